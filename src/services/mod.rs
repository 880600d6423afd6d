// Bookmark Audit services
// Services are the stateless audit stages: flattening, normalization, grouping, probing, analytics, settings.

pub mod duplicate_grouper;
pub mod health_analyzer;
pub mod http_probe;
pub mod liveness_scanner;
pub mod settings_engine;
pub mod tree_flattener;
pub mod url_normalizer;
