// Shared type definitions for the auditor.
// Each submodule defines types used across managers, services and the RPC surface.

pub mod analytics;
pub mod bookmark;
pub mod errors;
pub mod recycle;
pub mod scan;
pub mod settings;
