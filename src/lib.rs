//! Bookmark Audit: an engine for auditing a browser-style bookmark collection.
//!
//! Finds dead links and duplicates, soft-deletes them into a recoverable
//! recycle folder, and reports usage and health analytics. This library crate
//! exposes all modules for use by the RPC binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
