//! Prism core — shared types, configuration, and small utilities.
//!
//! - [`types`]: request/response shapes passed between callers and the router
//! - [`config`]: JSON config schema, loader, and env var overrides
//! - [`utils`]: data directory resolution and string helpers

pub mod config;
pub mod types;
pub mod utils;

pub use types::{Request, Response, StreamCallback, TokenUsage};
