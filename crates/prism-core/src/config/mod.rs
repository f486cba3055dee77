//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use prism_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Cache TTL: {}s", cfg.router.cache_ttl_secs);
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{get_config_path, load_config, save_config};
pub use schema::{Config, ProviderConfig, ProvidersConfig, RouterConfig};
