//! LLM provider layer for Prism.
//!
//! Routes a prompt to one of several LLM backends, normalizes the answer,
//! caches it, and falls back to another provider when a named one fails.
//!
//! # Architecture
//!
//! - [`registry`] — static provider specs + the runtime [`ProviderRegistry`]
//! - [`adapter`] — per-family wire formats ([`ProviderFamily`])
//! - [`stream`] — SSE line decoding for streamed completions
//! - [`traits::Transport`] / [`transport::HttpTransport`] — the network boundary
//! - [`cache`] — TTL response cache keyed by request fingerprint
//! - [`router::Router`] — selection, dispatch, caching, bounded fallback
//! - [`reports::ReportAssistant`] — report/question/insight prompt templates

pub mod adapter;
pub mod cache;
pub mod error;
pub mod registry;
pub mod reports;
pub mod router;
pub mod stream;
pub mod traits;
pub mod transport;

// Re-export main types for convenience
pub use adapter::ProviderFamily;
pub use cache::ResponseCache;
pub use error::{Result, RouterError, TransportError};
pub use registry::{ProviderDescriptor, ProviderRegistry, ProviderSpec, PROVIDERS};
pub use reports::ReportAssistant;
pub use router::Router;
pub use traits::{ChunkStream, Outbound, Transport};
pub use transport::HttpTransport;
