//! Transport trait — the seam between the router and the network.
//!
//! The router builds an [`Outbound`] request and hands it to a `Transport`.
//! [`HttpTransport`](crate::transport::HttpTransport) is the production
//! implementation; tests can substitute their own.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// A fully-shaped provider call.
#[derive(Clone, Debug)]
pub struct Outbound {
    /// Absolute request URL.
    pub url: String,
    /// Sent as `Authorization: Bearer <credential>`.
    pub credential: String,
    /// Provider-specific headers (auth variants, config extras).
    pub headers: Vec<(String, String)>,
    /// JSON request body.
    pub body: Value,
}

/// Outbound HTTP boundary.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST and return the full JSON response body.
    ///
    /// Non-2xx statuses and undecodable bodies are errors.
    async fn send(&self, request: &Outbound) -> Result<Value, TransportError>;

    /// POST and return the raw response body as a chunk stream.
    async fn open_stream(&self, request: &Outbound) -> Result<Box<dyn ChunkStream>, TransportError>;
}

/// Raw response body, read chunk by chunk.
///
/// Dropping the stream releases the underlying connection.
#[async_trait]
pub trait ChunkStream: Send {
    /// Next chunk, or `None` at end of body.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}
