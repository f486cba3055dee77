//! Router error types.

/// Errors surfaced to callers of the router.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// No configured provider has a credential.
    #[error("no LLM provider available: set at least one API key (e.g. OPENAI_API_KEY)")]
    NoProviderAvailable,

    /// A provider name has no matching adapter, or a provider is missing
    /// data it needs (e.g. no models). Never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Transport failure, non-2xx status, or an unreadable body.
    #[error("error communicating with provider '{provider}': {message}")]
    ProviderCommunication { provider: String, message: String },
}

impl RouterError {
    pub(crate) fn communication(provider: &str, err: impl std::fmt::Display) -> Self {
        RouterError::ProviderCommunication {
            provider: provider.to_string(),
            message: err.to_string(),
        }
    }
}

/// Errors raised by a [`Transport`](crate::traits::Transport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
