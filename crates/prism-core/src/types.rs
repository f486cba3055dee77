//! Core types for Prism — the abstract request/response shapes the router
//! speaks, independent of any provider's wire format.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Default sampling temperature when the caller doesn't set one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Callback invoked with the accumulated text after every streamed increment.
pub type StreamCallback = Arc<dyn Fn(&str) + Send + Sync>;

// ─────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────

/// A prompt submitted to the router.
///
/// Cloning is cheap apart from the prompt itself; the stream callback is
/// shared behind an `Arc`.
#[derive(Clone, Default)]
pub struct Request {
    /// Natural-language prompt.
    pub prompt: String,
    /// Explicit model. `None` = provider's first supported model.
    pub model: Option<String>,
    /// Token cap. `None` = provider's `max_tokens`.
    pub max_tokens: Option<u32>,
    /// Sampling temperature. `None` = [`DEFAULT_TEMPERATURE`].
    pub temperature: Option<f64>,
    /// Explicit provider. `None` = highest-priority available provider.
    pub provider_name: Option<String>,
    /// Request a streamed response.
    pub streaming: bool,
    /// Receives the accumulated text while streaming.
    pub on_stream_update: Option<StreamCallback>,
}

impl Request {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider_name = Some(provider.into());
        self
    }

    /// Enable streaming and register the update callback.
    pub fn with_stream<F>(mut self, on_update: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.streaming = true;
        self.on_stream_update = Some(Arc::new(on_update));
        self
    }

    /// Effective temperature (falls back to [`DEFAULT_TEMPERATURE`]).
    pub fn effective_temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("prompt", &self.prompt)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("provider_name", &self.provider_name)
            .field("streaming", &self.streaming)
            .field("on_stream_update", &self.on_stream_update.is_some())
            .finish()
    }
}

// ─────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────

/// Normalized result of a routed request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Generated text.
    pub text: String,
    /// Provider that produced the response.
    pub provider_name: String,
    /// Model that produced the response.
    pub model_name: String,
    /// Token accounting, when the provider reported it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
}

/// Token usage statistics reported by a provider.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_request_defaults() {
        let req = Request::new("hello");
        assert_eq!(req.prompt, "hello");
        assert!(req.model.is_none());
        assert!(req.provider_name.is_none());
        assert!(!req.streaming);
        assert!(req.on_stream_update.is_none());
        assert_eq!(req.effective_temperature(), 0.7);
    }

    #[test]
    fn test_request_builder() {
        let req = Request::new("p")
            .with_provider("anthropic")
            .with_model("claude-3-5-haiku-latest")
            .with_max_tokens(256)
            .with_temperature(0.2);
        assert_eq!(req.provider_name.as_deref(), Some("anthropic"));
        assert_eq!(req.model.as_deref(), Some("claude-3-5-haiku-latest"));
        assert_eq!(req.max_tokens, Some(256));
        assert_eq!(req.effective_temperature(), 0.2);
    }

    #[test]
    fn test_with_stream_sets_flag_and_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let req = Request::new("p").with_stream(move |t| sink.lock().unwrap().push(t.to_string()));
        assert!(req.streaming);

        let cb = req.on_stream_update.clone().unwrap();
        cb("He");
        cb("Hello");
        assert_eq!(*seen.lock().unwrap(), vec!["He", "Hello"]);
    }

    #[test]
    fn test_request_debug_hides_callback() {
        let req = Request::new("p").with_stream(|_| {});
        let dbg = format!("{:?}", req);
        assert!(dbg.contains("on_stream_update: true"));
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let resp = Response {
            text: "ok".into(),
            provider_name: "openai".into(),
            model_name: "gpt-4o-mini".into(),
            token_usage: Some(TokenUsage {
                prompt_tokens: 3,
                completion_tokens: 1,
                total_tokens: 4,
            }),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["providerName"], "openai");
        assert_eq!(json["tokenUsage"]["totalTokens"], 4);
    }

    #[test]
    fn test_response_omits_missing_usage() {
        let resp = Response {
            text: "ok".into(),
            provider_name: "openai".into(),
            model_name: "gpt-4o-mini".into(),
            token_usage: None,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("tokenUsage").is_none());
    }
}
