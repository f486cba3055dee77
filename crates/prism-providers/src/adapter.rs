//! Provider adapters — translation between the abstract request/response and
//! each provider family's wire format.
//!
//! Adapters are selected by provider name, not by subclassing: every provider
//! maps onto one [`ProviderFamily`] variant, and each variant implements the
//! same four operations. Adding a provider that speaks an existing protocol
//! is one line in [`ProviderFamily::for_provider`].

use serde::Deserialize;
use serde_json::{json, Value};

use prism_core::TokenUsage;

use crate::error::{Result, RouterError};

/// Persona shared by every provider.
pub const SYSTEM_INSTRUCTION: &str = "You are a data analysis assistant. \
You turn structured business data into clear, accurate reports, answers, and insights. \
Ground every statement in the data you are given and say so when the data is insufficient.";

/// `anthropic-version` header value sent with every Anthropic request.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Wire protocol spoken by a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderFamily {
    /// `POST /chat/completions` (OpenAI, DeepSeek, Groq, OpenRouter, Moonshot).
    OpenAiCompatible,
    /// `POST /messages` with a top-level `system` field.
    Anthropic,
    /// `POST /models/{model}:generateContent` with `systemInstruction`.
    Gemini,
}

impl ProviderFamily {
    /// Map a provider name to its adapter.
    pub fn for_provider(name: &str) -> Result<Self> {
        match name {
            "openai" | "deepseek" | "groq" | "openrouter" | "moonshot" => {
                Ok(ProviderFamily::OpenAiCompatible)
            }
            "anthropic" => Ok(ProviderFamily::Anthropic),
            "gemini" => Ok(ProviderFamily::Gemini),
            other => Err(RouterError::Configuration(format!(
                "no adapter for provider '{other}'"
            ))),
        }
    }

    /// Full request URL for this family.
    pub fn request_url(&self, endpoint: &str, model: &str, streaming: bool) -> String {
        let base = endpoint.trim_end_matches('/');
        match self {
            ProviderFamily::OpenAiCompatible => format!("{base}/chat/completions"),
            ProviderFamily::Anthropic => format!("{base}/messages"),
            ProviderFamily::Gemini if streaming => {
                format!("{base}/models/{model}:streamGenerateContent?alt=sse")
            }
            ProviderFamily::Gemini => format!("{base}/models/{model}:generateContent"),
        }
    }

    /// Headers required on top of `Authorization: Bearer <credential>`.
    pub fn auth_headers(&self, credential: &str) -> Vec<(String, String)> {
        match self {
            ProviderFamily::OpenAiCompatible => Vec::new(),
            ProviderFamily::Anthropic => vec![
                ("x-api-key".to_string(), credential.to_string()),
                ("anthropic-version".to_string(), ANTHROPIC_VERSION.to_string()),
            ],
            ProviderFamily::Gemini => {
                vec![("x-goog-api-key".to_string(), credential.to_string())]
            }
        }
    }

    /// Build the provider-native request body.
    pub fn build_request_body(
        &self,
        prompt: &str,
        model: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Value {
        match self {
            ProviderFamily::OpenAiCompatible => json!({
                "model": model,
                "messages": [
                    { "role": "system", "content": SYSTEM_INSTRUCTION },
                    { "role": "user", "content": prompt },
                ],
                "max_tokens": max_tokens,
                "temperature": temperature,
            }),
            ProviderFamily::Anthropic => json!({
                "model": model,
                "system": SYSTEM_INSTRUCTION,
                "messages": [
                    { "role": "user", "content": prompt },
                ],
                "max_tokens": max_tokens,
                "temperature": temperature,
            }),
            ProviderFamily::Gemini => json!({
                "systemInstruction": {
                    "parts": [{ "text": SYSTEM_INSTRUCTION }],
                },
                "contents": [
                    { "role": "user", "parts": [{ "text": prompt }] },
                ],
                "generationConfig": {
                    "maxOutputTokens": max_tokens,
                    "temperature": temperature,
                },
            }),
        }
    }

    /// Mark a body as streaming. Gemini streams through its URL instead.
    pub fn enable_streaming(&self, body: &mut Value) {
        match self {
            ProviderFamily::OpenAiCompatible | ProviderFamily::Anthropic => {
                if let Some(obj) = body.as_object_mut() {
                    obj.insert("stream".to_string(), Value::Bool(true));
                }
            }
            ProviderFamily::Gemini => {}
        }
    }

    /// Pull the generated text out of a full response body.
    ///
    /// Returns an empty string when the expected path is absent.
    pub fn extract_text(&self, body: &Value) -> String {
        match self {
            ProviderFamily::OpenAiCompatible => body
                .pointer("/choices/0/message/content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            ProviderFamily::Anthropic => body
                .get("content")
                .and_then(Value::as_array)
                .map(|blocks| {
                    blocks
                        .iter()
                        .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
                        .filter_map(|b| b.get("text").and_then(Value::as_str))
                        .collect::<String>()
                })
                .unwrap_or_default(),
            ProviderFamily::Gemini => gemini_parts_text(body),
        }
    }

    /// Best-effort token accounting. Any shape mismatch yields `None`.
    pub fn extract_token_usage(&self, body: &Value) -> Option<TokenUsage> {
        match self {
            ProviderFamily::OpenAiCompatible => {
                let usage: OpenAiUsage = serde_json::from_value(body.get("usage")?.clone()).ok()?;
                Some(TokenUsage {
                    prompt_tokens: usage.prompt_tokens,
                    completion_tokens: usage.completion_tokens,
                    total_tokens: usage.total_tokens,
                })
            }
            ProviderFamily::Anthropic => {
                let usage: AnthropicUsage =
                    serde_json::from_value(body.get("usage")?.clone()).ok()?;
                Some(TokenUsage {
                    prompt_tokens: usage.input_tokens,
                    completion_tokens: usage.output_tokens,
                    total_tokens: usage.input_tokens.saturating_add(usage.output_tokens),
                })
            }
            ProviderFamily::Gemini => {
                let usage: GeminiUsage =
                    serde_json::from_value(body.get("usageMetadata")?.clone()).ok()?;
                let total = usage.total_token_count.unwrap_or_else(|| {
                    usage
                        .prompt_token_count
                        .saturating_add(usage.candidates_token_count)
                });
                Some(TokenUsage {
                    prompt_tokens: usage.prompt_token_count,
                    completion_tokens: usage.candidates_token_count,
                    total_tokens: total,
                })
            }
        }
    }

    /// Incremental text carried by one decoded SSE payload.
    ///
    /// Control events (role headers, `message_start`, `ping`, ...) yield "".
    pub fn extract_stream_chunk_text(&self, payload: &Value) -> String {
        match self {
            ProviderFamily::OpenAiCompatible => payload
                .pointer("/choices/0/delta/content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            ProviderFamily::Anthropic => {
                if payload.get("type").and_then(Value::as_str) != Some("content_block_delta") {
                    return String::new();
                }
                payload
                    .pointer("/delta/text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            }
            ProviderFamily::Gemini => gemini_parts_text(payload),
        }
    }
}

/// Concatenate `candidates[0].content.parts[*].text`.
fn gemini_parts_text(body: &Value) -> String {
    body.pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    total_token_count: Option<u32>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
