//! Provider registry — static specs for the supported LLM providers and the
//! runtime [`ProviderRegistry`] built from them.
//!
//! Each `ProviderSpec` describes how to reach a provider and what it offers:
//! default endpoint, models, token limit, streaming, and selection priority.
//! Config overrides are merged in once at startup; the result is an
//! immutable list of [`ProviderDescriptor`]s.

use std::fmt;

use prism_core::config::{ProviderConfig, ProvidersConfig};

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name (e.g. `"openrouter"`).
    pub name: &'static str,
    /// Human-readable name for logs. E.g. `"OpenRouter"`.
    pub display_name: &'static str,
    /// Vendor environment variable for the API key. E.g. `"OPENROUTER_API_KEY"`.
    pub env_key: &'static str,
    /// Default API base URL.
    pub default_api_base: &'static str,
    /// Supported models; the first one is used when a request names none.
    pub models: &'static [&'static str],
    /// Default token cap.
    pub max_tokens: u32,
    /// Whether the provider speaks SSE streaming.
    pub supports_streaming: bool,
    /// Selection priority (lower = preferred).
    pub priority: i32,
    /// Per-model overrides. If `pattern` appears in the model name
    /// (lowercase), force that field to `value` in the request.
    /// E.g. Kimi K2.5 requires `temperature >= 1.0`.
    pub model_overrides: &'static [ModelOverride],
}

/// A per-model parameter override.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelOverride {
    /// Substring to match in the lowercase model name.
    pub pattern: &'static str,
    /// The field to override.
    pub field: OverrideField,
    /// The value to set.
    pub value: f64,
}

/// Fields that can be overridden per model.
#[derive(Clone, Debug, PartialEq)]
pub enum OverrideField {
    Temperature,
}

// ─────────────────────────────────────────────
// Supported providers (in declaration order)
// ─────────────────────────────────────────────

/// Complete list of supported provider specifications.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "openai",
        display_name: "OpenAI",
        env_key: "OPENAI_API_KEY",
        default_api_base: "https://api.openai.com/v1",
        models: &["gpt-4o-mini", "gpt-4o"],
        max_tokens: 4096,
        supports_streaming: true,
        priority: 1,
        model_overrides: &[],
    },
    ProviderSpec {
        name: "anthropic",
        display_name: "Anthropic",
        env_key: "ANTHROPIC_API_KEY",
        default_api_base: "https://api.anthropic.com/v1",
        models: &["claude-3-5-sonnet-latest", "claude-3-5-haiku-latest"],
        max_tokens: 4096,
        supports_streaming: true,
        priority: 2,
        model_overrides: &[],
    },
    ProviderSpec {
        name: "gemini",
        display_name: "Gemini",
        env_key: "GEMINI_API_KEY",
        default_api_base: "https://generativelanguage.googleapis.com/v1beta",
        models: &["gemini-1.5-flash", "gemini-1.5-pro"],
        max_tokens: 8192,
        supports_streaming: true,
        priority: 3,
        model_overrides: &[],
    },
    ProviderSpec {
        name: "deepseek",
        display_name: "DeepSeek",
        env_key: "DEEPSEEK_API_KEY",
        default_api_base: "https://api.deepseek.com/v1",
        models: &["deepseek-chat", "deepseek-reasoner"],
        max_tokens: 4096,
        supports_streaming: true,
        priority: 4,
        model_overrides: &[],
    },
    ProviderSpec {
        name: "groq",
        display_name: "Groq",
        env_key: "GROQ_API_KEY",
        default_api_base: "https://api.groq.com/openai/v1",
        models: &["llama-3.3-70b-versatile", "llama-3.1-8b-instant"],
        max_tokens: 4096,
        supports_streaming: true,
        priority: 5,
        model_overrides: &[],
    },
    // Gateway — last resort, routes to many vendors
    ProviderSpec {
        name: "openrouter",
        display_name: "OpenRouter",
        env_key: "OPENROUTER_API_KEY",
        default_api_base: "https://openrouter.ai/api/v1",
        models: &["openai/gpt-4o-mini", "anthropic/claude-3.5-sonnet"],
        max_tokens: 4096,
        supports_streaming: true,
        priority: 6,
        model_overrides: &[],
    },
    // Moonshot (Kimi) — Kimi K2.5 forces temperature=1.0
    ProviderSpec {
        name: "moonshot",
        display_name: "Moonshot",
        env_key: "MOONSHOT_API_KEY",
        default_api_base: "https://api.moonshot.ai/v1",
        models: &["moonshot-v1-8k", "kimi-k2.5-preview"],
        max_tokens: 4096,
        supports_streaming: false,
        priority: 7,
        model_overrides: &[ModelOverride {
            pattern: "kimi-k2.5",
            field: OverrideField::Temperature,
            value: 1.0,
        }],
    },
];

/// Find a provider spec by exact name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.name == name)
}

/// Apply per-model overrides to request parameters.
///
/// Returns the overridden temperature. E.g. Kimi K2.5 forces `temperature = 1.0`.
pub fn apply_model_overrides(model: &str, overrides: &[ModelOverride], temperature: f64) -> f64 {
    let model_lower = model.to_lowercase();
    let mut temp = temperature;

    for ovr in overrides {
        if model_lower.contains(ovr.pattern) {
            match ovr.field {
                OverrideField::Temperature => temp = ovr.value,
            }
        }
    }

    temp
}

// ─────────────────────────────────────────────
// ProviderDescriptor — one provider, as configured
// ─────────────────────────────────────────────

/// Runtime description of a provider: static spec merged with user config.
///
/// Created once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct ProviderDescriptor {
    pub name: String,
    pub display_name: String,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    pub endpoint: String,
    /// API key. Empty = unavailable.
    pub credential: String,
    pub supported_models: Vec<String>,
    pub max_tokens: u32,
    pub supports_streaming: bool,
    pub priority: i32,
    /// Extra headers from config (e.g. OpenRouter `HTTP-Referer`).
    pub extra_headers: Vec<(String, String)>,
    pub model_overrides: Vec<ModelOverride>,
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("available", &self.is_available())
            .field("supported_models", &self.supported_models)
            .field("max_tokens", &self.max_tokens)
            .field("supports_streaming", &self.supports_streaming)
            .field("priority", &self.priority)
            .finish()
    }
}

impl ProviderDescriptor {
    /// A bare descriptor: no models, 4096 tokens, streaming on, priority 0.
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        let name = name.into();
        ProviderDescriptor {
            display_name: name.clone(),
            name,
            endpoint: endpoint.into(),
            credential: credential.into(),
            supported_models: Vec::new(),
            max_tokens: 4096,
            supports_streaming: true,
            priority: 0,
            extra_headers: Vec::new(),
            model_overrides: Vec::new(),
        }
    }

    /// Build a descriptor from a static spec and the user's config for it.
    pub fn from_spec(spec: &ProviderSpec, config: &ProviderConfig) -> Self {
        let supported_models = match &config.models {
            Some(models) if !models.is_empty() => models.clone(),
            _ => spec.models.iter().map(|m| m.to_string()).collect(),
        };

        let extra_headers = config
            .extra_headers
            .as_ref()
            .map(|headers| {
                let mut pairs: Vec<(String, String)> =
                    headers.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                pairs.sort();
                pairs
            })
            .unwrap_or_default();

        ProviderDescriptor {
            name: spec.name.to_string(),
            display_name: spec.display_name.to_string(),
            endpoint: config
                .api_base
                .clone()
                .unwrap_or_else(|| spec.default_api_base.to_string()),
            credential: config.api_key.clone(),
            supported_models,
            max_tokens: config.max_tokens.unwrap_or(spec.max_tokens),
            supports_streaming: spec.supports_streaming,
            priority: config.priority.unwrap_or(spec.priority),
            extra_headers,
            model_overrides: spec.model_overrides.to_vec(),
        }
    }

    pub fn with_models(mut self, models: &[&str]) -> Self {
        self.supported_models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_streaming(mut self, supports_streaming: bool) -> Self {
        self.supports_streaming = supports_streaming;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// A provider is available iff it has a non-empty credential.
    pub fn is_available(&self) -> bool {
        !self.credential.is_empty()
    }

    /// The model used when a request doesn't name one.
    pub fn default_model(&self) -> Option<&str> {
        self.supported_models.first().map(String::as_str)
    }
}

// ─────────────────────────────────────────────
// ProviderRegistry
// ─────────────────────────────────────────────

/// The set of providers known to this process, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct ProviderRegistry {
    providers: Vec<ProviderDescriptor>,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<ProviderDescriptor>) -> Self {
        Self { providers }
    }

    /// Build the registry from the static table and user config.
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let defaults = ProviderConfig::default();
        let providers = PROVIDERS
            .iter()
            .map(|spec| {
                let cfg = config.get_by_name(spec.name).unwrap_or(&defaults);
                ProviderDescriptor::from_spec(spec, cfg)
            })
            .collect();
        Self { providers }
    }

    /// All known providers, available or not, in declaration order.
    pub fn all(&self) -> &[ProviderDescriptor] {
        &self.providers
    }

    /// Look up a provider by name regardless of availability.
    pub fn get(&self, name: &str) -> Option<&ProviderDescriptor> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Providers with a credential, ascending by priority.
    ///
    /// The sort is stable, so equal priorities keep declaration order.
    pub fn list_available(&self) -> Vec<&ProviderDescriptor> {
        let mut available: Vec<&ProviderDescriptor> =
            self.providers.iter().filter(|p| p.is_available()).collect();
        available.sort_by_key(|p| p.priority);
        available
    }

    /// Pick a provider for a request.
    ///
    /// 1. `name` given, known, and available → that provider.
    /// 2. Otherwise the highest-priority available provider.
    /// 3. `None` when nothing is available.
    pub fn resolve(&self, name: Option<&str>) -> Option<&ProviderDescriptor> {
        if let Some(name) = name {
            if let Some(p) = self
                .providers
                .iter()
                .find(|p| p.name == name && p.is_available())
            {
                return Some(p);
            }
        }

        self.list_available().into_iter().next()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
