//! Request router — picks a provider, dispatches, caches, and falls back.
//!
//! Flow of one call:
//!
//! 1. **Cache check** (non-streaming only): a fresh hit is returned as-is.
//! 2. **Provider select**: [`ProviderRegistry::resolve`] with the requested name.
//! 3. **Dispatch**: the adapter shapes the body, the transport sends it, and
//!    the result is either streamed into the caller's callback or read whole.
//! 4. **Cache store** (non-streaming only).
//!
//! A transport or extraction failure on an explicitly named provider gets
//! exactly one retry with the provider cleared, so priority order decides.
//! There is no loop over every provider and no backoff.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{debug, info, warn};

use prism_core::config::Config;
use prism_core::utils::truncate_string;
use prism_core::{Request, Response, StreamCallback};

use crate::adapter::ProviderFamily;
use crate::cache::{fingerprint, ResponseCache};
use crate::error::{Result, RouterError};
use crate::registry::{apply_model_overrides, ProviderDescriptor, ProviderRegistry};
use crate::stream::{SseDecoder, SseFrame};
use crate::traits::{Outbound, Transport};
use crate::transport::HttpTransport;

/// Multi-provider request router.
///
/// `Send + Sync`; share it behind an `Arc` across tasks.
pub struct Router {
    registry: RwLock<Arc<ProviderRegistry>>,
    cache: Arc<ResponseCache>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("registry", &self.registry())
            .field("cached_entries", &self.cache.len())
            .finish()
    }
}

impl Router {
    pub fn new(
        registry: ProviderRegistry,
        cache: Arc<ResponseCache>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Router {
            registry: RwLock::new(Arc::new(registry)),
            cache,
            transport,
        }
    }

    /// Build a router from loaded configuration: registry from the provider
    /// section, cache TTL and HTTP timeout from the router section.
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = ProviderRegistry::from_config(&config.providers);
        let cache = ResponseCache::with_ttl(Duration::from_secs(config.router.cache_ttl_secs));
        let transport = HttpTransport::new(Duration::from_secs(config.router.request_timeout_secs))
            .map_err(|e| RouterError::Configuration(e.to_string()))?;

        debug!(
            available = registry.list_available().len(),
            cache_ttl_secs = config.router.cache_ttl_secs,
            "Router initialized"
        );

        Ok(Router::new(registry, Arc::new(cache), Arc::new(transport)))
    }

    /// Snapshot of the current registry.
    pub fn registry(&self) -> Arc<ProviderRegistry> {
        self.registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Swap in a new registry (e.g. after the config file changed).
    ///
    /// Calls already past provider selection keep the descriptor they chose.
    pub fn reload_registry(&self, registry: ProviderRegistry) {
        let mut guard = self.registry.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(registry);
        info!(available = guard.list_available().len(), "Provider registry reloaded");
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Available providers, ascending by priority.
    pub fn list_available(&self) -> Vec<ProviderDescriptor> {
        self.registry()
            .list_available()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Empty the response cache.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Route one request.
    pub async fn send_request(&self, request: &Request) -> Result<Response> {
        match self.route(request).await {
            Err(RouterError::ProviderCommunication { provider, message })
                if request.provider_name.is_some() =>
            {
                info!(
                    provider = %provider,
                    error = %message,
                    "Explicit provider failed, falling back to priority order"
                );
                let mut fallback = request.clone();
                fallback.provider_name = None;
                self.route(&fallback).await
            }
            other => other,
        }
    }

    /// One attempt: cache check, provider select, dispatch, cache store.
    async fn route(&self, request: &Request) -> Result<Response> {
        let cacheable = !request.streaming;
        let key = fingerprint(request);

        if cacheable {
            if let Some(hit) = self.cache.get(&key) {
                debug!(provider = %hit.provider_name, "Cache hit");
                return Ok(hit);
            }
        }

        let registry = self.registry();
        let provider = registry
            .resolve(request.provider_name.as_deref())
            .ok_or(RouterError::NoProviderAvailable)?;

        let response = self.dispatch(provider, request).await?;

        if cacheable {
            self.cache.put(key, response.clone());
        }
        Ok(response)
    }

    async fn dispatch(&self, provider: &ProviderDescriptor, request: &Request) -> Result<Response> {
        let family = ProviderFamily::for_provider(&provider.name)?;

        let model = match request.model.as_deref().or_else(|| provider.default_model()) {
            Some(m) => m.to_string(),
            None => {
                return Err(RouterError::Configuration(format!(
                    "provider '{}' has no supported models",
                    provider.name
                )))
            }
        };
        let max_tokens = request.max_tokens.unwrap_or(provider.max_tokens);
        let temperature = apply_model_overrides(
            &model,
            &provider.model_overrides,
            request.effective_temperature(),
        );

        let stream_to = match &request.on_stream_update {
            Some(cb) if request.streaming && provider.supports_streaming => Some(cb.clone()),
            _ => None,
        };

        let mut body = family.build_request_body(&request.prompt, &model, max_tokens, temperature);
        if stream_to.is_some() {
            family.enable_streaming(&mut body);
        }

        let mut headers = family.auth_headers(&provider.credential);
        headers.extend(provider.extra_headers.iter().cloned());

        let outbound = Outbound {
            url: family.request_url(&provider.endpoint, &model, stream_to.is_some()),
            credential: provider.credential.clone(),
            headers,
            body,
        };

        debug!(
            provider = %provider.display_name,
            model = %model,
            streaming = stream_to.is_some(),
            prompt = %truncate_string(&request.prompt, 60),
            "Dispatching request"
        );

        match stream_to {
            Some(on_update) => self.dispatch_stream(provider, family, model, &outbound, on_update).await,
            None => self.dispatch_sync(provider, family, model, &outbound).await,
        }
    }

    async fn dispatch_sync(
        &self,
        provider: &ProviderDescriptor,
        family: ProviderFamily,
        model: String,
        outbound: &Outbound,
    ) -> Result<Response> {
        let body = self
            .transport
            .send(outbound)
            .await
            .map_err(|e| RouterError::communication(&provider.name, e))?;

        let text = family.extract_text(&body);
        let token_usage = family.extract_token_usage(&body);

        debug!(
            provider = %provider.display_name,
            chars = text.len(),
            total_tokens = token_usage.as_ref().map_or(0, |u| u.total_tokens),
            "Response received"
        );

        Ok(Response {
            text,
            provider_name: provider.name.clone(),
            model_name: model,
            token_usage,
        })
    }

    async fn dispatch_stream(
        &self,
        provider: &ProviderDescriptor,
        family: ProviderFamily,
        model: String,
        outbound: &Outbound,
        on_update: StreamCallback,
    ) -> Result<Response> {
        // Owned by this scope: dropped (and the connection released) on every exit path.
        let mut stream = self
            .transport
            .open_stream(outbound)
            .await
            .map_err(|e| RouterError::communication(&provider.name, e))?;

        let mut decoder = SseDecoder::new();
        let mut accumulated = String::new();

        loop {
            let chunk = stream
                .next_chunk()
                .await
                .map_err(|e| RouterError::communication(&provider.name, e))?;

            let frames = match chunk {
                Some(bytes) => decoder.feed(&bytes),
                None => {
                    let tail = decoder.finish();
                    apply_frames(family, &tail, &mut accumulated, &on_update);
                    break;
                }
            };
            apply_frames(family, &frames, &mut accumulated, &on_update);
        }

        debug!(
            provider = %provider.display_name,
            chars = accumulated.len(),
            done_sentinel = decoder.is_done(),
            "Stream finished"
        );

        Ok(Response {
            text: accumulated,
            provider_name: provider.name.clone(),
            model_name: model,
            token_usage: None,
        })
    }
}

/// Append the text of each data frame and notify the caller per increment.
fn apply_frames(
    family: ProviderFamily,
    frames: &[SseFrame],
    accumulated: &mut String,
    on_update: &StreamCallback,
) {
    for frame in frames {
        let SseFrame::Data(payload) = frame else {
            continue;
        };

        let value: serde_json::Value = match serde_json::from_str(payload) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, payload = %truncate_string(payload, 80), "Dropping malformed stream frame");
                continue;
            }
        };

        let delta = family.extract_stream_chunk_text(&value);
        if !delta.is_empty() {
            accumulated.push_str(&delta);
            on_update(accumulated.as_str());
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
