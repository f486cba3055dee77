//! Response cache for non-streaming requests.
//!
//! Entries are keyed by a request fingerprint and live for a fixed TTL.
//! Backed by moka's sync cache: an expired entry is never returned, and
//! moka evicts it on its own schedule.
//!
//! Concurrent identical requests may both miss and both dispatch; the last
//! completion wins. There is no single-flight guarantee.

use std::fmt;
use std::time::Duration;

use moka::sync::Cache;
use tracing::debug;

use prism_core::types::DEFAULT_TEMPERATURE;
use prism_core::{Request, Response};

/// Default time-to-live: 30 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Deterministic cache key for a request.
///
/// Built from `(provider | "auto", model | "default", max_tokens | 0,
/// temperature | 0.7, prompt)`, serialized as a JSON array so no field can
/// bleed into its neighbour.
pub fn fingerprint(request: &Request) -> String {
    serde_json::json!([
        request.provider_name.as_deref().unwrap_or("auto"),
        request.model.as_deref().unwrap_or("default"),
        request.max_tokens.unwrap_or(0),
        request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        request.prompt,
    ])
    .to_string()
}

/// In-memory TTL cache of normalized responses.
///
/// Cheap to share: all methods take `&self` and never block across an await.
pub struct ResponseCache {
    entries: Cache<String, Response>,
    ttl: Duration,
}

impl fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCache {
    /// Create a cache with the default 30 minute TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder().time_to_live(ttl).build(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Response> {
        self.entries.get(key)
    }

    /// Insert or overwrite the entry for `key`.
    pub fn put(&self, key: impl Into<String>, response: Response) {
        self.entries.insert(key.into(), response);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
        debug!("Response cache cleared");
    }

    /// Number of live entries.
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn response(text: &str) -> Response {
        Response {
            text: text.into(),
            provider_name: "openai".into(),
            model_name: "gpt-4o-mini".into(),
            token_usage: None,
        }
    }

    #[test]
    fn test_fingerprint_defaults() {
        let fp = fingerprint(&Request::new("hello"));
        assert_eq!(fp, r#"["auto","default",0,0.7,"hello"]"#);
    }

    #[test]
    fn test_fingerprint_explicit_default_temperature_matches_implicit() {
        let a = fingerprint(&Request::new("p"));
        let b = fingerprint(&Request::new("p").with_temperature(0.7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_distinguishes_fields() {
        let base = fingerprint(&Request::new("p"));
        assert_ne!(base, fingerprint(&Request::new("p").with_provider("groq")));
        assert_ne!(base, fingerprint(&Request::new("p").with_model("gpt-4o")));
        assert_ne!(base, fingerprint(&Request::new("p").with_max_tokens(10)));
        assert_ne!(base, fingerprint(&Request::new("p").with_temperature(0.1)));
        assert_ne!(base, fingerprint(&Request::new("q")));
    }

    #[test]
    fn test_fingerprint_no_delimiter_bleed() {
        let a = fingerprint(&Request::new("b|c").with_model("a"));
        let b = fingerprint(&Request::new("c").with_model("a|b"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_ignores_streaming_flag() {
        let a = fingerprint(&Request::new("p"));
        let b = fingerprint(&Request::new("p").with_stream(|_| {}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_put_get() {
        let cache = ResponseCache::new();
        assert!(cache.get("k").is_none());
        cache.put("k", response("one"));
        assert_eq!(cache.get("k").unwrap().text, "one");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_overwrites() {
        let cache = ResponseCache::new();
        cache.put("k", response("one"));
        cache.put("k", response("two"));
        assert_eq!(cache.get("k").unwrap().text, "two");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entry_not_returned() {
        let cache = ResponseCache::with_ttl(Duration::from_millis(1));
        cache.put("k", response("stale"));
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_after_expiry_is_fresh_again() {
        let cache = ResponseCache::with_ttl(Duration::from_millis(30));
        cache.put("k", response("old"));
        std::thread::sleep(Duration::from_millis(60));
        cache.put("k", response("new"));
        assert_eq!(cache.get("k").unwrap().text, "new");
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let cache = ResponseCache::with_ttl(Duration::from_millis(30));
        cache.put("k", response("v"));
        assert!(cache.get("k").is_some());
        std::thread::sleep(Duration::from_millis(60));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_clear() {
        let cache = ResponseCache::new();
        cache.put("a", response("1"));
        cache.put("b", response("2"));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_default_ttl_is_thirty_minutes() {
        assert_eq!(ResponseCache::default().ttl(), Duration::from_secs(1800));
    }
}
