//! Config loader — reads `~/.prism/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.prism/config.json`
//! 3. Environment variables `PRISM_<SECTION>__<FIELD>` (override JSON)
//! 4. Vendor variables such as `OPENAI_API_KEY`, only when no key is set yet
//!
//! A missing or unreadable file is never fatal: a provider without a key is
//! simply unavailable.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Provider names with env var support, in the order they are applied.
const PROVIDER_NAMES: &[&str] = &[
    "openai",
    "anthropic",
    "gemini",
    "deepseek",
    "groq",
    "openrouter",
    "moonshot",
];

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path, |key| std::env::var(key).ok())
}

/// Load config from a specific file path, resolving env vars through `env`.
fn load_config_from_path<F>(path: &Path, env: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default(), env);
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default(), env);
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default(), env);
        }
    };

    apply_env_overrides(config, env)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `PRISM_PROVIDERS__<NAME>__API_KEY` → `providers.<name>.api_key`
/// - `PRISM_PROVIDERS__<NAME>__API_BASE` → `providers.<name>.api_base`
/// - `<NAME>_API_KEY` → `providers.<name>.api_key` when still empty
/// - `PRISM_ROUTER__CACHE_TTL_SECS` → `router.cache_ttl_secs`
/// - `PRISM_ROUTER__REQUEST_TIMEOUT_SECS` → `router.request_timeout_secs`
/// - `PRISM_ROUTER__DEFAULT_PROVIDER` → `router.default_provider`
fn apply_env_overrides<F>(mut config: Config, env: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    for name in PROVIDER_NAMES {
        let upper = name.to_uppercase();
        let Some(provider) = config.providers.get_by_name_mut(name) else {
            continue;
        };

        if let Some(val) = env(&format!("PRISM_PROVIDERS__{upper}__API_KEY")) {
            provider.api_key = val;
        }
        if let Some(val) = env(&format!("PRISM_PROVIDERS__{upper}__API_BASE")) {
            provider.api_base = Some(val);
        }
        if provider.api_key.is_empty() {
            if let Some(val) = env(&format!("{upper}_API_KEY")) {
                provider.api_key = val;
            }
        }
    }

    if let Some(val) = env("PRISM_ROUTER__CACHE_TTL_SECS") {
        match val.parse::<u64>() {
            Ok(n) => config.router.cache_ttl_secs = n,
            Err(_) => warn!(value = %val, "Ignoring invalid PRISM_ROUTER__CACHE_TTL_SECS"),
        }
    }
    if let Some(val) = env("PRISM_ROUTER__REQUEST_TIMEOUT_SECS") {
        match val.parse::<u64>() {
            Ok(n) => config.router.request_timeout_secs = n,
            Err(_) => warn!(value = %val, "Ignoring invalid PRISM_ROUTER__REQUEST_TIMEOUT_SECS"),
        }
    }
    if let Some(val) = env("PRISM_ROUTER__DEFAULT_PROVIDER") {
        config.router.default_provider = Some(val);
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
