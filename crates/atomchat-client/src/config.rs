//! Base-URL resolution for the backend.

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const ENV_BASE_URL: &str = "ATOMCHAT_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("base url must not be empty")]
    EmptyBaseUrl,
    #[error("base url must use http:// or https:// and include a host")]
    InvalidBaseUrl,
}

/// Resolves the backend base URL: an explicit value (CLI flag) wins, then
/// `ATOMCHAT_BASE_URL`, then the local default. Returns the resolved URL
/// plus the source it came from.
pub fn resolve_base_url(explicit: Option<&str>) -> Result<(String, &'static str), ConfigError> {
    if let Some(raw) = explicit.map(str::trim).filter(|raw| !raw.is_empty()) {
        return normalize_base_url(raw).map(|normalized| (normalized, "flag"));
    }
    if let Some(raw) = env_non_empty(ENV_BASE_URL) {
        return normalize_base_url(&raw).map(|normalized| (normalized, ENV_BASE_URL));
    }
    normalize_base_url(DEFAULT_BASE_URL).map(|normalized| (normalized, "default_local"))
}

pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl);
    }
    let Some((_, remainder)) = trimmed.split_once("://") else {
        return Err(ConfigError::InvalidBaseUrl);
    };
    if remainder.trim().is_empty() || remainder.starts_with('/') {
        return Err(ConfigError::InvalidBaseUrl);
    }
    Ok(trimmed.to_string())
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn with_env<T>(value: Option<&str>, test: impl FnOnce() -> T) -> T {
        let lock = ENV_LOCK.get_or_init(|| Mutex::new(()));
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let previous = std::env::var(ENV_BASE_URL).ok();
        if let Some(value) = value {
            unsafe { std::env::set_var(ENV_BASE_URL, value) };
        } else {
            unsafe { std::env::remove_var(ENV_BASE_URL) };
        }

        let result = test();

        if let Some(value) = previous {
            unsafe { std::env::set_var(ENV_BASE_URL, value) };
        } else {
            unsafe { std::env::remove_var(ENV_BASE_URL) };
        }

        result
    }

    #[test]
    fn normalize_trims_and_drops_trailing_slash() {
        let normalized = normalize_base_url(" https://bot.example.com/ ").expect("valid base url");
        assert_eq!(normalized, "https://bot.example.com");
    }

    #[test]
    fn normalize_requires_http_scheme_and_host() {
        assert_eq!(
            normalize_base_url("bot.example.com"),
            Err(ConfigError::InvalidBaseUrl)
        );
        assert_eq!(
            normalize_base_url("https:///ask"),
            Err(ConfigError::InvalidBaseUrl)
        );
        assert_eq!(normalize_base_url("   "), Err(ConfigError::EmptyBaseUrl));
    }

    #[test]
    fn resolve_prefers_explicit_flag_over_env() {
        with_env(Some("https://env.example.com"), || {
            let (resolved, source) =
                resolve_base_url(Some("https://flag.example.com/")).expect("resolved");
            assert_eq!(resolved, "https://flag.example.com");
            assert_eq!(source, "flag");
        });
    }

    #[test]
    fn resolve_uses_env_when_no_flag() {
        with_env(Some("https://env.example.com/"), || {
            let (resolved, source) = resolve_base_url(None).expect("resolved");
            assert_eq!(resolved, "https://env.example.com");
            assert_eq!(source, ENV_BASE_URL);
        });
    }

    #[test]
    fn resolve_defaults_local_when_nothing_set() {
        with_env(None, || {
            let (resolved, source) = resolve_base_url(None).expect("resolved");
            assert_eq!(resolved, DEFAULT_BASE_URL);
            assert_eq!(source, "default_local");
        });
    }
}
