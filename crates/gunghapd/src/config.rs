//! Service configuration.
//!
//! Built once at startup from the environment and handed to the server and
//! the model client. Nothing reads the environment after that.

use std::fmt;
use std::time::Duration;

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_MODEL: &str = "GEMINI_MODEL";
pub const ENV_BASE_URL: &str = "GEMINI_BASE_URL";
pub const ENV_TIMEOUT: &str = "GUNGHAP_TIMEOUT_SECS";
pub const ENV_BIND: &str = "GUNGHAP_BIND";

#[derive(Clone)]
pub struct ServiceConfig {
    /// Provider credential; the service starts without it but cannot generate
    pub api_key: Option<String>,

    pub model: String,

    /// Provider API root, without the `/models/...` suffix
    pub base_url: String,

    /// Per-attempt timeout for provider calls
    pub request_timeout_secs: u64,

    pub bind_addr: String,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_request_timeout() -> u64 {
    20
}

fn default_bind_addr() -> String {
    "127.0.0.1:8787".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl ServiceConfig {
    /// Read from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self {
            api_key: get(ENV_API_KEY),
            ..Self::default()
        };
        if let Some(model) = get(ENV_MODEL) {
            config.model = model;
        }
        if let Some(base_url) = get(ENV_BASE_URL) {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = get(ENV_TIMEOUT) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout_secs = secs,
                _ => tracing::warn!(
                    "Ignoring invalid {}={:?}, using {}s",
                    ENV_TIMEOUT,
                    raw,
                    config.request_timeout_secs
                ),
            }
        }
        if let Some(bind) = get(ENV_BIND) {
            config.bind_addr = bind;
        }
        config
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Mask a secret for logs (first 4 chars only)
pub fn mask_key(key: &str) -> String {
    if key.chars().count() > 8 {
        let prefix: String = key.chars().take(4).collect();
        format!("{}...", prefix)
    } else {
        "***".to_string()
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &self.api_key.as_deref().map(mask_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup_from(&[]));
        assert!(config.api_key.is_none());
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.request_timeout(), Duration::from_secs(20));
        assert!(!config.has_credential());
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            (ENV_API_KEY, "AIzaSyExampleKey"),
            (ENV_MODEL, "gemini-1.5-pro"),
            (ENV_BASE_URL, "http://localhost:9000/v1beta/"),
            (ENV_TIMEOUT, "5"),
            (ENV_BIND, "0.0.0.0:3000"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("AIzaSyExampleKey"));
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.base_url, "http://localhost:9000/v1beta");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_blank_key_is_unset() {
        let config = ServiceConfig::from_lookup(lookup_from(&[(ENV_API_KEY, "   ")]));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_invalid_timeout_keeps_default() {
        let config = ServiceConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT, "soon")]));
        assert_eq!(config.request_timeout_secs, 20);
        let config = ServiceConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT, "0")]));
        assert_eq!(config.request_timeout_secs, 20);
    }

    #[test]
    fn test_debug_masks_key() {
        let config = ServiceConfig {
            api_key: Some("AIzaSySecretValue123".into()),
            ..Default::default()
        };
        let dbg = format!("{:?}", config);
        assert!(dbg.contains("AIza..."));
        assert!(!dbg.contains("SecretValue"));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("short"), "***");
        assert_eq!(mask_key("12345678"), "***");
        assert_eq!(mask_key("1234567890abcdef"), "1234...");
    }
}
