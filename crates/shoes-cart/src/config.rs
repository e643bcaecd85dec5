//! Cart configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::money::Currency;
use crate::notify::CartMessages;

/// Storage key the cart snapshot lives under.
pub const DEFAULT_CART_KEY: &str = "@RocketShoes:cart";

/// Environment variable overriding [`ApiConfig::base_url`].
pub const API_URL_ENV: &str = "SHOES_API_URL";

/// Top-level cart configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Storefront API.
    #[serde(default)]
    pub api: ApiConfig,

    /// Persisted slot.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Notice texts.
    #[serde(default)]
    pub messages: CartMessages,

    /// Currency used for price display.
    #[serde(default)]
    pub currency: Currency,
}

impl CartConfig {
    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.api.base_url = url;
        }
        self
    }
}

/// Storefront API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL serving `/products` and `/stock`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3333".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Persisted slot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// File backing the Key-Value store.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Key the cart snapshot is stored under.
    #[serde(default = "default_key")]
    pub key: String,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".shoes").join("storage.json")
}

fn default_key() -> String {
    DEFAULT_CART_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            key: default_key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CartConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:3333");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.storage.key, "@RocketShoes:cart");
        assert_eq!(config.currency, Currency::BRL);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: CartConfig =
            serde_json::from_str(r#"{"api": {"base_url": "http://api.local"}}"#).unwrap();
        assert_eq!(config.api.base_url, "http://api.local");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_env_override() {
        let config = CartConfig::default().with_overrides(|name| {
            (name == API_URL_ENV).then(|| "http://staging:3333".to_string())
        });
        assert_eq!(config.api.base_url, "http://staging:3333");

        let config = CartConfig::default().with_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.api.base_url, "http://localhost:3333");
    }
}
