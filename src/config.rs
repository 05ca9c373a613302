use std::time::Duration;

use serde::Deserialize;

/// Shape of the data returned by API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnFormat {
    /// Always a JSON object; top-level lists are keyed by index.
    Object,
    /// Top-level lists stay lists.
    Array,
}

impl Default for ReturnFormat {
    fn default() -> Self {
        ReturnFormat::Object
    }
}

/// Client configuration. Every field has a default, so a partial document
/// deserializes fine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the REST API.
    pub endpoint: String,
    /// Base URL of the `oauth/*` handshake endpoints.
    pub endpoint_oauth: String,
    /// Base URL of endpoints that never moved to the current API version.
    pub endpoint_legacy: String,
    pub return_format: ReturnFormat,
    /// Seconds a cached reply stays fresh.
    pub cache_ttl: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: "https://api.twitter.com/1.1/".to_string(),
            endpoint_oauth: "https://api.twitter.com/".to_string(),
            endpoint_legacy: "https://api.twitter.com/1/".to_string(),
            return_format: ReturnFormat::Object,
            cache_ttl: 60,
        }
    }
}

impl Config {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}
