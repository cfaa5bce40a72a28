//! Seller API configuration.

use serde::Deserialize;

/// HTTP client settings for the seller API.
#[derive(Debug, Clone, Deserialize)]
pub struct UzumHttpConfig {
    /// Request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_http_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

const fn default_http_timeout_ms() -> u64 {
    10_000
}

const fn default_http_connect_timeout_ms() -> u64 {
    5_000
}

impl Default for UzumHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_http_timeout_ms(),
            connect_timeout_ms: default_http_connect_timeout_ms(),
        }
    }
}

/// Where and what to fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct UzumConfig {
    /// Seller OpenAPI root, without a trailing slash.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Shop whose orders are watched.
    #[serde(default)]
    pub shop_id: String,
    /// Order status to poll.
    #[serde(default = "default_status")]
    pub status: String,
    /// Default credential for recipients registered with `/start`.
    /// Overridden by `UZUM_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub http: UzumHttpConfig,
}

fn default_api_url() -> String {
    "https://api-seller.uzum.uz/api/seller-openapi".into()
}

fn default_status() -> String {
    "PACKING".into()
}

impl Default for UzumConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            shop_id: String::new(),
            status: default_status(),
            api_key: None,
            http: UzumHttpConfig::default(),
        }
    }
}

impl UzumConfig {
    /// Full URL of the FBS orders endpoint.
    #[must_use]
    pub fn orders_url(&self) -> String {
        format!("{}/v1/fbs/orders", self.api_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_url_tolerates_trailing_slash() {
        let config = UzumConfig {
            api_url: "http://localhost:8080/api/".into(),
            ..UzumConfig::default()
        };
        assert_eq!(config.orders_url(), "http://localhost:8080/api/v1/fbs/orders");
    }

    #[test]
    fn defaults_poll_packing_orders() {
        let config: UzumConfig = toml::from_str("shop_id = \"7\"").unwrap();
        assert_eq!(config.status, "PACKING");
        assert_eq!(config.http.timeout_ms, 10_000);
        assert!(config.api_key.is_none());
    }
}
