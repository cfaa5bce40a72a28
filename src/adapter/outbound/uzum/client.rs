//! Seller orders HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::normalize::parse_orders_body;
use super::settings::UzumConfig;
use crate::domain::{Credential, Order};
use crate::error::FetchError;
use crate::port::OrderSource;

/// Longest error body kept in a [`FetchError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for the FBS orders endpoint.
///
/// One request per [`fetch`](OrderSource::fetch); the next poll tick is
/// the retry.
pub struct UzumClient {
    http: HttpClient,
    orders_url: String,
    shop_id: String,
    status: String,
}

impl UzumClient {
    #[must_use]
    pub fn from_config(config: &UzumConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.http.timeout_ms))
            .connect_timeout(Duration::from_millis(config.http.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            orders_url: config.orders_url(),
            shop_id: config.shop_id.clone(),
            status: config.status.clone(),
        }
    }

    #[must_use]
    pub fn orders_url(&self) -> &str {
        &self.orders_url
    }
}

#[async_trait]
impl OrderSource for UzumClient {
    async fn fetch(&self, credential: &Credential) -> Result<Vec<Order>, FetchError> {
        let response = self
            .http
            .get(&self.orders_url)
            .query(&[("shopIds", self.shop_id.as_str()), ("status", self.status.as_str())])
            .header(AUTHORIZATION, credential.reveal())
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let orders = parse_orders_body(&body)?;
        debug!(
            shop_id = %self.shop_id,
            status = %self.status,
            count = orders.len(),
            "Fetched orders"
        );
        Ok(orders)
    }

    fn source_name(&self) -> &'static str {
        "uzum"
    }
}
