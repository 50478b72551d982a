//! HTTP clients for the search and detail services
//!
//! The search service (MultiverseBridge) maps a card name to printings across
//! editions; the detail service (Scryfall) maps a printing id to the full card
//! record including image URIs.

use crate::error::LookupError;
use crate::model::{CardCandidate, CardRecord};
use crate::{CardDetails, CardSearch, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default base URL of the search-by-name service
pub const DEFAULT_SEARCH_URL: &str = "https://www.multiversebridge.com";
/// Default base URL of the detail-by-id service
pub const DEFAULT_DETAIL_URL: &str = "https://api.scryfall.com";

/// Lookup client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Base URL of the search service
    pub search_base_url: String,
    /// Base URL of the detail service
    pub detail_base_url: String,
    /// User agent sent with every request
    pub user_agent: String,
    /// Per-request timeout in seconds (0 disables the timeout)
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig {
            search_base_url: std::env::var("PACKSLIP_SEARCH_URL")
                .unwrap_or_else(|_| DEFAULT_SEARCH_URL.to_string()),
            detail_base_url: std::env::var("PACKSLIP_DETAIL_URL")
                .unwrap_or_else(|_| DEFAULT_DETAIL_URL.to_string()),
            user_agent: format!("packslip-card-lookup/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}

impl LookupConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for specific service endpoints
    pub fn new(search_base_url: &str, detail_base_url: &str) -> Self {
        LookupConfig {
            search_base_url: search_base_url.trim_end_matches('/').to_string(),
            detail_base_url: detail_base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn build_http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(&self.user_agent);
        if self.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(self.timeout_secs));
        }
        builder
            .build()
            .map_err(|e| LookupError::ClientBuild(e.to_string()))
    }
}

/// Issue a GET and decode the JSON body, mapping every failure into a
/// service-tagged [`LookupError`].
async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    service: &'static str,
) -> Result<T> {
    let response = request.send().await?;
    let url = response.url().to_string();
    let status = response.status();

    if !status.is_success() {
        return Err(LookupError::Status {
            service,
            url,
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| LookupError::Decode {
        service,
        reason: e.to_string(),
    })
}

/// Search-by-name client (service A)
pub struct MultiverseBridgeClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl MultiverseBridgeClient {
    /// Create a new search client
    pub fn new(config: &LookupConfig) -> Result<Self> {
        Ok(MultiverseBridgeClient {
            base_url: config.search_base_url.clone(),
            http_client: config.build_http_client()?,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(&LookupConfig::from_env())
    }
}

#[async_trait]
impl CardSearch for MultiverseBridgeClient {
    async fn search_by_name(&self, card_name: &str) -> Result<Vec<CardCandidate>> {
        let url = format!("{}/api/v1/cards/search", self.base_url);
        debug!(card_name = %card_name, "searching printings");

        let request = self.http_client.get(&url).query(&[("name", card_name)]);
        get_json(request, "multiversebridge").await
    }
}

/// Detail-by-id client (service B)
pub struct ScryfallClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl ScryfallClient {
    /// Create a new detail client
    pub fn new(config: &LookupConfig) -> Result<Self> {
        Ok(ScryfallClient {
            base_url: config.detail_base_url.clone(),
            http_client: config.build_http_client()?,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(&LookupConfig::from_env())
    }
}

#[async_trait]
impl CardDetails for ScryfallClient {
    async fn card_by_id(&self, card_id: &str) -> Result<CardRecord> {
        let url = format!("{}/cards/{}", self.base_url, card_id);
        debug!(card_id = %card_id, "fetching card detail");

        get_json(self.http_client.get(&url), "scryfall").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_config_default() {
        let config = LookupConfig::default();
        assert!(!config.search_base_url.is_empty());
        assert!(!config.detail_base_url.is_empty());
        assert!(config.user_agent.starts_with("packslip-card-lookup/"));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_lookup_config_new_trims_trailing_slash() {
        let config = LookupConfig::new("http://search.local/", "http://detail.local//");
        assert_eq!(config.search_base_url, "http://search.local");
        assert_eq!(config.detail_base_url, "http://detail.local");
    }

    #[test]
    fn test_lookup_config_with_timeout() {
        let config = LookupConfig::default().with_timeout_secs(0);
        assert_eq!(config.timeout_secs, 0);
        assert!(MultiverseBridgeClient::new(&config).is_ok());
    }
}
