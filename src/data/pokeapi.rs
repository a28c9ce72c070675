//! PokeAPI client
//!
//! This module fetches PokeAPI resources and decodes them into our data
//! structures. Every request goes through the shared [`ResponseCache`]: the
//! raw body is looked up by URL before touching the network, and stored after
//! a successful fetch.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use super::{LocationArea, LocationAreaPage, Pokemon};
use crate::cache::ResponseCache;

/// Base URL for PokeAPI v2
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when fetching from PokeAPI
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },
}

/// Read-through client for PokeAPI
///
/// Cloning is cheap; clones share the HTTP connection pool and the cache.
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    client: Client,
    base_url: String,
    cache: Arc<ResponseCache>,
}

impl PokeApiClient {
    /// Create a client with its own HTTP client and the given request timeout
    pub fn new(
        base_url: impl Into<String>,
        cache: Arc<ResponseCache>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pokedex/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url, cache))
    }

    /// Create a client around an existing HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>, cache: Arc<ResponseCache>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            cache,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// URL of the first page of the location-area listing
    pub fn location_areas_url(&self) -> String {
        format!("{}/location-area", self.base_url)
    }

    /// Fetch a page of location areas
    ///
    /// `page_url` is a `next`/`previous` link from an earlier page, used
    /// verbatim so each page is cached under the exact URL the API handed out.
    /// `None` fetches the first page.
    pub async fn location_areas(&self, page_url: Option<&str>) -> Result<LocationAreaPage, ApiError> {
        match page_url {
            Some(url) => self.fetch_json(url).await,
            None => self.fetch_json(&self.location_areas_url()).await,
        }
    }

    /// Fetch a location area by name or id
    pub async fn location_area(&self, name: &str) -> Result<LocationArea, ApiError> {
        let url = format!("{}/location-area/{}", self.base_url, name);
        self.fetch_json(&url).await
    }

    /// Fetch a pokemon by name or id
    pub async fn pokemon(&self, name: &str) -> Result<Pokemon, ApiError> {
        let url = format!("{}/pokemon/{}", self.base_url, name);
        self.fetch_json(&url).await
    }

    /// Fetch `url` through the cache and decode the body as JSON
    ///
    /// Only a complete body that decodes cleanly is cached, so errors never
    /// poison later lookups. Concurrent misses on the same URL each go to the
    /// network.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        if let Some(body) = self.cache.get(url) {
            debug!(url, "cache hit");
            return Ok(serde_json::from_slice(&body)?);
        }

        debug!(url, "cache miss, fetching");
        let body = self.fetch_body(url).await?;
        let data = serde_json::from_slice(&body)?;
        self.cache.add(url, body);

        Ok(data)
    }

    async fn fetch_body(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.client.get(url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.bytes().await?.to_vec()),
            StatusCode::NOT_FOUND => {
                warn!(url, "resource not found");
                Err(ApiError::NotFound(url.to_string()))
            }
            status => {
                warn!(url, status = status.as_u16(), "unexpected response status");
                Err(ApiError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;

    // Nothing listens on the discard port, so any network access fails fast.
    const UNREACHABLE: &str = "http://127.0.0.1:9/api/v2";

    fn offline_client() -> PokeApiClient {
        let cache = Arc::new(ResponseCache::new(CacheConfig::new(Duration::from_secs(60))));
        PokeApiClient::new(UNREACHABLE, cache, Duration::from_secs(2)).expect("client should build")
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash_is_trimmed() {
        let cache = Arc::new(ResponseCache::with_ttl(Duration::from_secs(60)));
        let client = PokeApiClient::with_client(Client::new(), "https://pokeapi.co/api/v2/", cache);

        assert_eq!(client.base_url(), "https://pokeapi.co/api/v2");
        assert_eq!(
            client.location_areas_url(),
            "https://pokeapi.co/api/v2/location-area"
        );
    }

    #[tokio::test]
    async fn test_cached_page_is_served_without_network() {
        let client = offline_client();
        let url = client.location_areas_url();
        client.cache().add(
            url,
            br#"{"count": 1, "next": null, "previous": null, "results": [{"name": "mt-coronet-1f", "url": "x"}]}"#.to_vec(),
        );

        let page = client.location_areas(None).await.expect("should decode from cache");

        assert_eq!(page.results[0].name, "mt-coronet-1f");
        assert_eq!(client.cache().stats().hits, 1);
    }

    #[tokio::test]
    async fn test_cached_pokemon_is_served_without_network() {
        let client = offline_client();
        client.cache().add(
            format!("{}/pokemon/pikachu", UNREACHABLE),
            br#"{"name": "pikachu", "base_experience": 112, "height": 4, "weight": 60, "stats": [], "types": []}"#.to_vec(),
        );

        let pokemon = client.pokemon("pikachu").await.expect("should decode from cache");

        assert_eq!(pokemon.name, "pikachu");
        assert_eq!(pokemon.base_experience, Some(112));
    }

    #[tokio::test]
    async fn test_network_failure_is_not_cached() {
        let client = offline_client();

        let result = client.location_area("nowhere").await;

        assert!(matches!(result, Err(ApiError::RequestFailed(_))));
        assert!(client.cache().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_cached_body_surfaces_parse_error() {
        let client = offline_client();
        client
            .cache()
            .add(format!("{}/location-area/bad", UNREACHABLE), b"not json".to_vec());

        let result = client.location_area("bad").await;

        assert!(matches!(result, Err(ApiError::ParseError(_))));
    }
}
