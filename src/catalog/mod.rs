//! Stateless outbound HTTP client against the external catalog search API
//! and its companion popularity feed.

pub mod normalizer;

pub use normalizer::{Normalizer, RecentTrackIds};

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::{AppResult, FetchError};
use crate::utils::generate_jitter_ms;

const ITUNES_SEARCH_URL: &str = "https://itunes.apple.com/search";
const CHART_FEED_URL_TEMPLATE: &str =
    "https://rss.applemarketingtools.com/api/v2/{country}/music/most-played/{limit}/songs.json";
const CHART_FEED_TIMEOUT: Duration = Duration::from_secs(10);

/// A search produced by a [`crate::strategies::SearchStrategy`], consumed by
/// [`CatalogClient::search`]. Only `term` is forwarded to the catalog API;
/// strategies returning multiple terms split them into the keyword buffer
/// one at a time upstream.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub term: String,
    pub entity: Option<String>,
    pub attribute: Option<String>,
}

/// Raw record as returned by the catalog search API. Fields are optional so
/// that records missing required data can be detected and dropped by the
/// [`Normalizer`] rather than failing deserialization outright.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRecord {
    #[serde(default, rename = "trackId")]
    pub track_id: Option<serde_json::Value>,
    #[serde(default, rename = "trackName")]
    pub track_name: Option<String>,
    #[serde(default, rename = "artistName")]
    pub artist_name: Option<String>,
    #[serde(default, rename = "previewUrl")]
    pub preview_url: Option<String>,
    #[serde(default, rename = "artworkUrl100")]
    pub artwork_url_100: Option<String>,
    #[serde(default, rename = "collectionName")]
    pub collection_name: Option<String>,
    #[serde(default, rename = "trackTimeMillis")]
    pub track_time_millis: Option<i64>,
    #[serde(default, rename = "primaryGenreName")]
    pub primary_genre_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<CatalogRecord>,
}

#[derive(Debug, Deserialize)]
struct ChartFeedResponse {
    feed: ChartFeed,
}

#[derive(Debug, Deserialize)]
struct ChartFeed {
    #[serde(default)]
    results: Vec<ChartFeedEntry>,
}

#[derive(Debug, Deserialize)]
struct ChartFeedEntry {
    #[serde(default, rename = "artistName")]
    artist_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Clone)]
pub struct CatalogClientConfig {
    pub country: String,
    pub lang: String,
    pub retry_max: u32,
    pub http_timeout: Duration,
    /// Overrides the search endpoint; defaults to the production iTunes URL.
    /// Exists so tests can point the client at a local mock server.
    pub search_url: Option<String>,
    /// Overrides the chart feed URL template; defaults to the production one.
    pub chart_feed_url_template: Option<String>,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self {
            country: "JP".to_string(),
            lang: "ja_jp".to_string(),
            retry_max: 3,
            http_timeout: Duration::from_secs(5),
            search_url: None,
            chart_feed_url_template: None,
        }
    }
}

/// HTTP client for the external catalog search API. Stateless: callers
/// supply a fresh [`CatalogQuery`] each time.
pub struct CatalogClient {
    client: reqwest::Client,
    config: CatalogClientConfig,
}

impl CatalogClient {
    pub fn new(config: CatalogClientConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| crate::errors::AppError::internal(format!("http client build: {e}")))?;
        Ok(Self { client, config })
    }

    /// `GET` against the catalog search endpoint with defaults applied.
    /// Retries transport timeouts and 5xx up to `retry_max` with exponential
    /// backoff `0.5 * 2^attempt` seconds (plus a small jitter). 4xx is
    /// treated as non-retryable and yields an empty result set.
    pub async fn search(&self, query: &CatalogQuery, limit: usize) -> AppResult<Vec<CatalogRecord>> {
        let limit = limit.min(200);
        let mut attempt = 0u32;

        loop {
            let search_url = self.config.search_url.as_deref().unwrap_or(ITUNES_SEARCH_URL);
            let mut req = self
                .client
                .get(search_url)
                .query(&[
                    ("term", query.term.as_str()),
                    ("media", "music"),
                    ("country", self.config.country.as_str()),
                    ("lang", self.config.lang.as_str()),
                    ("limit", &limit.to_string()),
                ]);
            if let Some(entity) = &query.entity {
                req = req.query(&[("entity", entity.as_str())]);
            }
            if let Some(attribute) = &query.attribute {
                req = req.query(&[("attribute", attribute.as_str())]);
            }

            match req.send().await {
                Ok(resp) if resp.status().is_client_error() => {
                    debug!(status = %resp.status(), "catalog search returned 4xx, not retrying");
                    return Ok(Vec::new());
                }
                Ok(resp) if resp.status().is_server_error() => {
                    attempt += 1;
                    if attempt > self.config.retry_max {
                        return Err(FetchError::Transient {
                            message: format!("catalog search failed after {attempt} attempts: {}", resp.status()),
                        }
                        .into());
                    }
                    self.backoff(attempt).await;
                    continue;
                }
                Ok(resp) => {
                    let body: SearchResponse = resp
                        .json()
                        .await
                        .map_err(|e| FetchError::Transient {
                            message: format!("decoding catalog search response: {e}"),
                        })?;
                    return Ok(body.results);
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    attempt += 1;
                    if attempt > self.config.retry_max {
                        return Err(FetchError::Transient {
                            message: format!("catalog search timed out after {attempt} attempts: {e}"),
                        }
                        .into());
                    }
                    self.backoff(attempt).await;
                    continue;
                }
                Err(e) => {
                    return Err(FetchError::Transient {
                        message: format!("catalog search request failed: {e}"),
                    }
                    .into());
                }
            }
        }
    }

    async fn backoff(&self, attempt: u32) {
        let base_ms = (0.5_f64 * 2f64.powi(attempt as i32) * 1000.0) as u64;
        let jitter_ms = generate_jitter_ms(base_ms / 10 + 1);
        warn!(attempt, base_ms, "retrying catalog search after backoff");
        tokio::time::sleep(Duration::from_millis(base_ms + jitter_ms)).await;
    }

    /// Fetches the country popularity feed and extracts `(artist, name)`
    /// pairs. Fails if the feed is unreachable or yields zero entries.
    pub async fn fetch_chart_feed(&self, country: &str, limit: usize) -> AppResult<Vec<(String, String)>> {
        let template = self
            .config
            .chart_feed_url_template
            .as_deref()
            .unwrap_or(CHART_FEED_URL_TEMPLATE);
        let url = template
            .replace("{country}", country)
            .replace("{limit}", &limit.to_string());

        let resp = self
            .client
            .get(&url)
            .timeout(CHART_FEED_TIMEOUT)
            .send()
            .await
            .map_err(|e| FetchError::Transient {
                message: format!("chart feed request failed: {e}"),
            })?;

        if !resp.status().is_success() {
            return Err(FetchError::Transient {
                message: format!("chart feed returned {}", resp.status()),
            }
            .into());
        }

        let body: ChartFeedResponse = resp.json().await.map_err(|e| FetchError::Transient {
            message: format!("decoding chart feed response: {e}"),
        })?;

        let pairs: Vec<(String, String)> = body
            .feed
            .results
            .into_iter()
            .filter_map(|entry| Some((entry.artist_name?, entry.name?)))
            .collect();

        if pairs.is_empty() {
            return Err(crate::errors::AppError::empty_result("chart feed yielded zero entries"));
        }

        Ok(pairs)
    }
}
