//! Search backend adapters and the priority-ordered fallback executor.
//!
//! Backends are tried in fixed order per query: Google Custom Search
//! (quality-first, small daily quota), Brave Search (larger quota), then a
//! credential-free sitemap probe that HEAD-checks conventional paths on the
//! seed domain. The first backend to return a non-empty result wins that
//! query; results are never merged across backends for a single query.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info, warn};

use pagescout_common::{extract_host, DiscoveryMethod, SearchResult};
use search_client::{BraveSearchClient, GoogleSearchClient, SearchError};

use crate::retry::RetryPolicy;
use crate::traits::SearchBackend;

/// Vendor APIs cap a single request at 10 results; one query never asks for more.
pub const RESULTS_PER_QUERY: usize = 10;

// ---------------------------------------------------------------------------
// Vendor adapters
// ---------------------------------------------------------------------------

pub struct GoogleCseBackend {
    client: Arc<GoogleSearchClient>,
}

impl GoogleCseBackend {
    pub fn new(client: Arc<GoogleSearchClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchBackend for GoogleCseBackend {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::GoogleCustomSearch
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let hits = self.client.search(query, max_results).await?;
        Ok(hits
            .into_iter()
            .map(|hit| SearchResult {
                url: hit.url,
                title: hit.title,
                snippet: hit.snippet,
                backend: DiscoveryMethod::GoogleCustomSearch,
            })
            .collect())
    }
}

pub struct BraveApiBackend {
    client: Arc<BraveSearchClient>,
}

impl BraveApiBackend {
    pub fn new(client: Arc<BraveSearchClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchBackend for BraveApiBackend {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::BraveSearch
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let hits = self.client.search(query, max_results).await?;
        Ok(hits
            .into_iter()
            .map(|hit| SearchResult {
                url: hit.url,
                title: hit.title,
                snippet: hit.snippet,
                backend: DiscoveryMethod::BraveSearch,
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Sitemap probe
// ---------------------------------------------------------------------------

/// Conventional page paths worth probing when no search API can answer.
const CONVENTIONAL_PATHS: &[&str] = &[
    "/pricing", "/plans", "/features", "/about", "/blog", "/contact", "/company", "/team",
    "/docs", "/careers",
];

/// Last-resort backend: HEAD-check conventional paths on the seed domain.
/// Needs no credentials, so it is always configured.
pub struct SitemapProbe {
    base_url: String,
    http: reqwest::Client,
}

impl SitemapProbe {
    pub fn for_seed(seed_url: &str) -> Self {
        let host = extract_host(seed_url);
        Self {
            base_url: format!("https://{host}"),
            http: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(5))
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Fetch the page and pull its `<title>`. Best-effort only.
    async fn fetch_title(&self, url: &str) -> Option<String> {
        let response = self.http.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let html = response.text().await.ok()?;
        let title_re = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").ok()?;
        let title = title_re.captures(&html)?.get(1)?.as_str().trim().to_string();
        if title.is_empty() {
            None
        } else {
            Some(title)
        }
    }
}

/// "/pricing" -> "Pricing".
fn title_from_path(path: &str) -> String {
    let name = path.trim_start_matches('/');
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[async_trait]
impl SearchBackend for SitemapProbe {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::SitemapProbe
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        debug!(query, base = %self.base_url, "Probing conventional paths");

        let mut results = Vec::new();
        for path in CONVENTIONAL_PATHS {
            if results.len() >= max_results {
                break;
            }
            let url = format!("{}{}", self.base_url, path);
            let exists = match self.http.head(&url).send().await {
                Ok(response) => response.status().is_success(),
                Err(_) => false,
            };
            if !exists {
                continue;
            }

            let title = self
                .fetch_title(&url)
                .await
                .unwrap_or_else(|| title_from_path(path));
            results.push(SearchResult {
                url,
                title,
                snippet: "Found by probing conventional site paths".to_string(),
                backend: DiscoveryMethod::SitemapProbe,
            });
        }

        info!(query, count = results.len(), "Sitemap probe complete");
        Ok(results)
    }
}

// ---------------------------------------------------------------------------
// Fallback executor
// ---------------------------------------------------------------------------

/// Runs one query through the configured backends in priority order.
pub struct SearchExecutor {
    backends: Vec<Arc<dyn SearchBackend>>,
    retry: RetryPolicy,
}

impl SearchExecutor {
    pub fn new(backends: Vec<Arc<dyn SearchBackend>>, retry: RetryPolicy) -> Self {
        Self { backends, retry }
    }

    /// Configured backend names in priority order.
    pub fn available_backends(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.method().to_string()).collect()
    }

    /// First non-empty result set wins. Any failure (rate limit, timeout,
    /// API error) falls through to the next backend; an empty list from all
    /// backends is an answer, not an error.
    pub async fn run_query(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        for backend in &self.backends {
            let attempt = self
                .retry
                .run(SearchError::is_retryable, || {
                    backend.search(query, max_results)
                })
                .await;

            match attempt {
                Ok(results) if !results.is_empty() => {
                    info!(
                        backend = %backend.method(),
                        query,
                        count = results.len(),
                        "Search query answered"
                    );
                    return results;
                }
                Ok(_) => {
                    debug!(backend = %backend.method(), query, "Empty result, trying next backend");
                }
                Err(e) => {
                    warn!(
                        backend = %backend.method(),
                        query,
                        error = %e,
                        "Search backend failed, trying next"
                    );
                }
            }
        }

        warn!(query, "All search backends failed or returned nothing");
        Vec::new()
    }
}
