//! Brave Search API client. Larger free quota than Google CSE; second in
//! the fallback order.

use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::error::{Result, SearchError};
use crate::types::SearchHit;
use crate::MAX_RESULTS_PER_REQUEST;

const BASE_URL: &str = "https://api.search.brave.com/res/v1/web/search";

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: BraveWeb,
}

#[derive(Debug, Default, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

pub struct BraveSearchClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl BraveSearchClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            http: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(5))
                .timeout(Duration::from_secs(15))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let count = max_results.min(MAX_RESULTS_PER_REQUEST).to_string();

        let response = self
            .http
            .get(&self.base_url)
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(SearchError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let data: BraveResponse = response.json().await?;
        let hits: Vec<SearchHit> = data
            .web
            .results
            .into_iter()
            .map(|item| SearchHit {
                title: item.title,
                url: item.url,
                snippet: item.description,
            })
            .collect();

        info!(query, count = hits.len(), "Brave search complete");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parsing_maps_description_to_snippet() {
        let json = r#"{"web":{"results":[{"title":"Blog","url":"https://example.com/blog","description":"Posts"}]}}"#;
        let parsed: BraveResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.web.results.len(), 1);
        assert_eq!(parsed.web.results[0].description, "Posts");
    }

    #[test]
    fn response_parsing_tolerates_missing_web_section() {
        let parsed: BraveResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.web.results.is_empty());
    }
}
