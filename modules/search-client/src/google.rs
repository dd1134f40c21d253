//! Google Custom Search API client. ~100 free queries/day, so this is the
//! quality-first backend that runs out early in heavy use.

use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::error::{Result, SearchError};
use crate::types::SearchHit;
use crate::MAX_RESULTS_PER_REQUEST;

const BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

pub struct GoogleSearchClient {
    api_key: String,
    engine_id: String,
    base_url: String,
    http: reqwest::Client,
}

impl GoogleSearchClient {
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            engine_id: engine_id.into(),
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
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", count.as_str()),
            ])
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

        let data: CseResponse = response.json().await?;
        let hits: Vec<SearchHit> = data
            .items
            .into_iter()
            .map(|item| SearchHit {
                title: item.title,
                url: item.link,
                snippet: item.snippet,
            })
            .collect();

        info!(query, count = hits.len(), "Google Custom Search complete");
        Ok(hits)
    }
}
