// Test mocks for the discovery pipeline.
//
// Two mocks matching the two provider boundaries:
// - MockSearchBackend (SearchBackend) — scripted per-query results/failures
// - ScriptedModel (CompletionModel) — marker-keyed or queued responses
//
// Both record their calls so tests can assert fallback order and cache
// behavior. No network, no credentials; `cargo test` in seconds.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use ai_client::CompletionModel;
use pagescout_common::{DiscoveryMethod, SearchResult};
use search_client::SearchError;

use crate::traits::SearchBackend;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Minimal SearchResult with a title derived from the URL's last segment.
pub fn search_result(url: &str, backend: DiscoveryMethod) -> SearchResult {
    let title = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string();
    SearchResult {
        url: url.to_string(),
        title,
        snippet: String::new(),
        backend,
    }
}

/// Fully specified SearchResult.
pub fn search_result_titled(
    url: &str,
    title: &str,
    snippet: &str,
    backend: DiscoveryMethod,
) -> SearchResult {
    SearchResult {
        url: url.to_string(),
        title: title.to_string(),
        snippet: snippet.to_string(),
        backend,
    }
}

// ---------------------------------------------------------------------------
// MockSearchBackend
// ---------------------------------------------------------------------------

/// Which failure a scripted backend produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    RateLimited,
    Timeout,
    Backend,
}

impl MockFailure {
    fn to_error(self) -> SearchError {
        match self {
            MockFailure::RateLimited => SearchError::RateLimited,
            MockFailure::Timeout => SearchError::Timeout,
            MockFailure::Backend => SearchError::Api {
                status: 500,
                message: "mock backend failure".to_string(),
            },
        }
    }
}

/// Scripted search backend. Exact-query registrations win over the default
/// response; an unregistered query with no default returns an empty list.
pub struct MockSearchBackend {
    method: DiscoveryMethod,
    responses: HashMap<String, Vec<SearchResult>>,
    default_response: Option<Vec<SearchResult>>,
    failure: Option<MockFailure>,
    calls: Mutex<Vec<String>>,
}

impl MockSearchBackend {
    pub fn new(method: DiscoveryMethod) -> Self {
        Self {
            method,
            responses: HashMap::new(),
            default_response: None,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_query(mut self, query: &str, results: Vec<SearchResult>) -> Self {
        self.responses.insert(query.to_string(), results);
        self
    }

    pub fn with_default(mut self, results: Vec<SearchResult>) -> Self {
        self.default_response = Some(results);
        self
    }

    /// Make every call fail with the given failure.
    pub fn failing(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchBackend for MockSearchBackend {
    fn method(&self) -> DiscoveryMethod {
        self.method
    }

    async fn search(
        &self,
        query: &str,
        _max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        self.calls.lock().unwrap().push(query.to_string());
        if let Some(failure) = self.failure {
            return Err(failure.to_error());
        }
        if let Some(results) = self.responses.get(query) {
            return Ok(results.clone());
        }
        Ok(self.default_response.clone().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// ScriptedModel
// ---------------------------------------------------------------------------

/// Scripted language model. Marker registrations are checked against the
/// combined system+user text first; otherwise responses pop off a queue in
/// order. An unscripted call is an error, never a silent default.
pub struct ScriptedModel {
    name: String,
    keyed: Vec<(String, String)>,
    queue: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            keyed: Vec::new(),
            queue: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Respond with `response` whenever the combined prompt contains `marker`.
    pub fn on_prompt_containing(mut self, marker: &str, response: &str) -> Self {
        self.keyed.push((marker.to_string(), response.to_string()));
        self
    }

    /// Queue a response for the next otherwise-unmatched call.
    pub fn then_respond(self, response: &str) -> Self {
        self.queue.lock().unwrap().push_back(response.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// How many recorded prompts contained `marker`.
    pub fn prompt_count_containing(&self, marker: &str) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(marker))
            .count()
    }
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let combined = format!("{system}\n{prompt}");
        self.prompts.lock().unwrap().push(combined.clone());

        for (marker, response) in &self.keyed {
            if combined.contains(marker) {
                return Ok(response.clone());
            }
        }
        if let Some(response) = self.queue.lock().unwrap().pop_front() {
            return Ok(response);
        }
        bail!("ScriptedModel: no scripted response for prompt: {prompt}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_backend_prefers_exact_query_over_default() {
        let backend = MockSearchBackend::new(DiscoveryMethod::GoogleCustomSearch)
            .on_query(
                "exact",
                vec![search_result("https://a.com/x", DiscoveryMethod::GoogleCustomSearch)],
            )
            .with_default(vec![search_result(
                "https://a.com/default",
                DiscoveryMethod::GoogleCustomSearch,
            )]);

        let exact = backend.search("exact", 10).await.unwrap();
        assert_eq!(exact[0].url, "https://a.com/x");
        let other = backend.search("other", 10).await.unwrap();
        assert_eq!(other[0].url, "https://a.com/default");
        assert_eq!(backend.calls(), vec!["exact", "other"]);
    }

    #[tokio::test]
    async fn scripted_model_markers_win_over_queue() {
        let model = ScriptedModel::new("m")
            .on_prompt_containing("RANKING", "RANKING: 1\nCONFIDENCE: 0.9\nREASON: x")
            .then_respond("queued");

        let keyed = model.complete("RANKING instructions", "candidates").await.unwrap();
        assert!(keyed.starts_with("RANKING: 1"));
        let queued = model.complete("other", "prompt").await.unwrap();
        assert_eq!(queued, "queued");
        assert!(model.complete("other", "again").await.is_err());
        assert_eq!(model.call_count(), 3);
    }
}
