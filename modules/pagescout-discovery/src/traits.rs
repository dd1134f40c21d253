// Trait abstraction for search backends.
//
// Every keyword-search source (Google CSE, Brave, the sitemap probe, test
// mocks) sits behind SearchBackend, so the fallback chain and the tests
// never care which vendor answered. `cargo test` runs without network.

use async_trait::async_trait;

use pagescout_common::{DiscoveryMethod, SearchResult};
use search_client::SearchError;

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Which backend this is, for result provenance and logging.
    fn method(&self) -> DiscoveryMethod;

    /// Run one query. `Err(SearchError::RateLimited)` must be distinct from
    /// other failures so the executor can fall through without retrying.
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError>;
}
