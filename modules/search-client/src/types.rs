use serde::Deserialize;

/// One organic result as returned by a search vendor, before the pipeline
/// tags it with its originating backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}
