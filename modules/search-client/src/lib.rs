pub mod brave;
pub mod error;
pub mod google;
pub mod types;

pub use brave::BraveSearchClient;
pub use error::{Result, SearchError};
pub use google::GoogleSearchClient;
pub use types::SearchHit;

/// Both vendors cap one request at 10 results.
pub const MAX_RESULTS_PER_REQUEST: usize = 10;
