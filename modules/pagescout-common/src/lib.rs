pub mod config;
pub mod error;
pub mod types;

pub use config::{BraveSearchConfig, DiscoveryConfig, GoogleSearchConfig};
pub use error::PageScoutError;
pub use types::*;
