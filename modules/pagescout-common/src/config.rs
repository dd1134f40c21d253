use std::env;

use ai_client::ProviderId;

/// Google Custom Search credentials (primary backend, ~100 free queries/day).
#[derive(Debug, Clone)]
pub struct GoogleSearchConfig {
    pub api_key: String,
    pub engine_id: String,
}

/// Brave Search credentials (secondary backend, larger free quota).
#[derive(Debug, Clone)]
pub struct BraveSearchConfig {
    pub api_key: String,
}

/// Discovery configuration. Every recognized option is an explicit field;
/// unrecognized keys cannot exist by construction.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub google_search: Option<GoogleSearchConfig>,
    pub brave_search: Option<BraveSearchConfig>,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// Default model used to rank candidates (overridable per request).
    pub ranking_model: ProviderId,
    /// Default model used to pick the best URL (overridable per request).
    pub selection_model: ProviderId,
    pub min_confidence_threshold: f32,
}

impl DiscoveryConfig {
    pub const DEFAULT_THRESHOLD: f32 = 0.6;

    /// Load configuration from environment variables. Search and model
    /// credentials are all optional here; which combinations are viable is
    /// decided by the pipeline at construction time.
    pub fn from_env() -> Self {
        let google_search = match (env::var("GOOGLE_CSE_API_KEY"), env::var("GOOGLE_CSE_ENGINE_ID")) {
            (Ok(api_key), Ok(engine_id)) => Some(GoogleSearchConfig { api_key, engine_id }),
            _ => None,
        };
        let brave_search = env::var("BRAVE_API_KEY")
            .ok()
            .map(|api_key| BraveSearchConfig { api_key });

        Self {
            google_search,
            brave_search,
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").ok(),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            ranking_model: provider_env("PAGESCOUT_RANKING_MODEL"),
            selection_model: provider_env("PAGESCOUT_SELECTION_MODEL"),
            min_confidence_threshold: env::var("PAGESCOUT_MIN_CONFIDENCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(Self::DEFAULT_THRESHOLD),
        }
    }
}

fn provider_env(key: &str) -> ProviderId {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(ProviderId::Claude)
}
