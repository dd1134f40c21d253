pub mod claude;
pub mod openai;

pub use claude::Claude;
pub use openai::OpenAi;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default Claude model for discovery verdicts. Haiku-class: these are
/// short classification calls, not generation workloads.
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-haiku-4-5-20251001";

/// Default OpenAI model for discovery verdicts.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

// =============================================================================
// CompletionModel Trait
// =============================================================================

/// A language-model provider reduced to its one job here: turn a prompt into
/// unstructured text. Callers own the parsing, including negative sentinels.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Model identifier recorded in output provenance.
    fn name(&self) -> &str;

    /// One-shot completion with a system preamble.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

// =============================================================================
// Provider Selection
// =============================================================================

/// Names a configured provider. Ranking and selection callers pick one each,
/// independently, so cost/quality tradeoffs stay decoupled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    Claude,
    OpenAi,
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderId::Claude => write!(f, "claude"),
            ProviderId::OpenAi => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "claude" | "anthropic" => Ok(ProviderId::Claude),
            "openai" | "gpt" => Ok(ProviderId::OpenAi),
            other => Err(format!("unknown model provider: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_parses_aliases() {
        assert_eq!("claude".parse::<ProviderId>().unwrap(), ProviderId::Claude);
        assert_eq!("Anthropic".parse::<ProviderId>().unwrap(), ProviderId::Claude);
        assert_eq!("openai".parse::<ProviderId>().unwrap(), ProviderId::OpenAi);
        assert!("mistral".parse::<ProviderId>().is_err());
    }

    #[test]
    fn provider_id_display_round_trips() {
        for id in [ProviderId::Claude, ProviderId::OpenAi] {
            assert_eq!(id.to_string().parse::<ProviderId>().unwrap(), id);
        }
    }
}
