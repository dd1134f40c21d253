//! Relevance ranking — ask a model to order candidates for one category.
//!
//! The model answers in a fixed line format with an explicit NONE sentinel.
//! Anything else (a missing line, an out-of-range index, prose instead of
//! numbers) is a ranking failure that drops the category. Partial parses
//! are never promoted to partial successes.

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use ai_client::CompletionModel;
use pagescout_common::{RankingOutcome, SearchResult};

use crate::parse::{index_list, is_none_sentinel, labeled_f32, labeled_value};
use crate::retry::RetryPolicy;

/// Candidate pool cap handed to the model.
pub const MAX_CANDIDATES: usize = 20;

/// Ranked subset cap coming back out.
pub const MAX_RANKED: usize = 10;

const RANKING_SYSTEM: &str = "\
You are a competitive-intelligence analyst ranking a company's own web pages \
by relevance to one requested page category.\n\n\
Respond with exactly three lines:\n\
RANKING: comma-separated candidate numbers, most relevant first, at most 10 \
- or RANKING: NONE if no candidate is relevant\n\
CONFIDENCE: a number between 0.0 and 1.0\n\
REASON: one short sentence";

/// Numbered listing of candidates, the shape both the ranker and the
/// selector put in front of a model.
pub(crate) fn numbered_listing(candidates: &[SearchResult]) -> String {
    let mut listing = String::new();
    for (i, candidate) in candidates.iter().enumerate() {
        listing.push_str(&format!(
            "{n}. URL: {url}\n   Title: {title}\n   Snippet: {snippet}\n",
            n = i + 1,
            url = candidate.url,
            title = candidate.title,
            snippet = candidate.snippet,
        ));
    }
    listing
}

pub async fn rank_candidates(
    model: &dyn CompletionModel,
    retry: &RetryPolicy,
    company: &str,
    category: &str,
    candidates: &[SearchResult],
) -> Result<RankingOutcome> {
    if candidates.is_empty() {
        return Ok(RankingOutcome::NoneRelevant {
            reason: "no candidates to rank".to_string(),
        });
    }
    let pool = &candidates[..candidates.len().min(MAX_CANDIDATES)];

    let prompt = format!(
        "Company: {company}\nCategory: {category}\n\nCandidates:\n{listing}\n\
         Which candidates are that company's \"{category}\" pages?",
        listing = numbered_listing(pool),
    );

    debug!(company, category, pool = pool.len(), "Ranking candidates");
    let text = retry
        .run(|_: &anyhow::Error| true, || model.complete(RANKING_SYSTEM, &prompt))
        .await
        .context("ranking call failed")?;

    parse_ranking(&text, pool)
}

fn parse_ranking(text: &str, pool: &[SearchResult]) -> Result<RankingOutcome> {
    let value =
        labeled_value(text, "RANKING").ok_or_else(|| anyhow!("response missing RANKING line"))?;

    if is_none_sentinel(value) {
        let reason = labeled_value(text, "REASON")
            .unwrap_or("model judged no candidate relevant")
            .to_string();
        return Ok(RankingOutcome::NoneRelevant { reason });
    }

    let indices =
        index_list(value).ok_or_else(|| anyhow!("unparseable RANKING list: {value:?}"))?;

    let mut seen = Vec::new();
    for index in indices {
        if index == 0 || index > pool.len() {
            return Err(anyhow!(
                "RANKING index {index} out of range 1..={}",
                pool.len()
            ));
        }
        if !seen.contains(&index) {
            seen.push(index);
        }
    }
    seen.truncate(MAX_RANKED);

    let confidence = labeled_f32(text, "CONFIDENCE")
        .ok_or_else(|| anyhow!("response missing CONFIDENCE line"))?
        .clamp(0.0, 1.0);
    let reason = labeled_value(text, "REASON")
        .unwrap_or("no reason given")
        .to_string();

    let candidates = seen.into_iter().map(|i| pool[i - 1].clone()).collect();
    Ok(RankingOutcome::Ranked {
        candidates,
        confidence,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagescout_common::DiscoveryMethod;

    fn pool(n: usize) -> Vec<SearchResult> {
        (1..=n)
            .map(|i| SearchResult {
                url: format!("https://example.com/page{i}"),
                title: format!("Page {i}"),
                snippet: String::new(),
                backend: DiscoveryMethod::GoogleCustomSearch,
            })
            .collect()
    }

    #[test]
    fn parses_ordered_subset() {
        let text = "RANKING: 3, 1\nCONFIDENCE: 0.85\nREASON: pricing pages first";
        let outcome = parse_ranking(text, &pool(3)).unwrap();
        match outcome {
            RankingOutcome::Ranked {
                candidates,
                confidence,
                reason,
            } => {
                assert_eq!(candidates[0].url, "https://example.com/page3");
                assert_eq!(candidates[1].url, "https://example.com/page1");
                assert!((confidence - 0.85).abs() < 1e-6);
                assert_eq!(reason, "pricing pages first");
            }
            other => panic!("expected Ranked, got {other:?}"),
        }
    }

    #[test]
    fn none_sentinel_becomes_negative_outcome() {
        let text = "RANKING: NONE\nCONFIDENCE: 0.9\nREASON: all results are press coverage";
        let outcome = parse_ranking(text, &pool(5)).unwrap();
        assert_eq!(
            outcome,
            RankingOutcome::NoneRelevant {
                reason: "all results are press coverage".to_string()
            }
        );
    }

    #[test]
    fn out_of_range_index_is_a_failure() {
        let text = "RANKING: 1, 7\nCONFIDENCE: 0.8\nREASON: x";
        assert!(parse_ranking(text, &pool(3)).is_err());
    }

    #[test]
    fn zero_index_is_a_failure() {
        let text = "RANKING: 0\nCONFIDENCE: 0.8\nREASON: x";
        assert!(parse_ranking(text, &pool(3)).is_err());
    }

    #[test]
    fn missing_confidence_is_a_failure() {
        let text = "RANKING: 1\nREASON: looks right";
        assert!(parse_ranking(text, &pool(2)).is_err());
    }

    #[test]
    fn prose_instead_of_numbers_is_a_failure() {
        let text = "RANKING: the first one\nCONFIDENCE: 0.8\nREASON: x";
        assert!(parse_ranking(text, &pool(2)).is_err());
    }

    #[test]
    fn duplicates_collapse_and_output_caps_at_ten() {
        let text = "RANKING: 1, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12\nCONFIDENCE: 0.7\nREASON: x";
        let outcome = parse_ranking(text, &pool(15)).unwrap();
        match outcome {
            RankingOutcome::Ranked { candidates, .. } => {
                assert_eq!(candidates.len(), MAX_RANKED);
                assert_eq!(candidates[0].url, "https://example.com/page1");
                assert_eq!(candidates[1].url, "https://example.com/page2");
            }
            other => panic!("expected Ranked, got {other:?}"),
        }
    }

    #[test]
    fn confidence_is_clamped() {
        let text = "RANKING: 1\nCONFIDENCE: 1.7\nREASON: x";
        match parse_ranking(text, &pool(1)).unwrap() {
            RankingOutcome::Ranked { confidence, .. } => assert_eq!(confidence, 1.0),
            other => panic!("expected Ranked, got {other:?}"),
        }
    }

    #[test]
    fn listing_numbers_from_one() {
        let listing = numbered_listing(&pool(2));
        assert!(listing.starts_with("1. URL: https://example.com/page1"));
        assert!(listing.contains("2. URL: https://example.com/page2"));
    }

    #[tokio::test]
    async fn empty_pool_short_circuits_without_model() {
        let model = crate::testing::ScriptedModel::new("test-model");
        let outcome = rank_candidates(&model, &RetryPolicy::none(), "X", "pricing", &[])
            .await
            .unwrap();
        assert!(matches!(outcome, RankingOutcome::NoneRelevant { .. }));
        assert_eq!(model.call_count(), 0);
    }
}
