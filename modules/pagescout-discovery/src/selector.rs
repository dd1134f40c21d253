//! Best-URL selection — exactly one URL per category out of the ranked pool.
//!
//! A single surviving candidate is returned directly at a fixed high
//! confidence, no model call. Otherwise the model picks by index with the
//! same explicit-sentinel, fail-on-garbage discipline as the ranker.

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use ai_client::CompletionModel;
use pagescout_common::{SearchResult, SelectionOutcome};

use crate::parse::{index_list, is_none_sentinel, labeled_f32, labeled_value};
use crate::ranker::numbered_listing;
use crate::retry::RetryPolicy;

/// Confidence assigned when only one candidate remains.
pub const SINGLE_CANDIDATE_CONFIDENCE: f32 = 0.9;

/// Provenance label recorded when selection needed no model.
pub const SINGLE_CANDIDATE_LABEL: &str = "single-candidate";

const SELECTION_SYSTEM: &str = "\
You are a competitive-intelligence analyst choosing the single page that \
best represents one category for a company. Weigh directness (the canonical \
page, not a subpage), comprehensiveness, and competitive-intelligence value.\n\n\
Respond with exactly three lines:\n\
SELECTION: one candidate number - or SELECTION: NONE if nothing fits\n\
CONFIDENCE: a number between 0.0 and 1.0\n\
REASON: one short sentence";

pub async fn select_best_url(
    model: &dyn CompletionModel,
    retry: &RetryPolicy,
    company: &str,
    category: &str,
    ranked: &[SearchResult],
) -> Result<SelectionOutcome> {
    match ranked {
        [] => Ok(SelectionOutcome::NoneSuitable {
            reason: "no ranked candidates".to_string(),
        }),
        [only] => Ok(SelectionOutcome::Selected {
            result: only.clone(),
            confidence: SINGLE_CANDIDATE_CONFIDENCE,
            reason: "only remaining candidate".to_string(),
        }),
        _ => {
            let prompt = format!(
                "Company: {company}\nCategory: {category}\n\nCandidates:\n{listing}\n\
                 Which single candidate is the company's canonical \"{category}\" page?",
                listing = numbered_listing(ranked),
            );

            debug!(company, category, pool = ranked.len(), "Selecting best URL");
            let text = retry
                .run(|_: &anyhow::Error| true, || {
                    model.complete(SELECTION_SYSTEM, &prompt)
                })
                .await
                .context("selection call failed")?;

            parse_selection(&text, ranked)
        }
    }
}

fn parse_selection(text: &str, ranked: &[SearchResult]) -> Result<SelectionOutcome> {
    let value = labeled_value(text, "SELECTION")
        .ok_or_else(|| anyhow!("response missing SELECTION line"))?;

    if is_none_sentinel(value) {
        let reason = labeled_value(text, "REASON")
            .unwrap_or("model judged no candidate suitable")
            .to_string();
        return Ok(SelectionOutcome::NoneSuitable { reason });
    }

    let indices =
        index_list(value).ok_or_else(|| anyhow!("unparseable SELECTION value: {value:?}"))?;
    let [index] = indices.as_slice() else {
        return Err(anyhow!("SELECTION must name exactly one candidate, got {indices:?}"));
    };
    if *index == 0 || *index > ranked.len() {
        return Err(anyhow!(
            "SELECTION index {index} out of range 1..={}",
            ranked.len()
        ));
    }

    let confidence = labeled_f32(text, "CONFIDENCE")
        .ok_or_else(|| anyhow!("response missing CONFIDENCE line"))?
        .clamp(0.0, 1.0);
    let reason = labeled_value(text, "REASON")
        .unwrap_or("no reason given")
        .to_string();

    Ok(SelectionOutcome::Selected {
        result: ranked[*index - 1].clone(),
        confidence,
        reason,
    })
}
