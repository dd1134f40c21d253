//! Brand validation and canonical-domain discovery.
//!
//! Two gates run before any searching happens. First a recognition check:
//! is this brand real and well-known enough that search results about it
//! can be trusted? Second, domain enumeration with a cross-check: which
//! hostnames actually belong to the brand? Either gate failing aborts the
//! whole run; returning nothing beats returning someone else's pricing
//! page for a company the model has never heard of.

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use ai_client::CompletionModel;
use pagescout_common::{extract_host, DomainSet};

use crate::parse::{labeled_f32, labeled_value, labeled_yes_no};
use crate::retry::RetryPolicy;

/// Outcome of the recognition gate.
#[derive(Debug, Clone, PartialEq)]
pub struct BrandCheck {
    pub recognized: bool,
    pub confidence: f32,
    pub reason: String,
}

/// Validated brand: its domain set and the combined confidence carried into
/// every per-category score (minimum of recognition and cross-check).
#[derive(Debug, Clone, PartialEq)]
pub struct BrandProfile {
    pub domains: DomainSet,
    pub confidence: f32,
}

const RECOGNITION_SYSTEM: &str = "\
You judge whether a company brand is real and widely known enough that web \
search results about it will be reliable. Obscure startups, fictional names, \
and typo'd brands must be flagged as not recognized.\n\n\
Respond with exactly three lines:\n\
RECOGNIZED: yes or no\n\
CONFIDENCE: a number between 0.0 and 1.0\n\
REASON: one short sentence";

const ENUMERATION_SYSTEM: &str = "\
You list the canonical domains a company operates, by usage and importance. \
Exclude social media platforms, app stores, and any third-party site that \
merely writes about the company.\n\n\
Respond with up to 3 domains, one per line, bare hostnames only \
(e.g. example.com), most important first.";

const CROSS_CHECK_SYSTEM: &str = "\
You verify whether a set of domains actually belong to a given company as \
its own web properties.\n\n\
Respond with exactly three lines:\n\
RELATED: yes or no\n\
CONFIDENCE: a number between 0.0 and 1.0\n\
REASON: one short sentence";

pub struct BrandValidator<'a> {
    model: &'a dyn CompletionModel,
    retry: &'a RetryPolicy,
}

impl<'a> BrandValidator<'a> {
    pub fn new(model: &'a dyn CompletionModel, retry: &'a RetryPolicy) -> Self {
        Self { model, retry }
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        self.retry
            .run(|_: &anyhow::Error| true, || self.model.complete(system, prompt))
            .await
    }

    /// Gate 1: is the brand recognizable at all?
    pub async fn check_recognition(&self, company: &str, seed_url: &str) -> Result<BrandCheck> {
        let prompt = format!(
            "Company: {company}\nWebsite: {seed_url}\n\n\
             Is this a real, recognizable brand?"
        );
        let text = self
            .complete(RECOGNITION_SYSTEM, &prompt)
            .await
            .context("brand recognition call failed")?;

        let recognized = labeled_yes_no(&text, "RECOGNIZED")
            .context("brand recognition response missing RECOGNIZED line")?;
        let confidence = labeled_f32(&text, "CONFIDENCE")
            .context("brand recognition response missing CONFIDENCE line")?
            .clamp(0.0, 1.0);
        let reason = labeled_value(&text, "REASON")
            .unwrap_or("no reason given")
            .to_string();

        info!(company, recognized, confidence, %reason, "Brand recognition check");
        Ok(BrandCheck {
            recognized,
            confidence,
            reason,
        })
    }

    /// Gate 2: enumerate canonical domains, filter them with the format and
    /// brand-relevance heuristics, then cross-check the surviving set.
    /// Returns the domain set and the cross-check confidence.
    pub async fn discover_domains(
        &self,
        company: &str,
        seed_url: &str,
    ) -> Result<(DomainSet, f32)> {
        let seed_host = extract_host(seed_url);
        let prompt = format!(
            "Company: {company}\nKnown website: {seed_url}\n\n\
             List the top canonical domains this company operates."
        );
        let text = self
            .complete(ENUMERATION_SYSTEM, &prompt)
            .await
            .context("domain enumeration call failed")?;

        let candidates = extract_domain_candidates(&text, company);
        if candidates.is_empty() && seed_host.is_empty() {
            bail!("domain enumeration produced no valid domains for {company}");
        }
        if candidates.is_empty() {
            warn!(company, "No enumerated domains survived validation, keeping seed only");
        }

        let domains = DomainSet::from_candidates(&seed_host, candidates);
        if domains.is_empty() {
            bail!("no usable domains for {company} (seed host unparseable)");
        }

        let confidence = self.cross_check(company, &domains).await?;
        info!(company, domains = %domains, confidence, "Domain discovery complete");
        Ok((domains, confidence))
    }

    async fn cross_check(&self, company: &str, domains: &DomainSet) -> Result<f32> {
        let prompt = format!(
            "Company: {company}\nDomains: {domains}\n\n\
             Do these domains belong to this company?"
        );
        let text = self
            .complete(CROSS_CHECK_SYSTEM, &prompt)
            .await
            .context("domain cross-check call failed")?;

        let related = labeled_yes_no(&text, "RELATED")
            .context("domain cross-check response missing RELATED line")?;
        let confidence = labeled_f32(&text, "CONFIDENCE")
            .context("domain cross-check response missing CONFIDENCE line")?
            .clamp(0.0, 1.0);

        if !related {
            let reason = labeled_value(&text, "REASON").unwrap_or("no reason given");
            bail!("domain cross-check rejected the set for {company}: {reason}");
        }
        Ok(confidence)
    }
}

/// Strict hostname shape: two or three dot-separated labels, 4–100 chars.
fn looks_like_domain(token: &str) -> bool {
    if token.len() < 4 || token.len() > 100 {
        return false;
    }
    let labels: Vec<&str> = token.split('.').collect();
    if !(2..=3).contains(&labels.len()) {
        return false;
    }
    labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// A domain counts as brand-relevant when one of its labels carries a
/// substantial chunk of the brand name, or the registrable label is a short
/// shortcut (3 chars or fewer, like an initialism domain).
fn is_brand_relevant(host: &str, company: &str) -> bool {
    let brand: String = company
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if brand.is_empty() {
        return false;
    }
    let needle: String = brand.chars().take(4).collect();

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let registrable = labels[labels.len() - 2];
    let name_labels = &labels[..labels.len() - 1];

    name_labels.iter().any(|label| label.contains(&needle))
        || (registrable.len() <= 3 && registrable != "www")
}

/// Pull plausible, brand-relevant hostnames out of free model text, in
/// order of appearance.
pub(crate) fn extract_domain_candidates(text: &str, company: &str) -> Vec<String> {
    let mut found = Vec::new();
    for raw in text.split_whitespace() {
        let token = raw
            .trim_matches(['.', ',', ':', ';', '(', ')', '[', ']', '"', '\'', '-', '*'])
            .to_lowercase();
        let token = token
            .strip_prefix("https://")
            .or_else(|| token.strip_prefix("http://"))
            .unwrap_or(&token)
            .trim_end_matches('/')
            .to_string();

        if looks_like_domain(&token)
            && is_brand_relevant(&token, company)
            && !found.contains(&token)
        {
            found.push(token);
        }
    }
    found
}
