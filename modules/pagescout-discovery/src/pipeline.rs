//! The discovery pipeline: brand validation → domain discovery → query
//! planning → search with fallback → per-category filter/rank/select/gate.
//!
//! The governing policy is silence over guessing. Any gate that cannot be
//! passed with confidence drops its category (or the whole run) and logs
//! why; the caller sees zero or more high-confidence URLs, never an error
//! for "this company is obscure". Only a degenerate configuration raises.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{info, warn};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use ai_client::{
    Claude, CompletionModel, OpenAi, ProviderId, DEFAULT_CLAUDE_MODEL, DEFAULT_OPENAI_MODEL,
};
use pagescout_common::{
    extract_host, sanitize_url, DiscoveredUrl, DiscoveryConfig, DomainSet, PageScoutError,
    RankingOutcome, SearchDepth, SearchResult, SelectionOutcome,
};
use search_client::{BraveSearchClient, GoogleSearchClient};

use crate::backends::{
    BraveApiBackend, GoogleCseBackend, SearchExecutor, SitemapProbe, RESULTS_PER_QUERY,
};
use crate::brand::{BrandProfile, BrandValidator};
use crate::domain_filter::is_same_domain;
use crate::patterns::{PatternTable, PATTERN_MATCH_CONFIDENCE, PATTERN_METHOD_LABEL};
use crate::queries::plan_queries;
use crate::ranker::rank_candidates;
use crate::retry::RetryPolicy;
use crate::selector::{select_best_url, SINGLE_CANDIDATE_CONFIDENCE, SINGLE_CANDIDATE_LABEL};
use crate::traits::SearchBackend;

/// One discovery run's parameters. Categories are whatever strings the
/// caller cares about; the pipeline never hardcodes a category set.
#[derive(Debug, Clone, TypedBuilder)]
pub struct DiscoveryRequest {
    #[builder(setter(into))]
    pub company_name: String,
    #[builder(setter(into))]
    pub seed_url: String,
    pub categories: Vec<String>,
    #[builder(default = SearchDepth::Standard)]
    pub search_depth: SearchDepth,
    #[builder(default = ProviderId::Claude)]
    pub ranking_provider: ProviderId,
    #[builder(default = ProviderId::Claude)]
    pub selection_provider: ProviderId,
    #[builder(default = DiscoveryConfig::DEFAULT_THRESHOLD)]
    pub min_confidence_threshold: f32,
}

/// The discovery service. Cheap to share; holds no per-run state beyond the
/// brand-profile cache.
pub struct UrlDiscovery {
    backends: Vec<Arc<dyn SearchBackend>>,
    /// Append a seed-domain sitemap probe as the last-resort backend.
    probe_fallback: bool,
    models: HashMap<ProviderId, Arc<dyn CompletionModel>>,
    pattern_table: PatternTable,
    retry: RetryPolicy,
    /// Company key → validated brand profile. Domain discovery costs two
    /// model calls; one per company per process is enough. Guarded so
    /// category processing could be parallelized later.
    domain_cache: Mutex<HashMap<String, BrandProfile>>,
}

impl UrlDiscovery {
    /// Direct construction with explicit backends and models. The seam the
    /// tests use; no sitemap probe is appended.
    pub fn new(
        backends: Vec<Arc<dyn SearchBackend>>,
        models: HashMap<ProviderId, Arc<dyn CompletionModel>>,
    ) -> Self {
        Self {
            backends,
            probe_fallback: false,
            models,
            pattern_table: PatternTable::with_defaults(),
            retry: RetryPolicy::default(),
            domain_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Build from configuration. The sitemap probe needs no credentials and
    /// is always appended, so at least one search tier exists; a config
    /// with neither a search API nor a model provider is rejected outright.
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self, PageScoutError> {
        let mut backends: Vec<Arc<dyn SearchBackend>> = Vec::new();
        if let Some(google) = &config.google_search {
            let client = GoogleSearchClient::new(
                google.api_key.as_str(),
                google.engine_id.as_str(),
            );
            backends.push(Arc::new(GoogleCseBackend::new(Arc::new(client))));
        }
        if let Some(brave) = &config.brave_search {
            let client = BraveSearchClient::new(brave.api_key.as_str());
            backends.push(Arc::new(BraveApiBackend::new(Arc::new(client))));
        }

        let mut models: HashMap<ProviderId, Arc<dyn CompletionModel>> = HashMap::new();
        if let Some(key) = &config.anthropic_api_key {
            models.insert(
                ProviderId::Claude,
                Arc::new(Claude::new(key.as_str(), DEFAULT_CLAUDE_MODEL)),
            );
        }
        if let Some(key) = &config.openai_api_key {
            models.insert(
                ProviderId::OpenAi,
                Arc::new(OpenAi::new(key.as_str(), DEFAULT_OPENAI_MODEL)),
            );
        }

        if backends.is_empty() && models.is_empty() {
            return Err(PageScoutError::Config(
                "no search backend and no model provider configured".to_string(),
            ));
        }

        Ok(Self {
            backends,
            probe_fallback: true,
            models,
            pattern_table: PatternTable::with_defaults(),
            retry: RetryPolicy::default(),
            domain_cache: Mutex::new(HashMap::new()),
        })
    }

    /// Replace the pattern table used when no model provider is configured.
    pub fn with_pattern_table(mut self, table: PatternTable) -> Self {
        self.pattern_table = table;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Configured backend names in priority order (probe excluded; it is
    /// assembled per run against the seed domain).
    pub fn available_backends(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.method().to_string()).collect()
    }

    /// Discover one URL per requested category, gated by confidence.
    ///
    /// Returns an empty list when the brand cannot be validated or nothing
    /// clears the threshold; raises only for configuration errors. Callers
    /// wanting an overall deadline can wrap the future in
    /// `tokio::time::timeout`; dropping it cancels the run cleanly.
    pub async fn discover_urls(
        &self,
        request: &DiscoveryRequest,
    ) -> Result<Vec<DiscoveredUrl>, PageScoutError> {
        let run_id = Uuid::new_v4();
        let seed_host = extract_host(&request.seed_url);
        if seed_host.is_empty() {
            return Err(PageScoutError::Validation(format!(
                "seed URL has no host: {}",
                request.seed_url
            )));
        }
        if request.categories.is_empty() {
            info!(%run_id, company = %request.company_name, "No categories requested");
            return Ok(Vec::new());
        }

        info!(
            %run_id,
            company = %request.company_name,
            seed = %seed_host,
            categories = request.categories.len(),
            depth = %request.search_depth,
            "Starting URL discovery"
        );

        if self.models.is_empty() {
            warn!(%run_id, "No model provider configured, using pattern-matching fallback");
            return Ok(self.pattern_discovery(request).await);
        }

        let ranking_model = self.require_model(request.ranking_provider)?;
        let selection_model = self.require_model(request.selection_provider)?;

        // Brand + domain gates. Either failing aborts the whole run.
        let profile = match self
            .validated_brand(ranking_model.as_ref(), &request.company_name, &request.seed_url)
            .await
        {
            Ok(Some(profile)) => profile,
            Ok(None) => return Ok(Vec::new()),
            Err(e) => {
                warn!(%run_id, company = %request.company_name, error = %e,
                    "Brand validation failed, aborting run");
                return Ok(Vec::new());
            }
        };

        let candidates = self.collect_candidates(request, &profile.domains).await;
        if candidates.is_empty() {
            warn!(%run_id, company = %request.company_name, "No same-brand candidates found");
            return Ok(Vec::new());
        }

        let mut discovered = Vec::new();
        for category in &request.categories {
            let ranked = match rank_candidates(
                ranking_model.as_ref(),
                &self.retry,
                &request.company_name,
                category,
                &candidates,
            )
            .await
            {
                Ok(RankingOutcome::Ranked {
                    candidates,
                    confidence,
                    reason,
                }) => {
                    info!(%category, count = candidates.len(), confidence, %reason, "Ranked candidates");
                    (candidates, confidence)
                }
                Ok(RankingOutcome::NoneRelevant { reason }) => {
                    info!(%category, %reason, "No relevant URLs for category");
                    continue;
                }
                Err(e) => {
                    warn!(%category, error = %e, "Ranking failed, dropping category");
                    continue;
                }
            };
            let (ranked_candidates, ranking_confidence) = ranked;

            let selection = if ranked_candidates.len() == 1 {
                (
                    ranked_candidates[0].clone(),
                    SINGLE_CANDIDATE_CONFIDENCE,
                    SINGLE_CANDIDATE_LABEL.to_string(),
                )
            } else {
                match select_best_url(
                    selection_model.as_ref(),
                    &self.retry,
                    &request.company_name,
                    category,
                    &ranked_candidates,
                )
                .await
                {
                    Ok(SelectionOutcome::Selected {
                        result,
                        confidence,
                        reason,
                    }) => {
                        info!(%category, url = %result.url, confidence, %reason, "Selected best URL");
                        (result, confidence, selection_model.name().to_string())
                    }
                    Ok(SelectionOutcome::NoneSuitable { reason }) => {
                        info!(%category, %reason, "No suitable URL for category");
                        continue;
                    }
                    Err(e) => {
                        warn!(%category, error = %e, "Selection failed, dropping category");
                        continue;
                    }
                }
            };
            let (result, selection_confidence, selection_model_used) = selection;

            let confidence_score = profile
                .confidence
                .min(ranking_confidence)
                .min(selection_confidence);
            if confidence_score < request.min_confidence_threshold {
                info!(
                    %category,
                    score = confidence_score,
                    threshold = request.min_confidence_threshold,
                    "Confidence below threshold, suppressing category"
                );
                continue;
            }

            discovered.push(DiscoveredUrl {
                url: result.url,
                title: result.title,
                snippet: result.snippet,
                category: category.clone(),
                confidence_score,
                brand_confidence: profile.confidence,
                ranking_confidence,
                selection_confidence,
                discovery_method: result.backend,
                ranking_model_used: ranking_model.name().to_string(),
                selection_model_used,
                discovered_at: Utc::now(),
            });
        }

        info!(%run_id, count = discovered.len(), "Discovery complete");
        Ok(discovered)
    }

    fn require_model(
        &self,
        provider: ProviderId,
    ) -> Result<Arc<dyn CompletionModel>, PageScoutError> {
        self.models.get(&provider).cloned().ok_or_else(|| {
            PageScoutError::Config(format!(
                "model provider '{provider}' has no credentials configured"
            ))
        })
    }

    /// Brand recognition + domain discovery, with the per-process cache.
    async fn validated_brand(
        &self,
        model: &dyn CompletionModel,
        company: &str,
        seed_url: &str,
    ) -> anyhow::Result<Option<BrandProfile>> {
        let key = company.trim().to_lowercase();
        let cached = self.domain_cache.lock().unwrap().get(&key).cloned();
        if let Some(profile) = cached {
            info!(company, domains = %profile.domains, "Using cached brand profile");
            return Ok(Some(profile));
        }

        let validator = BrandValidator::new(model, &self.retry);
        let check = validator.check_recognition(company, seed_url).await?;
        if !check.recognized {
            warn!(company, reason = %check.reason, "Brand not recognized, aborting run");
            return Ok(None);
        }

        let (domains, cross_confidence) = validator.discover_domains(company, seed_url).await?;
        let profile = BrandProfile {
            domains,
            confidence: check.confidence.min(cross_confidence),
        };
        self.domain_cache
            .lock()
            .unwrap()
            .insert(key, profile.clone());
        Ok(Some(profile))
    }

    /// Plan queries, execute them through the fallback chain, dedup by URL,
    /// and keep only same-brand candidates.
    async fn collect_candidates(
        &self,
        request: &DiscoveryRequest,
        domains: &DomainSet,
    ) -> Vec<SearchResult> {
        let queries = plan_queries(
            &request.company_name,
            domains,
            &request.categories,
            request.search_depth,
        );

        let mut backends = self.backends.clone();
        if self.probe_fallback {
            backends.push(Arc::new(SitemapProbe::for_seed(&request.seed_url)));
        }
        let executor = SearchExecutor::new(backends, self.retry.clone());
        info!(
            queries = queries.len(),
            backends = ?executor.available_backends(),
            "Executing planned queries"
        );

        let mut all_results = Vec::new();
        for query in &queries {
            all_results.extend(executor.run_query(query, RESULTS_PER_QUERY).await);
        }

        let unique = dedup_by_url(all_results);
        let total = unique.len();
        let on_brand: Vec<SearchResult> = unique
            .into_iter()
            .filter(|r| is_same_domain(&r.url, &request.seed_url, domains))
            .collect();

        info!(
            total,
            on_brand = on_brand.len(),
            "Candidates surviving same-domain filter"
        );
        on_brand
    }

    /// Model-less discovery: same search phase, then the pattern table
    /// classifies per category. Seed domain only: without a model there is
    /// no brand validation and no enumerated domain set.
    async fn pattern_discovery(&self, request: &DiscoveryRequest) -> Vec<DiscoveredUrl> {
        let domains = DomainSet::seed_only(&extract_host(&request.seed_url));
        let candidates = self.collect_candidates(request, &domains).await;
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut discovered = Vec::new();
        for category in &request.categories {
            let Some(hit) = candidates
                .iter()
                .find(|r| self.pattern_table.matches(category, r))
            else {
                info!(%category, "No pattern match for category");
                continue;
            };

            if PATTERN_MATCH_CONFIDENCE < request.min_confidence_threshold {
                info!(
                    %category,
                    score = PATTERN_MATCH_CONFIDENCE,
                    threshold = request.min_confidence_threshold,
                    "Pattern confidence below threshold, suppressing category"
                );
                continue;
            }

            discovered.push(DiscoveredUrl {
                url: hit.url.clone(),
                title: hit.title.clone(),
                snippet: hit.snippet.clone(),
                category: category.clone(),
                confidence_score: PATTERN_MATCH_CONFIDENCE,
                brand_confidence: PATTERN_MATCH_CONFIDENCE,
                ranking_confidence: PATTERN_MATCH_CONFIDENCE,
                selection_confidence: PATTERN_MATCH_CONFIDENCE,
                discovery_method: hit.backend,
                ranking_model_used: PATTERN_METHOD_LABEL.to_string(),
                selection_model_used: PATTERN_METHOD_LABEL.to_string(),
                discovered_at: Utc::now(),
            });
        }
        discovered
    }
}

/// Sanitize tracking parameters away, then dedup by URL. First occurrence
/// wins, preserving backend arrival order.
fn dedup_by_url(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .map(|mut r| {
            r.url = sanitize_url(&r.url);
            r
        })
        .filter(|r| !r.url.is_empty() && seen.insert(r.url.clone()))
        .collect()
}
