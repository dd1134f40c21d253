use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Search Types ---

/// A single keyword-search hit, tagged with the backend that produced it.
/// Ordered only by arrival; never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub backend: DiscoveryMethod,
}

/// Which search backend produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    GoogleCustomSearch,
    BraveSearch,
    SitemapProbe,
}

impl std::fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryMethod::GoogleCustomSearch => write!(f, "google_custom_search"),
            DiscoveryMethod::BraveSearch => write!(f, "brave_search"),
            DiscoveryMethod::SitemapProbe => write!(f, "sitemap_probe"),
        }
    }
}

/// How many queries the planner is allowed to expand per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDepth {
    Quick,
    Standard,
    Comprehensive,
}

impl std::fmt::Display for SearchDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchDepth::Quick => write!(f, "quick"),
            SearchDepth::Standard => write!(f, "standard"),
            SearchDepth::Comprehensive => write!(f, "comprehensive"),
        }
    }
}

impl std::str::FromStr for SearchDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quick" => Ok(SearchDepth::Quick),
            "standard" => Ok(SearchDepth::Standard),
            "comprehensive" => Ok(SearchDepth::Comprehensive),
            other => Err(format!("unknown search depth: {other}")),
        }
    }
}

// --- Brand Domains ---

/// Ordered set of hostnames judged to belong to one brand, most important
/// first. Capped at [`DomainSet::MAX_DOMAINS`]; the seed host is always a
/// member.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainSet {
    domains: Vec<String>,
}

impl DomainSet {
    pub const MAX_DOMAINS: usize = 3;

    /// Build a domain set from enumerated candidates plus the guaranteed
    /// seed host. Candidates keep their given order (most important first);
    /// the seed is appended at the end if the candidates missed it.
    /// Duplicates (after www-stripping and lowercasing) collapse to their
    /// first occurrence.
    pub fn from_candidates<I>(seed_host: &str, candidates: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let seed = normalize_host(seed_host);
        let mut domains: Vec<String> = Vec::new();

        for candidate in candidates {
            let host = normalize_host(&candidate);
            if host.is_empty() || domains.contains(&host) {
                continue;
            }
            // Leave room for the seed if it hasn't shown up yet.
            let cap = if domains.contains(&seed) || host == seed {
                Self::MAX_DOMAINS
            } else {
                Self::MAX_DOMAINS - 1
            };
            if domains.len() >= cap {
                continue;
            }
            domains.push(host);
        }

        if !seed.is_empty() && !domains.contains(&seed) {
            domains.push(seed);
        }

        Self { domains }
    }

    /// Seed-only set, used when domain enumeration is unavailable.
    pub fn seed_only(seed_host: &str) -> Self {
        Self::from_candidates(seed_host, std::iter::empty())
    }

    /// The highest-priority domain.
    pub fn primary(&self) -> &str {
        self.domains.first().map(String::as_str).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.domains
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl std::fmt::Display for DomainSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.domains.join(", "))
    }
}

// --- Pipeline Outcomes ---

/// Result of asking a model to order candidates by relevance to a category.
#[derive(Debug, Clone, PartialEq)]
pub enum RankingOutcome {
    Ranked {
        /// Relevance-ordered subset of the input candidates (≤10).
        candidates: Vec<SearchResult>,
        confidence: f32,
        reason: String,
    },
    /// The model explicitly judged none of the candidates relevant.
    NoneRelevant { reason: String },
}

/// Result of asking a model to pick exactly one URL from a ranked pool.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    Selected {
        result: SearchResult,
        confidence: f32,
        reason: String,
    },
    /// The model explicitly judged no candidate suitable.
    NoneSuitable { reason: String },
}

// --- Final Output ---

/// One discovered page per category, with full provenance. Created fresh per
/// discovery run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredUrl {
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub category: String,
    /// min(brand, ranking, selection); always ≥ the caller's threshold.
    pub confidence_score: f32,
    pub brand_confidence: f32,
    pub ranking_confidence: f32,
    pub selection_confidence: f32,
    pub discovery_method: DiscoveryMethod,
    pub ranking_model_used: String,
    pub selection_model_used: String,
    pub discovered_at: DateTime<Utc>,
}

// --- Host Helpers ---

/// Extract the host from a URL (e.g. "https://www.example.com/path" ->
/// "www.example.com"). Ports are stripped; the scheme is optional.
pub fn extract_host(url: &str) -> String {
    url.split("://")
        .nth(1)
        .unwrap_or(url)
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .split(':')
        .next()
        .unwrap_or("")
        .to_lowercase()
}

/// Normalize a host for comparison: lowercase, strip a trailing dot and a
/// leading `www.`.
pub fn normalize_host(host: &str) -> String {
    let h = host.trim().trim_end_matches('.').to_lowercase();
    h.strip_prefix("www.").unwrap_or(&h).to_string()
}

/// Strip tracking parameters from URLs that would otherwise make identical
/// pages look like distinct discoveries.
pub fn sanitize_url(url: &str) -> String {
    const TRACKING_PARAMS: &[&str] = &[
        "fbclid",
        "gclid",
        "utm_source",
        "utm_medium",
        "utm_campaign",
        "utm_term",
        "utm_content",
        "ref",
        "mc_cid",
        "mc_eid",
    ];

    let Ok(mut parsed) = url::Url::parse(url) else {
        return url.to_string();
    };

    if parsed.query().is_none() {
        return url.to_string();
    }

    let clean_pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if clean_pairs.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(clean_pairs);
    }

    parsed.to_string()
}
