//! Pattern-matching fallback classifier.
//!
//! Used only when no model provider is configured. The table maps category
//! names to URL/title substrings; callers may supply their own table, so
//! the pipeline itself never bakes in a category set.

use pagescout_common::SearchResult;

/// Fixed confidence for a pattern hit. Deliberately below what a confident
/// model verdict produces.
pub const PATTERN_MATCH_CONFIDENCE: f32 = 0.8;

/// Provenance label for model-less classification.
pub const PATTERN_METHOD_LABEL: &str = "pattern-matching";

#[derive(Debug, Clone)]
pub struct PatternTable {
    entries: Vec<(String, Vec<String>)>,
}

impl PatternTable {
    /// The conventional SaaS page vocabulary.
    pub fn with_defaults() -> Self {
        let defaults: &[(&str, &[&str])] = &[
            ("pricing", &["pricing", "plans", "subscription", "cost", "price", "billing"]),
            ("features", &["features", "product", "capabilities", "functionality", "solutions"]),
            ("blog", &["blog", "news", "articles", "insights"]),
            ("about", &["about", "company", "team", "story", "mission"]),
            ("contact", &["contact", "support", "help"]),
            ("careers", &["careers", "jobs", "hiring"]),
            ("docs", &["docs", "documentation", "api", "developer", "guide"]),
        ];
        Self {
            entries: defaults
                .iter()
                .map(|(cat, pats)| {
                    (
                        cat.to_string(),
                        pats.iter().map(|p| p.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn from_entries(entries: Vec<(String, Vec<String>)>) -> Self {
        Self { entries }
    }

    pub fn patterns_for(&self, category: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(cat, _)| cat.eq_ignore_ascii_case(category))
            .map(|(_, patterns)| patterns.as_slice())
    }

    /// Whether the result's URL or title contains any of the category's
    /// patterns. A category absent from the table matches nothing.
    pub fn matches(&self, category: &str, result: &SearchResult) -> bool {
        let Some(patterns) = self.patterns_for(category) else {
            return false;
        };
        let url = result.url.to_lowercase();
        let title = result.title.to_lowercase();
        patterns
            .iter()
            .any(|pattern| url.contains(pattern) || title.contains(pattern))
    }
}
