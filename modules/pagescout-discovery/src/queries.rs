//! Query planning — pure expansion of (company, domains, categories, depth)
//! into a bounded, ordered list of search queries.
//!
//! Volume stays O(categories × domains): comprehensive depth adds one
//! synonym variant per domain per category, never the whole synonym table.

use pagescout_common::{DomainSet, SearchDepth};

/// Fixed synonym table. The planner rotates through a category's synonyms
/// across domains so comprehensive runs spread their extra coverage.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("pricing", &["price", "cost", "plans", "subscription"]),
    ("features", &["product", "capabilities"]),
    ("blog", &["news", "articles"]),
    ("about", &["company", "team"]),
    ("docs", &["documentation", "api"]),
    ("careers", &["jobs"]),
    ("contact", &["support"]),
];

fn synonyms_for(category: &str) -> &'static [&'static str] {
    SYNONYMS
        .iter()
        .find(|(cat, _)| cat.eq_ignore_ascii_case(category))
        .map(|(_, syns)| *syns)
        .unwrap_or(&[])
}

/// Expand the requested categories into search queries. For each category:
/// one brand-only query, then one domain-scoped query per validated domain
/// (quick depth: the single highest-priority domain only), then at
/// comprehensive depth one synonym variant per domain.
pub fn plan_queries(
    company: &str,
    domains: &DomainSet,
    categories: &[String],
    depth: SearchDepth,
) -> Vec<String> {
    let scoped: Vec<&str> = match depth {
        SearchDepth::Quick => vec![domains.primary()],
        _ => domains.iter().collect(),
    };

    let mut queries = Vec::new();
    for category in categories {
        let category = category.trim();
        if category.is_empty() {
            continue;
        }

        push_unique(&mut queries, format!("{company} {category}"));
        for domain in &scoped {
            push_unique(&mut queries, format!("site:{domain} {category}"));
        }

        if depth == SearchDepth::Comprehensive {
            let synonyms = synonyms_for(category);
            if !synonyms.is_empty() {
                for (i, domain) in scoped.iter().enumerate() {
                    let synonym = synonyms[i % synonyms.len()];
                    push_unique(&mut queries, format!("site:{domain} {synonym}"));
                }
            }
        }
    }
    queries
}

fn push_unique(queries: &mut Vec<String>, query: String) {
    if !queries.contains(&query) {
        queries.push(query);
    }
}
