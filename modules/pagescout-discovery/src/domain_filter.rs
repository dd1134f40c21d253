//! Same-domain filter — the brand boundary gate.
//!
//! Candidates that fail this check never reach a model: a glowing article
//! *about* the company on a news site is off-brand no matter how well it
//! matches the keywords.

use pagescout_common::{extract_host, normalize_host, DomainSet};

/// True when the candidate's host is the seed host, a sub/superdomain of
/// it, or equals/subdomains any validated brand domain. Comparison strips a
/// leading `www.` and works suffix-wise.
pub fn is_same_domain(candidate_url: &str, seed_url: &str, domains: &DomainSet) -> bool {
    let candidate = normalize_host(&extract_host(candidate_url));
    if candidate.is_empty() {
        return false;
    }

    let seed = normalize_host(&extract_host(seed_url));
    if !seed.is_empty()
        && (candidate == seed || is_subdomain(&candidate, &seed) || is_subdomain(&seed, &candidate))
    {
        return true;
    }

    domains.iter().any(|domain| {
        let domain = normalize_host(domain);
        !domain.is_empty() && (candidate == domain || is_subdomain(&candidate, &domain))
    })
}

fn is_subdomain(host: &str, parent: &str) -> bool {
    host.len() > parent.len() + 1 && host.ends_with(parent) && {
        let boundary = host.len() - parent.len() - 1;
        host.as_bytes()[boundary] == b'.'
    }
}
