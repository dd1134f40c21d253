// Full-pipeline scenarios against scripted mocks: brand gate, same-domain
// filter, fallback order, confidence gate, domain cache. No network.

use std::collections::HashMap;
use std::sync::Arc;

use ai_client::{CompletionModel, ProviderId};
use pagescout_common::DiscoveryMethod;
use pagescout_discovery::testing::{
    search_result, search_result_titled, MockFailure, MockSearchBackend, ScriptedModel,
};
use pagescout_discovery::traits::SearchBackend;
use pagescout_discovery::{DiscoveryRequest, UrlDiscovery};

// Markers match phrases in the pipeline's system prompts, so one scripted
// model can answer every stage of a run.
const RECOGNITION_MARKER: &str = "brand is real";
const ENUMERATION_MARKER: &str = "canonical domains";
const CROSS_CHECK_MARKER: &str = "actually belong";
const RANKING_MARKER: &str = "ranking a company's own web pages";
const SELECTION_MARKER: &str = "choosing the single page";

/// A model scripted for a clean happy-path run on "Notion".
fn happy_model() -> ScriptedModel {
    ScriptedModel::new("scripted-haiku")
        .on_prompt_containing(
            RECOGNITION_MARKER,
            "RECOGNIZED: yes\nCONFIDENCE: 0.95\nREASON: well-known productivity brand",
        )
        .on_prompt_containing(ENUMERATION_MARKER, "notion.so\nnotion.com")
        .on_prompt_containing(
            CROSS_CHECK_MARKER,
            "RELATED: yes\nCONFIDENCE: 0.9\nREASON: official web properties",
        )
        .on_prompt_containing(
            RANKING_MARKER,
            "RANKING: 1\nCONFIDENCE: 0.9\nREASON: direct pricing page",
        )
        .on_prompt_containing(
            SELECTION_MARKER,
            "SELECTION: 1\nCONFIDENCE: 0.85\nREASON: canonical page",
        )
}

fn discovery_with(
    backends: Vec<Arc<MockSearchBackend>>,
    model: &Arc<ScriptedModel>,
) -> UrlDiscovery {
    let backends: Vec<Arc<dyn SearchBackend>> = backends
        .into_iter()
        .map(|b| b as Arc<dyn SearchBackend>)
        .collect();
    let mut models: HashMap<ProviderId, Arc<dyn CompletionModel>> = HashMap::new();
    models.insert(ProviderId::Claude, Arc::clone(model) as Arc<dyn CompletionModel>);
    UrlDiscovery::new(backends, models)
}

fn notion_request(categories: &[&str], threshold: f32) -> DiscoveryRequest {
    DiscoveryRequest::builder()
        .company_name("Notion")
        .seed_url("https://www.notion.so")
        .categories(categories.iter().map(|c| c.to_string()).collect())
        .min_confidence_threshold(threshold)
        .build()
}

#[tokio::test]
async fn happy_path_discovers_one_pricing_url() {
    let backend = Arc::new(
        MockSearchBackend::new(DiscoveryMethod::GoogleCustomSearch).with_default(vec![
            search_result_titled(
                "https://www.notion.so/pricing",
                "Pricing - Notion",
                "Plans for every team",
                DiscoveryMethod::GoogleCustomSearch,
            ),
            // Off-brand coverage about the company must never surface.
            search_result_titled(
                "https://news.example.com/article-about-notion",
                "Notion raises funding",
                "Press coverage",
                DiscoveryMethod::GoogleCustomSearch,
            ),
        ]),
    );
    let model = Arc::new(happy_model());
    let discovery = discovery_with(vec![backend.clone()], &model);

    let discovered = discovery
        .discover_urls(&notion_request(&["pricing"], 0.3))
        .await
        .unwrap();

    assert_eq!(discovered.len(), 1);
    let hit = &discovered[0];
    assert_eq!(hit.category, "pricing");
    assert_eq!(hit.url, "https://www.notion.so/pricing");
    assert!(hit.confidence_score >= 0.3);
    // min(brand 0.9, ranking 0.9, single-candidate 0.9)
    assert!((hit.confidence_score - 0.9).abs() < 1e-6);
    assert_eq!(hit.discovery_method, DiscoveryMethod::GoogleCustomSearch);
    assert_eq!(hit.ranking_model_used, "scripted-haiku");
    // Only one candidate survived ranking, so selection needed no model.
    assert_eq!(hit.selection_model_used, "single-candidate");
}

#[tokio::test]
async fn unrecognized_brand_returns_empty_without_searching() {
    let backend = Arc::new(
        MockSearchBackend::new(DiscoveryMethod::GoogleCustomSearch).with_default(vec![
            search_result("https://www.fakecompanyxyz.com/pricing", DiscoveryMethod::GoogleCustomSearch),
        ]),
    );
    let model = Arc::new(ScriptedModel::new("scripted-haiku").on_prompt_containing(
        RECOGNITION_MARKER,
        "RECOGNIZED: no\nCONFIDENCE: 0.2\nREASON: no evidence this company exists",
    ));
    let discovery = discovery_with(vec![backend.clone()], &model);

    let request = DiscoveryRequest::builder()
        .company_name("FakeCompanyXYZ")
        .seed_url("https://www.fakecompanyxyz.com")
        .categories(vec!["pricing".to_string(), "features".to_string()])
        .build();
    let discovered = discovery.discover_urls(&request).await.unwrap();

    assert!(discovered.is_empty());
    // The run aborted before any search query was issued.
    assert_eq!(backend.call_count(), 0);
    // And before domain enumeration.
    assert_eq!(model.prompt_count_containing(ENUMERATION_MARKER), 0);
}

#[tokio::test]
async fn confidence_gate_suppresses_below_threshold() {
    let backend = Arc::new(
        MockSearchBackend::new(DiscoveryMethod::GoogleCustomSearch).with_default(vec![
            search_result("https://www.notion.so/pricing", DiscoveryMethod::GoogleCustomSearch),
            search_result("https://www.notion.so/product", DiscoveryMethod::GoogleCustomSearch),
        ]),
    );
    // Ranking keeps both candidates at 0.7; selection lands at 0.75.
    let model = Arc::new(
        ScriptedModel::new("scripted-haiku")
            .on_prompt_containing(
                RECOGNITION_MARKER,
                "RECOGNIZED: yes\nCONFIDENCE: 0.95\nREASON: known brand",
            )
            .on_prompt_containing(ENUMERATION_MARKER, "notion.so")
            .on_prompt_containing(
                CROSS_CHECK_MARKER,
                "RELATED: yes\nCONFIDENCE: 0.9\nREASON: official",
            )
            .on_prompt_containing(
                RANKING_MARKER,
                "RANKING: 1, 2\nCONFIDENCE: 0.7\nREASON: both plausible",
            )
            .on_prompt_containing(
                SELECTION_MARKER,
                "SELECTION: 1\nCONFIDENCE: 0.75\nREASON: more direct",
            ),
    );
    let discovery = discovery_with(vec![backend], &model);

    // min(0.9, 0.7, 0.75) = 0.7: below a 0.8 bar, above a 0.6 bar.
    let strict = discovery
        .discover_urls(&notion_request(&["pricing"], 0.8))
        .await
        .unwrap();
    assert!(strict.is_empty());

    let relaxed = discovery
        .discover_urls(&notion_request(&["pricing"], 0.6))
        .await
        .unwrap();
    assert_eq!(relaxed.len(), 1);
    assert!((relaxed[0].confidence_score - 0.7).abs() < 1e-6);
    assert_eq!(relaxed[0].selection_model_used, "scripted-haiku");
}

#[tokio::test]
async fn rate_limited_primary_falls_back_to_secondary() {
    let primary = Arc::new(
        MockSearchBackend::new(DiscoveryMethod::GoogleCustomSearch)
            .failing(MockFailure::RateLimited),
    );
    let secondary = Arc::new(
        MockSearchBackend::new(DiscoveryMethod::BraveSearch).with_default(vec![
            search_result("https://www.notion.so/pricing", DiscoveryMethod::BraveSearch),
        ]),
    );
    let model = Arc::new(happy_model());
    let discovery = discovery_with(vec![primary.clone(), secondary.clone()], &model);

    let discovered = discovery
        .discover_urls(&notion_request(&["pricing"], 0.3))
        .await
        .unwrap();

    assert_eq!(discovered.len(), 1);
    assert_eq!(discovered[0].discovery_method, DiscoveryMethod::BraveSearch);
    // Every planned query consulted the rate-limited primary first.
    assert!(primary.call_count() > 0);
    assert_eq!(primary.calls(), secondary.calls());
}

#[tokio::test]
async fn second_run_reuses_cached_brand_profile() {
    let backend = Arc::new(
        MockSearchBackend::new(DiscoveryMethod::GoogleCustomSearch).with_default(vec![
            search_result("https://www.notion.so/pricing", DiscoveryMethod::GoogleCustomSearch),
        ]),
    );
    let model = Arc::new(happy_model());
    let discovery = discovery_with(vec![backend], &model);

    let first = discovery
        .discover_urls(&notion_request(&["pricing"], 0.3))
        .await
        .unwrap();
    let second = discovery
        .discover_urls(&notion_request(&["pricing"], 0.3))
        .await
        .unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    // Recognition, enumeration and cross-check each ran exactly once.
    assert_eq!(model.prompt_count_containing(RECOGNITION_MARKER), 1);
    assert_eq!(model.prompt_count_containing(ENUMERATION_MARKER), 1);
    assert_eq!(model.prompt_count_containing(CROSS_CHECK_MARKER), 1);
    // Ranking still ran per call.
    assert_eq!(model.prompt_count_containing(RANKING_MARKER), 2);
}

#[tokio::test]
async fn ranking_none_sentinel_drops_category() {
    let backend = Arc::new(
        MockSearchBackend::new(DiscoveryMethod::GoogleCustomSearch).with_default(vec![
            search_result("https://www.notion.so/careers", DiscoveryMethod::GoogleCustomSearch),
        ]),
    );
    let model = Arc::new(
        ScriptedModel::new("scripted-haiku")
            .on_prompt_containing(
                RECOGNITION_MARKER,
                "RECOGNIZED: yes\nCONFIDENCE: 0.95\nREASON: known",
            )
            .on_prompt_containing(ENUMERATION_MARKER, "notion.so")
            .on_prompt_containing(
                CROSS_CHECK_MARKER,
                "RELATED: yes\nCONFIDENCE: 0.9\nREASON: official",
            )
            .on_prompt_containing(
                RANKING_MARKER,
                "RANKING: NONE\nCONFIDENCE: 0.9\nREASON: nothing matches pricing",
            ),
    );
    let discovery = discovery_with(vec![backend], &model);

    let discovered = discovery
        .discover_urls(&notion_request(&["pricing"], 0.3))
        .await
        .unwrap();
    assert!(discovered.is_empty());
}

#[tokio::test]
async fn garbled_model_response_drops_category_not_run() {
    let backend = Arc::new(
        MockSearchBackend::new(DiscoveryMethod::GoogleCustomSearch).with_default(vec![
            search_result("https://www.notion.so/pricing", DiscoveryMethod::GoogleCustomSearch),
        ]),
    );
    let model = Arc::new(
        ScriptedModel::new("scripted-haiku")
            .on_prompt_containing(
                RECOGNITION_MARKER,
                "RECOGNIZED: yes\nCONFIDENCE: 0.95\nREASON: known",
            )
            .on_prompt_containing(ENUMERATION_MARKER, "notion.so")
            .on_prompt_containing(
                CROSS_CHECK_MARKER,
                "RELATED: yes\nCONFIDENCE: 0.9\nREASON: official",
            )
            .on_prompt_containing(RANKING_MARKER, "I think the pricing page looks best."),
    );
    let discovery = discovery_with(vec![backend], &model);

    let discovered = discovery
        .discover_urls(&notion_request(&["pricing"], 0.3))
        .await
        .unwrap();
    assert!(discovered.is_empty());
}

#[tokio::test]
async fn selection_none_sentinel_drops_category() {
    let backend = Arc::new(
        MockSearchBackend::new(DiscoveryMethod::GoogleCustomSearch).with_default(vec![
            search_result("https://www.notion.so/pricing", DiscoveryMethod::GoogleCustomSearch),
            search_result("https://www.notion.so/enterprise", DiscoveryMethod::GoogleCustomSearch),
        ]),
    );
    let model = Arc::new(
        ScriptedModel::new("scripted-haiku")
            .on_prompt_containing(
                RECOGNITION_MARKER,
                "RECOGNIZED: yes\nCONFIDENCE: 0.95\nREASON: known",
            )
            .on_prompt_containing(ENUMERATION_MARKER, "notion.so")
            .on_prompt_containing(
                CROSS_CHECK_MARKER,
                "RELATED: yes\nCONFIDENCE: 0.9\nREASON: official",
            )
            .on_prompt_containing(
                RANKING_MARKER,
                "RANKING: 1, 2\nCONFIDENCE: 0.8\nREASON: both could fit",
            )
            .on_prompt_containing(
                SELECTION_MARKER,
                "SELECTION: NONE\nCONFIDENCE: 0.7\nREASON: neither is canonical",
            ),
    );
    let discovery = discovery_with(vec![backend], &model);

    let discovered = discovery
        .discover_urls(&notion_request(&["pricing"], 0.3))
        .await
        .unwrap();
    assert!(discovered.is_empty());
}

#[tokio::test]
async fn output_never_contains_unrequested_categories() {
    let backend = Arc::new(
        MockSearchBackend::new(DiscoveryMethod::GoogleCustomSearch).with_default(vec![
            search_result("https://www.notion.so/pricing", DiscoveryMethod::GoogleCustomSearch),
            search_result("https://www.notion.so/blog", DiscoveryMethod::GoogleCustomSearch),
        ]),
    );
    let model = Arc::new(happy_model());
    let discovery = discovery_with(vec![backend], &model);

    let discovered = discovery
        .discover_urls(&notion_request(&["pricing"], 0.3))
        .await
        .unwrap();

    assert!(discovered.iter().all(|d| d.category == "pricing"));
    assert!(discovered.len() <= 1);
}

#[tokio::test]
async fn pattern_fallback_classifies_without_models() {
    let backend = Arc::new(
        MockSearchBackend::new(DiscoveryMethod::BraveSearch).with_default(vec![
            search_result_titled(
                "https://www.notion.so/pricing",
                "Pricing",
                "",
                DiscoveryMethod::BraveSearch,
            ),
            search_result_titled(
                "https://www.notion.so/blog",
                "Blog",
                "",
                DiscoveryMethod::BraveSearch,
            ),
        ]),
    );
    let backends: Vec<Arc<dyn SearchBackend>> = vec![backend];
    let discovery = UrlDiscovery::new(backends, HashMap::new());

    let discovered = discovery
        .discover_urls(&notion_request(&["pricing", "blog"], 0.6))
        .await
        .unwrap();

    assert_eq!(discovered.len(), 2);
    for hit in &discovered {
        assert_eq!(hit.ranking_model_used, "pattern-matching");
        assert!((hit.confidence_score - 0.8).abs() < 1e-6);
    }

    // A stricter threshold silences the pattern path too.
    let strict = discovery
        .discover_urls(&notion_request(&["pricing"], 0.9))
        .await
        .unwrap();
    assert!(strict.is_empty());
}
