use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::ProviderId;
use pagescout_common::{DiscoveryConfig, SearchDepth};
use pagescout_discovery::{DiscoveryRequest, UrlDiscovery};

/// Discover and classify a company's web pages (pricing, blog, ...) using
/// keyword search plus confidence-validated model ranking and selection.
#[derive(Parser, Debug)]
#[command(name = "pagescout")]
struct Args {
    /// Company name, e.g. "Notion"
    #[arg(long)]
    company: String,

    /// Seed website URL, e.g. "https://www.notion.so"
    #[arg(long)]
    seed_url: String,

    /// Comma-separated categories to discover
    #[arg(long, default_value = "pricing,features,blog,about")]
    categories: String,

    /// quick | standard | comprehensive
    #[arg(long, default_value = "standard")]
    depth: SearchDepth,

    /// Model used for ranking (claude | openai); default from env config
    #[arg(long)]
    ranking_model: Option<ProviderId>,

    /// Model used for selection (claude | openai); default from env config
    #[arg(long)]
    selection_model: Option<ProviderId>,

    /// Suppress results scoring below this
    #[arg(long)]
    min_confidence: Option<f32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("pagescout_discovery=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = DiscoveryConfig::from_env();

    let discovery = UrlDiscovery::from_config(&config)?;
    info!(backends = ?discovery.available_backends(), "PageScout starting");

    let categories: Vec<String> = args
        .categories
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    let request = DiscoveryRequest::builder()
        .company_name(args.company)
        .seed_url(args.seed_url)
        .categories(categories)
        .search_depth(args.depth)
        .ranking_provider(args.ranking_model.unwrap_or(config.ranking_model))
        .selection_provider(args.selection_model.unwrap_or(config.selection_model))
        .min_confidence_threshold(args.min_confidence.unwrap_or(config.min_confidence_threshold))
        .build();

    let discovered = discovery.discover_urls(&request).await?;
    info!(count = discovered.len(), "Discovery finished");

    println!("{}", serde_json::to_string_pretty(&discovered)?);
    Ok(())
}
