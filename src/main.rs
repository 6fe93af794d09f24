mod models;
mod scrapers;

use clap::Parser;
use models::{SearchCriteria, SearchReport, TargetLocation, DEFAULT_URL_TEMPLATE, ID_PLACEHOLDER};
use scrapers::{
    ChromeRenderer, HttpPageFetcher, RedfinClient, RetryPolicy, SearchDriver, SuitabilityEvaluator,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scan tour pages for suitable homes that are not on the market
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Listings need more bedrooms than this
    #[arg(short = 'b', long, default_value_t = 1)]
    beds: u32,
    /// Location as "city, state"; the state may be a code or a full name
    #[arg(short = 'l', long)]
    loc: TargetLocation,
    /// Listings need an asking price below this
    #[arg(short = 'p', long, default_value_t = 500_000.0)]
    price: f64,
    /// First listing ID to scan
    #[arg(short = 's', long, default_value_t = 5000)]
    id_start: u64,
    /// Number of listing IDs to scan
    #[arg(short = 'i', long, default_value_t = 1000)]
    increments: u64,
    /// Listing page URL, with {id} where the listing ID goes
    #[arg(long, default_value = DEFAULT_URL_TEMPLATE)]
    url_template: String,
    /// Milliseconds to let a rendered page settle before reading fields
    #[arg(long, default_value_t = 1000)]
    render_wait_ms: u64,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn print_report(report: &SearchReport) {
    println!("Potential matches ({}):", report.matches.len());
    for m in &report.matches {
        println!("   {} ({})", m.url, m.address);
    }

    println!();
    println!("Listings that could not be checked ({}):", report.errors.len());
    for e in &report.errors {
        println!(
            "   {} [{}]: {}",
            e.url,
            e.address.as_deref().unwrap_or("unknown address"),
            e.reason
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if !args.url_template.contains(ID_PLACEHOLDER) {
        anyhow::bail!("--url-template must contain {}", ID_PLACEHOLDER);
    }

    let criteria = SearchCriteria {
        min_beds: args.beds,
        max_price: args.price,
        target: args.loc,
        id_start: args.id_start,
        count: args.increments,
    };

    info!("🏠 Off-market scout");

    let fetcher: Arc<HttpPageFetcher> = Arc::new(HttpPageFetcher::new()?);
    let market = Arc::new(RedfinClient::new(fetcher.clone())?);
    let renderer = ChromeRenderer::new(Duration::from_millis(args.render_wait_ms));
    let evaluator = SuitabilityEvaluator::new(Box::new(renderer), RetryPolicy::default());

    let driver = SearchDriver::new(fetcher, evaluator, market, args.url_template);
    let report = driver.run(&criteria).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}
