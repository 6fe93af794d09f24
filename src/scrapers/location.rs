use crate::models::TargetLocation;
use crate::scrapers::traits::PageFetcher;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

/// Title fragment of pages the site has allocated but not filled in yet
pub const UNPOPULATED_MARKER: &str = "Sample Tour";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// reqwest-backed page fetcher
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url = %url, "Fetching listing page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {} for {}", status, url);
        }

        response.text().await.context("Failed to read response body")
    }
}

/// What the page title says about where a listing is
#[derive(Debug, Clone, PartialEq)]
pub struct LocationCheck {
    pub title: Option<String>,
    pub in_area: bool,
    /// Street, city and state taken from the title; only set when in area
    pub address: Option<String>,
}

impl LocationCheck {
    pub fn is_unpopulated(&self) -> bool {
        self.title
            .as_deref()
            .map(|t| t.contains(UNPOPULATED_MARKER))
            .unwrap_or(false)
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;
    document
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

/// Check whether a listing page's title mentions the target location
pub fn verify_location(html: &str, target: &TargetLocation) -> LocationCheck {
    let document = Html::parse_document(html);
    let Some(title) = extract_title(&document) else {
        return LocationCheck {
            title: None,
            in_area: false,
            address: None,
        };
    };

    let in_area = title.contains(&target.to_string());
    let address = in_area.then(|| {
        title
            .split(',')
            .take(3)
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(", ")
    });

    LocationCheck {
        title: Some(title),
        in_area,
        address,
    }
}

/// Fetch `url` and check its title against `target`
pub async fn fetch_and_verify(
    fetcher: &dyn PageFetcher,
    url: &str,
    target: &TargetLocation,
) -> Result<LocationCheck> {
    let html = fetcher.fetch(url).await?;
    Ok(verify_location(&html, target))
}
