use crate::scrapers::traits::{ListingStatus, PageFetcher};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://www.redfin.com/stingray/";

const SEARCH_PATH: &str = "do/location-autocomplete";
const INITIAL_INFO_PATH: &str = "api/home/details/initialInfo";
const AVM_PATH: &str = "api/home/details/avm";

/// Anti-JSON-hijacking guard in front of every stingray payload
const RESPONSE_GUARD: &str = "{}&&";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    payload: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPayload {
    exact_match: Option<ExactMatch>,
}

#[derive(Debug, Deserialize)]
struct ExactMatch {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitialInfo {
    property_id: Option<u64>,
    listing_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvmDetails {
    is_activish: Option<bool>,
}

/// Identifiers the property API knows an address by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyIds {
    pub property_id: u64,
    /// Absent when the property has no listing
    pub listing_id: Option<u64>,
}

/// Strip the guard prefix and decode the `payload` object
fn decode_payload<T: DeserializeOwned>(body: &str) -> Result<T> {
    let json = body.trim_start().strip_prefix(RESPONSE_GUARD).unwrap_or(body);
    let envelope: Envelope<T> =
        serde_json::from_str(json).context("Failed to decode property API response")?;
    envelope
        .payload
        .context("property API response has no payload")
}

pub fn parse_exact_match_url(body: &str) -> Result<String> {
    let payload: SearchPayload = decode_payload(body)?;
    payload
        .exact_match
        .map(|m| m.url)
        .context("no exact match for address")
}

pub fn parse_property_ids(body: &str) -> Result<PropertyIds> {
    let info: InitialInfo = decode_payload(body)?;
    Ok(PropertyIds {
        property_id: info.property_id.context("initial info has no propertyId")?,
        listing_id: info.listing_id,
    })
}

pub fn parse_is_activish(body: &str) -> Result<bool> {
    let avm: AvmDetails = decode_payload(body)?;
    avm.is_activish.context("avm details have no isActivish")
}

/// Client for Redfin's stingray endpoints
///
/// Requests go through the injected fetcher, so one HTTP client serves both
/// the listing pages and the property API.
pub struct RedfinClient {
    fetcher: Arc<dyn PageFetcher>,
    base_url: Url,
}

impl RedfinClient {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        Self::with_base_url(fetcher, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(fetcher: Arc<dyn PageFetcher>, base_url: &str) -> Result<Self> {
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = Url::parse(&base_url)
            .with_context(|| format!("invalid property API url '{}'", base_url))?;

        Ok(Self { fetcher, base_url })
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path)
            .with_context(|| format!("invalid endpoint path '{}'", path))?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = self.endpoint(path, query)?;
        debug!(url = %url, "Querying property API");
        self.fetcher.fetch(url.as_str()).await
    }

    fn search_query(address: &str) -> [(&'static str, String); 2] {
        [("location", address.to_string()), ("v", "2".to_string())]
    }

    fn initial_info_query(path: &str) -> [(&'static str, String); 1] {
        [("path", path.to_string())]
    }

    fn avm_query(property_id: u64, listing_id: u64) -> [(&'static str, String); 3] {
        [
            ("propertyId", property_id.to_string()),
            ("listingId", listing_id.to_string()),
            ("accessLevel", "1".to_string()),
        ]
    }

    /// Resolve an address to its home page path
    pub async fn search(&self, address: &str) -> Result<String> {
        let body = self
            .get(SEARCH_PATH, &Self::search_query(address))
            .await?;
        parse_exact_match_url(&body)
    }

    pub async fn initial_info(&self, path: &str) -> Result<PropertyIds> {
        let body = self
            .get(INITIAL_INFO_PATH, &Self::initial_info_query(path))
            .await?;
        parse_property_ids(&body)
    }

    pub async fn avm_details(&self, property_id: u64, listing_id: u64) -> Result<bool> {
        let body = self
            .get(AVM_PATH, &Self::avm_query(property_id, listing_id))
            .await?;
        parse_is_activish(&body)
    }
}

#[async_trait]
impl ListingStatus for RedfinClient {
    async fn is_currently_listed(&self, address: &str) -> Result<bool> {
        let path = self
            .search(address)
            .await
            .with_context(|| format!("address lookup failed for '{}'", address))?;
        let ids = self.initial_info(&path).await?;

        let Some(listing_id) = ids.listing_id else {
            debug!(address, "No listing id, treating as off-market");
            return Ok(false);
        };

        self.avm_details(ids.property_id, listing_id).await
    }

}
