use chrono::{DateTime, Utc};
use serde::Serialize;
use std::ops::Range;

pub mod location;

pub use location::TargetLocation;

/// Placeholder inserted by the URL template where the listing ID goes
pub const ID_PLACEHOLDER: &str = "{id}";

/// Listing pages are addressed by numeric ID
pub const DEFAULT_URL_TEMPLATE: &str = "https://www.seetheproperty.com/story/39{id}";

/// Build the page URL for a listing ID
pub fn listing_url(template: &str, id: u64) -> String {
    template.replace(ID_PLACEHOLDER, &id.to_string())
}

/// Search criteria, fixed for the duration of a run
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    /// Listings need strictly more bedrooms than this
    pub min_beds: u32,
    /// Listings need an asking price strictly below this
    pub max_price: f64,
    pub target: TargetLocation,
    pub id_start: u64,
    pub count: u64,
}

impl SearchCriteria {
    pub fn ids(&self) -> Range<u64> {
        self.id_start..self.id_start.saturating_add(self.count)
    }
}

/// Outcome of evaluating a single listing ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationResult {
    NotInTargetArea,
    /// Page exists but still shows the site's sample placeholder
    Unpopulated,
    Unsuitable,
    /// Suitable, but currently on the market
    Listed,
    /// Suitable and not on the market
    OffMarket,
}

/// A suitable, off-market property worth a closer look
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    pub id: u64,
    pub url: String,
    pub address: String,
}

/// A listing ID whose evaluation failed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub id: u64,
    pub url: String,
    pub address: Option<String>,
    pub reason: String,
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub scanned: u64,
    pub matches: Vec<MatchRecord>,
    pub errors: Vec<ErrorRecord>,
}
