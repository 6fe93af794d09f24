// In-memory collaborators for tests

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::traits::{ListingStatus, PageFetcher, PageRenderer, RenderedPage};

pub type CallLog = Arc<Mutex<Vec<String>>>;

// =============================================================================
// Listing page fixtures
// =============================================================================

/// Field values to render into a listing page; `None` leaves the field out
#[derive(Debug, Clone, Default)]
pub struct ListingFixture {
    pub property_type: Option<&'static str>,
    pub listing_type: Option<&'static str>,
    pub price: Option<&'static str>,
    pub beds: Option<&'static str>,
    pub lot_size: Option<&'static str>,
    pub square_feet: Option<&'static str>,
}

/// Markup shaped like the rendered tour pages
pub fn listing_html(fixture: &ListingFixture) -> String {
    let mut body = String::new();

    let stats = [
        (fixture.price, "asking"),
        (fixture.beds, "bed"),
        (fixture.lot_size, "lot size"),
        (fixture.square_feet, "square feet"),
    ];
    for (value, label) in stats {
        if let Some(value) = value {
            body.push_str(&format!(
                "<div class=\"stat\"><h3>{}</h3> <span>{}</span></div>",
                value, label
            ));
        }
    }

    let details = [
        (fixture.property_type, "Property Type"),
        (fixture.listing_type, "Listing Type"),
    ];
    for (value, label) in details {
        if let Some(value) = value {
            body.push_str(&format!(
                "<li><span>{}</span> <span>{}</span></li>",
                label, value
            ));
        }
    }

    format!(
        "<html><head><title>Tour</title></head><body><section>{}</section></body></html>",
        body
    )
}

pub fn titled_page(title: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body></body></html>",
        title
    )
}

// =============================================================================
// Fake page fetcher
// =============================================================================

#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    calls: CallLog,
}

impl FakeFetcher {
    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> CallLog {
        self.calls.clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.failing.contains(url) {
            anyhow::bail!("connection reset fetching {}", url);
        }
        Ok(self.pages.get(url).cloned().unwrap_or_default())
    }
}

// =============================================================================
// Fake renderer
// =============================================================================

/// Serves canned DOM snapshots; successive `html()` calls walk the list
/// and stick on the last entry
#[derive(Default)]
pub struct FakeRenderer {
    pages: HashMap<String, Vec<String>>,
    opened: CallLog,
    sessions: CallLog,
}

impl FakeRenderer {
    pub fn with_page(self, url: &str, html: impl Into<String>) -> Self {
        self.with_pages(url, vec![html.into()])
    }

    pub fn with_pages(mut self, url: &str, snapshots: Vec<String>) -> Self {
        self.pages.insert(url.to_string(), snapshots);
        self
    }

    pub fn opened(&self) -> CallLog {
        self.opened.clone()
    }

    /// "open <url>" and "close <url>" events, in order
    pub fn sessions(&self) -> CallLog {
        self.sessions.clone()
    }
}

struct FakePage {
    url: String,
    snapshots: Vec<String>,
    cursor: AtomicUsize,
    sessions: CallLog,
}

impl Drop for FakePage {
    fn drop(&mut self) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.push(format!("close {}", self.url));
        }
    }
}

impl RenderedPage for FakePage {
    fn html(&self) -> Result<String> {
        let idx = self.cursor.fetch_add(1, Ordering::SeqCst);
        let last = self.snapshots.len().saturating_sub(1);
        Ok(self.snapshots.get(idx.min(last)).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn open(&self, url: &str) -> Result<Box<dyn RenderedPage>> {
        self.opened.lock().unwrap().push(url.to_string());
        let snapshots = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("browser could not render {}", url))?;
        self.sessions.lock().unwrap().push(format!("open {}", url));
        Ok(Box::new(FakePage {
            url: url.to_string(),
            snapshots,
            cursor: AtomicUsize::new(0),
            sessions: self.sessions.clone(),
        }))
    }
}

// =============================================================================
// Fake market status
// =============================================================================

#[derive(Default)]
pub struct FakeListingStatus {
    listed: HashSet<String>,
    calls: CallLog,
}

impl FakeListingStatus {
    pub fn with_listed(mut self, address: &str) -> Self {
        self.listed.insert(address.to_string());
        self
    }

    pub fn calls(&self) -> CallLog {
        self.calls.clone()
    }
}

#[async_trait]
impl ListingStatus for FakeListingStatus {
    async fn is_currently_listed(&self, address: &str) -> Result<bool> {
        self.calls.lock().unwrap().push(address.to_string());
        Ok(self.listed.contains(address))
    }
}
