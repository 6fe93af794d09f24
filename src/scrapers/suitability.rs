use crate::scrapers::retry::RetryPolicy;
use crate::scrapers::traits::{PageRenderer, RenderedPage};
use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;

/// Lots must be strictly larger than this many acres
pub const MIN_LOT_ACRES: f64 = 0.13;
/// Interiors must be strictly larger than this many square feet
pub const MIN_INTERIOR_SQFT: f64 = 1500.0;

const SINGLE_FAMILY: &str = "Single Family";
const FOR_SALE: &str = "For Sale";

/// Result of one suitability predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    /// The field never showed up on the page
    Unknown,
}

impl Verdict {
    fn from_bool(ok: bool) -> Self {
        if ok {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    /// Unknown counts as a pass
    pub fn passes(self) -> bool {
        self != Verdict::Fail
    }
}

/// Which neighbour of the label span carries the value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sibling {
    FollowingSpan,
    PrecedingH3,
}

/// Labelled values on a rendered listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingField {
    PropertyType,
    ListingType,
    AskingPrice,
    Beds,
    LotSize,
    SquareFeet,
}

impl ListingField {
    pub fn label(self) -> &'static str {
        match self {
            ListingField::PropertyType => "Property Type",
            ListingField::ListingType => "Listing Type",
            ListingField::AskingPrice => "asking",
            ListingField::Beds => "bed",
            ListingField::LotSize => "lot size",
            ListingField::SquareFeet => "square feet",
        }
    }

    fn sibling(self) -> Sibling {
        match self {
            ListingField::PropertyType | ListingField::ListingType => Sibling::FollowingSpan,
            _ => Sibling::PrecedingH3,
        }
    }
}

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("field '{label}' not found")]
    NotFound { label: &'static str },
    #[error("could not parse '{raw}' for field '{label}'")]
    Unparseable { label: &'static str, raw: String },
    #[error(transparent)]
    Render(#[from] anyhow::Error),
}

impl FieldError {
    /// A page still rendering can show a label before its value is filled in
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FieldError::NotFound { .. } | FieldError::Unparseable { .. }
        )
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn value_beside(label: ElementRef<'_>, sibling: Sibling) -> Option<ElementRef<'_>> {
    match sibling {
        Sibling::FollowingSpan => label
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "span"),
        Sibling::PrecedingH3 => label
            .prev_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "h3"),
    }
}

/// Find the span labelled `field` and read the value next to it. Labels
/// without the expected neighbour (menus, legends) are skipped.
pub fn extract_field(html: &str, field: ListingField) -> Option<String> {
    let document = Html::parse_document(html);
    let span_selector = Selector::parse("span").ok()?;

    document
        .select(&span_selector)
        .filter(|el| element_text(*el) == field.label())
        .find_map(|label| value_beside(label, field.sibling()))
        .map(element_text)
}

pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    cleaned.parse().ok()
}

pub fn parse_beds(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

/// Sellers sometimes write "0.25 acres"; only the number counts
pub fn parse_lot_acres(raw: &str) -> Option<f64> {
    raw.split_whitespace().next()?.parse().ok()
}

pub fn parse_square_feet(raw: &str) -> Option<f64> {
    raw.replace(',', "").trim().parse().ok()
}

/// Per-predicate verdicts for one listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuitabilityReport {
    pub property_type: Verdict,
    pub sale_status: Verdict,
    pub price: Verdict,
    pub beds: Verdict,
    pub lot_size: Verdict,
    pub interior: Verdict,
}

impl SuitabilityReport {
    pub fn has_enough_space(&self) -> bool {
        self.lot_size.passes() && self.interior.passes()
    }

    pub fn is_suitable(&self) -> bool {
        self.property_type.passes()
            && self.sale_status.passes()
            && self.price.passes()
            && self.beds.passes()
            && self.has_enough_space()
    }
}

/// Judges rendered listing pages against the search thresholds
pub struct SuitabilityEvaluator {
    renderer: Box<dyn PageRenderer>,
    retry: RetryPolicy,
}

impl SuitabilityEvaluator {
    pub fn new(renderer: Box<dyn PageRenderer>, retry: RetryPolicy) -> Self {
        Self { renderer, retry }
    }

    pub async fn is_suitable(&self, url: &str, min_beds: u32, max_price: f64) -> Result<bool> {
        Ok(self.evaluate(url, min_beds, max_price).await?.is_suitable())
    }

    pub async fn evaluate(&self, url: &str, min_beds: u32, max_price: f64) -> Result<SuitabilityReport> {
        let session = self.renderer.open(url).await?;
        let page = &*session;

        let report = SuitabilityReport {
            property_type: self
                .judge(page, ListingField::PropertyType, |raw| Some(raw == SINGLE_FAMILY))
                .await?,
            sale_status: self
                .judge(page, ListingField::ListingType, |raw| Some(raw == FOR_SALE))
                .await?,
            price: self
                .judge(page, ListingField::AskingPrice, |raw| {
                    parse_price(raw).map(|price| price < max_price)
                })
                .await?,
            beds: self
                .judge(page, ListingField::Beds, |raw| {
                    parse_beds(raw).map(|beds| beds > min_beds)
                })
                .await?,
            lot_size: self
                .judge(page, ListingField::LotSize, |raw| {
                    parse_lot_acres(raw).map(|acres| acres > MIN_LOT_ACRES)
                })
                .await?,
            interior: self
                .judge(page, ListingField::SquareFeet, |raw| {
                    parse_square_feet(raw).map(|sqft| sqft > MIN_INTERIOR_SQFT)
                })
                .await?,
        };

        debug!(url = %url, ?report, "Evaluated listing");
        Ok(report)
    }

    /// Look `field` up and test it, re-reading the page while the value is
    /// missing or not yet parseable. A field that never appears is Unknown.
    async fn judge(
        &self,
        page: &dyn RenderedPage,
        field: ListingField,
        test: impl Fn(&str) -> Option<bool>,
    ) -> Result<Verdict, FieldError> {
        let test = &test;
        let lookup = self
            .retry
            .run(
                || async move {
                    let html = page.html()?;
                    let raw = extract_field(&html, field)
                        .ok_or(FieldError::NotFound { label: field.label() })?;
                    test(&raw)
                        .map(Verdict::from_bool)
                        .ok_or(FieldError::Unparseable { label: field.label(), raw })
                },
                FieldError::is_retryable,
            )
            .await;

        match lookup {
            Ok(verdict) => Ok(verdict),
            Err(FieldError::NotFound { label }) => {
                debug!(field = label, "Field missing, assuming it passes");
                Ok(Verdict::Unknown)
            }
            Err(err) => Err(err),
        }
    }
}
