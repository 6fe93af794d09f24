use crate::models::{
    listing_url, ErrorRecord, EvaluationResult, MatchRecord, SearchCriteria, SearchReport,
};
use crate::scrapers::location::fetch_and_verify;
use crate::scrapers::suitability::SuitabilityEvaluator;
use crate::scrapers::traits::{ListingStatus, PageFetcher};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Log a progress line every this many IDs
const PROGRESS_EVERY: u64 = 50;

/// A failed evaluation and the address known for that ID when it failed
struct Failure {
    address: Option<String>,
    error: anyhow::Error,
}

/// Walks an ID range and sequences the per-listing checks
pub struct SearchDriver {
    fetcher: Arc<dyn PageFetcher>,
    evaluator: SuitabilityEvaluator,
    market: Arc<dyn ListingStatus>,
    url_template: String,
}

impl SearchDriver {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        evaluator: SuitabilityEvaluator,
        market: Arc<dyn ListingStatus>,
        url_template: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            evaluator,
            market,
            url_template: url_template.into(),
        }
    }

    /// Scan every ID in the criteria's range. Failures for one ID are recorded
    /// and never stop the scan.
    pub async fn run(&self, criteria: &SearchCriteria) -> SearchReport {
        let started_at = Utc::now();
        let mut matches = Vec::new();
        let mut errors = Vec::new();
        let mut scanned: u64 = 0;

        info!(
            target_location = %criteria.target,
            min_beds = criteria.min_beds,
            max_price = criteria.max_price,
            id_start = criteria.id_start,
            count = criteria.count,
            "Starting search"
        );

        for id in criteria.ids() {
            let url = listing_url(&self.url_template, id);
            if (id - criteria.id_start) % PROGRESS_EVERY == 0 {
                info!(url = %url, "Currently looking at listing");
            }
            scanned += 1;

            let outcome = self.evaluate(&url, criteria).await;
            match outcome {
                Ok((EvaluationResult::OffMarket, Some(address))) => {
                    info!(url = %url, address = %address, "Found a match");
                    matches.push(MatchRecord { id, url, address });
                }
                Ok((result, _)) => {
                    debug!(url = %url, ?result, "Skipping listing");
                }
                Err(Failure { address, error }) => {
                    warn!(url = %url, address = ?address, "Evaluation failed: {:#}", error);
                    errors.push(ErrorRecord {
                        id,
                        url,
                        address,
                        reason: format!("{:#}", error),
                    });
                }
            }
        }

        info!(
            scanned,
            matches = matches.len(),
            errors = errors.len(),
            "Search finished"
        );

        SearchReport {
            started_at,
            finished_at: Utc::now(),
            scanned,
            matches,
            errors,
        }
    }

    /// Run the checks for one listing, cheapest first
    async fn evaluate(
        &self,
        url: &str,
        criteria: &SearchCriteria,
    ) -> Result<(EvaluationResult, Option<String>), Failure> {
        let check = fetch_and_verify(self.fetcher.as_ref(), url, &criteria.target)
            .await
            .map_err(|error| Failure {
                address: None,
                error,
            })?;

        if check.is_unpopulated() {
            return Ok((EvaluationResult::Unpopulated, check.address));
        }
        let Some(address) = check.address.filter(|_| check.in_area) else {
            return Ok((EvaluationResult::NotInTargetArea, None));
        };

        let outcome = self.evaluate_candidate(url, &address, criteria).await;
        match outcome {
            Ok(result) => Ok((result, Some(address))),
            Err(error) => Err(Failure {
                address: Some(address),
                error,
            }),
        }
    }

    async fn evaluate_candidate(
        &self,
        url: &str,
        address: &str,
        criteria: &SearchCriteria,
    ) -> Result<EvaluationResult> {
        if !self
            .evaluator
            .is_suitable(url, criteria.min_beds, criteria.max_price)
            .await?
        {
            return Ok(EvaluationResult::Unsuitable);
        }

        if self.market.is_currently_listed(address).await? {
            debug!(address, "Currently listed");
            return Ok(EvaluationResult::Listed);
        }

        Ok(EvaluationResult::OffMarket)
    }
}
