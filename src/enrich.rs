//! Batch enrichment jobs that attach raw amenity metrics to listings.
//!
//! Listings are processed one at a time. Provider pacing comes from the
//! rate limiter inside the HTTP client, so the jobs themselves never sleep.
//! A listing without a coordinate is skipped and its metric reset to 0.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::scoring::grocery::GroceryScorer;
use crate::scoring::transit::TransitScorer;
use crate::scoring::venue::VenueDensityScorer;
use crate::services::{TransitTimes, VenueSearch};
use crate::types::Listing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Amenity {
    Transit,
    Social,
    Grocery,
}

impl Amenity {
    pub const ALL: [Amenity; 3] = [Amenity::Transit, Amenity::Social, Amenity::Grocery];
}

impl fmt::Display for Amenity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Amenity::Transit => "transit",
            Amenity::Social => "social",
            Amenity::Grocery => "grocery",
        };
        f.write_str(name)
    }
}

/// Per-job tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnrichReport {
    pub amenity: Amenity,
    pub succeeded: usize,
    /// Scored 0 after a provider failure.
    pub degraded: usize,
    /// No coordinate to search from.
    pub skipped: usize,
}

impl EnrichReport {
    fn new(amenity: Amenity) -> Self {
        Self {
            amenity,
            succeeded: 0,
            degraded: 0,
            skipped: 0,
        }
    }

    fn record(&mut self, degraded: bool) {
        if degraded {
            self.degraded += 1;
        } else {
            self.succeeded += 1;
        }
    }

    fn skip(&mut self, address: &str) {
        warn!(amenity = %self.amenity, address, "No coordinates, scoring 0");
        self.skipped += 1;
    }

    fn log(&self) {
        info!(
            amenity = %self.amenity,
            succeeded = self.succeeded,
            degraded = self.degraded,
            skipped = self.skipped,
            "Enrichment complete"
        );
    }
}

#[tracing::instrument(skip_all, fields(count = listings.len()))]
pub async fn enrich_transit<T: TransitTimes>(
    listings: &mut [Listing],
    scorer: &TransitScorer<T>,
) -> EnrichReport {
    let mut report = EnrichReport::new(Amenity::Transit);
    let total = listings.len();

    for (i, listing) in listings.iter_mut().enumerate() {
        let Some(origin) = listing.coordinate else {
            listing.metrics.transit_score = 0;
            report.skip(&listing.address);
            continue;
        };

        let outcome = scorer.score(origin).await;
        listing.metrics.transit_score = outcome.score;
        report.record(outcome.degraded);
        info!(
            progress = %format!("{}/{}", i + 1, total),
            address = %listing.address,
            avg_minutes = outcome.average_minutes,
            score = outcome.score,
            "Transit scored"
        );
    }

    report.log();
    report
}

#[tracing::instrument(skip_all, fields(count = listings.len()))]
pub async fn enrich_social<S: VenueSearch>(
    listings: &mut [Listing],
    scorer: &VenueDensityScorer<S>,
) -> EnrichReport {
    let mut report = EnrichReport::new(Amenity::Social);
    let total = listings.len();

    for (i, listing) in listings.iter_mut().enumerate() {
        let Some(center) = listing.coordinate else {
            listing.metrics.social_raw = 0;
            report.skip(&listing.address);
            continue;
        };

        let density = scorer.score(center).await;
        listing.metrics.social_raw = density.score;
        report.record(density.degraded);
        info!(
            progress = %format!("{}/{}", i + 1, total),
            address = %listing.address,
            score = density.score,
            "Daily living scored"
        );
    }

    report.log();
    report
}

#[tracing::instrument(skip_all, fields(count = listings.len()))]
pub async fn enrich_grocery<S: VenueSearch>(
    listings: &mut [Listing],
    scorer: &GroceryScorer<S>,
) -> EnrichReport {
    let mut report = EnrichReport::new(Amenity::Grocery);
    let total = listings.len();

    for (i, listing) in listings.iter_mut().enumerate() {
        let Some(center) = listing.coordinate else {
            listing.metrics.grocery_raw = 0;
            report.skip(&listing.address);
            continue;
        };

        let grocery = scorer.score(center).await;
        listing.metrics.grocery_raw = grocery.score;
        report.record(grocery.degraded);
        info!(
            progress = %format!("{}/{}", i + 1, total),
            address = %listing.address,
            budget = grocery.breakdown.budget,
            regular = grocery.breakdown.regular,
            premium = grocery.breakdown.premium,
            score = grocery.score,
            "Grocery scored"
        );
    }

    report.log();
    report
}
