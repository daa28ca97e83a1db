//! Per-listing score composition.
//!
//! Every function here is pure: rescoring unchanged listings with unchanged
//! weights yields identical results, so "what-if" weight changes never touch
//! the raw data.

use clap::ValueEnum;
use std::cmp::Ordering;

use crate::scoring::utility::{median, to_score};
use crate::scoring::weights::ScoreWeights;
use crate::types::{DerivedScores, Listing, ScoredListing};

/// Reference rent the housing score is measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReferenceRent {
    /// Median of all positive prices in the batch being scored.
    BatchMedian,
    Fixed(f64),
}

impl ReferenceRent {
    pub fn resolve(&self, listings: &[Listing]) -> f64 {
        match self {
            ReferenceRent::Fixed(amount) => *amount,
            ReferenceRent::BatchMedian => {
                let prices: Vec<f64> = listings
                    .iter()
                    .map(|l| l.price)
                    .filter(|p| *p > 0.0)
                    .collect();
                median(&prices)
            }
        }
    }
}

/// Housing affordability from the price-to-median ratio.
///
/// Half the median or less scores 100, 150% or more scores 0, and the
/// median itself scores 50. A non-positive reference scores 0.
pub fn housing_score(price: f64, median_price: f64) -> u8 {
    if median_price <= 0.0 || !median_price.is_finite() {
        return 0;
    }
    let ratio = price / median_price;
    if ratio <= 0.5 {
        100
    } else if ratio >= 1.5 {
        0
    } else {
        to_score(100.0 - (ratio - 0.5) * 100.0)
    }
}

/// Scales a raw score against the batch maximum (floored at 1).
pub fn normalize(raw: u32, batch_max: u32) -> u8 {
    let max = batch_max.max(1);
    to_score(f64::from(raw) / f64::from(max) * 100.0)
}

/// Weighted sum of the four component scores, rounded.
pub fn affordability_index(
    housing: u8,
    transit: u8,
    social: u8,
    grocery: u8,
    weights: &ScoreWeights,
) -> u8 {
    let w = weights.normalized();
    to_score(
        f64::from(housing) * w.housing
            + f64::from(transit) * w.transit
            + f64::from(social) * w.social
            + f64::from(grocery) * w.grocery,
    )
}

/// Computes derived scores for every listing, preserving input order.
pub fn score_listings(
    listings: &[Listing],
    weights: &ScoreWeights,
    reference: ReferenceRent,
) -> Vec<ScoredListing> {
    let median_price = reference.resolve(listings);
    let weights = weights.normalized();

    let max_social = listings.iter().map(|l| l.metrics.social_raw).max().unwrap_or(0);
    let max_grocery = listings.iter().map(|l| l.metrics.grocery_raw).max().unwrap_or(0);

    listings
        .iter()
        .map(|listing| {
            let housing = housing_score(listing.price, median_price);
            let social = normalize(listing.metrics.social_raw, max_social);
            let grocery = normalize(listing.metrics.grocery_raw, max_grocery);
            let index = affordability_index(
                housing,
                listing.metrics.transit_score,
                social,
                grocery,
                &weights,
            );

            ScoredListing {
                listing: listing.clone(),
                scores: DerivedScores {
                    housing,
                    social,
                    grocery,
                    index,
                },
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    #[default]
    Index,
    Housing,
    Transit,
    Social,
    Grocery,
    Price,
}

/// Stable sort of scored listings by `key`.
pub fn sort_listings(listings: &mut [ScoredListing], key: SortKey, descending: bool) {
    listings.sort_by(|a, b| {
        let ord = compare_by(a, b, key);
        if descending { ord.reverse() } else { ord }
    });
}

fn compare_by(a: &ScoredListing, b: &ScoredListing, key: SortKey) -> Ordering {
    match key {
        SortKey::Index => a.scores.index.cmp(&b.scores.index),
        SortKey::Housing => a.scores.housing.cmp(&b.scores.housing),
        SortKey::Transit => a
            .listing
            .metrics
            .transit_score
            .cmp(&b.listing.metrics.transit_score),
        SortKey::Social => a.scores.social.cmp(&b.scores.social),
        SortKey::Grocery => a.scores.grocery.cmp(&b.scores.grocery),
        SortKey::Price => a.listing.price.total_cmp(&b.listing.price),
    }
}
