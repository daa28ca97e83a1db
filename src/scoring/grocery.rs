//! Grocery affordability scoring.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::scoring::classify::{GroceryTaxonomy, GroceryTier};
use crate::services::{NearbyQuery, VenueSearch};
use crate::types::{Coordinate, Venue};

pub const GROCERY_TYPES: &[&str] = &["grocery_store", "supermarket"];
pub const GROCERY_RADIUS_M: u32 = 800;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierBreakdown {
    pub budget: u32,
    pub regular: u32,
    pub premium: u32,
}

impl TierBreakdown {
    fn record(&mut self, tier: GroceryTier) {
        match tier {
            GroceryTier::Budget => self.budget += 1,
            GroceryTier::Regular => self.regular += 1,
            GroceryTier::Premium => self.premium += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedStore {
    #[serde(flatten)]
    pub venue: Venue,
    pub tier: GroceryTier,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroceryScore {
    pub score: u32,
    pub breakdown: TierBreakdown,
    pub stores: Vec<ClassifiedStore>,
    pub degraded: bool,
}

/// Weighted tier sum, floored at zero.
pub fn weighted_score(breakdown: &TierBreakdown, taxonomy: &GroceryTaxonomy) -> u32 {
    let total = i64::from(breakdown.budget) * i64::from(taxonomy.weight(GroceryTier::Budget))
        + i64::from(breakdown.regular) * i64::from(taxonomy.weight(GroceryTier::Regular))
        + i64::from(breakdown.premium) * i64::from(taxonomy.weight(GroceryTier::Premium));
    total.clamp(0, i64::from(u32::MAX)) as u32
}

pub struct GroceryScorer<S> {
    search: S,
    taxonomy: GroceryTaxonomy,
}

impl<S: VenueSearch> GroceryScorer<S> {
    pub fn new(search: S, taxonomy: GroceryTaxonomy) -> Self {
        Self { search, taxonomy }
    }

    /// Scores grocery affordability around `center`. A provider error yields
    /// a degraded zero score with an empty breakdown.
    #[tracing::instrument(skip(self), fields(center = %center))]
    pub async fn score(&self, center: Coordinate) -> GroceryScore {
        match self.try_score(center).await {
            Ok(score) => score,
            Err(e) => {
                warn!(error = %e, "Grocery search failed, using neutral score");
                GroceryScore {
                    degraded: true,
                    ..Default::default()
                }
            }
        }
    }

    async fn try_score(&self, center: Coordinate) -> Result<GroceryScore, ProviderError> {
        let query = NearbyQuery::new(center, GROCERY_RADIUS_M, GROCERY_TYPES);
        let venues = self.search.search_nearby(&query).await?;

        let mut seen = HashSet::new();
        let mut breakdown = TierBreakdown::default();
        let mut stores = Vec::new();

        for venue in venues {
            if !seen.insert(venue.id.clone()) {
                continue;
            }
            let tier = self.taxonomy.classify(&venue.name);
            breakdown.record(tier);
            stores.push(ClassifiedStore { venue, tier });
        }

        let score = weighted_score(&breakdown, &self.taxonomy);
        debug!(
            budget = breakdown.budget,
            regular = breakdown.regular,
            premium = breakdown.premium,
            score,
            "Grocery stores classified"
        );

        Ok(GroceryScore {
            score,
            breakdown,
            stores,
            degraded: false,
        })
    }
}
