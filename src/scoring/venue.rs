//! Venue density ("daily living") scoring.
//!
//! The Places API caps a nearby search at 20 results, so one fixed-radius
//! query saturates in dense neighborhoods. The multi-tier strategy searches
//! at growing radii and credits only venues not already seen at a smaller
//! radius, which keeps dense and very dense areas apart.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::services::{NearbyQuery, VenueSearch};
use crate::types::Coordinate;

/// Place categories counted as social venues.
pub const VENUE_TYPES: &[&str] = &["restaurant", "cafe"];

/// Radius used by the single-radius strategy (about half a mile).
pub const DEFAULT_RADIUS_M: u32 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DensityTier {
    pub radius_m: u32,
    pub weight: u32,
}

/// 200m x3, 400m x2, 800m x1.
pub const DEFAULT_TIERS: [DensityTier; 3] = [
    DensityTier {
        radius_m: 200,
        weight: 3,
    },
    DensityTier {
        radius_m: 400,
        weight: 2,
    },
    DensityTier {
        radius_m: 800,
        weight: 1,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DensityStrategy {
    /// Searches each tier in order, crediting only newly seen venues.
    MultiTier(Vec<DensityTier>),
    /// Counts unique venues in a single search.
    SingleRadius { radius_m: u32 },
}

impl Default for DensityStrategy {
    fn default() -> Self {
        DensityStrategy::MultiTier(DEFAULT_TIERS.to_vec())
    }
}

impl DensityStrategy {
    fn tiers(&self) -> Vec<DensityTier> {
        match self {
            DensityStrategy::MultiTier(tiers) => tiers.clone(),
            DensityStrategy::SingleRadius { radius_m } => vec![DensityTier {
                radius_m: *radius_m,
                weight: 1,
            }],
        }
    }
}

/// Per-tier breakdown of a density score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierCount {
    pub radius_m: u32,
    pub weight: u32,
    pub returned: usize,
    pub new_venues: usize,
    pub points: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VenueDensity {
    /// Unbounded raw score; normalize against the batch before weighting.
    pub score: u32,
    pub tiers: Vec<TierCount>,
    /// Set when a provider failure forced the neutral score.
    pub degraded: bool,
}

pub struct VenueDensityScorer<S> {
    search: S,
    strategy: DensityStrategy,
}

impl<S: VenueSearch> VenueDensityScorer<S> {
    pub fn new(search: S, strategy: DensityStrategy) -> Self {
        Self { search, strategy }
    }

    /// Scores venue density around `center`. Never fails: a provider error
    /// yields a degraded score of 0.
    #[tracing::instrument(skip(self), fields(center = %center))]
    pub async fn score(&self, center: Coordinate) -> VenueDensity {
        match self.try_score(center).await {
            Ok(density) => density,
            Err(e) => {
                warn!(error = %e, "Venue search failed, using neutral score");
                VenueDensity {
                    degraded: true,
                    ..Default::default()
                }
            }
        }
    }

    async fn try_score(&self, center: Coordinate) -> Result<VenueDensity, ProviderError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut density = VenueDensity::default();

        for tier in self.strategy.tiers() {
            let query = NearbyQuery::new(center, tier.radius_m, VENUE_TYPES);
            let venues = self.search.search_nearby(&query).await?;

            let returned = venues.len();
            let mut new_venues = 0;
            for venue in venues {
                if seen.insert(venue.id) {
                    new_venues += 1;
                }
            }

            let points = new_venues as u32 * tier.weight;
            debug!(
                radius_m = tier.radius_m,
                returned, new_venues, points, "Venue tier counted"
            );

            density.score += points;
            density.tiers.push(TierCount {
                radius_m: tier.radius_m,
                weight: tier.weight,
                returned,
                new_venues,
                points,
            });
        }

        Ok(density)
    }
}
