//! Trait and request type for nearby venue search.

use crate::error::ProviderError;
use crate::types::{Coordinate, Venue};

/// Upper bound the Places API applies to a single nearby search.
pub const MAX_RESULTS_PER_QUERY: u8 = 20;

/// A circular nearby search restricted to the given place categories.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub center: Coordinate,
    pub radius_m: u32,
    pub included_types: Vec<String>,
    pub max_results: u8,
}

impl NearbyQuery {
    pub fn new(center: Coordinate, radius_m: u32, included_types: &[&str]) -> Self {
        Self {
            center,
            radius_m,
            included_types: included_types.iter().map(|s| s.to_string()).collect(),
            max_results: MAX_RESULTS_PER_QUERY,
        }
    }
}

/// Abstraction over a place search provider (e.g., Google Places).
#[async_trait::async_trait]
pub trait VenueSearch: Send + Sync {
    /// Returns the venues inside the query circle.
    ///
    /// An empty vector means the search succeeded with zero results; a
    /// failed request is always an `Err`.
    async fn search_nearby(&self, query: &NearbyQuery) -> Result<Vec<Venue>, ProviderError>;
}

#[async_trait::async_trait]
impl<T: VenueSearch + ?Sized> VenueSearch for std::sync::Arc<T> {
    async fn search_nearby(&self, query: &NearbyQuery) -> Result<Vec<Venue>, ProviderError> {
        (**self).search_nearby(query).await
    }
}
