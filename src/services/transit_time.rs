//! Trait for transit travel-time lookups.

use crate::error::ProviderError;
use crate::types::Coordinate;

/// Outcome of a single origin/destination lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteTime {
    /// Transit travel time in minutes.
    Minutes(f64),
    /// The provider answered but found no transit route.
    NoRoute { status: String },
}

/// Abstraction over a travel-time provider (e.g., Google Distance Matrix).
#[async_trait::async_trait]
pub trait TransitTimes: Send + Sync {
    async fn travel_time(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteTime, ProviderError>;
}
