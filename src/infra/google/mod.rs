//! Google Maps Platform adapters.
//!
//! [`PlacesClient`] implements [`VenueSearch`](crate::services::VenueSearch)
//! over Places API (New) nearby search. [`DistanceMatrixClient`] implements
//! [`TransitTimes`](crate::services::TransitTimes) over the Distance Matrix
//! API. Both take any [`HttpClient`](crate::fetch::HttpClient), so keys and
//! pacing are layered on by the caller.

mod distance_matrix;
mod places;

pub use distance_matrix::{DISTANCE_MATRIX_BASE_URL, DistanceMatrixClient};
pub use places::{PLACES_BASE_URL, PlacesClient};

/// Header carrying the Places API key.
pub const PLACES_KEY_HEADER: &str = "X-Goog-Api-Key";

/// Query parameter carrying the Distance Matrix API key.
pub const DISTANCE_MATRIX_KEY_PARAM: &str = "key";
