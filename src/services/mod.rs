//! Provider contracts consumed by the amenity scorers.
//!
//! [`VenueSearch`] finds places around a coordinate; [`TransitTimes`]
//! reports transit travel time between two coordinates. The Google
//! implementations live in `crate::infra::google`.

mod transit_time;
mod venue_search;

pub use transit_time::{RouteTime, TransitTimes};
pub use venue_search::{NearbyQuery, VenueSearch};
