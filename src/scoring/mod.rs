//! Amenity scoring, per-listing score composition and zip aggregation.
//!
//! The amenity scorers turn provider responses into raw metrics and absorb
//! provider failures into a zero sentinel. The composer and the aggregator
//! are pure functions over listings.

pub mod aggregate;
pub mod classify;
pub mod composer;
pub mod grocery;
pub mod transit;
pub mod utility;
pub mod venue;
pub mod weights;

#[cfg(test)]
pub(crate) mod testing;
