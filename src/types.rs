//! Data types shared by the store, the scorers and the aggregation pipeline.

use serde::Serialize;
use std::fmt;

use crate::error::DataError;

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lng: f64) -> Result<Self, DataError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if valid {
            Ok(Self { lat, lng })
        } else {
            Err(DataError::InvalidCoordinate { lat, lng })
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Canonical zip code key.
///
/// Digit-only values are left-zero-padded to five characters and numeric
/// spellings such as `11201.0` are reduced to their integer digits, so the
/// same zip read from a numeric column and a text column groups together.
/// Anything else is kept verbatim after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct ZipCode(String);

impl ZipCode {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let digits = match trimmed.split_once('.') {
            Some((int, frac)) if frac.chars().all(|c| c == '0') => int,
            _ => trimmed,
        };

        if !digits.is_empty() && digits.len() <= 5 && digits.chars().all(|c| c.is_ascii_digit()) {
            Some(Self(format!("{digits:0>5}")))
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<ZipCode> for String {
    fn from(value: ZipCode) -> Self {
        value.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw amenity metrics attached to a listing by the enrichment jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AmenityMetrics {
    /// Already on the 0-100 scale.
    pub transit_score: u8,
    /// Unbounded weighted venue count.
    pub social_raw: u32,
    /// Floored at zero by the grocery scorer.
    pub grocery_raw: u32,
}

/// A rental listing with its raw fields only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub address: String,
    pub zip: ZipCode,
    pub coordinate: Option<Coordinate>,
    pub price: f64,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    pub square_feet: Option<f64>,
    pub url: Option<String>,
    pub metrics: AmenityMetrics,
}

/// Scores derived from a listing's raw fields and the scoring configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DerivedScores {
    pub housing: u8,
    pub social: u8,
    pub grocery: u8,
    pub index: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredListing {
    #[serde(flatten)]
    pub listing: Listing,
    pub scores: DerivedScores,
}

/// Zip-level summary used by the heatmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipAggregate {
    pub zip: ZipCode,
    /// Taken from the first member listing that has a coordinate, not a
    /// centroid. Members without one are skipped rather than leaving the
    /// zip unplaced because its first listing lacked a location.
    pub coordinate: Option<Coordinate>,
    pub listing_count: usize,
    pub median_rent: u32,
    pub avg_housing_score: u8,
    pub avg_transit_score: u8,
    pub avg_social_score: u8,
    pub avg_grocery_score: u8,
    pub affordability_index: u8,
}

/// A place returned by a venue search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub address: String,
    pub categories: Vec<String>,
}
