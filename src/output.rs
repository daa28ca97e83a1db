//! Output formatting and persistence for scored listings and zip aggregates.
//!
//! Supports the heatmap CSV, pretty JSON export and structured log summaries.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::scoring::aggregate::AggregateSummary;
use crate::scoring::weights::ScoreWeights;
use crate::types::{ScoredListing, ZipAggregate};

/// One heatmap row.
#[derive(Serialize)]
struct ZipRow<'a> {
    #[serde(rename = "Zip Code")]
    zip: &'a str,
    #[serde(rename = "Latitude")]
    lat: Option<f64>,
    #[serde(rename = "Longitude")]
    lng: Option<f64>,
    #[serde(rename = "Listing Count")]
    listing_count: usize,
    #[serde(rename = "Median Rent")]
    median_rent: u32,
    #[serde(rename = "Avg Housing Score")]
    housing: u8,
    #[serde(rename = "Avg Transit Score")]
    transit: u8,
    #[serde(rename = "Avg Daily Living Score")]
    social: u8,
    #[serde(rename = "Avg Grocery Score")]
    grocery: u8,
    #[serde(rename = "Affordability Index")]
    index: u8,
}

impl<'a> From<&'a ZipAggregate> for ZipRow<'a> {
    fn from(agg: &'a ZipAggregate) -> Self {
        Self {
            zip: agg.zip.as_str(),
            lat: agg.coordinate.map(|c| c.lat),
            lng: agg.coordinate.map(|c| c.lng),
            listing_count: agg.listing_count,
            median_rent: agg.median_rent,
            housing: agg.avg_housing_score,
            transit: agg.avg_transit_score,
            social: agg.avg_social_score,
            grocery: agg.avg_grocery_score,
            index: agg.affordability_index,
        }
    }
}

/// A report body stamped with the configuration that produced it.
#[derive(Debug, Serialize)]
pub struct Report<T> {
    pub generated_at: DateTime<Utc>,
    pub weights: ScoreWeights,
    pub reference_rent: f64,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Report<T> {
    pub fn new(weights: ScoreWeights, reference_rent: f64, body: T) -> Self {
        Self {
            generated_at: Utc::now(),
            weights,
            reference_rent,
            body,
        }
    }
}

/// Writes zip aggregates to a CSV file, replacing any existing file.
pub fn write_zip_csv(path: impl AsRef<Path>, aggregates: &[ZipAggregate]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for agg in aggregates {
        writer.serialize(ZipRow::from(agg))?;
    }
    writer.flush()?;

    info!(path = %path.display(), zips = aggregates.len(), "Zip aggregates written");
    Ok(())
}

/// Writes any serializable value as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value)?;
    debug!(path = %path.display(), bytes = json.len(), "Writing JSON export");
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Logs scored listings in their current order.
pub fn log_scored(listings: &[ScoredListing]) {
    for (rank, scored) in listings.iter().enumerate() {
        let l = &scored.listing;
        info!(
            rank = rank + 1,
            address = %l.address,
            zip = %l.zip,
            price = l.price,
            housing = scored.scores.housing,
            transit = l.metrics.transit_score,
            social = scored.scores.social,
            grocery = scored.scores.grocery,
            index = scored.scores.index,
            "Listing"
        );
    }
}

/// Logs the first `n` zip aggregates.
pub fn log_top_zips(aggregates: &[ZipAggregate], n: usize) {
    for (rank, agg) in aggregates.iter().take(n).enumerate() {
        info!(
            rank = rank + 1,
            zip = %agg.zip,
            listings = agg.listing_count,
            median_rent = agg.median_rent,
            index = agg.affordability_index,
            "Top zip"
        );
    }
}

pub fn log_summary(summary: &AggregateSummary) {
    info!(
        zips = summary.zip_count,
        mean_index = summary.mean_index,
        best_index = summary.best_index,
        worst_index = summary.worst_index,
        "Aggregate summary"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coordinate, ZipCode};
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn aggregate(zip: &str, index: u8, coordinate: Option<Coordinate>) -> ZipAggregate {
        ZipAggregate {
            zip: ZipCode::parse(zip).unwrap(),
            coordinate,
            listing_count: 3,
            median_rent: 2500,
            avg_housing_score: 50,
            avg_transit_score: 80,
            avg_social_score: 40,
            avg_grocery_score: 30,
            affordability_index: index,
        }
    }

    #[test]
    fn test_log_helpers_do_not_panic() {
        let aggs = vec![aggregate("11201", 53, None)];
        log_top_zips(&aggs, 5);
        log_summary(&AggregateSummary::default());
        log_scored(&[]);
    }

    #[test]
    fn test_write_zip_csv_columns() {
        let path = temp_path("affordability_test_zips.csv");
        let _ = fs::remove_file(&path);

        let aggs = vec![
            aggregate(
                "11201",
                53,
                Some(Coordinate {
                    lat: 40.69,
                    lng: -73.99,
                }),
            ),
            aggregate("10001", 41, None),
        ];
        write_zip_csv(&path, &aggs).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(
            lines[0],
            "Zip Code,Latitude,Longitude,Listing Count,Median Rent,Avg Housing Score,\
             Avg Transit Score,Avg Daily Living Score,Avg Grocery Score,Affordability Index"
        );
        assert_eq!(lines[1], "11201,40.69,-73.99,3,2500,50,80,40,30,53");
        assert_eq!(lines[2], "10001,,,3,2500,50,80,40,30,41");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_zip_csv_replaces_existing_file() {
        let path = temp_path("affordability_test_replace.csv");
        write_zip_csv(&path, &[aggregate("11201", 53, None)]).unwrap();
        write_zip_csv(&path, &[aggregate("11203", 60, None)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("11203"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_json_report() {
        let path = temp_path("affordability_test_report.json");
        let report = Report::new(
            ScoreWeights::default(),
            2500.0,
            serde_json::json!({ "zips": [] }),
        );
        write_json(&path, &report).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["weights"]["housing"], 0.6);
        assert_eq!(value["reference_rent"], 2500.0);
        assert!(value["zips"].as_array().unwrap().is_empty());
        assert!(value["generated_at"].is_string());

        fs::remove_file(&path).unwrap();
    }
}
