use serde::Serialize;
use std::collections::HashMap;

use crate::scoring::utility::{average, median, to_score};
use crate::types::{ScoredListing, ZipAggregate, ZipCode};

/// Groups scored listings by canonical zip code and reduces each group to a
/// [`ZipAggregate`].
///
/// Groups keep first-encounter order before the final stable sort by
/// descending affordability index, so ties stay in input order.
pub fn aggregate_by_zip(scored: &[ScoredListing]) -> Vec<ZipAggregate> {
    let mut order: Vec<&ZipCode> = Vec::new();
    let mut groups: HashMap<&ZipCode, Vec<&ScoredListing>> = HashMap::new();

    for s in scored {
        let zip = &s.listing.zip;
        groups
            .entry(zip)
            .or_insert_with(|| {
                order.push(zip);
                Vec::new()
            })
            .push(s);
    }

    let mut aggregates: Vec<ZipAggregate> = order
        .into_iter()
        .filter_map(|zip| groups.get(zip).map(|members| aggregate_zip(zip, members)))
        .collect();

    aggregates.sort_by(|a, b| b.affordability_index.cmp(&a.affordability_index));
    aggregates
}

fn aggregate_zip(zip: &ZipCode, members: &[&ScoredListing]) -> ZipAggregate {
    let rents: Vec<f64> = members.iter().map(|s| s.listing.price).collect();
    let median_rent = median(&rents).round().max(0.0) as u32;

    ZipAggregate {
        zip: zip.clone(),
        coordinate: members.iter().find_map(|s| s.listing.coordinate),
        listing_count: members.len(),
        median_rent,
        avg_housing_score: mean_score(members, |s| s.scores.housing),
        avg_transit_score: mean_score(members, |s| s.listing.metrics.transit_score),
        avg_social_score: mean_score(members, |s| s.scores.social),
        avg_grocery_score: mean_score(members, |s| s.scores.grocery),
        affordability_index: mean_score(members, |s| s.scores.index),
    }
}

fn mean_score(members: &[&ScoredListing], field: impl Fn(&ScoredListing) -> u8) -> u8 {
    let values: Vec<f64> = members.iter().map(|s| f64::from(field(*s))).collect();
    to_score(average(&values))
}

/// Spread of affordability across all zip aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateSummary {
    pub zip_count: usize,
    pub mean_index: u8,
    pub best_index: u8,
    pub worst_index: u8,
}

pub fn summarize(aggregates: &[ZipAggregate]) -> AggregateSummary {
    let indexes: Vec<u8> = aggregates.iter().map(|a| a.affordability_index).collect();
    let as_f64: Vec<f64> = indexes.iter().map(|i| f64::from(*i)).collect();

    AggregateSummary {
        zip_count: aggregates.len(),
        mean_index: to_score(average(&as_f64)),
        best_index: indexes.iter().copied().max().unwrap_or(0),
        worst_index: indexes.iter().copied().min().unwrap_or(0),
    }
}
