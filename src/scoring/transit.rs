//! Transit access scoring from average travel time to reference destinations.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::scoring::utility::{average, to_score};
use crate::services::{RouteTime, TransitTimes};
use crate::types::Coordinate;

const BEST_MINUTES: f64 = 15.0;
const WORST_MINUTES: f64 = 90.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Destination {
    pub name: String,
    pub coordinate: Coordinate,
}

impl Destination {
    fn new(name: &str, lat: f64, lng: f64) -> Self {
        Self {
            name: name.to_string(),
            coordinate: Coordinate { lat, lng },
        }
    }
}

/// Business-district anchors used as commute targets.
pub fn default_destinations() -> Vec<Destination> {
    vec![
        Destination::new("Manhattan Financial District", 40.7074, -74.0113),
        Destination::new("Downtown Brooklyn", 40.6925, -73.9874),
        Destination::new("Williamsburg", 40.7081, -73.9571),
    ]
}

/// Converts an average travel time into a 0-100 score.
///
/// 15 minutes or less scores 100, 90 minutes or more scores 0, linear in
/// between. A non-positive time means no route was found and scores 0.
pub fn transit_score(avg_minutes: f64) -> u8 {
    if avg_minutes <= 0.0 || avg_minutes.is_nan() {
        return 0;
    }
    if avg_minutes <= BEST_MINUTES {
        return 100;
    }
    if avg_minutes >= WORST_MINUTES {
        return 0;
    }
    to_score(100.0 - ((avg_minutes - BEST_MINUTES) / (WORST_MINUTES - BEST_MINUTES)) * 100.0)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransitOutcome {
    /// Mean over destinations with a route, rounded to whole minutes;
    /// `None` when none had one.
    pub average_minutes: Option<f64>,
    pub routed: usize,
    pub score: u8,
    pub degraded: bool,
}

pub struct TransitScorer<T> {
    times: T,
    destinations: Vec<Destination>,
}

impl<T: TransitTimes> TransitScorer<T> {
    pub fn new(times: T, destinations: Vec<Destination>) -> Self {
        Self {
            times,
            destinations,
        }
    }

    /// Scores transit access from `origin`. Any provider error abandons the
    /// lookup and yields a degraded score of 0.
    #[tracing::instrument(skip(self), fields(origin = %origin))]
    pub async fn score(&self, origin: Coordinate) -> TransitOutcome {
        match self.average_minutes(origin).await {
            Ok(minutes) => {
                let average_minutes = (!minutes.is_empty()).then(|| average(&minutes).round());
                if average_minutes.is_none() {
                    warn!("No valid transit routes found");
                }
                TransitOutcome {
                    average_minutes,
                    routed: minutes.len(),
                    score: transit_score(average_minutes.unwrap_or(0.0)),
                    degraded: false,
                }
            }
            Err(e) => {
                warn!(error = %e, "Transit lookup failed, using neutral score");
                TransitOutcome {
                    degraded: true,
                    ..Default::default()
                }
            }
        }
    }

    async fn average_minutes(&self, origin: Coordinate) -> Result<Vec<f64>, ProviderError> {
        let mut minutes = Vec::with_capacity(self.destinations.len());

        for dest in &self.destinations {
            match self.times.travel_time(origin, dest.coordinate).await? {
                RouteTime::Minutes(m) => {
                    debug!(destination = %dest.name, minutes = m, "Transit route found");
                    minutes.push(m);
                }
                RouteTime::NoRoute { status } => {
                    debug!(destination = %dest.name, status, "No transit route");
                }
            }
        }

        Ok(minutes)
    }
}
