//! In-memory providers for scorer tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::ProviderError;
use crate::services::{NearbyQuery, RouteTime, TransitTimes, VenueSearch};
use crate::types::{Coordinate, Venue};

pub fn venue(id: &str, name: &str) -> Venue {
    Venue {
        id: id.to_string(),
        name: name.to_string(),
        address: format!("{id} Test St"),
        categories: vec!["restaurant".to_string()],
    }
}

pub fn point() -> Coordinate {
    Coordinate {
        lat: 40.6939,
        lng: -73.9919,
    }
}

/// Answers nearby searches by radius. Radii mapped to `None` fail.
#[derive(Default)]
pub struct StubVenues {
    pub by_radius: HashMap<u32, Option<Vec<Venue>>>,
    pub calls: Mutex<Vec<NearbyQuery>>,
}

impl StubVenues {
    pub fn with(mut self, radius_m: u32, venues: Vec<Venue>) -> Self {
        self.by_radius.insert(radius_m, Some(venues));
        self
    }

    pub fn failing(mut self, radius_m: u32) -> Self {
        self.by_radius.insert(radius_m, None);
        self
    }
}

#[async_trait::async_trait]
impl VenueSearch for StubVenues {
    async fn search_nearby(&self, query: &NearbyQuery) -> Result<Vec<Venue>, ProviderError> {
        self.calls.lock().unwrap().push(query.clone());
        match self.by_radius.get(&query.radius_m) {
            Some(Some(venues)) => Ok(venues.clone()),
            Some(None) => Err(ProviderError::RateLimited),
            None => Ok(Vec::new()),
        }
    }
}

/// Answers transit lookups in destination order. `None` entries fail.
#[derive(Default)]
pub struct StubTransit {
    pub answers: Mutex<Vec<Option<RouteTime>>>,
}

impl StubTransit {
    pub fn new(answers: Vec<Option<RouteTime>>) -> Self {
        let mut answers = answers;
        answers.reverse();
        Self {
            answers: Mutex::new(answers),
        }
    }
}

#[async_trait::async_trait]
impl TransitTimes for StubTransit {
    async fn travel_time(
        &self,
        _origin: Coordinate,
        _destination: Coordinate,
    ) -> Result<RouteTime, ProviderError> {
        match self.answers.lock().unwrap().pop() {
            Some(Some(answer)) => Ok(answer),
            Some(None) => Err(ProviderError::Unauthorized),
            None => Ok(RouteTime::NoRoute {
                status: "ZERO_RESULTS".to_string(),
            }),
        }
    }
}
