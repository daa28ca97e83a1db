use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use reqwest::{Method, Request, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, ProviderError};
use crate::fetch::{HttpClient, fetch_json};
use crate::services::{NearbyQuery, VenueSearch};
use crate::types::Venue;

pub const PLACES_BASE_URL: &str = "https://places.googleapis.com";

const FIELD_MASK: &str = "places.displayName,places.formattedAddress,places.types,places.id";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchNearbyRequest<'a> {
    included_types: &'a [String],
    max_result_count: u8,
    location_restriction: LocationRestriction,
}

#[derive(Serialize)]
struct LocationRestriction {
    circle: Circle,
}

#[derive(Serialize)]
struct Circle {
    center: LatLng,
    radius: f64,
}

#[derive(Serialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct SearchNearbyResponse {
    #[serde(default)]
    places: Vec<Place>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Place {
    id: Option<String>,
    display_name: Option<LocalizedText>,
    formatted_address: Option<String>,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Deserialize)]
struct LocalizedText {
    text: String,
}

impl Place {
    fn into_venue(self) -> Option<Venue> {
        Some(Venue {
            id: self.id?,
            name: self
                .display_name
                .map(|n| n.text)
                .unwrap_or_else(|| "Unknown".to_string()),
            address: self
                .formatted_address
                .unwrap_or_else(|| "No address".to_string()),
            categories: self.types,
        })
    }
}

/// Places API (New) nearby search.
pub struct PlacesClient<C> {
    http: C,
    endpoint: Url,
}

impl<C: HttpClient> PlacesClient<C> {
    pub fn new(http: C, base_url: &str) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join("/v1/places:searchNearby"))
            .map_err(|e| ConfigError::InvalidSetting {
                name: "places base url",
                value: format!("{base_url}: {e}"),
            })?;
        Ok(Self { http, endpoint })
    }

    fn build_request(&self, query: &NearbyQuery) -> Result<Request, ProviderError> {
        let body = SearchNearbyRequest {
            included_types: &query.included_types,
            max_result_count: query.max_results,
            location_restriction: LocationRestriction {
                circle: Circle {
                    center: LatLng {
                        latitude: query.center.lat,
                        longitude: query.center.lng,
                    },
                    radius: f64::from(query.radius_m),
                },
            },
        };
        let body = serde_json::to_vec(&body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let mut req = Request::new(Method::POST, self.endpoint.clone());
        let headers = req.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("x-goog-fieldmask"),
            HeaderValue::from_static(FIELD_MASK),
        );
        *req.body_mut() = Some(body.into());
        Ok(req)
    }
}

#[async_trait]
impl<C: HttpClient> VenueSearch for PlacesClient<C> {
    #[tracing::instrument(skip(self, query), fields(center = %query.center, radius_m = query.radius_m))]
    async fn search_nearby(&self, query: &NearbyQuery) -> Result<Vec<Venue>, ProviderError> {
        let req = self.build_request(query)?;
        let resp: SearchNearbyResponse = fetch_json(&self.http, req).await?;

        if resp.places.is_empty() {
            warn!("No places found");
            return Ok(Vec::new());
        }

        let venues: Vec<Venue> = resp.places.into_iter().filter_map(Place::into_venue).collect();
        debug!(count = venues.len(), "Places found");
        Ok(venues)
    }
}
