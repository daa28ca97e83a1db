use async_trait::async_trait;
use reqwest::{Method, Request, Url};
use serde::Deserialize;

use crate::error::{ConfigError, ProviderError};
use crate::fetch::{HttpClient, fetch_json};
use crate::services::{RouteTime, TransitTimes};
use crate::types::Coordinate;

pub const DISTANCE_MATRIX_BASE_URL: &str = "https://maps.googleapis.com";

#[derive(Deserialize)]
struct MatrixResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Deserialize)]
struct MatrixElement {
    status: String,
    duration: Option<TextValue>,
}

#[derive(Deserialize)]
struct TextValue {
    /// Seconds.
    value: f64,
}

/// Distance Matrix API in transit mode, one origin and one destination per
/// request.
pub struct DistanceMatrixClient<C> {
    http: C,
    endpoint: Url,
}

impl<C: HttpClient> DistanceMatrixClient<C> {
    pub fn new(http: C, base_url: &str) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join("/maps/api/distancematrix/json"))
            .map_err(|e| ConfigError::InvalidSetting {
                name: "distance matrix base url",
                value: format!("{base_url}: {e}"),
            })?;
        Ok(Self { http, endpoint })
    }

    fn build_request(&self, origin: Coordinate, destination: Coordinate) -> Request {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("origins", &origin.to_string())
            .append_pair("destinations", &destination.to_string())
            .append_pair("mode", "transit");
        Request::new(Method::GET, url)
    }
}

fn route_time(resp: MatrixResponse) -> Result<RouteTime, ProviderError> {
    if resp.status != "OK" {
        return Err(ProviderError::Api {
            status: resp.status,
            message: resp
                .error_message
                .unwrap_or_else(|| "Unknown error".to_string()),
        });
    }

    let element = resp
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or_else(|| ProviderError::Malformed("response has no matrix element".to_string()))?;

    if element.status != "OK" {
        return Ok(RouteTime::NoRoute {
            status: element.status,
        });
    }

    let seconds = element
        .duration
        .ok_or_else(|| ProviderError::Malformed("route has no duration".to_string()))?
        .value;
    Ok(RouteTime::Minutes((seconds / 60.0).round()))
}

#[async_trait]
impl<C: HttpClient> TransitTimes for DistanceMatrixClient<C> {
    #[tracing::instrument(skip(self), fields(origin = %origin, destination = %destination))]
    async fn travel_time(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteTime, ProviderError> {
        let req = self.build_request(origin, destination);
        let resp: MatrixResponse = fetch_json(&self.http, req).await?;
        route_time(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StubHttp;

    fn origin() -> Coordinate {
        Coordinate {
            lat: 40.6945,
            lng: -73.9917,
        }
    }

    fn destination() -> Coordinate {
        Coordinate {
            lat: 40.7074,
            lng: -74.0113,
        }
    }

    async fn lookup(body: &str) -> Result<RouteTime, ProviderError> {
        let client =
            DistanceMatrixClient::new(StubHttp::new(200, body), DISTANCE_MATRIX_BASE_URL).unwrap();
        client.travel_time(origin(), destination()).await
    }

    #[tokio::test]
    async fn test_duration_converted_to_whole_minutes() {
        let body = r#"{
            "status": "OK",
            "rows": [{ "elements": [{
                "status": "OK",
                "duration": { "text": "24 mins", "value": 1430 }
            }]}]
        }"#;
        assert_eq!(lookup(body).await.unwrap(), RouteTime::Minutes(24.0));
    }

    #[tokio::test]
    async fn test_element_without_route() {
        let body = r#"{"status":"OK","rows":[{"elements":[{"status":"ZERO_RESULTS"}]}]}"#;
        assert_eq!(
            lookup(body).await.unwrap(),
            RouteTime::NoRoute {
                status: "ZERO_RESULTS".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_top_level_status_is_provider_error() {
        let body = r#"{"status":"REQUEST_DENIED","error_message":"The provided API key is invalid."}"#;
        let err = lookup(body).await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { ref status, .. } if status == "REQUEST_DENIED"));
    }

    #[tokio::test]
    async fn test_missing_element_is_malformed() {
        let err = lookup(r#"{"status":"OK","rows":[]}"#).await.unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_request_carries_transit_query() {
        let client =
            DistanceMatrixClient::new(StubHttp::new(200, "{}"), DISTANCE_MATRIX_BASE_URL).unwrap();
        let _ = client.travel_time(origin(), destination()).await;

        let requests = client.http.requests.lock().unwrap();
        let url = requests[0].url();
        assert_eq!(url.path(), "/maps/api/distancematrix/json");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("origins".to_string(), "40.6945,-73.9917".to_string())));
        assert!(pairs.contains(&("mode".to_string(), "transit".to_string())));
    }
}
