use crate::error::ConfigError;
use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that sends an API key in a request header.
///
/// Google Places (New) expects the key in `X-Goog-Api-Key`.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    key: HeaderValue,
}

impl<C> ApiKey<C> {
    /// Validates `header_name` and `key` up front so that sending never fails
    /// on a malformed header.
    pub fn header(inner: C, header_name: &str, key: &str) -> Result<Self, ConfigError> {
        let name = HeaderName::from_bytes(header_name.as_bytes()).map_err(|e| {
            ConfigError::InvalidHeader {
                name: header_name.to_string(),
                reason: e.to_string(),
            }
        })?;
        let mut value = HeaderValue::from_str(key).map_err(|e| ConfigError::InvalidHeader {
            name: header_name.to_string(),
            reason: e.to_string(),
        })?;
        value.set_sensitive(true);

        Ok(Self {
            inner,
            header_name: name,
            key: value,
        })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.key.clone());
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StubHttp;

    #[test]
    fn test_rejects_invalid_header_name() {
        let err = ApiKey::header((), "bad header", "k").err().unwrap();
        assert!(matches!(err, ConfigError::InvalidHeader { .. }));
    }

    #[tokio::test]
    async fn test_sets_header_on_every_request() {
        let client = ApiKey::header(StubHttp::new(200, "{}"), "X-Goog-Api-Key", "secret").unwrap();
        let req = reqwest::Request::new(
            reqwest::Method::POST,
            "https://places.example.test/v1/places:searchNearby".parse().unwrap(),
        );
        client.execute(req).await.unwrap();

        let requests = client.inner.requests.lock().unwrap();
        assert_eq!(requests[0].headers()["x-goog-api-key"], "secret");
    }

    #[test]
    fn test_rejects_control_characters_in_key() {
        assert!(ApiKey::header((), "X-Goog-Api-Key", "abc\n").is_err());
        assert!(ApiKey::header((), "X-Goog-Api-Key", "abc123").is_ok());
    }
}
