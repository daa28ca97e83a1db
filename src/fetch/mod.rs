mod basic;
mod client;
mod throttled;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use throttled::Throttled;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ProviderError;

/// Maps non-success responses onto [`ProviderError`].
///
/// 403 means a bad key or a disabled API, 429 a rate limit; anything else
/// non-2xx carries its status code and body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    match status.as_u16() {
        403 => Err(ProviderError::Unauthorized),
        429 => Err(ProviderError::RateLimited),
        code => Err(ProviderError::Status {
            code,
            body: resp.text().await.unwrap_or_default(),
        }),
    }
}

/// Executes `req` and decodes a JSON body into `T`.
pub async fn fetch_json<C, T>(client: &C, req: reqwest::Request) -> Result<T, ProviderError>
where
    C: HttpClient + ?Sized,
    T: DeserializeOwned,
{
    let resp = client.execute(req).await?;
    let resp = check_response(resp).await?;
    let bytes = resp.bytes().await?;
    debug!(bytes = bytes.len(), "Provider response received");

    serde_json::from_slice(&bytes).map_err(|e| ProviderError::Malformed(e.to_string()))
}


#[cfg(test)]
mod tests {
    use super::testing::StubHttp;
    use super::*;

    fn get(url: &str) -> reqwest::Request {
        reqwest::Request::new(reqwest::Method::GET, url.parse().unwrap())
    }

    #[tokio::test]
    async fn test_fetch_json_decodes_body() {
        let client = StubHttp::new(200, r#"{"status":"OK"}"#);
        let value: serde_json::Value = fetch_json(&client, get("https://example.test/"))
            .await
            .unwrap();
        assert_eq!(value["status"], "OK");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let forbidden = StubHttp::new(403, "");
        let err = fetch_json::<_, serde_json::Value>(&forbidden, get("https://example.test/"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unauthorized));

        let limited = StubHttp::new(429, "");
        let err = fetch_json::<_, serde_json::Value>(&limited, get("https://example.test/"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited));

        let broken = StubHttp::new(500, "backend down");
        let err = fetch_json::<_, serde_json::Value>(&broken, get("https://example.test/"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Status { code: 500, ref body } if body == "backend down"));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let client = StubHttp::new(200, "<html>");
        let err = fetch_json::<_, serde_json::Value>(&client, get("https://example.test/"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }
}
