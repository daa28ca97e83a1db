use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared HTTP request.
///
/// Wrappers such as [`crate::fetch::auth::ApiKey`] and
/// [`crate::fetch::Throttled`] implement this trait around an inner client,
/// so credentials and pacing compose without the provider adapters knowing.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
