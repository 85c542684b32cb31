use crate::error::SourceError;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Shared reqwest client with the configured request timeout
pub fn create_client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent(concat!("cineast/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Join a base URL and a path without doubling or dropping the slash
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Turn a non-success status into `SourceError::Status`, keeping the body for diagnostics
pub async fn ensure_success(response: Response, endpoint: &str) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SourceError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// Check the status, then decode the JSON body
pub async fn read_json<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T, SourceError> {
    let response = ensure_success(response, endpoint).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| SourceError::Parse {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}
