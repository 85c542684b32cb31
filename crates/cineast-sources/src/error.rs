use thiserror::Error;

/// Failure talking to one of the upstream REST services.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("could not parse {endpoint} response: {message}")]
    Parse { endpoint: String, message: String },

    /// The metadata backend answered `"Response": "False"`
    #[error("metadata backend rejected the request: {0}")]
    Api(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not configured: {0}")]
    NotConfigured(String),
}
