use thiserror::Error;

/// Failure of a single outbound call to an open-data provider.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} still rate limited after {attempts} attempts")]
    RateLimited { url: String, attempts: u32 },

    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] FetchError),

    #[error("legislator directory unavailable: {0}")]
    Directory(#[source] FetchError),
}
