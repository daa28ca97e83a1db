//! Error taxonomy for the scoring pipeline.
//!
//! Configuration and store errors are fatal to a run. Provider and data
//! errors are absorbed per listing and never reach the aggregation stage.

use thiserror::Error;

/// Missing or invalid configuration. Reported immediately, never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not configured; set it in the environment or .env file")]
    MissingCredential(&'static str),

    #[error("invalid score weights: {0}")]
    InvalidWeights(String),

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("invalid setting {name}: {value}")]
    InvalidSetting { name: &'static str, value: String },

    #[error("cannot load grocery taxonomy from {path}: {reason}")]
    Taxonomy { path: String, reason: String },
}

/// Failure of a single external provider request.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API key is invalid or the API is not enabled")]
    Unauthorized,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("request failed ({code}): {body}")]
    Status { code: u16, body: String },

    #[error("provider returned status {status}: {message}")]
    Api { status: String, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A listing row that cannot be scored as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("missing or non-numeric price")]
    InvalidPrice,

    #[error("missing zip code")]
    MissingZip,

    #[error("invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },
}

/// Failure to read or write the persisted listing set.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("no rental data found in {0}")]
    Empty(String),
}
