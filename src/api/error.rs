//! Shared error type for the API layer: URL validation, HTTP, and response parsing.

use thiserror::Error;

/// API fetch error. Every variant is fatal; no request is retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL: {input}: expected a story URL like https://www.literotica.com/s/some-story-title")]
    InvalidUrl { input: String },

    #[error("Network error: could not reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },
}
