//! Blocking HTTP client with a fixed identifying User-Agent.
//!
//! Requests are single-attempt by design: a failure surfaces immediately,
//! there is no retry or backoff layer.

use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;

/// Blocking HTTP client wrapper carrying the configured User-Agent and timeout.
#[derive(Debug)]
pub struct ApiClient {
    inner: reqwest::blocking::Client,
}

impl ApiClient {
    /// Build a client with the default User-Agent and timeout.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder().build()
    }

    /// Builder for a custom User-Agent and/or timeout.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Perform a single GET request. One attempt, no retry.
    pub fn get(&self, url: &str) -> Result<reqwest::blocking::Response, reqwest::Error> {
        self.inner.get(url).send()
    }
}

/// Builder for [ApiClient] with optional User-Agent and timeout.
#[derive(Debug)]
pub struct ApiClientBuilder {
    user_agent: Option<String>,
    timeout_secs: u64,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiClientBuilder {
    /// Set a custom User-Agent. If not set, `Mozilla/5.0` is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set request timeout in seconds. Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Build the blocking client and wrapper.
    pub fn build(self) -> Result<ApiClient, reqwest::Error> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let inner = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(ApiClient { inner })
    }
}
