// Transport configuration for building the single reqwest::Client.
//
// One client per process: fixed timeout, JSON default headers, and a
// user agent. Auth is attached per request by `ApiClient`, not here,
// because the token can change (login, 401) while the client lives.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

use crate::error::Error;

const USER_AGENT: &str = concat!("hookgate/", env!("CARGO_PKG_VERSION"));

/// Connection settings for the gateway's admin API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Gateway base URL (e.g. `http://localhost:8000`). A path prefix is
    /// kept: endpoint paths are appended after it.
    pub base_url: Url,
    /// Fixed per-request timeout. Expiry is reported as a network error.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: Url, timeout: Duration) -> Self {
        Self { base_url, timeout }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_http(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::setup(format!("failed to build HTTP client: {e}")))
    }
}
