use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub(crate) const TIMEOUT_DETAIL: &str = "Request timeout - server not responding";
pub(crate) const NETWORK_DETAIL: &str = "Network error - unable to reach server";
pub(crate) const SERVER_FALLBACK_DETAIL: &str = "Server error";

/// Normalized error for every call made through the admin API client.
///
/// The transport classifies each failure into one of these shapes before
/// handing it back, so callers never see raw `reqwest` errors. The type is
/// `Clone` because the query cache shares one result between every caller
/// waiting on the same in-flight fetch.
#[derive(Debug, Clone, Error)]
pub enum Error {
    // ── Server responded ────────────────────────────────────────────
    /// Non-2xx response. `detail` prefers the server-supplied message.
    #[error("HTTP {status}: {detail}")]
    Server {
        status: u16,
        detail: String,
        timestamp: DateTime<Utc>,
    },

    // ── No response ─────────────────────────────────────────────────
    /// The request went out but nothing came back (timeout or connectivity).
    #[error("{detail}")]
    Network {
        timeout: bool,
        detail: String,
        timestamp: DateTime<Utc>,
    },

    // ── Never sent ──────────────────────────────────────────────────
    /// The request could not be constructed (bad URL, invalid header,
    /// payload rejected by client-side validation).
    #[error("{detail}")]
    Setup {
        detail: String,
        timestamp: DateTime<Utc>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// A 2xx response whose body did not match the expected schema.
    #[error("Unexpected response body (HTTP {status}): {detail}")]
    Decode {
        status: u16,
        detail: String,
        timestamp: DateTime<Utc>,
    },
}

/// The `{status, detail, timestamp}` shape every error normalizes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorShape {
    pub status: u16,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

impl Error {
    pub fn server(status: u16, detail: impl Into<String>) -> Self {
        Self::Server {
            status,
            detail: detail.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn network(timeout: bool) -> Self {
        let detail = if timeout {
            TIMEOUT_DETAIL
        } else {
            NETWORK_DETAIL
        };
        Self::Network {
            timeout,
            detail: detail.into(),
            timestamp: Utc::now(),
        }
    }

    /// Build a setup error. Also used by request validation, which runs
    /// before any network I/O.
    pub fn setup(detail: impl Into<String>) -> Self {
        Self::Setup {
            detail: detail.into(),
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn decode(status: u16, err: &serde_json::Error, body: &[u8]) -> Self {
        let preview = String::from_utf8_lossy(&body[..body.len().min(200)]);
        Self::Decode {
            status,
            detail: format!("{err} (body preview: {preview:?})"),
            timestamp: Utc::now(),
        }
    }

    /// Classify a `reqwest` failure that happened before a response arrived.
    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_builder() {
            Self::setup(err.to_string())
        } else if err.is_timeout() {
            Self::network(true)
        } else {
            Self::network(false)
        }
    }

    /// HTTP status, or 0 when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            Self::Server { status, .. } | Self::Decode { status, .. } => *status,
            Self::Network { .. } | Self::Setup { .. } => 0,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::Server { detail, .. }
            | Self::Network { detail, .. }
            | Self::Setup { detail, .. }
            | Self::Decode { detail, .. } => detail,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Server { timestamp, .. }
            | Self::Network { timestamp, .. }
            | Self::Setup { timestamp, .. }
            | Self::Decode { timestamp, .. } => *timestamp,
        }
    }

    pub fn shape(&self) -> ErrorShape {
        ErrorShape {
            status: self.status(),
            detail: self.detail().to_owned(),
            timestamp: self.timestamp(),
        }
    }

    /// Short human title derived from the status code.
    pub fn title(&self) -> &'static str {
        match self.status() {
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            409 => "Conflict",
            429 => "Rate Limited",
            500 => "Server Error",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            _ => "Error",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Server { status: 404, .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Server { status: 401, .. })
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Server { status: 401 | 403, .. })
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Server { status: 400 | 422, .. } | Self::Setup { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Server { status: 409, .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Server { status: 429, .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { timeout: true, .. })
    }

    /// A route the gateway does not serve (yet). Only a documented set of
    /// list/stats reads degrade to a zero value on this.
    pub fn is_endpoint_absent(&self) -> bool {
        matches!(self, Self::Server { status: 404 | 405 | 501, .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Server { status, .. } => *status >= 500 || *status == 429,
            Self::Setup { .. } | Self::Decode { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_details_distinguish_timeout() {
        assert_eq!(Error::network(true).detail(), TIMEOUT_DETAIL);
        assert_eq!(Error::network(false).detail(), NETWORK_DETAIL);
        assert_eq!(Error::network(true).status(), 0);
    }

    #[test]
    fn transient_classification() {
        assert!(Error::network(false).is_transient());
        assert!(Error::server(503, "down").is_transient());
        assert!(Error::server(429, "slow down").is_transient());
        assert!(!Error::server(404, "missing").is_transient());
        assert!(!Error::setup("bad").is_transient());
    }

    #[test]
    fn shape_carries_status_and_detail() {
        let err = Error::server(409, "Provider 'stripe' already exists");
        let shape = err.shape();
        assert_eq!(shape.status, 409);
        assert_eq!(shape.detail, "Provider 'stripe' already exists");
        assert_eq!(err.title(), "Conflict");
        assert!(err.is_conflict());
    }

    #[test]
    fn endpoint_absent_covers_missing_routes_only() {
        assert!(Error::server(404, "Not Found").is_endpoint_absent());
        assert!(Error::server(405, "Method Not Allowed").is_endpoint_absent());
        assert!(!Error::server(500, "boom").is_endpoint_absent());
        assert!(!Error::network(false).is_endpoint_absent());
    }
}
