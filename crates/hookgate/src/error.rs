//! CLI error types with miette diagnostics.
//!
//! Maps normalized API errors into user-facing errors with actionable
//! help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use hookgate_api::Error as ApiError;
use hookgate_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the gateway: {detail}")]
    #[diagnostic(
        code(hookgate::connection_failed),
        help(
            "Check that the gateway is running and the URL is right.\n\
             Override it with --api-url or HOOKGATE_API_URL."
        )
    )]
    ConnectionFailed { detail: String },

    #[error("{detail}")]
    #[diagnostic(
        code(hookgate::timeout),
        help("Increase the timeout with --timeout or check gateway responsiveness.")
    )]
    Timeout { detail: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {detail}")]
    #[diagnostic(
        code(hookgate::auth_failed),
        help("The stored token was cleared. Run: hookgate login --token <TOKEN>")
    )]
    AuthFailed { detail: String },

    #[error("Access denied: {detail}")]
    #[diagnostic(
        code(hookgate::forbidden),
        help("The token is valid but lacks permission for this operation.")
    )]
    Forbidden { detail: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Not found: {detail}")]
    #[diagnostic(code(hookgate::not_found))]
    NotFound { detail: String },

    #[error("Conflict: {detail}")]
    #[diagnostic(code(hookgate::conflict))]
    Conflict { detail: String },

    #[error("Rate limited: {detail}")]
    #[diagnostic(code(hookgate::rate_limited), help("Wait a moment and try again."))]
    RateLimited { detail: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("{title} ({status}): {detail}")]
    #[diagnostic(code(hookgate::api_error))]
    Api {
        status: u16,
        title: &'static str,
        detail: String,
    },

    #[error("Unexpected response from gateway: {detail}")]
    #[diagnostic(
        code(hookgate::decode),
        help("The gateway answered with a body this client does not understand.")
    )]
    Decode { detail: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hookgate::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(hookgate::confirmation_required),
        help("Re-run with --yes (-y) to confirm.")
    )]
    ConfirmationRequired { action: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(hookgate::config), help("Inspect it with: hookgate config show"))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(hookgate::json), help("Check the JSON payload and try again."))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(ConfigError::from(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::ConfirmationRequired { .. }
            | Self::Config(ConfigError::Validation { .. }) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── API error → CliError mapping ─────────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        let detail = err.detail().to_owned();
        match err {
            ApiError::Network { timeout: true, .. } => Self::Timeout { detail },
            ApiError::Network { .. } => Self::ConnectionFailed { detail },
            ApiError::Setup { .. } => Self::Validation {
                field: "request".into(),
                reason: detail,
            },
            ApiError::Decode { .. } => Self::Decode { detail },
            ref server => match server.status() {
                401 => Self::AuthFailed { detail },
                403 => Self::Forbidden { detail },
                404 => Self::NotFound { detail },
                409 => Self::Conflict { detail },
                429 => Self::RateLimited { detail },
                400 | 422 => Self::Validation {
                    field: "request".into(),
                    reason: detail,
                },
                status => Self::Api {
                    status,
                    title: server.title(),
                    detail,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_exit_codes() {
        let cases = [
            (ApiError::server(401, "expired"), exit_code::AUTH),
            (ApiError::server(403, "nope"), exit_code::PERMISSION),
            (ApiError::server(404, "missing"), exit_code::NOT_FOUND),
            (ApiError::server(409, "exists"), exit_code::CONFLICT),
            (ApiError::server(422, "bad"), exit_code::USAGE),
            (ApiError::server(500, "boom"), exit_code::GENERAL),
            (ApiError::network(true), exit_code::TIMEOUT),
            (ApiError::network(false), exit_code::CONNECTION),
            (ApiError::setup("invalid provider name"), exit_code::USAGE),
        ];
        for (err, code) in cases {
            let status = err.status();
            assert_eq!(CliError::from(err).exit_code(), code, "status {status}");
        }
    }

    #[test]
    fn server_detail_is_kept() {
        let err = CliError::from(ApiError::server(503, "Gateway overloaded"));
        assert_eq!(err.to_string(), "Service Unavailable (503): Gateway overloaded");
    }
}
