// Wire models for the gateway admin API.
//
// Responses are parsed into these types on ingress; a body that does not
// match is a decode error rather than a loosely-typed value. Request types
// carry their own validation so bad input never reaches the network.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;
use uuid::Uuid;

use crate::error::Error;

pub const PROVIDER_NAME_MIN: usize = 3;
pub const PROVIDER_NAME_MAX: usize = 50;
pub const SECRET_KEY_MIN: usize = 32;
pub const PAGE_LIMIT_DEFAULT: u32 = 50;
pub const PAGE_LIMIT_MAX: u32 = 100;

// ── Providers ────────────────────────────────────────────────────────

/// A registered webhook counterparty.
///
/// `name` is unique and addresses the provider in detail/update/delete
/// calls. The secret is redacted from `Debug` and never serialized back out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing, deserialize_with = "secret::deserialize_opt")]
    pub secret_key: Option<SecretString>,
    pub forwarding_url: String,
    pub is_active: bool,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderCreate {
    pub name: String,
    #[serde(serialize_with = "secret::serialize")]
    pub secret_key: SecretString,
    pub forwarding_url: String,
}

impl ProviderCreate {
    pub fn new(
        name: impl Into<String>,
        secret_key: impl Into<String>,
        forwarding_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            secret_key: SecretString::from(secret_key.into()),
            forwarding_url: forwarding_url.into(),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        validate_provider_name(&self.name)?;
        validate_secret_key(self.secret_key.expose_secret())?;
        validate_forwarding_url(&self.forwarding_url)
    }
}

/// Partial update; `None` fields are left untouched by the gateway.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProviderUpdate {
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "secret::serialize_opt"
    )]
    pub secret_key: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarding_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ProviderUpdate {
    pub fn is_empty(&self) -> bool {
        self.secret_key.is_none() && self.forwarding_url.is_none() && self.is_active.is_none()
    }

    pub fn validate(&self) -> Result<(), Error> {
        if let Some(secret) = &self.secret_key {
            validate_secret_key(secret.expose_secret())?;
        }
        if let Some(url) = &self.forwarding_url {
            validate_forwarding_url(url)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStats {
    #[serde(default)]
    pub total_webhooks: u64,
    #[serde(default)]
    pub successful_webhooks: u64,
    #[serde(default)]
    pub failed_webhooks: u64,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub last_webhook_at: Option<DateTime<Utc>>,
}

// ── Webhook events ───────────────────────────────────────────────────

/// One received webhook and its verification/forwarding outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub request_id: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub signature_valid: bool,
    pub forwarded: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub received_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub forwarded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub response_status: Option<u16>,
    #[serde(default)]
    pub response_body: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Accepted,
    Rejected,
}

/// Gateway answer to an ingested (or re-forwarded) webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub status: Verdict,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub webhook_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub successful: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub avg_response_time: f64,
}

/// A synthetic webhook sent through the gateway's public ingest route.
///
/// The payload is serialized once; the same bytes are signed (when a
/// secret is set) and sent, so the gateway verifies exactly what it got.
#[derive(Debug, Clone, Default)]
pub struct TestWebhook {
    pub payload: Map<String, Value>,
    pub headers: BTreeMap<String, String>,
    secret: Option<SecretString>,
}

pub const SIGNATURE_HEADER: &str = "X-Signature";
pub const TIMESTAMP_HEADER: &str = "X-Timestamp";
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";
const PLACEHOLDER_SIGNATURE: &str = "test-signature";

impl TestWebhook {
    pub fn new(payload: Map<String, Value>) -> Self {
        Self {
            payload,
            ..Self::default()
        }
    }

    /// Build from an arbitrary JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(payload) => Ok(Self::new(payload)),
            other => Err(Error::setup(format!(
                "invalid payload: expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sign the body with the provider's shared secret instead of sending
    /// the placeholder signature.
    #[must_use]
    pub fn signed_with(mut self, secret: SecretString) -> Self {
        self.secret = Some(secret);
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.payload.is_empty() {
            return Err(Error::setup("invalid payload: must be a non-empty JSON object"));
        }
        Ok(())
    }

    pub fn body(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(&self.payload)
            .map_err(|e| Error::setup(format!("failed to serialize payload: {e}")))
    }

    /// Final header set for `body`: defaults first, then caller headers,
    /// which win over a default of the same name regardless of case.
    pub fn resolve_headers(&self, body: &[u8], now: DateTime<Utc>) -> BTreeMap<String, String> {
        let signature = self.secret.as_ref().map_or_else(
            || PLACEHOLDER_SIGNATURE.to_owned(),
            |secret| sign_payload(secret.expose_secret(), body),
        );

        let mut resolved = BTreeMap::from([
            (SIGNATURE_HEADER.to_owned(), signature),
            (TIMESTAMP_HEADER.to_owned(), now.to_rfc3339()),
            (
                REQUEST_ID_HEADER.to_owned(),
                format!("test-{}", now.timestamp_millis()),
            ),
        ]);

        for (name, value) in &self.headers {
            resolved.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
            resolved.insert(name.clone(), value.clone());
        }
        resolved
    }
}

/// Hex-encoded HMAC-SHA256 of `body` under `secret`, the signature format
/// the gateway checks in `X-Signature`.
pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    // HMAC accepts keys of any length, so this cannot fail.
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Security logs ────────────────────────────────────────────────────

/// Kind of rejected or suspicious inbound request.
///
/// The set is closed on the gateway side, but an unknown value must still
/// parse: it lands in [`Other`](Self::Other) and renders through the
/// generic formatter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SecurityEventType {
    InvalidSignature,
    RateLimitExceeded,
    TimestampTooOld,
    TimestampInFuture,
    ReplayAttempt,
    Other(String),
}

impl SecurityEventType {
    pub const KNOWN: [Self; 5] = [
        Self::InvalidSignature,
        Self::RateLimitExceeded,
        Self::TimestampTooOld,
        Self::TimestampInFuture,
        Self::ReplayAttempt,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidSignature => "invalid_signature",
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::TimestampTooOld => "timestamp_too_old",
            Self::TimestampInFuture => "timestamp_in_future",
            Self::ReplayAttempt => "replay_attempt",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for SecurityEventType {
    fn from(raw: &str) -> Self {
        match raw {
            "invalid_signature" => Self::InvalidSignature,
            "rate_limit_exceeded" => Self::RateLimitExceeded,
            "timestamp_too_old" => Self::TimestampTooOld,
            "timestamp_in_future" => Self::TimestampInFuture,
            "replay_attempt" => Self::ReplayAttempt,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for SecurityEventType {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<SecurityEventType> for String {
    fn from(kind: SecurityEventType) -> Self {
        match kind {
            SecurityEventType::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for SecurityEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityLog {
    pub id: String,
    pub provider_name: String,
    pub event_type: SecurityEventType,
    #[serde(alias = "client_ip")]
    pub ip_address: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub details: Map<String, Value>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityStats {
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub invalid_signatures: u64,
    #[serde(default)]
    pub rate_limit_events: u64,
    #[serde(default)]
    pub replay_attempts: u64,
    #[serde(default)]
    pub timestamp_errors: u64,
    #[serde(default)]
    pub events_by_type: BTreeMap<String, u64>,
}

// ── Health ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyState {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: HealthState,
    pub service: String,
    pub version: String,
    #[serde(default)]
    pub database: Option<DependencyState>,
    #[serde(default)]
    pub redis: Option<DependencyState>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    /// Stand-in reported when the health endpoint cannot be reached.
    pub fn unhealthy() -> Self {
        Self {
            status: HealthState::Unhealthy,
            service: "webhook-gateway".into(),
            version: "unknown".into(),
            database: None,
            redis: None,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    #[serde(default)]
    pub uptime: f64,
    #[serde(default)]
    pub memory_usage: f64,
    #[serde(default)]
    pub cpu_usage: f64,
    #[serde(default)]
    pub request_count: u64,
    #[serde(default)]
    pub error_count: u64,
}

// ── Query descriptors ────────────────────────────────────────────────
//
// These double as cache-key parameters, so they serialize canonically
// (fixed field order, `None` skipped).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: PAGE_LIMIT_DEFAULT,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.limit == 0 || self.limit > PAGE_LIMIT_MAX {
            return Err(Error::setup(format!(
                "limit must be between 1 and {PAGE_LIMIT_MAX}, got {}",
                self.limit
            )));
        }
        Ok(())
    }

    fn push_params(&self, params: &mut Vec<(&'static str, String)>) {
        params.push(("limit", self.limit.to_string()));
        params.push(("offset", self.offset.to_string()));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WebhookQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(flatten)]
    pub page: Pagination,
}

impl WebhookQuery {
    pub fn for_provider(name: impl Into<String>) -> Self {
        Self {
            provider_name: Some(name.into()),
            page: Pagination::default(),
        }
    }

    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        if let Some(name) = &self.provider_name {
            params.push(("provider_name", name.clone()));
        }
        self.page.push_params(&mut params);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecurityLogFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<SecurityEventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<DateTime<Utc>>,
}

impl SecurityLogFilters {
    pub fn validate(&self) -> Result<(), Error> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(Error::setup("date_from must not be after date_to"));
            }
        }
        Ok(())
    }

    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(6);
        if let Some(kind) = &self.event_type {
            params.push(("event_type", kind.as_str().to_owned()));
        }
        if let Some(name) = &self.provider_name {
            params.push(("provider_name", name.clone()));
        }
        if let Some(from) = self.date_from {
            params.push(("date_from", from.to_rfc3339()));
        }
        if let Some(to) = self.date_to {
            params.push(("date_to", to.to_rfc3339()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecurityLogQuery {
    #[serde(flatten)]
    pub filters: SecurityLogFilters,
    #[serde(flatten)]
    pub page: Pagination,
}

impl SecurityLogQuery {
    pub fn validate(&self) -> Result<(), Error> {
        self.filters.validate()?;
        self.page.validate()
    }

    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = self.filters.to_params();
        self.page.push_params(&mut params);
        params
    }
}

// ── Validation ───────────────────────────────────────────────────────

pub fn validate_provider_name(name: &str) -> Result<(), Error> {
    let len = name.chars().count();
    if !(PROVIDER_NAME_MIN..=PROVIDER_NAME_MAX).contains(&len) {
        return Err(Error::setup(format!(
            "invalid name: must be {PROVIDER_NAME_MIN}-{PROVIDER_NAME_MAX} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::setup(
            "invalid name: only letters, numbers, hyphens, and underscores are allowed",
        ));
    }
    Ok(())
}

pub fn validate_secret_key(secret: &str) -> Result<(), Error> {
    if secret.chars().count() < SECRET_KEY_MIN {
        return Err(Error::setup(format!(
            "invalid secret_key: must be at least {SECRET_KEY_MIN} characters"
        )));
    }
    Ok(())
}

pub fn validate_forwarding_url(raw: &str) -> Result<(), Error> {
    let url = Url::parse(raw)
        .map_err(|e| Error::setup(format!("invalid forwarding_url: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::setup(format!(
            "invalid forwarding_url: unsupported scheme '{}'",
            url.scheme()
        )));
    }
    Ok(())
}

// ── Serde helpers ────────────────────────────────────────────────────

mod secret {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &SecretString, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.expose_secret())
    }

    #[allow(clippy::ref_option)]
    pub(super) fn serialize_opt<S: Serializer>(
        value: &Option<SecretString>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(secret) => s.serialize_str(secret.expose_secret()),
            None => s.serialize_none(),
        }
    }

    pub(super) fn deserialize_opt<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<SecretString>, D::Error> {
        Ok(Option::<String>::deserialize(d)?.map(SecretString::from))
    }
}

/// The gateway emits both RFC 3339 and naive (zone-less) timestamps;
/// naive values are taken as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, de::Error as _};

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub(super) fn deserialize_opt<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}"))),
            None => Ok(None),
        }
    }
}
