// Admin API HTTP client
//
// Wraps `reqwest::Client` with endpoint URL construction, bearer auth,
// and failure normalization. Resource endpoints (providers, webhooks,
// security logs, health) are inherent methods implemented in
// `services/`, keeping this module focused on transport mechanics.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};
use url::Url;

use crate::auth::TokenStore;
use crate::error::{Error, SERVER_FALLBACK_DETAIL};
use crate::transport::ClientConfig;

/// HTTP client for the webhook gateway.
///
/// Every failure leaves this type as an [`Error`] in one of the normalized
/// shapes. A 401 additionally clears the token store and raises the
/// login-required signal; the error is still returned to the caller.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
    login_required: watch::Sender<bool>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, Error> {
        let http = config.build_http()?;
        Ok(Self::with_client(http, config.base_url.clone(), tokens))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, tokens: Arc<dyn TokenStore>) -> Self {
        let (login_required, _) = watch::channel(false);
        Self {
            http,
            base_url,
            tokens,
            login_required,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Session ──────────────────────────────────────────────────────

    pub fn is_authenticated(&self) -> bool {
        self.tokens.token().is_some()
    }

    /// Persist a new bearer token and lower the login-required signal.
    pub fn set_token(&self, token: SecretString) -> Result<(), Error> {
        self.tokens
            .store(token)
            .map_err(|e| Error::setup(format!("failed to store token: {e}")))?;
        self.login_required.send_replace(false);
        Ok(())
    }

    /// Forget the stored token.
    pub fn logout(&self) -> Result<(), Error> {
        self.tokens
            .clear()
            .map_err(|e| Error::setup(format!("failed to clear token: {e}")))
    }

    /// Flips to `true` after the gateway answers 401. UIs watch this to
    /// send the operator back to the login step.
    pub fn login_required(&self) -> watch::Receiver<bool> {
        self.login_required.subscribe()
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        if let Some(pos) = segments.iter().position(|s| s.is_empty()) {
            return Err(Error::setup(format!(
                "empty path segment at position {pos} in request URL"
            )));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::setup(format!("base URL cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.endpoint(segments)?;
        let resp = self.send(Method::GET, url, |b| b.query(params)).await?;
        decode(resp).await
    }

    pub(crate) async fn get_bytes(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<Bytes, Error> {
        let url = self.endpoint(segments)?;
        let resp = self.send(Method::GET, url, |b| b.query(params)).await?;
        resp.bytes().await.map_err(|e| Error::from_reqwest(&e))
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.endpoint(segments)?;
        let resp = self.send(Method::POST, url, |b| b.json(body)).await?;
        decode(resp).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, Error> {
        let url = self.endpoint(segments)?;
        let resp = self.send(Method::POST, url, |b| b).await?;
        decode(resp).await
    }

    pub(crate) async fn put_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.endpoint(segments)?;
        let resp = self.send(Method::PUT, url, |b| b.json(body)).await?;
        decode(resp).await
    }

    pub(crate) async fn delete(&self, segments: &[&str]) -> Result<(), Error> {
        let url = self.endpoint(segments)?;
        self.send(Method::DELETE, url, |b| b).await?;
        Ok(())
    }

    /// POST pre-serialized bytes with explicit extra headers. Used where the
    /// exact body matters (signed test webhooks).
    pub(crate) async fn post_raw<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: Vec<u8>,
        headers: &BTreeMap<String, String>,
    ) -> Result<T, Error> {
        let url = self.endpoint(segments)?;
        let extra = header_map(headers)?;
        let resp = self
            .send(Method::POST, url, |b| b.headers(extra).body(body))
            .await?;
        decode(resp).await
    }

    /// Attach auth, send, and normalize any failure.
    async fn send(
        &self,
        method: Method,
        url: Url,
        build: impl FnOnce(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, Error> {
        debug!("{method} {url}");

        let mut builder = build(self.http.request(method.clone(), url.clone()));
        if let Some(token) = self.tokens.token() {
            builder = builder.bearer_auth(token.expose_secret());
        }

        let resp = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => {
                let err = Error::from_reqwest(&e);
                warn!(%method, %url, error = %e, "{}", err.detail());
                return Err(err);
            }
        };

        let status = resp.status();
        debug!("response {} from {url}", status.as_u16());
        if status.is_success() {
            return Ok(resp);
        }

        Err(self.fail(status, &url, resp).await)
    }

    async fn fail(&self, status: StatusCode, url: &Url, resp: reqwest::Response) -> Error {
        let body = resp.bytes().await.unwrap_or_default();
        let detail = server_detail(&body, status.canonical_reason());

        match status {
            StatusCode::UNAUTHORIZED => {
                warn!(%url, "unauthorized, clearing stored token");
                if let Err(e) = self.tokens.clear() {
                    warn!(error = %e, "failed to clear token store");
                }
                self.login_required.send_replace(true);
            }
            StatusCode::FORBIDDEN => warn!(%url, "access denied: {detail}"),
            s if s.is_server_error() => warn!(status = s.as_u16(), %url, "{detail}"),
            s => debug!(status = s.as_u16(), %url, "{detail}"),
        }

        Error::server(status.as_u16(), detail)
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status().as_u16();
    let body = resp.bytes().await.map_err(|e| Error::from_reqwest(&e))?;
    serde_json::from_slice(&body).map_err(|e| Error::decode(status, &e, &body))
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, Error> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::setup(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::setup(format!("invalid value for header {name}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Pick the most useful message for a failed response.
///
/// Order: body `detail` (a string, or a list of validation entries whose
/// `msg` fields are joined), body `message`, the HTTP reason phrase, then
/// a generic fallback.
pub(crate) fn server_detail(body: &[u8], reason: Option<&str>) -> String {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    let from_body = parsed.as_ref().and_then(|v| {
        detail_field(v.get("detail")).or_else(|| {
            v.get("message")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        })
    });

    from_body
        .or_else(|| reason.filter(|r| !r.is_empty()).map(str::to_owned))
        .unwrap_or_else(|| SERVER_FALLBACK_DETAIL.to_owned())
}

fn detail_field(detail: Option<&Value>) -> Option<String> {
    match detail? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            Arc::new(MemoryTokenStore::new()),
        )
    }

    #[test]
    fn detail_prefers_body_detail() {
        let body = br#"{"detail":"Provider 'stripe' already exists","message":"other"}"#;
        assert_eq!(
            server_detail(body, Some("Conflict")),
            "Provider 'stripe' already exists"
        );
    }

    #[test]
    fn detail_joins_validation_entries() {
        let body = br#"{"detail":[{"loc":["body","name"],"msg":"too short"},{"msg":"bad url"}]}"#;
        assert_eq!(server_detail(body, None), "too short; bad url");
    }

    #[test]
    fn detail_falls_back_in_order() {
        assert_eq!(server_detail(br#"{"message":"nope"}"#, Some("Bad Request")), "nope");
        assert_eq!(server_detail(b"<html>", Some("Bad Gateway")), "Bad Gateway");
        assert_eq!(server_detail(b"", None), "Server error");
    }

    #[test]
    fn endpoint_appends_encoded_segments() {
        let api = client("http://gw.test/api/");
        let url = api.endpoint(&["admin", "providers", "a b"]).unwrap();
        assert_eq!(url.as_str(), "http://gw.test/api/admin/providers/a%20b");
    }

    #[test]
    fn endpoint_rejects_empty_segment() {
        let api = client("http://gw.test");
        let err = api.endpoint(&["admin", "providers", ""]).unwrap_err();
        assert!(matches!(err, Error::Setup { .. }));
    }
}
