// Webhook event endpoints
//
// Delivery history under `/admin/webhooks`, plus the public ingest route
// used to fire test webhooks.

use chrono::Utc;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{TestWebhook, WebhookEvent, WebhookQuery, WebhookResponse, WebhookStats};
use crate::services::or_default_if_absent;

impl ApiClient {
    /// `GET /admin/webhooks?provider_name&limit&offset`
    pub async fn list_webhook_events(&self, query: &WebhookQuery) -> Result<Vec<WebhookEvent>, Error> {
        query.page.validate()?;
        let result = self
            .get_json(&["admin", "webhooks"], &query.to_params())
            .await;
        or_default_if_absent("webhook event list", result)
    }

    /// `GET /admin/webhooks/{id}`
    pub async fn get_webhook_event(&self, id: &str) -> Result<WebhookEvent, Error> {
        self.get_json(&["admin", "webhooks", id], &[]).await
    }

    /// Ask the gateway to forward an event again.
    ///
    /// `POST /admin/webhooks/{id}/retry`
    pub async fn retry_webhook(&self, id: &str) -> Result<WebhookResponse, Error> {
        debug!(id, "retrying webhook");
        self.post_empty(&["admin", "webhooks", id, "retry"]).await
    }

    /// `GET /admin/webhooks/stats[?provider_name]`
    pub async fn webhook_stats(&self, provider_name: Option<&str>) -> Result<WebhookStats, Error> {
        let params: Vec<(&str, String)> = provider_name
            .map(|name| vec![("provider_name", name.to_owned())])
            .unwrap_or_default();
        let result = self.get_json(&["admin", "webhooks", "stats"], &params).await;
        or_default_if_absent("webhook stats", result)
    }

    /// Send a test webhook to `POST /webhooks/{provider}`.
    ///
    /// Missing `X-Signature`, `X-Timestamp` and `X-Request-ID` headers are
    /// filled in; caller headers take precedence.
    pub async fn send_test_webhook(
        &self,
        provider: &str,
        hook: &TestWebhook,
    ) -> Result<WebhookResponse, Error> {
        hook.validate()?;
        let body = hook.body()?;
        let headers = hook.resolve_headers(&body, Utc::now());
        debug!(provider, bytes = body.len(), "sending test webhook");
        self.post_raw(&["webhooks", provider], body, &headers).await
    }
}
