// ── Dashboard facade ──
//
// Cached reads and notifying mutations over one `ApiClient`. Each mutation
// awaits the server, invalidates the affected query keys, then raises a
// notification, all before it returns. A background task sweeps idle
// cache entries every `gc_time` until the dashboard shuts down.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use hookgate_api::{
    ApiClient, Error, HealthStatus, Provider, ProviderCreate, ProviderStats, ProviderUpdate,
    SecurityLog, SecurityLogFilters, SecurityLogQuery, SecurityStats, SystemMetrics, TestWebhook,
    WebhookEvent, WebhookQuery, WebhookResponse, WebhookStats,
};

use crate::config::DashboardConfig;
use crate::query::{QueryClient, QueryKey, keys};
use crate::store::{NotificationStore, UiStore};

const SUCCESS_TITLE: &str = "Success";
const ERROR_TITLE: &str = "Error";

pub struct Dashboard {
    api: Arc<ApiClient>,
    queries: QueryClient,
    notifications: NotificationStore,
    ui: UiStore,
    config: DashboardConfig,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("api", &self.api)
            .field("queries", &self.queries)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    pub fn new(config: DashboardConfig, api: ApiClient) -> Self {
        Self::with_shared(config, Arc::new(api))
    }

    /// Must be called from within a tokio runtime: the cache sweep is
    /// spawned here.
    pub fn with_shared(config: DashboardConfig, api: Arc<ApiClient>) -> Self {
        let queries = QueryClient::new(config.query.clone());
        let cancel = CancellationToken::new();
        let gc_time = config.query.gc_time;
        if !gc_time.is_zero() {
            tokio::spawn(gc_task(queries.clone(), gc_time, cancel.child_token()));
        }
        Self {
            api,
            queries,
            notifications: NotificationStore::new(config.notifications),
            ui: UiStore::new(),
            config,
            cancel,
        }
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn queries(&self) -> &QueryClient {
        &self.queries
    }

    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    pub fn ui(&self) -> &UiStore {
        &self.ui
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Stop the cache sweep and cancel pending notification timers.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        self.notifications.shutdown();
    }

    // ── Session ──────────────────────────────────────────────────────

    pub fn login(&self, token: SecretString) -> Result<(), Error> {
        self.api.set_token(token)?;
        self.queries.clear();
        Ok(())
    }

    pub fn logout(&self) -> Result<(), Error> {
        self.api.logout()?;
        self.queries.clear();
        Ok(())
    }

    // ── Providers ────────────────────────────────────────────────────

    pub async fn providers(&self) -> Result<Vec<Provider>, Error> {
        self.cached(keys::providers::lists(), self.config.stale_times.providers, |api| async move {
            api.list_providers().await
        })
        .await
    }

    pub async fn provider(&self, name: &str) -> Result<Provider, Error> {
        require("provider name", name)?;
        let owned = name.to_owned();
        self.cached(keys::providers::detail(name), self.config.stale_times.providers, move |api| {
            let name = owned.clone();
            async move { api.get_provider(&name).await }
        })
        .await
    }

    pub async fn provider_stats(&self, name: &str) -> Result<ProviderStats, Error> {
        require("provider name", name)?;
        let owned = name.to_owned();
        self.cached(keys::providers::stats(name), self.config.stale_times.providers, move |api| {
            let name = owned.clone();
            async move { api.provider_stats(&name).await }
        })
        .await
    }

    pub async fn create_provider(&self, req: &ProviderCreate) -> Result<Provider, Error> {
        match self.queries.run_mutation(|| self.api.create_provider(req)).await {
            Ok(provider) => {
                self.queries.invalidate(&keys::providers::lists());
                self.queries
                    .set_query_data(keys::providers::detail(&provider.name), provider.clone());
                self.notifications.success(
                    SUCCESS_TITLE,
                    format!("Provider \"{}\" created successfully", provider.name),
                );
                Ok(provider)
            }
            Err(e) => Err(self.report(e, "Failed to create provider")),
        }
    }

    pub async fn update_provider(
        &self,
        name: &str,
        req: &ProviderUpdate,
    ) -> Result<Provider, Error> {
        require("provider name", name)?;
        match self
            .queries
            .run_mutation(|| self.api.update_provider(name, req))
            .await
        {
            Ok(provider) => {
                self.queries.invalidate(&keys::providers::lists());
                self.queries.invalidate(&keys::providers::detail(name));
                self.queries
                    .set_query_data(keys::providers::detail(&provider.name), provider.clone());
                self.notifications.success(
                    SUCCESS_TITLE,
                    format!("Provider \"{}\" updated successfully", provider.name),
                );
                Ok(provider)
            }
            Err(e) => Err(self.report(e, "Failed to update provider")),
        }
    }

    pub async fn delete_provider(&self, name: &str) -> Result<(), Error> {
        require("provider name", name)?;
        match self.queries.run_mutation(|| self.api.delete_provider(name)).await {
            Ok(()) => {
                self.queries.invalidate(&keys::providers::lists());
                self.queries.invalidate(&keys::providers::stats(name));
                self.queries.remove(&keys::providers::detail(name));
                self.notifications
                    .success(SUCCESS_TITLE, format!("Provider \"{name}\" deleted successfully"));
                Ok(())
            }
            Err(e) => Err(self.report(e, "Failed to delete provider")),
        }
    }

    // ── Webhooks ─────────────────────────────────────────────────────

    pub async fn webhook_events(&self, query: &WebhookQuery) -> Result<Vec<WebhookEvent>, Error> {
        let owned = query.clone();
        self.cached(keys::webhooks::list(query), self.config.stale_times.webhooks, move |api| {
            let query = owned.clone();
            async move { api.list_webhook_events(&query).await }
        })
        .await
    }

    pub async fn webhook_event(&self, id: &str) -> Result<WebhookEvent, Error> {
        require("webhook id", id)?;
        let owned = id.to_owned();
        self.cached(keys::webhooks::detail(id), self.config.stale_times.webhooks, move |api| {
            let id = owned.clone();
            async move { api.get_webhook_event(&id).await }
        })
        .await
    }

    pub async fn webhook_stats(&self, provider_name: Option<&str>) -> Result<WebhookStats, Error> {
        let owned = provider_name.map(str::to_owned);
        self.cached(
            keys::webhooks::stats(provider_name),
            self.config.stale_times.webhooks,
            move |api| {
                let provider = owned.clone();
                async move { api.webhook_stats(provider.as_deref()).await }
            },
        )
        .await
    }

    pub async fn send_test_webhook(
        &self,
        provider: &str,
        hook: &TestWebhook,
    ) -> Result<WebhookResponse, Error> {
        require("provider name", provider)?;
        match self
            .queries
            .run_mutation(|| self.api.send_test_webhook(provider, hook))
            .await
        {
            Ok(resp) => {
                self.queries.invalidate(&keys::webhooks::lists());
                self.queries.invalidate(&keys::webhooks::all_stats());
                self.notifications.success(
                    SUCCESS_TITLE,
                    format!(
                        "Test webhook sent successfully (ID: {})",
                        display_id(resp.webhook_id.as_deref())
                    ),
                );
                Ok(resp)
            }
            Err(e) => Err(self.report(e, "Failed to send test webhook")),
        }
    }

    pub async fn retry_webhook(&self, id: &str) -> Result<WebhookResponse, Error> {
        require("webhook id", id)?;
        match self.queries.run_mutation(|| self.api.retry_webhook(id)).await {
            Ok(resp) => {
                self.queries.invalidate(&keys::webhooks::lists());
                self.queries.invalidate(&keys::webhooks::detail(id));
                self.notifications.success(
                    SUCCESS_TITLE,
                    format!(
                        "Webhook retry initiated (ID: {})",
                        display_id(resp.webhook_id.as_deref())
                    ),
                );
                Ok(resp)
            }
            Err(e) => Err(self.report(e, "Failed to retry webhook")),
        }
    }

    // ── Security logs ────────────────────────────────────────────────

    pub async fn security_logs(&self, query: &SecurityLogQuery) -> Result<Vec<SecurityLog>, Error> {
        let owned = query.clone();
        self.cached(keys::security_logs::list(query), self.config.stale_times.logs, move |api| {
            let query = owned.clone();
            async move { api.list_security_logs(&query).await }
        })
        .await
    }

    pub async fn security_log(&self, id: &str) -> Result<SecurityLog, Error> {
        require("security log id", id)?;
        let owned = id.to_owned();
        self.cached(keys::security_logs::detail(id), self.config.stale_times.logs, move |api| {
            let id = owned.clone();
            async move { api.get_security_log(&id).await }
        })
        .await
    }

    pub async fn security_stats(&self) -> Result<SecurityStats, Error> {
        self.cached(keys::security_logs::stats(), self.config.stale_times.logs, |api| async move {
            api.security_stats().await
        })
        .await
    }

    /// Export matching logs as CSV. Not cached.
    pub async fn export_security_logs(&self, filters: &SecurityLogFilters) -> Result<Bytes, Error> {
        match self
            .queries
            .run_mutation(|| self.api.export_security_logs(filters))
            .await
        {
            Ok(csv) => {
                self.notifications
                    .success(SUCCESS_TITLE, "Security logs exported successfully");
                Ok(csv)
            }
            Err(e) => Err(self.report(e, "Failed to export security logs")),
        }
    }

    // ── Health ───────────────────────────────────────────────────────

    pub async fn health(&self) -> Result<HealthStatus, Error> {
        self.cached(keys::health::status(), self.config.stale_times.health, |api| async move {
            Ok(api.health().await)
        })
        .await
    }

    pub async fn system_metrics(&self) -> Result<SystemMetrics, Error> {
        self.cached(keys::health::metrics(), self.config.stale_times.health, |api| async move {
            api.system_metrics().await
        })
        .await
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn cached<T, F, Fut>(&self, key: QueryKey, stale_time: Duration, fetch: F) -> Result<T, Error>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(Arc<ApiClient>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let api = Arc::clone(&self.api);
        self.queries
            .fetch_query(key, stale_time, move || fetch(Arc::clone(&api)))
            .await
    }

    /// Raise an error notification for a failed mutation and hand the
    /// error back.
    fn report(&self, err: Error, fallback: &str) -> Error {
        let message = if err.detail().is_empty() {
            fallback
        } else {
            err.detail()
        };
        debug!(status = err.status(), "{message}");
        self.notifications.error(ERROR_TITLE, message);
        err
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Drop idle cache entries every `every` until cancelled.
async fn gc_task(queries: QueryClient, every: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(every);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let collected = queries.collect_garbage();
                trace!(collected, remaining = queries.len(), "cache sweep");
            }
        }
    }
}

/// Reads keyed by a name or id are disabled until one is given.
fn require(what: &str, value: &str) -> Result<(), Error> {
    if value.is_empty() {
        return Err(Error::setup(format!("{what} is required")));
    }
    Ok(())
}

fn display_id(id: Option<&str>) -> &str {
    id.unwrap_or("unknown")
}
