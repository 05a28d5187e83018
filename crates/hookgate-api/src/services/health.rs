use tracing::warn;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{HealthState, HealthStatus, SystemMetrics};
use crate::services::or_default_if_absent;

impl ApiClient {
    /// `GET /health`. Never fails: any error is reported as an unhealthy
    /// stand-in status.
    pub async fn health(&self) -> HealthStatus {
        match self.get_json::<HealthStatus>(&["health"], &[]).await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "health check failed");
                HealthStatus::unhealthy()
            }
        }
    }

    pub async fn is_backend_reachable(&self) -> bool {
        self.health().await.status != HealthState::Unhealthy
    }

    /// `GET /health/metrics`
    pub async fn system_metrics(&self) -> Result<SystemMetrics, Error> {
        let result = self.get_json(&["health", "metrics"], &[]).await;
        or_default_if_absent("system metrics", result)
    }
}
