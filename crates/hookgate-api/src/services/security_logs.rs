// Security log endpoints
//
// Rejected and suspicious inbound requests recorded by the gateway.

use bytes::Bytes;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{SecurityLog, SecurityLogFilters, SecurityLogQuery, SecurityStats};
use crate::services::or_default_if_absent;

impl ApiClient {
    /// `GET /admin/logs` with optional filters and pagination.
    pub async fn list_security_logs(&self, query: &SecurityLogQuery) -> Result<Vec<SecurityLog>, Error> {
        query.validate()?;
        let result = self.get_json(&["admin", "logs"], &query.to_params()).await;
        or_default_if_absent("security log list", result)
    }

    /// `GET /admin/logs/{id}`
    pub async fn get_security_log(&self, id: &str) -> Result<SecurityLog, Error> {
        self.get_json(&["admin", "logs", id], &[]).await
    }

    /// `GET /admin/logs/stats`
    pub async fn security_stats(&self) -> Result<SecurityStats, Error> {
        let result = self.get_json(&["admin", "logs", "stats"], &[]).await;
        or_default_if_absent("security stats", result)
    }

    /// Download matching logs as CSV.
    ///
    /// `GET /admin/logs/export`. The body is returned as-is.
    pub async fn export_security_logs(&self, filters: &SecurityLogFilters) -> Result<Bytes, Error> {
        filters.validate()?;
        self.get_bytes(&["admin", "logs", "export"], &filters.to_params())
            .await
    }
}
