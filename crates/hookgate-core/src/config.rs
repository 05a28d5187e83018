// ── Runtime dashboard configuration ──
//
// Plain values describing cache freshness, retry, and notification
// behaviour. The CLI builds one from its settings and hands it in; this
// crate never reads files or the environment.

use crate::query::{QueryConfig, StaleTimes};
use crate::store::NotificationConfig;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardConfig {
    pub stale_times: StaleTimes,
    pub query: QueryConfig,
    pub notifications: NotificationConfig,
}
