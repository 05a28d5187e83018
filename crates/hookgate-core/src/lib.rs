//! Data layer between `hookgate-api` and UI consumers (CLI).
//!
//! - **[`Dashboard`]**: facade owning the cache, the notification list and
//!   UI flags. Reads go through the cache; mutations invalidate the keys
//!   they affect and raise a notification before returning.
//!
//! - **[`QueryClient`]**: keyed cache with in-flight deduplication,
//!   stale-while-revalidate, retry with backoff, and prefix invalidation.
//!
//! - **[`NotificationStore`]** / **[`UiStore`]**: process-local state
//!   published through `tokio::sync::watch` channels.
//!
//! - **[`format`]**: display helpers for event types, sizes and times.

pub mod config;
pub mod dashboard;
pub mod format;
pub mod query;
pub mod store;

pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use hookgate_api::Error;
pub use query::{QueryClient, QueryConfig, QueryKey, RetryPolicy, StaleTimes, keys};
pub use store::{
    Modal, NewNotification, Notification, NotificationConfig, NotificationId, NotificationKind,
    NotificationStore, Theme, UiState, UiStore,
};
