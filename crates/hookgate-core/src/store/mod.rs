// ── Client state stores ──

mod notification;
mod ui;

pub use notification::{
    NewNotification, Notification, NotificationConfig, NotificationId, NotificationKind,
    NotificationStore,
};
pub use ui::{Modal, Theme, UiState, UiStore};
