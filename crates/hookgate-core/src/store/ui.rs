// ── UI state ──
//
// Process-local presentation flags: which modal is open, sidebar, theme,
// and a global loading indicator. Nothing here is persisted.

use std::collections::BTreeSet;

use serde::Serialize;
use strum::{Display, EnumIter, EnumString};
use tokio::sync::watch;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Modal {
    CreateProvider,
    EditProvider,
    DeleteProvider,
    TestWebhook,
    ViewWebhookDetails,
    ViewSecurityLog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiState {
    pub open_modals: BTreeSet<Modal>,
    pub sidebar_open: bool,
    pub theme: Theme,
    pub is_loading: bool,
    pub loading_message: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            open_modals: BTreeSet::new(),
            sidebar_open: true,
            theme: Theme::default(),
            is_loading: false,
            loading_message: String::new(),
        }
    }
}

/// Watchable UI state. Every setter publishes a new snapshot.
#[derive(Debug)]
pub struct UiStore {
    state: watch::Sender<UiState>,
}

impl Default for UiStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UiStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(UiState::default());
        Self { state }
    }

    pub fn snapshot(&self) -> UiState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }

    pub fn open_modal(&self, modal: Modal) {
        self.state.send_if_modified(|s| s.open_modals.insert(modal));
    }

    pub fn close_modal(&self, modal: Modal) {
        self.state.send_if_modified(|s| s.open_modals.remove(&modal));
    }

    pub fn close_all_modals(&self) {
        self.state.send_if_modified(|s| {
            let had_any = !s.open_modals.is_empty();
            s.open_modals.clear();
            had_any
        });
    }

    pub fn is_modal_open(&self, modal: Modal) -> bool {
        self.state.borrow().open_modals.contains(&modal)
    }

    pub fn toggle_sidebar(&self) {
        self.state.send_modify(|s| s.sidebar_open = !s.sidebar_open);
    }

    pub fn set_sidebar_open(&self, open: bool) {
        self.state.send_if_modified(|s| std::mem::replace(&mut s.sidebar_open, open) != open);
    }

    pub fn set_theme(&self, theme: Theme) {
        self.state.send_if_modified(|s| std::mem::replace(&mut s.theme, theme) != theme);
    }

    /// Set the global loading flag. The message is cleared when loading stops.
    pub fn set_loading(&self, loading: bool, message: Option<&str>) {
        self.state.send_modify(|s| {
            s.is_loading = loading;
            s.loading_message = if loading {
                message.unwrap_or_default().to_owned()
            } else {
                String::new()
            };
        });
    }

    pub fn reset(&self) {
        self.state.send_replace(UiState::default());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn initial_state() {
        let ui = UiStore::new();
        let state = ui.snapshot();
        assert!(state.sidebar_open);
        assert_eq!(state.theme, Theme::Dark);
        assert!(Modal::iter().all(|m| !ui.is_modal_open(m)));
    }

    #[test]
    fn modals_open_and_close_independently() {
        let ui = UiStore::new();
        ui.open_modal(Modal::CreateProvider);
        ui.open_modal(Modal::ViewSecurityLog);
        assert!(ui.is_modal_open(Modal::CreateProvider));

        ui.close_modal(Modal::CreateProvider);
        assert!(!ui.is_modal_open(Modal::CreateProvider));
        assert!(ui.is_modal_open(Modal::ViewSecurityLog));

        ui.close_all_modals();
        assert!(ui.snapshot().open_modals.is_empty());
    }

    #[test]
    fn sidebar_theme_loading_and_reset() {
        let ui = UiStore::new();
        ui.toggle_sidebar();
        assert!(!ui.snapshot().sidebar_open);
        ui.set_sidebar_open(true);
        assert!(ui.snapshot().sidebar_open);

        ui.set_theme(Theme::Light);
        ui.set_loading(true, Some("Loading providers"));
        let state = ui.snapshot();
        assert_eq!(state.theme, Theme::Light);
        assert_eq!(state.loading_message, "Loading providers");

        ui.set_loading(false, None);
        assert!(ui.snapshot().loading_message.is_empty());

        ui.open_modal(Modal::TestWebhook);
        ui.reset();
        assert_eq!(ui.snapshot(), UiState::default());
    }

    #[test]
    fn modal_names_parse() {
        assert_eq!(Modal::from_str("view-webhook-details").unwrap(), Modal::ViewWebhookDetails);
        assert_eq!(Modal::TestWebhook.to_string(), "test-webhook");
    }
}
