//! UiStore - owns UI preferences and their persisted record.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::state::{PersistedPreferences, Theme, UiPreferences};
use crate::event_bus::{EventBus, StoreEvent};
use crate::persist::PersistedRecord;
use crate::storage::SharedBackend;

/// Name of the preference record in storage.
pub const PREFERENCES_RECORD: &str = "autodocops-ui";

/// Holds UI preferences. Setters are synchronous and do no validation beyond
/// the types; only theme and notification changes are written to storage.
pub struct UiStore {
    state: Mutex<UiPreferences>,
    record: PersistedRecord<PersistedPreferences>,
    event_bus: Arc<EventBus>,
}

impl UiStore {
    pub async fn open(backend: SharedBackend, event_bus: Arc<EventBus>) -> Self {
        let record = PersistedRecord::new(PREFERENCES_RECORD, backend);
        let state = record
            .hydrate()
            .await
            .map(UiPreferences::from_persisted)
            .unwrap_or_default();

        Self {
            state: Mutex::new(state),
            record,
            event_bus,
        }
    }

    pub fn set_theme(&self, theme: Theme) {
        self.update(|p| p.theme = theme);
    }

    pub fn set_notifications(&self, enabled: bool) {
        self.update(|p| p.notifications = enabled);
    }

    pub fn toggle_sidebar(&self) {
        self.update(|p| p.sidebar_open = !p.sidebar_open);
    }

    pub fn set_sidebar_open(&self, open: bool) {
        self.update(|p| p.sidebar_open = open);
    }

    pub fn set_loading(&self, loading: bool) {
        self.update(|p| p.is_loading = loading);
    }

    pub fn snapshot(&self) -> UiPreferences {
        self.lock().clone()
    }

    pub fn theme(&self) -> Theme {
        self.lock().theme
    }

    pub async fn flush(&self) {
        self.record.flush().await;
    }

    pub async fn close(&self) {
        self.record.close().await;
    }

    fn lock(&self) -> MutexGuard<'_, UiPreferences> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update<F: FnOnce(&mut UiPreferences)>(&self, f: F) {
        let snapshot = {
            let mut state = self.lock();
            let before = state.persisted();
            f(&mut state);
            let after = state.persisted();
            // Queue while locked so writes reach the writer in mutation order.
            if before != after {
                self.record.schedule(&after);
            }
            state.clone()
        };

        self.event_bus.emit(StoreEvent::Preferences(snapshot));
    }
}
