//! Store change notifications.
//!
//! Each store publishes a full snapshot of its state after every mutation so
//! views can re-render without polling.
//!
//! # Example
//!
//! ```rust
//! use autodocops_core::event_bus::{EventBus, StoreEvent};
//! use autodocops_core::preferences::UiPreferences;
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.emit(StoreEvent::Preferences(UiPreferences::default()));
//! assert!(matches!(rx.try_recv(), Ok(StoreEvent::Preferences(_))));
//! ```

use serde::Serialize;
use tokio::sync::broadcast;

use crate::preferences::UiPreferences;
use crate::session::Session;

/// Default channel capacity.
/// Subscribers that fall further behind than this miss events (lag).
const DEFAULT_CAPACITY: usize = 256;

/// A state change in one of the stores.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "store", content = "state", rename_all = "camelCase")]
pub enum StoreEvent {
    Session(Session),
    Preferences(UiPreferences),
}

/// Broadcasts [`StoreEvent`]s to any number of subscribers.
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event. Returns the number of subscribers reached; with no
    /// subscribers the event is dropped and 0 is returned.
    pub fn emit(&self, event: StoreEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Receive all future events. Past events are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::Theme;

    #[test]
    fn emit_without_subscribers_returns_zero() {
        let bus = EventBus::new();
        assert_eq!(bus.emit(StoreEvent::Session(Session::default())), 0);
    }

    #[test]
    fn subscribe_increments_count() {
        let bus = EventBus::new();
        let _rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn dropped_subscriber_decrements_count() {
        let bus = EventBus::default();
        let rx = bus.subscribe();
        drop(rx);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn every_subscriber_receives_event() {
        let bus = EventBus::with_capacity(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let prefs = UiPreferences {
            theme: Theme::Dark,
            ..UiPreferences::default()
        };
        assert_eq!(bus.emit(StoreEvent::Preferences(prefs)), 2);

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await.unwrap() {
                StoreEvent::Preferences(p) => assert_eq!(p.theme, Theme::Dark),
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[test]
    fn serializes_with_store_tag() {
        let event = StoreEvent::Preferences(UiPreferences::default());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["store"], "preferences");
        assert_eq!(json["state"]["theme"], "system");
    }
}
