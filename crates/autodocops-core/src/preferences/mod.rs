//! UI preferences: theme, notifications, sidebar and loading flags.
//!
//! Only `theme` and `notifications` are persisted.

mod state;
mod store;

pub use state::{PersistedPreferences, Theme, UiPreferences};
pub use store::{UiStore, PREFERENCES_RECORD};
