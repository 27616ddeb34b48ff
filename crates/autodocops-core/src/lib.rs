//! # autodocops-core
//!
//! Client-side state for the AutoDocOps documentation app.
//!
//! This crate has no UI dependencies and can sit behind any front end
//! (desktop shell, CLI, web view bridge).
//!
//! ## Key Concepts
//!
//! - **Session**: the signed-in user and bearer token, persisted across restarts
//! - **UI preferences**: theme and notification settings, plus transient view flags
//! - **Persistence adapter**: a [`storage::StorageBackend`] chosen once from
//!   [`config::StorageMode`], with secure-to-plain fallback for credentials
//! - **AppContext**: owns both stores; built at start-up, shut down at exit

pub mod auth;
pub mod config;
pub mod context;
pub mod event_bus;
pub mod paths;
pub mod persist;
pub mod preferences;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use auth::{AuthError, Authenticator, MockAuthenticator};
pub use config::{ConfigError, StorageConfig, StorageMode};
pub use context::{AppContext, AppContextBuilder};
pub use event_bus::{EventBus, StoreEvent};
pub use preferences::{Theme, UiPreferences, UiStore};
pub use session::{Session, SessionStore, UserRecord};
pub use storage::{StorageBackend, StorageError};
