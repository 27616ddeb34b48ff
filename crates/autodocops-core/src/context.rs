//! AppContext - the client state shared by every view.
//!
//! Built once at application start and shut down at exit. There are no
//! global stores: anything that needs the session or preferences receives
//! the context (or one of its `Arc`s).
//!
//! ```text
//!                ┌──────────────────────────┐
//!                │        AppContext        │
//!                ├──────────────────────────┤
//!                │  - EventBus              │
//!                │  - SessionStore          │──▶ session backend
//!                │  - UiStore               │──▶ preference backend
//!                └──────────────────────────┘
//! ```

use std::sync::Arc;

use crate::auth::{Authenticator, MockAuthenticator};
use crate::config::{ConfigError, StorageConfig};
use crate::event_bus::EventBus;
use crate::preferences::UiStore;
use crate::session::SessionStore;
use crate::storage::{Backends, SharedBackend};

/// Configuration for building an AppContext.
#[derive(Default)]
pub struct AppContextBuilder {
    config: Option<StorageConfig>,
    authenticator: Option<Arc<dyn Authenticator>>,
    session_backend: Option<SharedBackend>,
    preference_backend: Option<SharedBackend>,
    event_bus: Option<Arc<EventBus>>,
}

impl AppContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage configuration. Read from the environment when not given.
    pub fn config(mut self, config: StorageConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Login provider. Defaults to [`MockAuthenticator`].
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Use an explicit session backend instead of the configured one.
    pub fn session_backend(mut self, backend: SharedBackend) -> Self {
        self.session_backend = Some(backend);
        self
    }

    /// Use an explicit preference backend instead of the configured one.
    pub fn preference_backend(mut self, backend: SharedBackend) -> Self {
        self.preference_backend = Some(backend);
        self
    }

    /// Use an existing EventBus.
    pub fn event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Open both stores. Must run inside a tokio runtime.
    pub async fn build(self) -> Result<AppContext, ConfigError> {
        let (session_backend, preference_backend) =
            match (self.session_backend, self.preference_backend) {
                (Some(session), Some(preferences)) => (session, preferences),
                (session, preferences) => {
                    let config = match self.config {
                        Some(config) => config,
                        None => StorageConfig::from_env()?,
                    };
                    log::debug!(
                        "Using {} storage in {}",
                        config.mode,
                        config.data_dir.display()
                    );
                    let configured = Backends::from_config(&config);
                    (
                        session.unwrap_or(configured.session),
                        preferences.unwrap_or(configured.preferences),
                    )
                }
            };

        let event_bus = self.event_bus.unwrap_or_default();
        let authenticator = self
            .authenticator
            .unwrap_or_else(|| Arc::new(MockAuthenticator::new()));

        let session =
            SessionStore::open(session_backend, authenticator, Arc::clone(&event_bus)).await;
        let preferences = UiStore::open(preference_backend, Arc::clone(&event_bus)).await;

        Ok(AppContext {
            event_bus,
            session: Arc::new(session),
            preferences: Arc::new(preferences),
        })
    }
}

/// Client state for the whole application.
///
/// Cloning only clones the `Arc`s.
#[derive(Clone)]
pub struct AppContext {
    pub event_bus: Arc<EventBus>,
    pub session: Arc<SessionStore>,
    pub preferences: Arc<UiStore>,
}

impl AppContext {
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::new()
    }

    /// Wait until both stores have written everything queued so far.
    pub async fn flush(&self) {
        self.session.flush().await;
        self.preferences.flush().await;
    }

    /// Apply pending writes and stop both writers.
    pub async fn shutdown(&self) {
        self.session.close().await;
        self.preferences.close().await;
        log::debug!("Client state shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageMode;
    use crate::preferences::Theme;
    use crate::storage::MemoryBackend;
    use tempfile::tempdir;

    async fn memory_context() -> (AppContext, Arc<MemoryBackend>, Arc<MemoryBackend>) {
        let session = Arc::new(MemoryBackend::new());
        let preferences = Arc::new(MemoryBackend::new());
        let ctx = AppContext::builder()
            .session_backend(session.clone())
            .preference_backend(preferences.clone())
            .build()
            .await
            .unwrap();
        (ctx, session, preferences)
    }

    #[tokio::test]
    async fn builds_with_explicit_backends() {
        let (ctx, _, _) = memory_context().await;
        assert!(!ctx.session.is_authenticated());
        assert_eq!(ctx.preferences.theme(), Theme::System);
    }

    #[tokio::test]
    async fn stores_share_the_event_bus() {
        let bus = Arc::new(EventBus::new());
        let ctx = AppContext::builder()
            .session_backend(Arc::new(MemoryBackend::new()))
            .preference_backend(Arc::new(MemoryBackend::new()))
            .event_bus(Arc::clone(&bus))
            .build()
            .await
            .unwrap();

        let mut rx = ctx.event_bus.subscribe();
        ctx.session.set_token("t");
        ctx.preferences.set_theme(Theme::Dark);

        assert!(Arc::ptr_eq(&ctx.event_bus, &bus));
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn shutdown_flushes_both_stores() {
        let (ctx, session, preferences) = memory_context().await;

        ctx.session.login("a@x.com", "pw").await.unwrap();
        ctx.preferences.set_theme(Theme::Light);
        ctx.shutdown().await;

        assert!(session.peek("autodocops-session").is_some());
        assert!(preferences.peek("autodocops-ui").is_some());
    }

    #[tokio::test]
    async fn plain_mode_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let config = StorageConfig::new(dir.path().to_path_buf()).with_mode(StorageMode::Plain);

        let ctx = AppContext::builder()
            .config(config.clone())
            .build()
            .await
            .unwrap();
        ctx.session.login("a@x.com", "pw").await.unwrap();
        ctx.preferences.set_theme(Theme::Dark);
        ctx.preferences.toggle_sidebar();
        ctx.shutdown().await;

        let restarted = AppContext::builder().config(config).build().await.unwrap();
        assert!(restarted.session.is_authenticated());
        assert_eq!(restarted.session.user().unwrap().email, "a@x.com");
        assert_eq!(restarted.preferences.theme(), Theme::Dark);
        assert!(!restarted.preferences.snapshot().sidebar_open);
    }

    #[tokio::test]
    async fn browser_mode_keeps_both_records_in_one_file() {
        let dir = tempdir().unwrap();
        let config = StorageConfig::new(dir.path().to_path_buf()).with_mode(StorageMode::Browser);

        let ctx = AppContext::builder().config(config).build().await.unwrap();
        ctx.session.login("a@x.com", "pw").await.unwrap();
        ctx.preferences.set_notifications(false);
        ctx.shutdown().await;

        let contents =
            std::fs::read_to_string(dir.path().join(crate::storage::local::LOCAL_STORAGE_FILE))
                .unwrap();
        let map: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert!(map.get("autodocops-session").is_some());
        assert!(map.get("autodocops-ui").is_some());
    }

    #[tokio::test]
    async fn browser_mode_recovers_from_corrupt_storage_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(crate::storage::local::LOCAL_STORAGE_FILE),
            "{ not json",
        )
        .unwrap();
        let config = StorageConfig::new(dir.path().to_path_buf()).with_mode(StorageMode::Browser);

        let ctx = AppContext::builder()
            .config(config.clone())
            .build()
            .await
            .unwrap();
        assert!(!ctx.session.is_authenticated());
        assert_eq!(ctx.preferences.theme(), Theme::System);

        ctx.session.login("a@x.com", "pw").await.unwrap();
        ctx.preferences.set_theme(Theme::Dark);
        ctx.shutdown().await;

        let restarted = AppContext::builder().config(config).build().await.unwrap();
        assert!(restarted.session.is_authenticated());
        assert_eq!(restarted.preferences.theme(), Theme::Dark);
    }

    #[tokio::test]
    async fn clone_shares_stores() {
        let (ctx, _, _) = memory_context().await;
        let other = ctx.clone();

        ctx.preferences.set_theme(Theme::Dark);
        assert_eq!(other.preferences.theme(), Theme::Dark);
        assert!(Arc::ptr_eq(&ctx.session, &other.session));
    }
}
