//! SessionStore - owns the session state and its persisted record.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::state::{PersistedSession, Session, UserRecord};
use crate::auth::{AuthError, AuthResponse, Authenticator, Credentials};
use crate::event_bus::{EventBus, StoreEvent};
use crate::persist::PersistedRecord;
use crate::storage::SharedBackend;

/// Name of the session record in storage.
pub const SESSION_RECORD: &str = "autodocops-session";

/// Holds the current identity and token.
///
/// All mutations are applied to memory synchronously. Changes to a persisted
/// field then queue a write of the whole record; call [`SessionStore::flush`]
/// to wait for it.
///
/// Overlapping `login` calls are not serialized: each one applies its result
/// when it completes, so the last to finish wins.
pub struct SessionStore {
    state: Mutex<Session>,
    record: PersistedRecord<PersistedSession>,
    authenticator: Arc<dyn Authenticator>,
    event_bus: Arc<EventBus>,
}

impl SessionStore {
    /// Create the store and hydrate it from `backend`.
    pub async fn open(
        backend: SharedBackend,
        authenticator: Arc<dyn Authenticator>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let record = PersistedRecord::new(SESSION_RECORD, backend);
        let state = record
            .hydrate()
            .await
            .map(Session::from_persisted)
            .unwrap_or_default();

        if !state.is_consistent() {
            log::warn!("Restored session has an inconsistent authenticated flag");
        }

        Self {
            state: Mutex::new(state),
            record,
            authenticator,
            event_bus,
        }
    }

    /// Authenticate and, on success, replace user and token.
    ///
    /// On failure only `is_loading` is reset; user, token and the
    /// authenticated flag keep their previous values.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.update(|s| s.is_loading = true);

        let credentials = Credentials::new(email, password);
        match self.authenticator.login(&credentials).await {
            Ok(AuthResponse { user, token }) => {
                log::info!("Signed in as {}", user.email);
                self.update(|s| {
                    s.user = Some(user);
                    s.token = Some(token);
                    s.is_authenticated = true;
                    s.is_loading = false;
                });
                Ok(())
            }
            Err(e) => {
                log::warn!("Login failed for {email}: {e}");
                self.update(|s| s.is_loading = false);
                Err(e)
            }
        }
    }

    /// Clear the session.
    ///
    /// Memory is cleared before this returns; the storage write is queued
    /// and not awaited.
    pub fn logout(&self) {
        log::info!("Signing out");
        self.update(|s| *s = Session::default());
    }

    /// Set the user. Also marks the session authenticated.
    pub fn set_user(&self, user: UserRecord) {
        self.update(|s| {
            s.user = Some(user);
            s.is_authenticated = true;
        });
    }

    /// Set the token only.
    ///
    /// The authenticated flag is left as it is: holding a token is not by
    /// itself proof of a signed-in user. Use `login` or `set_user` to change
    /// the flag.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.update(|s| s.token = Some(token));
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    pub fn user(&self) -> Option<UserRecord> {
        self.lock().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    /// `Authorization` header value for API calls, if a token is held.
    pub fn authorization_header(&self) -> Option<String> {
        self.lock().token.as_ref().map(|t| format!("Bearer {t}"))
    }

    /// Wait for every queued write to reach storage.
    pub async fn flush(&self) {
        self.record.flush().await;
    }

    /// Flush and stop the writer. The store stays readable.
    pub async fn close(&self) {
        self.record.close().await;
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f`, queue a write if a persisted field changed, and notify.
    fn update<F: FnOnce(&mut Session)>(&self, f: F) {
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

        self.event_bus.emit(StoreEvent::Session(snapshot));
    }
}
