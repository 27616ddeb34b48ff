//! Session state types.

use serde::{Deserialize, Serialize};

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// In-memory session state.
///
/// `is_authenticated` is expected to be true exactly when both `user` and
/// `token` are present. The store keeps that true for `login` and `logout`
/// but the individual setters can break it; see [`super::SessionStore::set_token`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: Option<UserRecord>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl Session {
    /// The fields that are written to storage.
    pub fn persisted(&self) -> PersistedSession {
        PersistedSession {
            user: self.user.clone(),
            token: self.token.clone(),
            is_authenticated: self.is_authenticated,
        }
    }

    /// Rebuild a session from its stored fields. Loading always starts false.
    pub fn from_persisted(record: PersistedSession) -> Self {
        Self {
            user: record.user,
            token: record.token,
            is_authenticated: record.is_authenticated,
            is_loading: false,
        }
    }

    /// Whether the authenticated flag agrees with user and token presence.
    pub fn is_consistent(&self) -> bool {
        self.is_authenticated == (self.user.is_some() && self.token.is_some())
    }
}

/// Stored form of a [`Session`].
///
/// ```json
/// {"user":{"id":"1","email":"a@x.com","name":"Usuario Demo"},"token":"mock-token-...","isAuthenticated":true}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedSession {
    pub user: Option<UserRecord>,
    pub token: Option<String>,
    pub is_authenticated: bool,
}
