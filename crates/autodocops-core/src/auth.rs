//! Authentication against the documentation backend.
//!
//! The backend API is not available yet, so the only shipped
//! [`Authenticator`] is [`MockAuthenticator`]. It must never be used in a
//! production build: it accepts any non-empty email and password.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::UserRecord;

const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_RANDOM_LEN: usize = 16;

/// Display name given to every mock user.
pub const MOCK_USER_NAME: &str = "Usuario Demo";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Authentication backend error: {0}")]
    Backend(String),
}

/// Login input.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

// Keep passwords out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserRecord,
    pub token: String,
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, AuthError>;
}

/// Local stand-in for the login endpoint.
#[derive(Debug, Clone, Default)]
pub struct MockAuthenticator {
    latency: Duration,
}

impl MockAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a network round trip of `latency` before answering.
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, AuthError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(AuthResponse {
            user: UserRecord {
                id: "1".to_string(),
                email: credentials.email.clone(),
                name: MOCK_USER_NAME.to_string(),
            },
            token: mock_token(),
        })
    }
}

/// `mock-token-<16 base36 chars>-<unix millis>`. Encodes nothing about the user.
fn mock_token() -> String {
    let mut rng = rand::thread_rng();
    let random: String = (0..TOKEN_RANDOM_LEN)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect();
    format!("mock-token-{random}-{}", Utc::now().timestamp_millis())
}
