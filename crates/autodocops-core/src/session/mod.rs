//! Signed-in identity and bearer token.
//!
//! The session record (`user`, `token`, `isAuthenticated`) survives restarts;
//! the loading flag does not.

mod state;
mod store;

pub use state::{PersistedSession, Session, UserRecord};
pub use store::{SessionStore, SESSION_RECORD};
