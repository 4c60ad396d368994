//! Login gate.
//!
//! The store publishes one shared user/password pair at `GET /login` and the
//! client compares it with what the user typed. This keeps casual visitors
//! out of the board; it is not authentication.

use thiserror::Error;

use crate::store::{ClientError, DocumentStore};

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Invalid credentials. Please try again.")]
    InvalidCredentials,

    #[error("Error connecting to server: {0}")]
    Unreachable(#[from] ClientError),
}

/// Check `user`/`password` against the credentials the store publishes.
pub async fn login<S: DocumentStore + ?Sized>(
    store: &S,
    user: &str,
    password: &str,
) -> Result<(), LoginError> {
    let credentials = store.login().await?;
    if credentials.user == user && credentials.password == password {
        tracing::info!(%user, "Logged in");
        Ok(())
    } else {
        tracing::warn!(%user, "Login rejected");
        Err(LoginError::InvalidCredentials)
    }
}
