use axum::http::HeaderMap;
use chrono::Utc;

use crate::auth::adapter::IdentityAdapter;
use crate::models::session::AdapterSession;
use crate::models::user::AdapterUser;
use crate::storage::{Store, StoreError};

/// A request-scoped authenticated identity.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: AdapterUser,
    pub session: AdapterSession,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,
    #[error("Invalid Authorization header format")]
    InvalidFormat,
    #[error("Unknown session token")]
    UnknownSession,
    #[error("Session expired")]
    SessionExpired,
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Resolve the bearer session token in `headers` against the session store.
///
/// Expiry is enforced here rather than in the adapter: the adapter reports
/// what is stored, route-level policy decides whether it still counts.
pub async fn authenticate(
    headers: &HeaderMap,
    store: &Store,
) -> Result<AuthenticatedUser, AuthError> {
    let header = headers
        .get("Authorization")
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidFormat)?;

    let found = store
        .get_session_and_user(token)
        .await?
        .ok_or(AuthError::UnknownSession)?;

    if found.session.expires < Utc::now() {
        return Err(AuthError::SessionExpired);
    }

    Ok(AuthenticatedUser {
        user: found.user,
        session: found.session,
    })
}
