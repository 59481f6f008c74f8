use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::user::AdapterUser;

/// A login session as seen by the identity provider.
///
/// The expiry instant passes through storage without timezone conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterSession {
    pub session_token: String,
    pub user_id: String,
    pub expires: DateTime<Utc>,
}

/// Result of a session-token lookup joined with its owning user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionAndUser {
    pub session: AdapterSession,
    pub user: AdapterUser,
}
