use serde::Serialize;

/// Provider-neutral user record, decoupled from storage column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterUser {
    pub id: String,
    pub name: String,
    /// Claimed at pre-signup, before the identity provider confirms a profile.
    pub username: String,
    /// Filled in when the identity provider supplies a verified profile.
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// Profile fields supplied by the identity provider on signup or update.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}
