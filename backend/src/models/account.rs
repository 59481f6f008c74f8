/// OAuth account link supplied by the identity provider.
///
/// `(provider, provider_account_id)` is the composite uniqueness key; a second
/// link with the same pair must fail, never upsert.
#[derive(Debug, Clone, Default)]
pub struct AdapterAccount {
    pub user_id: String,
    /// Provider account category ("oauth", "oidc", ...).
    pub account_type: String,
    pub provider: String,
    pub provider_account_id: String,
    pub refresh_token: Option<String>,
    pub access_token: Option<String>,
    pub expires_at: Option<i64>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub id_token: Option<String>,
    pub session_state: Option<String>,
}
