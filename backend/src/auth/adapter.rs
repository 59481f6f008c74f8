//! Identity-provider persistence interface.
//!
//! The external authentication framework drives signup and login through a
//! fixed set of lifecycle operations. Modeling them as a trait keeps the
//! storage engine swappable and the rest of the service testable against the
//! interface alone.

use async_trait::async_trait;

use crate::models::account::AdapterAccount;
use crate::models::session::{AdapterSession, SessionAndUser};
use crate::models::user::{AdapterUser, UserProfile};
use crate::storage::{Store, StoreError};

/// The identity-provider lifecycle operations.
///
/// Lookups return `Ok(None)` for absent records and never error on absence;
/// mutations fail per the contracts documented on each method. Storage errors
/// bubble unmodified to the framework, which owns user-facing messaging.
#[async_trait]
pub trait IdentityAdapter: Send + Sync {
    /// Finalize a signup started on the public username form.
    ///
    /// `pending_token` is the single-use pending-signup token handed out at
    /// pre-signup. Fails with `MissingPendingIdentity` when the token is
    /// absent, consumed or expired — and mutates nothing in that case. On
    /// success the pre-created user row is updated with the verified profile
    /// and the token is invalidated.
    async fn create_user(
        &self,
        pending_token: Option<&str>,
        profile: UserProfile,
    ) -> Result<AdapterUser, StoreError>;

    async fn get_user(&self, id: &str) -> Result<Option<AdapterUser>, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<AdapterUser>, StoreError>;

    /// Join account -> user through the composite `(provider,
    /// provider_account_id)` key.
    async fn get_user_by_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<AdapterUser>, StoreError>;

    /// Overwrite profile fields. Fails with `NotFound` for an unknown id.
    async fn update_user(
        &self,
        id: &str,
        profile: UserProfile,
    ) -> Result<AdapterUser, StoreError>;

    /// Insert a new linked account. A duplicate composite key fails with
    /// `UniquenessViolation`; linking is never an upsert.
    async fn link_account(&self, account: AdapterAccount) -> Result<(), StoreError>;

    /// Insert a session row and return it verbatim.
    async fn create_session(
        &self,
        session: AdapterSession,
    ) -> Result<AdapterSession, StoreError>;

    async fn get_session_and_user(
        &self,
        session_token: &str,
    ) -> Result<Option<SessionAndUser>, StoreError>;

    /// Overwrite ownership and expiry of an existing session, keyed by token.
    /// Fails with `NotFound` when the token is unknown.
    async fn update_session(
        &self,
        session: AdapterSession,
    ) -> Result<AdapterSession, StoreError>;

    /// Remove a session. Deleting an absent token is not an error.
    async fn delete_session(&self, session_token: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl IdentityAdapter for Store {
    async fn create_user(
        &self,
        pending_token: Option<&str>,
        profile: UserProfile,
    ) -> Result<AdapterUser, StoreError> {
        self.create_user_sync(pending_token, &profile)
    }

    async fn get_user(&self, id: &str) -> Result<Option<AdapterUser>, StoreError> {
        self.get_user_sync(id)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<AdapterUser>, StoreError> {
        self.get_user_by_email_sync(email)
    }

    async fn get_user_by_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<AdapterUser>, StoreError> {
        self.get_user_by_account_sync(provider, provider_account_id)
    }

    async fn update_user(
        &self,
        id: &str,
        profile: UserProfile,
    ) -> Result<AdapterUser, StoreError> {
        self.update_user_sync(id, &profile)
    }

    async fn link_account(&self, account: AdapterAccount) -> Result<(), StoreError> {
        self.link_account_sync(&account)
    }

    async fn create_session(
        &self,
        session: AdapterSession,
    ) -> Result<AdapterSession, StoreError> {
        self.create_session_sync(&session)
    }

    async fn get_session_and_user(
        &self,
        session_token: &str,
    ) -> Result<Option<SessionAndUser>, StoreError> {
        self.get_session_and_user_sync(session_token)
    }

    async fn update_session(
        &self,
        session: AdapterSession,
    ) -> Result<AdapterSession, StoreError> {
        self.update_session_sync(&session)
    }

    async fn delete_session(&self, session_token: &str) -> Result<(), StoreError> {
        self.delete_session_sync(session_token)
    }
}
