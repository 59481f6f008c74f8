pub mod auth;
pub mod config;
pub mod logging;
pub mod models;
pub mod routes;
pub mod storage;
pub mod test_util;

pub use auth::{authenticate, AuthError, AuthenticatedUser, IdentityAdapter};
pub use config::Config;
pub use models::account::AdapterAccount;
pub use models::interval::TimeInterval;
pub use models::session::{AdapterSession, SessionAndUser};
pub use models::user::{AdapterUser, UserProfile};
pub use storage::{Store, StoreError};

use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<Store>,
}
