pub mod adapter;
pub mod pending;
pub mod session;

pub use adapter::IdentityAdapter;
pub use session::{authenticate, AuthError, AuthenticatedUser};
