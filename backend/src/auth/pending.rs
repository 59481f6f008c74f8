//! Single-use pending-signup tokens.
//!
//! The original flow parked a pre-created user id in an ambient client
//! cookie. Here the handoff is an explicit capability: a random 256-bit
//! token minted at pre-signup, stored server-side as a SHA-256 digest and
//! deleted on first consumption.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Cookie name carrying the raw token on the client, scoped to path `/`.
pub const PENDING_TOKEN_COOKIE: &str = "pendingUserId";

/// Mint a fresh pending-signup token: 32 random bytes, hex-encoded.
pub fn mint_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Digest stored at rest in place of the raw token.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_opaque() {
        let a = mint_token();
        let b = mint_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn digest_is_stable_and_differs_from_token() {
        let token = mint_token();
        assert_eq!(token_digest(&token), token_digest(&token));
        assert_ne!(token_digest(&token), token);
    }
}
