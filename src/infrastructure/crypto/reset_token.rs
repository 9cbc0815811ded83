//! Password reset tokens
//!
//! The raw token goes to the user; only its SHA-256 hex digest is stored.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 20;
pub const RESET_TOKEN_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone)]
pub struct ResetToken {
    /// Sent to the user
    pub raw: String,
    /// Stored
    pub hash: String,
    pub expires_at: DateTime<Utc>,
}

pub fn hash_reset_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

pub fn generate_reset_token(now: DateTime<Utc>) -> ResetToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let raw = hex::encode(bytes);

    ResetToken {
        hash: hash_reset_token(&raw),
        raw,
        expires_at: now + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_shape() {
        let now = Utc::now();
        let token = generate_reset_token(now);
        assert_eq!(token.raw.len(), TOKEN_BYTES * 2);
        assert_eq!(token.hash.len(), 64);
        assert_eq!(token.hash, hash_reset_token(&token.raw));
        assert_eq!(token.expires_at - now, Duration::minutes(10));
    }

    #[test]
    fn tokens_are_random() {
        let now = Utc::now();
        assert_ne!(generate_reset_token(now).raw, generate_reset_token(now).raw);
    }
}
