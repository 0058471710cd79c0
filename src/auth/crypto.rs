//! # Token Hashing
//!
//! Credential tokens are kept as SHA-256 digests and compared in constant time.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hash a token for storage using SHA-256
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let result = hasher.finalize();
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, result)
}

/// Constant-time comparison of two byte slices
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Constant-time comparison of two strings
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_hash_is_deterministic() {
        assert_eq!(hash_token("ABC123"), hash_token("ABC123"));
        assert_ne!(hash_token("ABC123"), hash_token("DEF456"));
        assert_ne!(hash_token("ABC123"), "ABC123");
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_str_eq("same", "same"));
        assert!(!constant_time_str_eq("same", "diff"));
        assert!(!constant_time_str_eq("short", "longer"));
    }
}
