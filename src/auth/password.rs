//! Password hashing for protected pages
//!
//! Salted, iterated SHA-256. The stored form is `pg1$<salt>$<digest>` with
//! both parts URL-safe base64. The `pg1` prefix versions the scheme so a
//! future format change can coexist with stored hashes.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};

const SCHEME: &str = "pg1";
const ITERATIONS: u32 = 10_000;
const SALT_LEN: usize = 16;

/// Hash a plaintext password for storage.
pub fn hash_password(plain: &str) -> String {
    let salt: [u8; SALT_LEN] = rand::rng().random();
    let digest = digest_with_salt(plain, &salt);
    format!(
        "{SCHEME}${}${}",
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(digest)
    )
}

/// Verify a plaintext password against a stored hash.
///
/// Unknown schemes and malformed hashes verify as false, never as an error:
/// a corrupt record must not let anyone in.
pub fn verify_password(plain: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(salt), Some(digest), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let (Ok(salt), Ok(expected)) = (URL_SAFE_NO_PAD.decode(salt), URL_SAFE_NO_PAD.decode(digest))
    else {
        return false;
    };

    let actual = digest_with_salt(plain, &salt);
    constant_time_eq(&actual, &expected)
}

fn digest_with_salt(plain: &str, salt: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(plain.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..ITERATIONS {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(digest);
        digest = hasher.finalize();
    }

    digest.to_vec()
}

/// Length-checked comparison that does not short-circuit on the first
/// differing byte. Also used for the bearer token checks.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let stored = hash_password("open sesame");
        assert!(verify_password("open sesame", &stored));
        assert!(!verify_password("open sesam", &stored));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password");
        let b = hash_password("same password");
        assert_ne!(a, b);
        assert!(verify_password("same password", &a));
        assert!(verify_password("same password", &b));
    }

    #[test]
    fn test_stored_format() {
        let stored = hash_password("pw");
        let parts: Vec<&str> = stored.split('$').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "pg1");
    }

    #[test]
    fn test_malformed_hash_verifies_false() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "pg1$only-two"));
        assert!(!verify_password("pw", "pg9$aaaa$bbbb"));
        assert!(!verify_password("pw", "pg1$не-base64$bbbb"));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
