// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password hashing with Argon2.

use std::sync::OnceLock;

use argon2::{
    password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

use crate::models::UserCredentials;

/// Hash a plaintext password with a fresh random salt.
///
/// Returns the PHC string (algorithm, parameters, salt and hash), which is
/// all that is ever persisted.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

/// Check a plaintext password against a stored PHC hash.
///
/// A hash that cannot be parsed never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::warn!("Stored password hash is malformed");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Hash checked when no account matches, so an unknown email costs the same
/// Argon2 work as a wrong password.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password("dummy-password-never-matches").unwrap_or_default())
}

/// Verify a login attempt and return the matching user's id.
///
/// Always runs exactly one Argon2 verification, whether or not `credentials`
/// were found.
pub fn authenticate(credentials: Option<&UserCredentials>, password: &str) -> Option<String> {
    match credentials {
        Some(found) => verify_password(password, &found.password_hash).then(|| found.id.clone()),
        None => {
            let _ = verify_password(password, dummy_hash());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_not_plaintext_and_verifies() {
        let hash = hash_password("secret123").unwrap();

        assert_ne!(hash, "secret123");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("secret124", &hash));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let a = hash_password("secret123").unwrap();
        let b = hash_password("secret123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!verify_password("secret123", "secret123"));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn test_dummy_hash_costs_the_same_as_a_real_one() {
        let real = hash_password("secret123").unwrap();
        let real = PasswordHash::new(&real).unwrap();
        let dummy = PasswordHash::new(dummy_hash()).unwrap();

        assert_eq!(dummy.algorithm, real.algorithm);
        assert_eq!(dummy.version, real.version);
        assert_eq!(dummy.params, real.params);
    }

    #[test]
    fn test_authenticate() {
        let credentials = UserCredentials {
            id: "u1".to_string(),
            email: "a@x.com".to_string(),
            password_hash: hash_password("secret123").unwrap(),
        };

        assert_eq!(authenticate(Some(&credentials), "secret123").as_deref(), Some("u1"));
        assert_eq!(authenticate(Some(&credentials), "secret124"), None);
        assert_eq!(authenticate(None, "secret123"), None);
        assert_eq!(authenticate(None, "dummy-password-never-matches"), None);
    }
}
