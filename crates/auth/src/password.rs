//! Salted password hashing.
//!
//! Stored form is `sha256$<salt>$<hex digest>`; the salt is a fresh
//! UUID per hash, so equal passwords never share a stored form.

use sha2::{Digest, Sha256};
use uuid::Uuid;

const SCHEME: &str = "sha256";

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Hashes a cleartext password with a random salt.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{SCHEME}${salt}${}", digest(&salt, password))
}

/// Checks a cleartext password against a stored hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(SCHEME), Some(salt), Some(expected)) => digest(salt, password) == expected,
        _ => false,
    }
}
