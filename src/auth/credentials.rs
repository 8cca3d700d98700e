//! Credential validation for the single configured account.

use sha2::{Digest, Sha256};

use crate::config::Config;

/// Checks a submitted username/password pair against the provisioned
/// account. Pure over configuration + inputs; no side effects.
#[derive(Debug, Clone)]
pub struct CredentialValidator {
    username: String,
    password_salt: String,
    password_hash: String,
}

impl CredentialValidator {
    /// Build from configuration. Returns `None` when the account is not
    /// fully provisioned (no username, salt, or hash) — login is then
    /// simply impossible rather than a startup failure.
    pub fn from_config(config: &Config) -> Option<Self> {
        Some(Self {
            username: config.username.clone()?,
            password_salt: config.password_salt.clone()?,
            password_hash: config.password_hash.clone()?,
        })
    }

    #[cfg(test)]
    pub fn new(username: &str, password_salt: &str, password_hash: &str) -> Self {
        Self {
            username: username.to_owned(),
            password_salt: password_salt.to_owned(),
            password_hash: password_hash.to_owned(),
        }
    }

    /// True only when the username matches the configured account and
    /// `sha256(salt || password)` matches the configured hash.
    pub fn validate(&self, username: &str, password: &str) -> bool {
        if username.is_empty() || password.is_empty() {
            return false;
        }

        let attempt = hash_credentials(&self.password_salt, password);

        if username != self.username {
            // The hash above keeps timing flat for unknown usernames.
            return false;
        }

        constant_time_eq(attempt.as_bytes(), self.password_hash.as_bytes())
    }
}

/// Hex-encoded `sha256(salt || password)`.
pub fn hash_credentials(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
