use crate::error::AppError;
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};
use validator::ValidationError;

/// bcrypt ignores input past this many bytes, so longer passwords are refused.
pub const MAX_PASSWORD_BYTES: usize = 72;

lazy_static! {
    // Unsalted SHA-256 hex digests written by earlier deployments.
    static ref LEGACY_DIGEST: Regex = Regex::new(r"^[0-9a-f]{64}$").unwrap();
}

/// Hashes and checks password credentials.
///
/// New credentials are always bcrypt hashes with an embedded random salt.
/// Legacy SHA-256 digests are still accepted by [`PasswordHasher::check`] so
/// they can be migrated on the next successful login; see
/// [`PasswordHasher::needs_rehash`].
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Fails with `ValidationError` for passwords over [`MAX_PASSWORD_BYTES`].
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::ValidationError(format!(
                "password: must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Returns `true` only when `password` matches `stored`.
    ///
    /// Stored forms that are neither bcrypt hashes nor legacy digests never match.
    pub fn check(&self, stored: &str, password: &str) -> bool {
        if is_legacy_digest(stored) {
            let candidate = hex::encode(Sha256::digest(password.as_bytes()));
            return constant_time_eq(candidate.as_bytes(), stored.as_bytes());
        }

        // bcrypt would compare only the first 72 bytes.
        if password.len() > MAX_PASSWORD_BYTES {
            return false;
        }

        match bcrypt::verify(password, stored) {
            Ok(valid) => valid,
            Err(e) => {
                log::warn!("Unrecognised stored credential format: {}", e);
                false
            }
        }
    }

    /// Spends one bcrypt round at this cost and fails.
    ///
    /// Used when there is no stored credential, so the time taken does not
    /// reveal whether an account exists.
    pub fn check_missing(&self, password: &str) -> bool {
        let truncated = truncate_to_char_boundary(password, MAX_PASSWORD_BYTES);
        if let Err(e) = bcrypt::hash(truncated, self.cost) {
            log::warn!("Placeholder password check failed: {}", e);
        }
        false
    }

    /// Whether a stored credential should be replaced by a fresh bcrypt hash.
    pub fn needs_rehash(&self, stored: &str) -> bool {
        is_legacy_digest(stored)
    }
}

/// Byte-length rule for request fields that end up in [`PasswordHasher::hash`].
pub fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        let mut error = ValidationError::new("password_too_long");
        error.message = Some(format!("must be at most {} bytes", MAX_PASSWORD_BYTES).into());
        return Err(error);
    }
    Ok(())
}

fn truncate_to_char_boundary(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

fn is_legacy_digest(stored: &str) -> bool {
    LEGACY_DIGEST.is_match(stored)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
