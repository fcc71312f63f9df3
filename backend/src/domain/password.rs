//! Password hashing and verification.
//!
//! Credentials are stored as argon2 PHC strings and never compared in
//! plaintext. Incoming plaintext is held in [`zeroize`]-backed buffers so it
//! is wiped once dropped.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, PasswordVerifier, SaltString};
use zeroize::Zeroizing;

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 6;
/// Maximum accepted password length.
pub const PASSWORD_MAX: usize = 100;
/// Special characters accepted (and one required) in passwords.
pub const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// Error raised when a password cannot be hashed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to hash password: {message}")]
pub struct HashError {
    message: String,
}

/// A stored, salted, one-way password hash (PHC string form).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash a plaintext password with a fresh random salt.
    pub fn derive(plain: &str) -> Result<Self, HashError> {
        let plain = Zeroizing::new(plain.to_owned());
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|error| HashError {
                message: error.to_string(),
            })?;
        Ok(Self(hash.to_string()))
    }

    /// Rehydrate a hash previously stored by [`PasswordHash::derive`].
    pub fn from_phc(stored: String) -> Self {
        Self(stored)
    }

    /// Check a plaintext candidate against the stored hash.
    ///
    /// An unparseable stored hash counts as a mismatch; it is logged so
    /// corrupt rows surface in monitoring rather than in login behaviour.
    pub fn verify(&self, plain: &str) -> bool {
        let plain = Zeroizing::new(plain.to_owned());
        match argon2::PasswordHash::new(&self.0) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok(),
            Err(error) => {
                tracing::warn!(%error, "stored password hash is not a valid PHC string");
                false
            }
        }
    }

    /// The PHC string persisted to storage.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
