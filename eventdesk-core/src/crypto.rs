//! Password hashing and verification
//!
//! Credentials are stored as a per-user random salt plus a PBKDF2-HMAC-SHA256
//! derivation of the password with that salt:
//!
//! | Parameter   | Value                                   |
//! | ----------- | --------------------------------------- |
//! | Salt        | 16 characters from `[A-Za-z0-9]`, OS RNG |
//! | PRF         | HMAC-SHA256                             |
//! | Iterations  | 100 000                                 |
//! | Output      | 32 bytes, lowercase hex (64 characters) |
//!
//! Salt and hash are two separate fields of the credential record and must
//! always be read and written together.
//!
//! # Security
//!
//! Verification decodes the stored hash and compares raw bytes with
//! [`subtle::ConstantTimeEq`], so the time taken does not depend on where the
//! first differing byte is. Any malformed stored value simply fails
//! verification.
//!
//! See: <https://cheatsheetseries.owasp.org/cheatsheets/Password_Storage_Cheat_Sheet.html#pbkdf2>

use pbkdf2::pbkdf2_hmac;
use rand::{TryRngCore, rngs::OsRng};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::{
    Error,
    error::{CryptoError, ValidationError},
};

/// Number of PBKDF2 iterations for password derivation.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Length of a generated salt, in characters.
pub const SALT_LENGTH: usize = 16;

/// Length of the derived key in bytes.
pub const HASH_LENGTH: usize = 32;

const SALT_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

// Largest multiple of the alphabet size that fits in a byte; bytes at or above
// it are discarded so every character is equally likely.
const SALT_REJECTION_BOUND: u8 = (256 - 256 % SALT_ALPHABET.len()) as u8;

/// A freshly derived credential: the salt it was derived with and the hex hash.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub salt: String,
    pub hash: String,
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHash")
            .field("salt", &"<redacted>")
            .field("hash", &"<redacted>")
            .finish()
    }
}

/// Hash a password with a newly generated salt.
///
/// # Errors
///
/// Returns a validation error for an empty password and a
/// [`CryptoError::Entropy`] if the OS random source cannot be read.
pub fn hash_password(password: &str) -> Result<PasswordHash, Error> {
    if password.is_empty() {
        return Err(ValidationError::MissingField("Password is required".to_string()).into());
    }

    let salt = generate_salt()?;
    let hash = hash_password_with_salt(password, &salt);

    Ok(PasswordHash { salt, hash })
}

/// Derive the hex-encoded hash of `password` for a known salt.
///
/// The result only depends on its inputs.
pub fn hash_password_with_salt(password: &str, salt: &str) -> String {
    let mut derived = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ITERATIONS,
        &mut derived,
    );
    hex::encode(derived)
}

/// Check a password against a stored salt and hex hash.
///
/// Returns `false` on mismatch and on any malformed stored value.
pub fn verify_password(password: &str, salt: &str, derived_hash: &str) -> bool {
    if salt.is_empty() {
        return false;
    }

    let Ok(stored) = hex::decode(derived_hash) else {
        return false;
    };
    if stored.len() != HASH_LENGTH {
        return false;
    }

    let mut computed = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ITERATIONS,
        &mut computed,
    );

    constant_time_compare(&computed, &stored)
}

/// Generate a random alphanumeric salt of [`SALT_LENGTH`] characters.
pub fn generate_salt() -> Result<String, CryptoError> {
    let mut salt = String::with_capacity(SALT_LENGTH);
    let mut buffer = [0u8; SALT_LENGTH * 2];

    while salt.len() < SALT_LENGTH {
        OsRng
            .try_fill_bytes(&mut buffer)
            .map_err(|e| CryptoError::Entropy(e.to_string()))?;

        for byte in buffer {
            if salt.len() == SALT_LENGTH {
                break;
            }
            if byte < SALT_REJECTION_BOUND {
                salt.push(SALT_ALPHABET[byte as usize % SALT_ALPHABET.len()] as char);
            }
        }
    }

    Ok(salt)
}

/// Read a few bytes from the OS random source.
///
/// Meant to be called once at startup so a broken entropy source stops the
/// process before any credential is created.
pub fn ensure_entropy() -> Result<(), CryptoError> {
    let mut sample = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut sample)
        .map_err(|e| CryptoError::Entropy(e.to_string()))
}

/// Perform constant-time comparison of two byte slices.
///
/// Slices of different lengths are never equal.
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
