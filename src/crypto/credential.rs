//! Login token: the value sent to the authentication server in place of the password.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::kdf::{self, KdfParams, KeyPurpose, KEY_LEN};
use crate::error::SealError;

/// Application-wide, non-secret salt for the login token. Distinct from every
/// per-file salt (those are random 32-byte values).
pub const LOGIN_SALT: &[u8] = b"secure-cloud-frontend-salt";

/// The server enrolled accounts with this count, so it is not configurable.
pub const LOGIN_ITERATIONS: u32 = kdf::COMPAT_ITERATIONS;

/// PBKDF2 output standing in for the password at login and registration.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct LoginToken([u8; KEY_LEN]);

impl LoginToken {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Lowercase hex, the form the authentication server expects.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for LoginToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LoginToken").field(&"[REDACTED]").finish()
    }
}

/// Derive the login token for `password`.
///
/// Stable across sessions and devices for the same password. File keys use
/// random salts, so the token never equals a file key.
pub fn tokenize(password: &str) -> Result<LoginToken, SealError> {
    let params = KdfParams {
        iterations: LOGIN_ITERATIONS,
    };
    let key = kdf::derive(password, LOGIN_SALT, KeyPurpose::EncKey, &params)?;
    Ok(LoginToken(*key))
}
