//! Key derivation: password + salt -> independent encryption and authentication keys.
//!
//! PBKDF2-HMAC-SHA256 with a fixed iteration count per deployment profile. The
//! authentication key is derived from `password || "hmac"` so that neither key
//! reveals the other even though both share the same salt.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::SealError;

/// Length of every derived key in bytes (AES-256 / HMAC-SHA256 key size).
pub const KEY_LEN: usize = 32;

/// Length of salts generated at encryption time.
pub const SALT_LEN: usize = 32;

/// Shortest salt accepted when re-deriving keys.
pub const MIN_SALT_LEN: usize = 16;

/// Longest salt accepted when re-deriving keys.
pub const MAX_SALT_LEN: usize = 32;

/// Iteration count used by the legacy web client and by the login token.
pub const COMPAT_ITERATIONS: u32 = 4096;

/// Iteration count for new data.
pub const STRONG_ITERATIONS: u32 = 600_000;

/// Domain tag appended to the password when deriving the authentication key.
const AUTH_KEY_TAG: &[u8] = b"hmac";

/// Named PBKDF2 cost profile. Fixed per deployment: the same profile must be
/// used to open an envelope as was used to seal it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KdfProfile {
    /// 4096 iterations, readable by the legacy client.
    Compat,
    /// 600,000 iterations.
    #[default]
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub iterations: u32,
}

impl KdfParams {
    pub fn compat() -> Self {
        Self {
            iterations: COMPAT_ITERATIONS,
        }
    }

    pub fn strong() -> Self {
        Self {
            iterations: STRONG_ITERATIONS,
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        KdfProfile::default().into()
    }
}

impl From<KdfProfile> for KdfParams {
    fn from(profile: KdfProfile) -> Self {
        match profile {
            KdfProfile::Compat => KdfParams::compat(),
            KdfProfile::Strong => KdfParams::strong(),
        }
    }
}

/// Which of the two keys to derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPurpose {
    EncKey,
    AuthKey,
}

/// The encryption and authentication keys for one seal/open call.
///
/// Zeroized on drop; never cached across operations.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKeys {
    enc: [u8; KEY_LEN],
    auth: [u8; KEY_LEN],
}

impl DerivedKeys {
    pub fn enc_key(&self) -> &[u8; KEY_LEN] {
        &self.enc
    }

    pub fn auth_key(&self) -> &[u8; KEY_LEN] {
        &self.auth
    }
}

impl std::fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKeys")
            .field("enc", &"[REDACTED]")
            .field("auth", &"[REDACTED]")
            .finish()
    }
}

/// Derive a single 32-byte key for `purpose` from a password and salt.
///
/// Deterministic: the same (password, salt, purpose, params) always yields the
/// same key. Rejects an empty password, a salt outside 16..=32 bytes, and
/// iteration counts below [`COMPAT_ITERATIONS`] with `InvalidInput` before
/// doing any hashing.
pub fn derive(
    password: &str,
    salt: &[u8],
    purpose: KeyPurpose,
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, SealError> {
    if password.is_empty() {
        return Err(SealError::InvalidInput("password must not be empty".into()));
    }
    if !(MIN_SALT_LEN..=MAX_SALT_LEN).contains(&salt.len()) {
        return Err(SealError::InvalidInput(format!(
            "salt must be {}..={} bytes, got {}",
            MIN_SALT_LEN,
            MAX_SALT_LEN,
            salt.len()
        )));
    }
    if params.iterations < COMPAT_ITERATIONS {
        return Err(SealError::InvalidInput(format!(
            "iteration count {} is below the minimum of {}",
            params.iterations, COMPAT_ITERATIONS
        )));
    }

    let mut input = Zeroizing::new(Vec::with_capacity(password.len() + AUTH_KEY_TAG.len()));
    input.extend_from_slice(password.as_bytes());
    if purpose == KeyPurpose::AuthKey {
        input.extend_from_slice(AUTH_KEY_TAG);
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha256>(&input, salt, params.iterations, key.as_mut());

    tracing::trace!(?purpose, iterations = params.iterations, salt_len = salt.len(), "derived key");
    Ok(key)
}

/// Derive both keys for one operation.
pub fn derive_keys(
    password: &str,
    salt: &[u8],
    params: &KdfParams,
) -> Result<DerivedKeys, SealError> {
    let enc = derive(password, salt, KeyPurpose::EncKey, params)?;
    let auth = derive(password, salt, KeyPurpose::AuthKey, params)?;
    Ok(DerivedKeys {
        enc: *enc,
        auth: *auth,
    })
}

/// Draw a fresh random salt.
pub fn generate_salt<R: RngCore + CryptoRng>(rng: &mut R) -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    salt
}
