//! Crypto module: password-based sealing and opening of file contents.
//!
//! `seal` runs the full pipeline: size check and normalization, fresh salt,
//! key derivation, AES-256-CBC + HMAC-SHA256, envelope packing. `open` reverses
//! it and never decrypts before the tag has been verified. Keys are derived per
//! call and dropped (zeroized) when the call returns, on success or failure.

pub mod cipher;
pub mod credential;
pub mod kdf;

use std::io::Read;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::envelope::{self, Envelope};
use crate::error::SealError;
use crate::payload::{self, Plaintext, MAX_PLAINTEXT_BYTES};

pub use credential::{tokenize, LoginToken};
pub use kdf::{KdfParams, KdfProfile};

/// Per-deployment settings for seal/open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SealOptions {
    pub kdf: KdfParams,
    /// Plaintext ceiling in bytes; clamped to [`MAX_PLAINTEXT_BYTES`].
    pub max_plaintext_bytes: u64,
}

impl SealOptions {
    pub fn new(profile: KdfProfile) -> Self {
        Self {
            kdf: profile.into(),
            max_plaintext_bytes: MAX_PLAINTEXT_BYTES,
        }
    }

    /// 4096-iteration options, readable by the legacy client.
    pub fn compat() -> Self {
        Self::new(KdfProfile::Compat)
    }
}

impl Default for SealOptions {
    fn default() -> Self {
        Self::new(KdfProfile::default())
    }
}

/// Encrypt `input` under `password` using the OS random source.
pub fn seal(input: &Plaintext, password: &str, options: &SealOptions) -> Result<Envelope, SealError> {
    seal_with_rng(&mut OsRng, input, password, options)
}

/// Encrypt `input` under `password`, drawing salt and IV from `rng`.
///
/// The size limit and password are checked before `rng` is touched or any
/// key is derived, so a rejected input has no side effects.
pub fn seal_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
    input: &Plaintext,
    password: &str,
    options: &SealOptions,
) -> Result<Envelope, SealError> {
    require_password(password)?;
    let canonical = payload::normalize(input, options.max_plaintext_bytes)?;
    seal_canonical(rng, canonical.as_bytes(), password, options)
}

/// Encrypt everything `reader` yields, streaming it through the normalizer.
pub fn seal_reader<R: Read>(reader: R, password: &str, options: &SealOptions) -> Result<Envelope, SealError> {
    require_password(password)?;
    let canonical = payload::normalize_reader(reader, options.max_plaintext_bytes)?;
    seal_canonical(&mut OsRng, canonical.as_bytes(), password, options)
}

/// Verify and decrypt `envelope`, returning the original bytes.
///
/// A wrong password and a tampered envelope both yield `AuthenticationFailed`.
pub fn open(envelope: &Envelope, password: &str, options: &SealOptions) -> Result<Vec<u8>, SealError> {
    require_password(password)?;
    let parts = envelope::unpack(envelope)?;
    let keys = kdf::derive_keys(password, &parts.salt, &options.kdf)?;

    let canonical = zeroize::Zeroizing::new(cipher::decrypt(
        &parts.ciphertext,
        keys.enc_key(),
        keys.auth_key(),
        &parts.iv,
        &parts.auth_tag,
    )?);
    // past the tag check, a decode failure is corruption
    let plaintext = payload::denormalize(&canonical).map_err(|e| {
        tracing::debug!(error = %e, "canonical payload failed to decode after a verified tag");
        SealError::CorruptedData
    })?;

    tracing::debug!(plaintext_len = plaintext.len(), "opened envelope");
    Ok(plaintext)
}

fn seal_canonical<R: RngCore + CryptoRng>(
    rng: &mut R,
    canonical: &[u8],
    password: &str,
    options: &SealOptions,
) -> Result<Envelope, SealError> {
    let salt = kdf::generate_salt(rng);
    let keys = kdf::derive_keys(password, &salt, &options.kdf)?;
    let sealed = cipher::encrypt_with_rng(rng, canonical, keys.enc_key(), keys.auth_key())?;

    tracing::debug!(
        iterations = options.kdf.iterations,
        ciphertext_len = sealed.ciphertext.len(),
        "sealed envelope"
    );
    envelope::pack(&salt, &sealed.iv, &sealed.ciphertext, &sealed.auth_tag)
}

fn require_password(password: &str) -> Result<(), SealError> {
    if password.is_empty() {
        return Err(SealError::InvalidInput("password must not be empty".into()));
    }
    Ok(())
}
