//! AES-256-CBC + HMAC-SHA256, encrypt-then-MAC.
//!
//! The tag is `HMAC-SHA256(auth_key, iv || ciphertext)`. On open the tag is
//! checked in constant time before the ciphertext is touched; a mismatch is
//! always reported as `AuthenticationFailed`, whether the password was wrong
//! or the bytes were altered.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha2::Sha256;

use crate::crypto::kdf::KEY_LEN;
use crate::error::SealError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// AES block size; also the IV length.
pub const BLOCK_LEN: usize = 16;

pub const IV_LEN: usize = BLOCK_LEN;

/// HMAC-SHA256 output length.
pub const TAG_LEN: usize = 32;

/// Output of [`encrypt`]: everything except the salt needed to open the data later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
    pub auth_tag: [u8; TAG_LEN],
}

/// Encrypt `plaintext` under a fresh IV from the OS random source.
pub fn encrypt(
    plaintext: &[u8],
    enc_key: &[u8; KEY_LEN],
    auth_key: &[u8; KEY_LEN],
) -> Result<Sealed, SealError> {
    encrypt_with_rng(&mut OsRng, plaintext, enc_key, auth_key)
}

/// Encrypt `plaintext`, drawing the IV from `rng`.
pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
    plaintext: &[u8],
    enc_key: &[u8; KEY_LEN],
    auth_key: &[u8; KEY_LEN],
) -> Result<Sealed, SealError> {
    let mut iv = [0u8; IV_LEN];
    rng.fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(&(*enc_key).into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let auth_tag = compute_tag(auth_key, &iv, &ciphertext)?;

    tracing::debug!(
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        "encrypted payload"
    );

    Ok(Sealed {
        iv,
        ciphertext,
        auth_tag,
    })
}

/// Verify `auth_tag` over `iv || ciphertext`, then decrypt.
///
/// Shape problems (IV not one block, ciphertext not whole blocks) are
/// `MalformedPayload` and are rejected before any keyed work. A tag mismatch is
/// `AuthenticationFailed`. A padding failure after a good tag is `CorruptedData`.
pub fn decrypt(
    ciphertext: &[u8],
    enc_key: &[u8; KEY_LEN],
    auth_key: &[u8; KEY_LEN],
    iv: &[u8],
    auth_tag: &[u8],
) -> Result<Vec<u8>, SealError> {
    let iv: &[u8; IV_LEN] = iv
        .try_into()
        .map_err(|_| SealError::malformed(format!("iv must be {} bytes, got {}", IV_LEN, iv.len())))?;
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(SealError::malformed(format!(
            "ciphertext length {} is not a positive multiple of {}",
            ciphertext.len(),
            BLOCK_LEN
        )));
    }

    let mut mac = new_mac(auth_key)?;
    mac.update(iv);
    mac.update(ciphertext);
    // verify_slice compares in constant time and also rejects a wrong-length tag
    mac.verify_slice(auth_tag).map_err(|_| {
        tracing::debug!("authentication tag mismatch");
        SealError::AuthenticationFailed
    })?;

    Aes256CbcDec::new(&(*enc_key).into(), &(*iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| {
            tracing::debug!("padding check failed after a verified tag");
            SealError::CorruptedData
        })
}

fn compute_tag(
    auth_key: &[u8; KEY_LEN],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
) -> Result<[u8; TAG_LEN], SealError> {
    let mut mac = new_mac(auth_key)?;
    mac.update(iv);
    mac.update(ciphertext);
    Ok(mac.finalize().into_bytes().into())
}

fn new_mac(auth_key: &[u8; KEY_LEN]) -> Result<HmacSha256, SealError> {
    <HmacSha256 as Mac>::new_from_slice(auth_key)
        .map_err(|_| SealError::InvalidInput("invalid authentication key length".into()))
}
