/// Envelope module: the persisted/transmitted form of one encrypted file.
///
/// An envelope is a compact JSON object with four lowercase-hex fields in a fixed
/// order: `salt`, `iv`, `ciphertext`, `authTag`. The server stores it as an
/// opaque blob; only the password that produced it can open it.

use serde::{Deserialize, Serialize};

use crate::crypto::cipher::{BLOCK_LEN, IV_LEN, TAG_LEN};
use crate::crypto::kdf::{MAX_SALT_LEN, MIN_SALT_LEN};
use crate::error::SealError;

/// The wire representation of an encrypted file.
///
/// Field order matters: serde serializes struct fields in declaration order, so
/// `pack` always emits salt, iv, ciphertext, authTag in that order. The legacy
/// web client named the ciphertext field `encrypted`; it is accepted on input.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Hex-encoded per-file random salt (16..=32 bytes).
    pub salt: String,
    /// Hex-encoded IV, exactly one AES block.
    pub iv: String,
    /// Hex-encoded AES-256-CBC ciphertext, whole blocks.
    #[serde(alias = "encrypted")]
    pub ciphertext: String,
    /// Hex-encoded HMAC-SHA256 tag over iv || ciphertext.
    #[serde(rename = "authTag")]
    pub auth_tag: String,
}

/// Decoded, shape-checked envelope fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeParts {
    pub salt: Vec<u8>,
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
    pub auth_tag: [u8; TAG_LEN],
}

impl Envelope {
    /// Compact JSON bytes, ready to hand to the transport.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SealError> {
        serde_json::to_vec(self)
            .map_err(|e| SealError::InvalidInput(format!("envelope serialization failed: {}", e)))
    }

    /// Parse JSON bytes. A missing field or non-JSON input is `MalformedPayload`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SealError> {
        serde_json::from_slice(bytes)
            .map_err(|e| SealError::malformed(format!("envelope is not valid JSON: {}", e)))
    }
}

/// Encode raw fields into an envelope. Fields with the wrong shape are
/// `InvalidInput`: they indicate a caller bug, not a damaged file.
pub fn pack(
    salt: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    auth_tag: &[u8],
) -> Result<Envelope, SealError> {
    check_shapes(salt, iv, ciphertext, auth_tag).map_err(SealError::InvalidInput)?;
    Ok(Envelope {
        salt: hex::encode(salt),
        iv: hex::encode(iv),
        ciphertext: hex::encode(ciphertext),
        auth_tag: hex::encode(auth_tag),
    })
}

/// Decode and validate every field. Nothing keyed happens here, so a damaged
/// envelope is rejected before any password work is spent on it.
pub fn unpack(envelope: &Envelope) -> Result<EnvelopeParts, SealError> {
    let salt = decode_field("salt", &envelope.salt)?;
    let iv = decode_field("iv", &envelope.iv)?;
    let ciphertext = decode_field("ciphertext", &envelope.ciphertext)?;
    let auth_tag = decode_field("authTag", &envelope.auth_tag)?;

    check_shapes(&salt, &iv, &ciphertext, &auth_tag).map_err(SealError::malformed)?;

    // lengths already checked by check_shapes
    let iv: [u8; IV_LEN] = iv
        .try_into()
        .map_err(|_| SealError::malformed("iv length"))?;
    let auth_tag: [u8; TAG_LEN] = auth_tag
        .try_into()
        .map_err(|_| SealError::malformed("authTag length"))?;

    tracing::trace!(
        salt_len = salt.len(),
        ciphertext_len = ciphertext.len(),
        "unpacked envelope"
    );

    Ok(EnvelopeParts {
        salt,
        iv,
        ciphertext,
        auth_tag,
    })
}

/// Parse and unpack in one step.
pub fn unpack_bytes(bytes: &[u8]) -> Result<EnvelopeParts, SealError> {
    unpack(&Envelope::from_bytes(bytes)?)
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>, SealError> {
    if value.is_empty() {
        return Err(SealError::malformed(format!("{} is empty", name)));
    }
    hex::decode(value).map_err(|e| SealError::malformed(format!("{} is not valid hex: {}", name, e)))
}

fn check_shapes(salt: &[u8], iv: &[u8], ciphertext: &[u8], auth_tag: &[u8]) -> Result<(), String> {
    if !(MIN_SALT_LEN..=MAX_SALT_LEN).contains(&salt.len()) {
        return Err(format!(
            "salt must be {}..={} bytes, got {}",
            MIN_SALT_LEN,
            MAX_SALT_LEN,
            salt.len()
        ));
    }
    if iv.len() != IV_LEN {
        return Err(format!("iv must be {} bytes, got {}", IV_LEN, iv.len()));
    }
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(format!(
            "ciphertext must be a positive multiple of {} bytes, got {}",
            BLOCK_LEN,
            ciphertext.len()
        ));
    }
    if auth_tag.len() != TAG_LEN {
        return Err(format!(
            "authTag must be {} bytes, got {}",
            TAG_LEN,
            auth_tag.len()
        ));
    }
    Ok(())
}
