//! Plaintext normalization: typed input -> canonical base64 text fed to the cipher.
//!
//! Conversion runs in fixed steps so no single call ever handles the whole
//! buffer at once: 3072 raw bytes become exactly 4096 base64 characters, and
//! because 3072 is a multiple of 3 the per-step encodings concatenate to the
//! same text a one-shot encoder would produce.

use std::io::Read;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::Zeroizing;

use crate::error::SealError;

/// Hard ceiling on plaintext size: 50 MiB.
pub const MAX_PLAINTEXT_BYTES: u64 = 50 * 1024 * 1024;

/// Raw bytes consumed per encoding step.
pub const ENCODE_STEP: usize = 3 * 1024;

/// Base64 characters consumed per decoding step (the encoding of one `ENCODE_STEP`).
pub const DECODE_STEP: usize = 4 * 1024;

/// Bytes counted past the limit when sizing an oversized stream.
pub const OVERSIZE_SCAN_BYTES: u64 = MAX_PLAINTEXT_BYTES;

/// File contents as handed to the sealing API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plaintext {
    Text(String),
    Bytes(Vec<u8>),
}

impl Plaintext {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Plaintext::Text(text) => text.as_bytes(),
            Plaintext::Bytes(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for Plaintext {
    fn from(text: String) -> Self {
        Plaintext::Text(text)
    }
}

impl From<&str> for Plaintext {
    fn from(text: &str) -> Self {
        Plaintext::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Plaintext {
    fn from(bytes: Vec<u8>) -> Self {
        Plaintext::Bytes(bytes)
    }
}

impl From<&[u8]> for Plaintext {
    fn from(bytes: &[u8]) -> Self {
        Plaintext::Bytes(bytes.to_vec())
    }
}

/// Effective limit: a configured limit may lower the ceiling but never raise it.
pub fn effective_limit(configured: u64) -> u64 {
    configured.min(MAX_PLAINTEXT_BYTES)
}

/// Reject sizes above `limit` (after clamping to [`MAX_PLAINTEXT_BYTES`]).
pub fn check_size(actual: u64, limit: u64) -> Result<(), SealError> {
    let limit = effective_limit(limit);
    if actual > limit {
        tracing::debug!(actual, limit, "plaintext over size limit");
        return Err(SealError::FileTooLarge { actual, limit });
    }
    Ok(())
}

/// Convert `input` to its canonical base64 form, enforcing `limit` first.
pub fn normalize(input: &Plaintext, limit: u64) -> Result<Zeroizing<String>, SealError> {
    let bytes = input.as_bytes();
    check_size(bytes.len() as u64, limit)?;

    let mut canonical = Zeroizing::new(String::with_capacity(encoded_len(bytes.len())));
    for step in bytes.chunks(ENCODE_STEP) {
        STANDARD.encode_string(step, &mut canonical);
    }
    Ok(canonical)
}

/// Stream `reader` into canonical base64 form, one step at a time.
///
/// Stops buffering as soon as the running total passes `limit`. Up to
/// [`OVERSIZE_SCAN_BYTES`] more are then counted (not stored) so the error can
/// report the real size; past that, `actual` in the error is a lower bound and
/// unbounded sources (pipes, stdin) still return.
pub fn normalize_reader<R: Read>(mut reader: R, limit: u64) -> Result<Zeroizing<String>, SealError> {
    let limit = effective_limit(limit);
    let mut canonical = Zeroizing::new(String::new());
    let mut step = Zeroizing::new(vec![0u8; ENCODE_STEP]);
    let mut total: u64 = 0;

    loop {
        let filled = fill_step(&mut reader, &mut step)?;
        if filled == 0 {
            break;
        }
        total += filled as u64;
        if total > limit {
            let mut remainder = (&mut reader).take(OVERSIZE_SCAN_BYTES);
            let rest = std::io::copy(&mut remainder, &mut std::io::sink()).map_err(read_error)?;
            return Err(SealError::FileTooLarge {
                actual: total + rest,
                limit,
            });
        }
        STANDARD.encode_string(&step[..filled], &mut canonical);
        if filled < ENCODE_STEP {
            break;
        }
    }

    tracing::trace!(plaintext_len = total, "normalized stream");
    Ok(canonical)
}

/// Decode canonical base64 back to the original bytes, one step at a time.
pub fn denormalize(canonical: &[u8]) -> Result<Vec<u8>, SealError> {
    if canonical.len() % 4 != 0 {
        return Err(SealError::malformed(format!(
            "canonical payload length {} is not a multiple of 4",
            canonical.len()
        )));
    }

    let mut bytes = Vec::with_capacity(canonical.len() / 4 * 3);
    let mut steps = canonical.chunks(DECODE_STEP).peekable();
    while let Some(step) = steps.next() {
        // Padding is only legal at the very end of the stream.
        if steps.peek().is_some() && step.last() == Some(&b'=') {
            return Err(SealError::malformed("padding inside canonical payload"));
        }
        STANDARD
            .decode_vec(step, &mut bytes)
            .map_err(|e| SealError::malformed(format!("invalid canonical payload: {}", e)))?;
    }
    Ok(bytes)
}

fn encoded_len(raw: usize) -> usize {
    raw.div_ceil(3) * 4
}

/// Read until `buf` is full or the reader is exhausted. Partial steps would
/// introduce padding mid-stream, so short reads are retried.
fn fill_step<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, SealError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_error(e)),
        }
    }
    Ok(filled)
}

fn read_error(e: std::io::Error) -> SealError {
    SealError::InvalidInput(format!("failed to read input: {}", e))
}
