/// Open command: verifies and decrypts an envelope, writing the plaintext with
/// owner-only permissions.
use anyhow::Context;
use owo_colors::{OwoColorize, Stream::Stderr, Stream::Stdout};

use cloudseal::crypto::{self, SealOptions};
use cloudseal::envelope::Envelope;
use cloudseal::error::SealError;
use cloudseal::store;
use cloudseal::transport::{DirectoryStore, EnvelopeSource};
use cloudseal::util::human_size;

use crate::cli::OpenArgs;

pub fn run_open(args: OpenArgs, options: &SealOptions) -> anyhow::Result<()> {
    // ── 1. Load envelope ─────────────────────────────────────────────────
    let (envelope, default_out) = match DirectoryStore::locate(&args.envelope) {
        Some((source, filename)) => {
            let stored = source.get(&filename)?;
            (stored.envelope, Some(source.root().join(filename)))
        }
        None => {
            let bytes = std::fs::read(&args.envelope)
                .with_context(|| format!("Failed to read {}", args.envelope.display()))?;
            (Envelope::from_bytes(&bytes)?, None)
        }
    };
    let out = args.out.or(default_out).ok_or_else(|| {
        anyhow::anyhow!("--out is required when the envelope name does not end in .encrypted")
    })?;
    store::ensure_writable(&out, args.force)?;

    // ── 2. Password ──────────────────────────────────────────────────────
    let password = super::read_password(false)?;

    // ── 3. Verify and decrypt ────────────────────────────────────────────
    let plaintext = match crypto::open(&envelope, &password, options) {
        Ok(plaintext) => zeroize::Zeroizing::new(plaintext),
        Err(e @ SealError::AuthenticationFailed) => {
            eprintln!(
                "{}",
                "Error: Wrong password or the file was modified. Nothing was written."
                    .if_supports_color(Stderr, |t| t.red())
            );
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    // ── 4. Write ─────────────────────────────────────────────────────────
    store::write_private_atomic(&plaintext, &out)?;
    println!(
        "{} {} ({})",
        "Opened".if_supports_color(Stdout, |t| t.green()),
        out.display(),
        human_size(plaintext.len() as u64)
    );

    Ok(())
}
