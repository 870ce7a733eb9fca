/// Seal command: encrypts a file and stores it as `<name>.encrypted`.
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use owo_colors::{OwoColorize, Stream::Stderr, Stream::Stdout};

use cloudseal::crypto::{self, SealOptions};
use cloudseal::error::SealError;
use cloudseal::payload;
use cloudseal::store;
use cloudseal::transport::{DirectoryStore, EnvelopeSink};
use cloudseal::util::human_size;

use crate::cli::SealArgs;

pub fn run_seal(args: SealArgs, options: &SealOptions) -> anyhow::Result<()> {
    // ── 1. Resolve names ─────────────────────────────────────────────────
    let filename = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("{} has no usable file name", args.file.display()))?
        .to_string();
    let out_dir = match args.out {
        Some(dir) => dir,
        None => args
            .file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    };
    let mut sink = DirectoryStore::new(out_dir);
    let dest = sink.envelope_path(&filename);
    store::ensure_writable(&dest, args.force)?;

    // ── 2. Size check before asking for a password ───────────────────────
    let size = std::fs::metadata(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?
        .len();
    if let Err(e) = payload::check_size(size, options.max_plaintext_bytes) {
        if let SealError::FileTooLarge { actual, limit } = &e {
            eprintln!(
                "{} {} is {}; the limit is {}.",
                "Error:".if_supports_color(Stderr, |t| t.red()),
                filename,
                human_size(*actual),
                human_size(*limit)
            );
        }
        return Err(e.into());
    }

    // ── 3. Password ──────────────────────────────────────────────────────
    let password = super::read_password(true)?;

    // ── 4. Encrypt ───────────────────────────────────────────────────────
    let file = std::fs::File::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let envelope = crypto::seal_reader(BufReader::new(file), &password, options)?;

    // ── 5. Store ─────────────────────────────────────────────────────────
    let meta = sink.put(&filename, &envelope)?;

    println!(
        "{} {} -> {}",
        "Sealed".if_supports_color(Stdout, |t| t.green()),
        filename,
        dest.display()
    );
    println!("Plaintext: {}  Envelope: {}", human_size(size), human_size(meta.size));

    Ok(())
}
