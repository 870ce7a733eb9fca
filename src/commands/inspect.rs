/// Inspect command: shows envelope field sizes and whether the envelope is
/// well-formed, without asking for a password.
use anyhow::Context;
use owo_colors::{OwoColorize, Stream::Stdout};

use cloudseal::envelope::{self, Envelope};

use crate::cli::InspectArgs;

pub fn run_inspect(args: InspectArgs) -> anyhow::Result<()> {
    use comfy_table::{Cell, Color, Table};

    let bytes = std::fs::read(&args.envelope)
        .with_context(|| format!("Failed to read {}", args.envelope.display()))?;
    let envelope = Envelope::from_bytes(&bytes)?;

    let mut table = Table::new();
    table.set_header(vec!["Field", "Hex chars", "Bytes"]);
    for (name, value) in [
        ("salt", &envelope.salt),
        ("iv", &envelope.iv),
        ("ciphertext", &envelope.ciphertext),
        ("authTag", &envelope.auth_tag),
    ] {
        let decoded = match hex::decode(value) {
            Ok(raw) => Cell::new(raw.len()),
            Err(_) => Cell::new("invalid hex").fg(Color::Red),
        };
        table.add_row(vec![Cell::new(name), Cell::new(value.len()), decoded]);
    }
    println!("{table}");

    match envelope::unpack(&envelope) {
        Ok(_) => println!("{}", "Envelope is well-formed.".if_supports_color(Stdout, |t| t.green())),
        Err(e) => println!("{}", e.to_string().if_supports_color(Stdout, |t| t.red())),
    }

    Ok(())
}
