/// List command: shows the envelopes stored in a directory.
use owo_colors::{OwoColorize, Stream::Stdout};

use cloudseal::transport::{DirectoryStore, EnvelopeSource};
use cloudseal::util::{human_duration, human_size};

use crate::cli::ListArgs;

pub fn run_list(args: ListArgs) -> anyhow::Result<()> {
    use comfy_table::{Cell, Table};

    let source = DirectoryStore::new(&args.dir);
    let files = source.list()?;
    if files.is_empty() {
        println!(
            "{}",
            format!("No envelopes in {}.", args.dir.display()).if_supports_color(Stdout, |t| t.yellow())
        );
        return Ok(());
    }

    let now_secs = std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut table = Table::new();
    table.set_header(vec!["File", "Envelope size", "Age"]);
    for file in &files {
        table.add_row(vec![
            Cell::new(&file.filename),
            Cell::new(human_size(file.size)),
            Cell::new(human_duration(now_secs.saturating_sub(file.created_at))),
        ]);
    }
    println!("{table}");

    Ok(())
}
