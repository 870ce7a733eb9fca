mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use cloudseal::config::Config;
use cloudseal::crypto::SealOptions;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = load_options(&cli)?;

    match cli.command {
        Commands::Seal(args) => commands::seal::run_seal(args, &options)?,
        Commands::Open(args) => commands::open::run_open(args, &options)?,
        Commands::Token(args) => commands::token::run_token(args)?,
        Commands::Inspect(args) => commands::inspect::run_inspect(args)?,
        Commands::List(args) => commands::list::run_list(args)?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

/// Config file, then `--kdf` / `CLOUDSEAL_KDF` on top.
fn load_options(cli: &Cli) -> anyhow::Result<SealOptions> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => match cloudseal::store::config_path() {
            Ok(path) => Config::load_or_default(&path)?,
            Err(e) => {
                tracing::debug!("no config directory: {}", e);
                Config::default()
            }
        },
    };
    if let Some(profile) = cli.kdf {
        config.kdf_profile = profile;
    }
    Ok(config.seal_options())
}
