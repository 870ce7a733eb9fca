use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cloudseal::crypto::KdfProfile;

#[derive(Parser)]
#[command(name = "cloudseal", version, about = "Encrypt files client-side before they reach an untrusted server")]
pub struct Cli {
    /// Config file (default: <config dir>/cloudseal/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Key derivation profile; overrides the config file
    #[arg(long, global = true, value_enum, env = "CLOUDSEAL_KDF")]
    pub kdf: Option<KdfProfile>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt a file into a <name>.encrypted envelope
    Seal(SealArgs),
    /// Verify and decrypt an envelope
    Open(OpenArgs),
    /// Print the login token derived from a password
    Token(TokenArgs),
    /// Show an envelope's fields without decrypting it
    Inspect(InspectArgs),
    /// List envelopes stored in a directory
    List(ListArgs),
}

#[derive(Parser)]
pub struct SealArgs {
    /// File to encrypt
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Directory to store the envelope in (defaults to the file's directory)
    #[arg(long, short = 'o', value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Overwrite an existing envelope
    #[arg(long, short = 'f')]
    pub force: bool,
}

#[derive(Parser)]
pub struct OpenArgs {
    /// Envelope to decrypt
    #[arg(value_name = "ENVELOPE")]
    pub envelope: PathBuf,

    /// Where to write the plaintext (defaults to the envelope path minus .encrypted)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(long, short = 'f')]
    pub force: bool,
}

#[derive(Parser)]
pub struct TokenArgs {
    /// Print the full login request body for this username
    #[arg(long, short = 'u', value_name = "NAME")]
    pub username: Option<String>,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Envelope to inspect
    #[arg(value_name = "ENVELOPE")]
    pub envelope: PathBuf,
}

#[derive(Parser)]
pub struct ListArgs {
    /// Directory holding envelopes
    #[arg(value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,
}
