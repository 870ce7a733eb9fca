/// Token command: prints the login token that replaces the password at login.
use cloudseal::crypto;
use cloudseal::transport::LoginRequest;

use crate::cli::TokenArgs;

pub fn run_token(args: TokenArgs) -> anyhow::Result<()> {
    let password = super::read_password(false)?;
    let token = crypto::tokenize(&password)?;

    match args.username {
        Some(username) => {
            let request = LoginRequest::new(username, &token);
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        None => println!("{}", token.to_hex()),
    }

    Ok(())
}
