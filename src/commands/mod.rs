pub mod inspect;
pub mod list;
pub mod open;
pub mod seal;
pub mod token;

use std::io::IsTerminal;

use cloudseal::error::CliError;
use zeroize::Zeroizing;

/// Environment variable that supplies the password without a prompt.
pub const PASSWORD_ENV: &str = "CLOUDSEAL_PASSWORD";

/// Obtain the password for one command. It lives only in this process, in a
/// buffer that is wiped when the command finishes.
pub fn read_password(confirm: bool) -> anyhow::Result<Zeroizing<String>> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        tracing::debug!("password taken from {}", PASSWORD_ENV);
        return Ok(Zeroizing::new(password));
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractivePassword.into());
    }

    let password = Zeroizing::new(
        dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|e| anyhow::anyhow!("Password prompt failed: {}", e))?,
    );
    if confirm {
        let again = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Confirm password")
                .interact()
                .map_err(|e| anyhow::anyhow!("Password prompt failed: {}", e))?,
        );
        if *again != *password {
            return Err(CliError::PasswordMismatch.into());
        }
    }
    Ok(password)
}
