use thiserror::Error;

/// Failures of a single seal/open operation.
///
/// Display strings are the user-facing message for each category. Anything
/// more specific (which field was malformed, which check failed) is only
/// emitted on the `tracing` debug channel.
#[derive(Error, Debug)]
pub enum SealError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {actual} bytes exceeds the limit of {limit} bytes")]
    FileTooLarge { actual: u64, limit: u64 },

    #[error("Encrypted file is malformed or incomplete")]
    MalformedPayload(String),

    #[error("Wrong password or corrupted data")]
    AuthenticationFailed,

    #[error("Decrypted data is corrupted")]
    CorruptedData,
}

/// Fieldless discriminant of [`SealError`], for callers that only branch on the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    FileTooLarge,
    MalformedPayload,
    AuthenticationFailed,
    CorruptedData,
}

impl SealError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SealError::InvalidInput(_) => ErrorKind::InvalidInput,
            SealError::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            SealError::MalformedPayload(_) => ErrorKind::MalformedPayload,
            SealError::AuthenticationFailed => ErrorKind::AuthenticationFailed,
            SealError::CorruptedData => ErrorKind::CorruptedData,
        }
    }

    /// Build a `MalformedPayload`, logging the detail on the debug channel only.
    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        tracing::debug!(%detail, "malformed payload");
        SealError::MalformedPayload(detail)
    }
}

/// Errors raised by the command-line front end (never by the library core).
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Output file {0} already exists. Pass --force to overwrite.")]
    OutputExists(String),

    #[error("Passwords don't match")]
    PasswordMismatch,

    #[error("Password entry requires an interactive terminal (or set CLOUDSEAL_PASSWORD)")]
    NonInteractivePassword,

    #[error("Cannot determine config directory")]
    ConfigDirNotFound,
}
