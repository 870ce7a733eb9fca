use anyhow::Context;
use std::path::{Path, PathBuf};

use crate::error::CliError;

pub fn config_dir() -> anyhow::Result<PathBuf> {
    let base = dirs::config_dir().ok_or(CliError::ConfigDirNotFound)?;
    Ok(base.join("cloudseal"))
}

pub fn config_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Refuse to clobber an existing file unless `force` is set.
pub fn ensure_writable(dest: &Path, force: bool) -> anyhow::Result<()> {
    if dest.exists() && !force {
        return Err(CliError::OutputExists(dest.display().to_string()).into());
    }
    Ok(())
}

/// Write `bytes` to `dest` atomically (write to temp then rename) and set 0600 permissions.
///
/// Used for decrypted output: the plaintext never appears at `dest` half-written,
/// and it is only readable by the owner.
pub fn write_private_atomic(bytes: &[u8], dest: &Path) -> anyhow::Result<()> {
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = dest
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Output path {} has no file name", dest.display()))?;

    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    let tmp = parent.join(tmp_name);

    write_private(&tmp, bytes)
        .with_context(|| format!("Failed to write temporary file {}", tmp.display()))?;

    if let Err(e) = std::fs::rename(&tmp, dest) {
        // Attempt cleanup of temp file on rename failure
        let _ = std::fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("Failed to move output into {}", dest.display()));
    }

    // Enforce 0600 after the rename as well, in case dest already existed.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(dest, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to set 0600 permissions on {}", dest.display()))?;
    }

    Ok(())
}

#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, bytes)
}
