//! Boundaries with the storage server and the authentication server.
//!
//! The crypto core never talks HTTP. It hands a sink one opaque envelope plus
//! the original (unencrypted) filename, and gets back an envelope plus
//! metadata from a source. `DirectoryStore` is the local implementation the
//! CLI uses: one `<filename>.encrypted` JSON file per upload, the same naming
//! the web client used for its multipart uploads.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::crypto::LoginToken;
use crate::envelope::Envelope;

/// Suffix appended to the original filename when an envelope is stored.
pub const ENCRYPTED_SUFFIX: &str = ".encrypted";

/// What the server reports about a stored envelope.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// Original filename, stored unencrypted.
    pub filename: String,
    /// Size of the stored envelope in bytes.
    pub size: u64,
    /// Unix timestamp (seconds) when the envelope was stored.
    pub created_at: u64,
}

#[derive(Debug, Clone)]
pub struct StoredEnvelope {
    pub metadata: FileMetadata,
    pub envelope: Envelope,
}

/// Upload side of the transport collaborator.
pub trait EnvelopeSink {
    fn put(&mut self, filename: &str, envelope: &Envelope) -> anyhow::Result<FileMetadata>;
}

/// Download side of the transport collaborator.
pub trait EnvelopeSource {
    fn get(&self, filename: &str) -> anyhow::Result<StoredEnvelope>;
    fn list(&self) -> anyhow::Result<Vec<FileMetadata>>;
}

/// Body of the login/registration request: the token replaces the password.
#[derive(Serialize, Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub pbkdf2_token: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, token: &LoginToken) -> Self {
        Self {
            username: username.into(),
            pbkdf2_token: token.to_hex(),
        }
    }
}

/// Envelopes stored as JSON files in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path an envelope for `filename` is stored at.
    pub fn envelope_path(&self, filename: &str) -> PathBuf {
        self.root.join(format!("{}{}", filename, ENCRYPTED_SUFFIX))
    }

    /// Split `path/to/report.pdf.encrypted` into a store rooted at `path/to`
    /// and the original filename `report.pdf`. Returns `None` when the path
    /// does not carry the suffix.
    pub fn locate(path: &Path) -> Option<(Self, String)> {
        let name = path.file_name()?.to_str()?;
        let filename = name.strip_suffix(ENCRYPTED_SUFFIX)?;
        if filename.is_empty() {
            return None;
        }
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Some((Self::new(root), filename.to_string()))
    }

    fn metadata_for(path: &Path, filename: &str) -> anyhow::Result<FileMetadata> {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("Failed to read metadata for {}", path.display()))?;
        let created_at = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Ok(FileMetadata {
            filename: filename.to_string(),
            size: meta.len(),
            created_at,
        })
    }
}

impl EnvelopeSink for DirectoryStore {
    fn put(&mut self, filename: &str, envelope: &Envelope) -> anyhow::Result<FileMetadata> {
        validate_filename(filename)?;
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create {}", self.root.display()))?;
        let path = self.envelope_path(filename);
        let bytes = envelope.to_bytes()?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write envelope to {}", path.display()))?;
        tracing::debug!(path = %path.display(), "stored envelope");
        Self::metadata_for(&path, filename)
    }
}

impl EnvelopeSource for DirectoryStore {
    fn get(&self, filename: &str) -> anyhow::Result<StoredEnvelope> {
        validate_filename(filename)?;
        let path = self.envelope_path(filename);
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read envelope from {}", path.display()))?;
        let envelope = Envelope::from_bytes(&bytes)?;
        Ok(StoredEnvelope {
            metadata: Self::metadata_for(&path, filename)?,
            envelope,
        })
    }

    fn list(&self) -> anyhow::Result<Vec<FileMetadata>> {
        let mut files = Vec::new();
        let entries = std::fs::read_dir(&self.root)
            .with_context(|| format!("Failed to list {}", self.root.display()))?;
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(filename) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(ENCRYPTED_SUFFIX))
            else {
                continue;
            };
            if filename.is_empty() {
                continue;
            }
            files.push(Self::metadata_for(&path, filename)?);
        }
        // Most recent first, like the server's file listing
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.filename.cmp(&b.filename)));
        Ok(files)
    }
}

/// Filenames are used as path components; reject anything that could escape the store.
fn validate_filename(filename: &str) -> anyhow::Result<()> {
    if filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains('/')
        || filename.contains('\\')
    {
        anyhow::bail!("invalid filename '{}'", filename);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_envelope() -> Envelope {
        crate::envelope::pack(&[1u8; 32], &[2u8; 16], &[3u8; 32], &[4u8; 32]).unwrap()
    }

    #[test]
    fn test_put_then_get_returns_same_envelope() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut store = DirectoryStore::new(dir.path());
        let envelope = sample_envelope();

        let meta = store.put("report.pdf", &envelope).expect("put should succeed");
        assert_eq!(meta.filename, "report.pdf");
        assert!(meta.size > 0);
        assert!(dir.path().join("report.pdf.encrypted").exists());

        let stored = store.get("report.pdf").expect("get should succeed");
        assert_eq!(stored.envelope, envelope);
        assert_eq!(stored.metadata.size, meta.size);
    }

    #[test]
    fn test_list_only_reports_envelopes() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut store = DirectoryStore::new(dir.path());
        store.put("a.txt", &sample_envelope()).unwrap();
        store.put("b.txt", &sample_envelope()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"plain").unwrap();

        let mut names: Vec<String> = store.list().unwrap().into_iter().map(|m| m.filename).collect();
        names.sort();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_path_traversal_rejected() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut store = DirectoryStore::new(dir.path());
        assert!(store.put("../escape", &sample_envelope()).is_err());
        assert!(store.get("..").is_err());
    }

    #[test]
    fn test_locate_splits_suffix() {
        let (store, name) = DirectoryStore::locate(Path::new("/tmp/up/report.pdf.encrypted"))
            .expect("suffix should be recognised");
        assert_eq!(store.root(), Path::new("/tmp/up"));
        assert_eq!(name, "report.pdf");

        let (store, name) = DirectoryStore::locate(Path::new("x.encrypted")).unwrap();
        assert_eq!(store.root(), Path::new("."));
        assert_eq!(name, "x");

        assert!(DirectoryStore::locate(Path::new("report.pdf")).is_none());
        assert!(DirectoryStore::locate(Path::new(".encrypted")).is_none());
    }

    #[test]
    fn test_login_request_carries_token_not_password() {
        let token = crate::crypto::tokenize("correct-password").unwrap();
        let request = LoginRequest::new("alice", &token);
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"pbkdf2_token\""));
        assert!(json.contains(&token.to_hex()));
        assert!(!json.contains("correct-password"));
    }
}
