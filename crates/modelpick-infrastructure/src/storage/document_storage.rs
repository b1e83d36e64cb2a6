//! Document file storage with ACID guarantees.
//!
//! Provides a smart mutex-like layer for safe concurrent access to configuration documents.
//! Returns data as `serde_json::Value` so callers never depend on the on-disk format.

use modelpick_core::ModelPickError;
use serde_json::Value as JsonValue;
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

/// Errors that can occur during document storage operations.
#[derive(Debug)]
pub enum DocumentStorageError {
    /// File I/O error.
    IoError(std::io::Error),
    /// TOML parsing error.
    TomlParseError(toml::de::Error),
    /// TOML serialization error.
    TomlSerError(toml::ser::Error),
    /// JSON parsing or conversion error.
    JsonError(serde_json::Error),
    /// File locking error.
    LockError(String),
}

impl std::fmt::Display for DocumentStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            DocumentStorageError::TomlParseError(e) => write!(f, "TOML parse error: {}", e),
            DocumentStorageError::TomlSerError(e) => write!(f, "TOML serialization error: {}", e),
            DocumentStorageError::JsonError(e) => write!(f, "JSON error: {}", e),
            DocumentStorageError::LockError(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for DocumentStorageError {}

impl From<std::io::Error> for DocumentStorageError {
    fn from(e: std::io::Error) -> Self {
        DocumentStorageError::IoError(e)
    }
}

impl From<toml::de::Error> for DocumentStorageError {
    fn from(e: toml::de::Error) -> Self {
        DocumentStorageError::TomlParseError(e)
    }
}

impl From<toml::ser::Error> for DocumentStorageError {
    fn from(e: toml::ser::Error) -> Self {
        DocumentStorageError::TomlSerError(e)
    }
}

impl From<serde_json::Error> for DocumentStorageError {
    fn from(e: serde_json::Error) -> Self {
        DocumentStorageError::JsonError(e)
    }
}

impl From<DocumentStorageError> for ModelPickError {
    fn from(e: DocumentStorageError) -> Self {
        match e {
            DocumentStorageError::IoError(e) => e.into(),
            DocumentStorageError::TomlParseError(e) => e.into(),
            DocumentStorageError::TomlSerError(e) => e.into(),
            DocumentStorageError::JsonError(e) => e.into(),
            DocumentStorageError::LockError(e) => ModelPickError::Lock(e),
        }
    }
}

/// On-disk encoding of a document, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// `.toml` files are TOML; everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Json,
        }
    }

    fn parse(self, content: &str) -> Result<JsonValue, DocumentStorageError> {
        match self {
            DocumentFormat::Json => Ok(serde_json::from_str(content)?),
            DocumentFormat::Toml => {
                // Parse TOML → toml::Value, then convert to serde_json::Value
                let toml_value: toml::Value = toml::from_str(content)?;
                toml_to_json(toml_value)
            }
        }
    }

    fn render(self, data: &JsonValue) -> Result<String, DocumentStorageError> {
        match self {
            DocumentFormat::Json => {
                let mut out = serde_json::to_string_pretty(data)?;
                out.push('\n');
                Ok(out)
            }
            DocumentFormat::Toml => {
                let toml_value = json_to_toml(data)?;
                Ok(toml::to_string_pretty(&toml_value)?)
            }
        }
    }
}

/// A document file storage with ACID guarantees.
///
/// Responsibilities:
/// - **File locking** (exclusive write lock)
/// - **Atomic read/write** (tmp file + atomic rename)
/// - **Format conversion** (JSON/TOML ⇄ serde_json::Value)
///
/// Does NOT:
/// - Know about recent models or size classes (delegated to the repository layer)
///
/// Provides:
/// - **Atomicity**: Updates are all-or-nothing via tmp file + atomic rename
/// - **Consistency**: Syntax validation on load/save
/// - **Isolation**: File locking serializes read-modify-write sequences
/// - **Durability**: Explicit fsync before rename
#[derive(Debug, Clone)]
pub struct DocumentStorage {
    path: PathBuf,
    format: DocumentFormat,
}

impl DocumentStorage {
    /// Creates a new document storage handle; the format follows the extension.
    pub fn new(path: PathBuf) -> Self {
        let format = DocumentFormat::from_path(&path);
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Loads the document and returns it as a serde_json::Value.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(JsonValue))`: Successfully loaded
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<JsonValue>, DocumentStorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(self.format.parse(&content)?))
    }

    /// Saves data to the document atomically.
    ///
    /// Uses a temporary file + atomic rename, so a failed write never
    /// replaces the previous contents.
    pub fn save(&self, data: &JsonValue) -> Result<(), DocumentStorageError> {
        // Render first so serialization failures touch nothing on disk
        let rendered = self.format.render(data)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.get_temp_path()?;
        if let Err(e) = write_synced(&tmp_path, rendered.as_bytes()) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        Ok(())
    }

    /// Performs a transactional update with file locking.
    ///
    /// The lock is held across load, `f` and save. `f` receives the current
    /// document (`None` when nothing is stored) and returns the document to
    /// write. If `f` fails nothing is written. Returns the written document.
    pub fn update<F, E>(&self, f: F) -> Result<JsonValue, E>
    where
        F: FnOnce(Option<JsonValue>) -> Result<JsonValue, E>,
        E: From<DocumentStorageError>,
    {
        // Acquire exclusive lock
        let _lock = self.acquire_lock()?;

        let current = self.load()?;
        let next = f(current)?;
        self.save(&next)?;

        Ok(next)
    }

    /// Gets a temporary file path for atomic writes.
    fn get_temp_path(&self) -> Result<PathBuf, DocumentStorageError> {
        let file_name = self.path.file_name().ok_or_else(|| {
            DocumentStorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no file name",
            ))
        })?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(self.path.with_file_name(tmp_name))
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Acquires an exclusive file lock.
    ///
    /// Returns a lock guard that releases the lock when dropped.
    fn acquire_lock(&self) -> Result<FileLock, DocumentStorageError> {
        FileLock::acquire(&self.lock_path())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp_file = File::create(path)?;
    tmp_file.write_all(bytes)?;
    // Ensure data is written to disk
    tmp_file.sync_all()
}

/// A file lock guard that releases the lock when dropped.
///
/// The lock file itself is left in place: deleting it while another process
/// waits on the old inode would let two writers hold "the" lock at once.
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(lock_path: &Path) -> Result<Self, DocumentStorageError> {
        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)?;

        use fs2::FileExt;
        file.lock_exclusive().map_err(|e| {
            DocumentStorageError::LockError(format!("Failed to acquire lock: {}", e))
        })?;

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        use fs2::FileExt;
        let _ = self.file.unlock();
    }
}

/// Converts a toml::Value to serde_json::Value.
fn toml_to_json(toml_value: toml::Value) -> Result<JsonValue, DocumentStorageError> {
    let json_str = serde_json::to_string(&toml_value)?;
    let json_value = serde_json::from_str(&json_str)?;
    Ok(json_value)
}

/// Converts a serde_json::Value to toml::Value.
fn json_to_toml(json_value: &JsonValue) -> Result<toml::Value, DocumentStorageError> {
    let json_str = serde_json::to_string(json_value)?;
    let toml_value: toml::Value = serde_json::from_str(&json_str)?;
    Ok(toml_value)
}
