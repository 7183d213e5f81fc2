//! Passcode persistence
//!
//! The lock engine only depends on [`PasscodeRepository`]. Two stores are
//! provided: an in-memory one for tests and ephemeral locks, and a JSON file
//! store written atomically with owner-only permissions.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;
use crate::sign::Passcode;

/// Durable store for exactly one passcode
///
/// Implementations are shared between the lock engine and the application,
/// so every method takes `&self` and synchronizes internally.
pub trait PasscodeRepository: Send + Sync {
    /// Whether a passcode is stored
    fn has_passcode(&self) -> bool;

    /// The stored passcode (Some iff `has_passcode`)
    fn passcode(&self) -> Option<Passcode>;

    /// Store a passcode, replacing any previous one
    fn save_passcode(&self, passcode: &Passcode) -> Result<(), RepositoryError>;

    /// Forget the stored passcode
    fn delete_passcode(&self) -> Result<(), RepositoryError>;
}

/// Repository that keeps the passcode in memory only
#[derive(Debug, Default)]
pub struct MemoryRepository {
    passcode: RwLock<Option<Passcode>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-loaded with a passcode
    pub fn with_passcode(passcode: Passcode) -> Self {
        Self {
            passcode: RwLock::new(Some(passcode)),
        }
    }
}

impl PasscodeRepository for MemoryRepository {
    fn has_passcode(&self) -> bool {
        self.passcode
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn passcode(&self) -> Option<Passcode> {
        self.passcode
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save_passcode(&self, passcode: &Passcode) -> Result<(), RepositoryError> {
        *self.passcode.write().unwrap_or_else(PoisonError::into_inner) = Some(passcode.clone());
        Ok(())
    }

    fn delete_passcode(&self) -> Result<(), RepositoryError> {
        *self.passcode.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// On-disk document format
#[derive(Serialize, Deserialize)]
struct PasscodeDocument {
    /// Stored passcode as a digit string
    passcode: Passcode,
    /// Version for future migrations
    version: u32,
}

/// Current document version
const DOCUMENT_VERSION: u32 = 1;

/// Repository backed by a JSON file
pub struct FileRepository {
    /// Path to the passcode document
    path: PathBuf,
    /// Cached contents of the document
    passcode: RwLock<Option<Passcode>>,
}

impl FileRepository {
    /// Open the repository at the default location
    pub fn open_default() -> Result<Self, RepositoryError> {
        Self::open(Self::default_path())
    }

    /// Default document path
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("passlock")
            .join("passcode.json")
    }

    /// Open (or prepare) the repository at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let passcode = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let document: PasscodeDocument = serde_json::from_str(&contents)
                .map_err(|e| RepositoryError::Corrupt(e.to_string()))?;
            if document.passcode.is_empty() {
                return Err(RepositoryError::Corrupt("empty passcode".to_string()));
            }
            Some(document.passcode)
        } else {
            None
        };

        tracing::debug!(path = ?path, stored = passcode.is_some(), "Opened passcode repository");

        Ok(Self {
            path,
            passcode: RwLock::new(passcode),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the document atomically
    fn write_document(&self, passcode: &Passcode) -> Result<(), RepositoryError> {
        let document = PasscodeDocument {
            passcode: passcode.clone(),
            version: DOCUMENT_VERSION,
        };
        let contents = serde_json::to_string_pretty(&document)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &contents)?;

        // Restrict before the rename so the document is never world-readable
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl PasscodeRepository for FileRepository {
    fn has_passcode(&self) -> bool {
        self.passcode
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn passcode(&self) -> Option<Passcode> {
        self.passcode
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save_passcode(&self, passcode: &Passcode) -> Result<(), RepositoryError> {
        let mut cached = self.passcode.write().unwrap_or_else(PoisonError::into_inner);
        self.write_document(passcode)?;
        *cached = Some(passcode.clone());
        tracing::info!(path = ?self.path, "Passcode saved");
        Ok(())
    }

    fn delete_passcode(&self) -> Result<(), RepositoryError> {
        let mut cached = self.passcode.write().unwrap_or_else(PoisonError::into_inner);
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        *cached = None;
        tracing::info!(path = ?self.path, "Passcode deleted");
        Ok(())
    }
}
