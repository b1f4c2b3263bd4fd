use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::store::Store;

pub mod json;
#[cfg(test)]
pub mod memory;
pub mod migrations;

/// File-system step that failed, used in `StorageError::Io` messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoAction {
    Read,
    CreateDir,
    Write,
    Lock,
    Backup,
    PruneBackups,
}

impl fmt::Display for IoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            IoAction::Read => "read",
            IoAction::CreateDir => "create directory",
            IoAction::Write => "write",
            IoAction::Lock => "lock",
            IoAction::Backup => "back up to",
            IoAction::PruneBackups => "prune backups in",
        };
        f.write_str(verb)
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Could not {action} '{}': {source}", .path.display())]
    Io {
        action: IoAction,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{}' is not a valid rota store: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not encode the store as JSON: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Store version field is not a number: {0}")]
    BadVersion(String),

    #[error(
        "Store schema v{found} is newer than this build of rota understands (v{supported}). Please upgrade rota."
    )]
    TooNew { found: u32, supported: u32 },

    #[error("No migration exists from store schema v{0}")]
    NoMigration(u32),
}

impl StorageError {
    /// `map_err` adapter tagging an io error with what was being done to `path`
    pub fn io(action: IoAction, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| StorageError::Io {
            action,
            path,
            source,
        }
    }
}

/// Persistence boundary handed to every service that mutates the store
pub trait Storage {
    fn load(&self) -> Result<Store, StorageError>;
    fn save(&self, store: &Store) -> Result<(), StorageError>;
}
