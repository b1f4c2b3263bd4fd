//! Pretty-printed JSON store file with rolling backups.
//!
//! Writes go to a uniquely named temp file first and are renamed over the
//! store while holding an exclusive lock on `<store>.lock`.

use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use tracing::debug;
use uuid::Uuid;

use crate::{
    models::store::{CURRENT_VERSION, Store},
    storage::{
        IoAction, Storage, StorageError,
        migrations::{apply_migrations, detect_version},
    },
};

/// Backups kept in `backups/` next to the store file
const MAX_BACKUPS: usize = 5;

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<(), StorageError> {
        match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(StorageError::io(IoAction::CreateDir, parent))
            }
            None => Ok(()),
        }
    }

    fn backup_dir(&self) -> PathBuf {
        self.path
            .parent()
            .unwrap_or(Path::new("."))
            .join("backups")
    }

    /// `<stem>-<nanos>.json`; the zero-padded suffix sorts chronologically
    fn next_backup_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("store"));
        let nanos = jiff::Timestamp::now().as_nanosecond();

        self.backup_dir().join(format!("{stem}-{nanos:020}.json"))
    }

    /// Copy the current store into `backups/` and drop all but the newest
    /// `MAX_BACKUPS` copies. Does nothing before the first save.
    fn rotate_backups(&self) -> Result<(), StorageError> {
        if !fs::exists(&self.path).map_err(StorageError::io(IoAction::Read, &self.path))? {
            return Ok(());
        }

        let dir = self.backup_dir();
        fs::create_dir_all(&dir).map_err(StorageError::io(IoAction::CreateDir, &dir))?;

        let backup = self.next_backup_path();
        fs::copy(&self.path, &backup).map_err(StorageError::io(IoAction::Backup, &backup))?;
        debug!(backup = %backup.display(), "store backed up");

        let mut backups: Vec<PathBuf> = fs::read_dir(&dir)
            .map_err(StorageError::io(IoAction::PruneBackups, &dir))?
            .flatten()
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .map(|entry| entry.path())
            .collect();
        backups.sort();

        let excess = backups.len().saturating_sub(MAX_BACKUPS);
        for old in &backups[..excess] {
            fs::remove_file(old).map_err(StorageError::io(IoAction::PruneBackups, &dir))?;
        }
        Ok(())
    }

    fn lock(&self) -> Result<File, StorageError> {
        let lock_path = self.path.with_extension("lock");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(StorageError::io(IoAction::Lock, &lock_path))?;
        file.lock_exclusive()
            .map_err(StorageError::io(IoAction::Lock, &lock_path))?;
        Ok(file)
    }

    /// Move a fully written temp file over the store under the lock
    fn commit(&self, temp_path: &Path) -> Result<(), StorageError> {
        let lock = self.lock()?;
        self.rotate_backups()?;
        fs::rename(temp_path, &self.path).map_err(StorageError::io(IoAction::Write, &self.path))?;
        FileExt::unlock(&lock).map_err(StorageError::io(IoAction::Lock, &self.path))
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Store, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file missing, starting empty");
                return Ok(Store::default());
            }
            Err(e) => return Err(StorageError::io(IoAction::Read, &self.path)(e)),
        };

        let corrupt = |source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        };

        let mut data: serde_json::Value = serde_json::from_str(&content).map_err(corrupt)?;

        let found = detect_version(&data)?;
        if found > CURRENT_VERSION {
            return Err(StorageError::TooNew {
                found,
                supported: CURRENT_VERSION,
            });
        }
        if found < CURRENT_VERSION {
            data = apply_migrations(data, found, CURRENT_VERSION)?;
        }
        if let Some(root) = data.as_object_mut() {
            root.insert(String::from("version"), CURRENT_VERSION.into());
        }

        let store: Store = serde_json::from_value(data).map_err(corrupt)?;
        debug!(
            path = %self.path.display(),
            members = store.members.len(),
            projects = store.projects.len(),
            partners = store.partners.len(),
            "store loaded"
        );
        Ok(store)
    }

    fn save(&self, store: &Store) -> Result<(), StorageError> {
        self.ensure_parent_dir()?;

        let json = serde_json::to_string_pretty(store).map_err(StorageError::Encode)?;
        let temp_path = PathBuf::from(format!("{}.tmp.{}", self.path.display(), Uuid::new_v4()));
        fs::write(&temp_path, json).map_err(StorageError::io(IoAction::Write, &temp_path))?;

        if let Err(e) = self.commit(&temp_path) {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                debug!(temp = %temp_path.display(), error = %cleanup, "temp file left behind");
            }
            return Err(e);
        }

        debug!(path = %self.path.display(), "store saved");
        Ok(())
    }
}
