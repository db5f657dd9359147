//! Single-key document snapshot persistence backed by redb.
//!
//! The store behaves like a small key/value "local storage": one table of
//! string keys and JSON string values. The current document lives under
//! [`SNAPSHOT_KEY`] and is overwritten wholesale on every save.

use crate::constants::SNAPSHOT_KEY;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, TableDefinition};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Key/value rows holding JSON strings.
pub const LOCAL_STORAGE: TableDefinition<&str, &str> = TableDefinition::new("local_storage");

/// Persisted document state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub title: String,
    /// Document body as an HTML fragment.
    pub html: String,
    #[serde(rename = "savedAt")]
    pub saved_at: DateTime<Utc>,
}

impl DocumentSnapshot {
    pub fn new(title: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            html: html.into(),
            saved_at: Utc::now(),
        }
    }
}

/// Handle to the snapshot database.
#[derive(Clone)]
pub struct SnapshotStore {
    db: Arc<redb::Database>,
    path: PathBuf,
}

impl SnapshotStore {
    /// Open (or create) `<dir>/data.redb` and make sure the table exists.
    ///
    /// # Errors
    /// Returns an error when the directory cannot be created or redb fails to
    /// open the file (for example, another process holds it).
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(REDB_FILE_NAME);
        let db = redb::Database::create(&path)?;
        let write_txn = db.begin_write()?;
        write_txn.open_table(LOCAL_STORAGE)?;
        write_txn.commit()?;
        info!("opened snapshot store at {}", path.display());
        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the stored snapshot.
    pub fn save(&self, snapshot: &DocumentSnapshot) -> Result<(), CoreError> {
        let encoded = serde_json::to_string(snapshot)?;
        self.put(SNAPSHOT_KEY, &encoded)
    }

    /// Read the stored snapshot. A value that no longer parses is treated as
    /// absent.
    pub fn load(&self) -> Result<Option<DocumentSnapshot>, CoreError> {
        let Some(raw) = self.get(SNAPSHOT_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) => {
                warn!("ignoring unreadable snapshot: {}", err);
                Ok(None)
            }
        }
    }

    /// Remove the stored snapshot. Returns whether one existed.
    pub fn clear(&self) -> Result<bool, CoreError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(LOCAL_STORAGE)?;
            let removed = table.remove(SNAPSHOT_KEY)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LOCAL_STORAGE)?;
        Ok(table.get(key)?.map(|value| value.value().to_string()))
    }

    pub fn put(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(LOCAL_STORAGE)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
