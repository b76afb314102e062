//! File-backed durable storage for native hosts.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::storage::{InstanceId, Storage};
use crate::codec::{decode_payload, encode_payload};
use crate::model::StorageError;

/// [`Storage`] persisted as one JSON object in a file.
///
/// The whole map is rewritten on every change. There is no change feed, so
/// managers backed by a `FileStorage` run without cross-instance sync.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: RefCell<BTreeMap<String, String>>,
}

/// Resolve the default storage file path.
///
/// Returns `~/.local/share/viewsync/storage.json` on Linux, or the platform
/// data directory elsewhere. Falls back to the current directory.
pub fn default_storage_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("viewsync").join("storage.json")
    } else {
        PathBuf::from("viewsync-storage.json")
    }
}

impl FileStorage {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store. A corrupt file is logged and treated
    /// as empty; it is overwritten on the next successful write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let items = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
            match decode_payload::<BTreeMap<String, String>>(&contents) {
                Ok(items) => items,
                Err(err) => {
                    warn!(path = ?path, error = %err, "corrupt storage file, starting empty");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = ?path, keys = items.len(), "opened file storage");
        Ok(Self {
            path,
            items: RefCell::new(items),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let contents = encode_payload(items)?;
        std::fs::write(&self.path, contents).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str, _source: InstanceId) -> Result<(), StorageError> {
        let mut next = self.items.borrow().clone();
        next.insert(key.to_owned(), value.to_owned());
        self.flush(&next)?;
        *self.items.borrow_mut() = next;
        Ok(())
    }

    fn remove_item(&self, key: &str, _source: InstanceId) -> Result<(), StorageError> {
        if !self.items.borrow().contains_key(key) {
            return Ok(());
        }
        let mut next = self.items.borrow().clone();
        next.remove(key);
        self.flush(&next)?;
        *self.items.borrow_mut() = next;
        Ok(())
    }
}
