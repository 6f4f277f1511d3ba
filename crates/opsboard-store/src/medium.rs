//! Pluggable key/value media the snapshot store writes through.

use crate::error::StoreError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Durable key/value medium holding string values. Implementations are
/// synchronous and local; nothing here blocks on the network.
pub trait StorageMedium {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the medium cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the medium rejects the write.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the value stored under `key`. Removing an absent key is fine.
    ///
    /// # Errors
    /// Returns a [`StoreError`] when the medium rejects the removal.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// File-backed medium: one file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileMedium {
    root: PathBuf,
}

impl FileMedium {
    /// Create a medium rooted at `root`. The directory is created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the medium stores its files in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl StorageMedium for FileMedium {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-process medium used by tests. The availability switch simulates a
/// disabled or full medium without touching the stored entries.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    entries: Mutex<BTreeMap<String, String>>,
    available: Mutex<bool>,
}

impl MemoryMedium {
    /// Create an empty, available medium.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            available: Mutex::new(true),
        }
    }

    /// Flip the availability switch. While unavailable, every operation
    /// fails with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        *guard(&self.available) = available;
    }

    /// Copy of the current entries, for state assertions in tests.
    #[must_use]
    pub fn entries(&self) -> BTreeMap<String, String> {
        guard(&self.entries).clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if *guard(&self.available) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("medium switched off".to_owned()))
        }
    }
}

impl StorageMedium for MemoryMedium {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_available()?;
        Ok(guard(&self.entries).get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_available()?;
        guard(&self.entries).insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.check_available()?;
        guard(&self.entries).remove(key);
        Ok(())
    }
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_medium_round_trips_values() {
        let medium = MemoryMedium::new();
        medium
            .write("a_key", "value")
            .unwrap_or_else(|err| panic!("write must succeed: {err}"));
        let read = medium
            .read("a_key")
            .unwrap_or_else(|err| panic!("read must succeed: {err}"));
        assert_eq!(read.as_deref(), Some("value"));

        medium
            .delete("a_key")
            .unwrap_or_else(|err| panic!("delete must succeed: {err}"));
        let read = medium
            .read("a_key")
            .unwrap_or_else(|err| panic!("read must succeed: {err}"));
        assert_eq!(read, None);
    }

    #[test]
    fn unavailable_medium_rejects_everything_but_keeps_entries() {
        let medium = MemoryMedium::new();
        medium
            .write("kept", "value")
            .unwrap_or_else(|err| panic!("write must succeed: {err}"));

        medium.set_available(false);
        assert!(medium.read("kept").is_err());
        assert!(medium.write("kept", "other").is_err());

        medium.set_available(true);
        let read = medium
            .read("kept")
            .unwrap_or_else(|err| panic!("read must succeed: {err}"));
        assert_eq!(read.as_deref(), Some("value"));
    }
}
