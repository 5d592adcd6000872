use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use cultivation_game::SnapshotStorage;

/// One JSON file per slot under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a save directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn slot_path(&self, slot: &str) -> PathBuf {
        let file: String = slot
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl SnapshotStorage for FileStorage {
    type Error = io::Error;

    fn save_snapshot(&self, slot: &str, snapshot: &str) -> Result<(), Self::Error> {
        let path = self.slot_path(slot);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, snapshot)?;
        fs::rename(&staging, &path)
    }

    fn load_snapshot(&self, slot: &str) -> Result<Option<String>, Self::Error> {
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn delete_snapshot(&self, slot: &str) -> Result<(), Self::Error> {
        match fs::remove_file(self.slot_path(slot)) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

/// Process-local saves for runs without `--save-dir`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    saves: Rc<RefCell<HashMap<String, String>>>,
}

impl SnapshotStorage for MemoryStorage {
    type Error = io::Error;

    fn save_snapshot(&self, slot: &str, snapshot: &str) -> Result<(), Self::Error> {
        self.saves
            .borrow_mut()
            .insert(slot.to_string(), snapshot.to_string());
        Ok(())
    }

    fn load_snapshot(&self, slot: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.saves.borrow().get(slot).cloned())
    }

    fn delete_snapshot(&self, slot: &str) -> Result<(), Self::Error> {
        self.saves.borrow_mut().remove(slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "cultivation-storage-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn file_storage_round_trips_and_deletes() {
        let storage = FileStorage::open(temp_dir("roundtrip")).unwrap();
        assert_eq!(storage.load_snapshot("seed-1").unwrap(), None);
        storage.save_snapshot("seed-1", r#"{"qi":1.0}"#).unwrap();
        assert_eq!(
            storage.load_snapshot("seed-1").unwrap().as_deref(),
            Some(r#"{"qi":1.0}"#)
        );
        storage.delete_snapshot("seed-1").unwrap();
        storage.delete_snapshot("seed-1").unwrap();
        assert_eq!(storage.load_snapshot("seed-1").unwrap(), None);
        let _ = fs::remove_dir_all(storage.dir());
    }

    #[test]
    fn slot_names_are_sanitized() {
        let storage = FileStorage::open(temp_dir("sanitize")).unwrap();
        let path = storage.slot_path("../escape me");
        assert_eq!(path.parent(), Some(storage.dir()));
        assert!(path.ends_with("___escape_me.json"));
        let _ = fs::remove_dir_all(storage.dir());
    }

    #[test]
    fn memory_storage_shares_between_clones() {
        let storage = MemoryStorage::default();
        let other = storage.clone();
        storage.save_snapshot("slot", "{}").unwrap();
        assert_eq!(other.load_snapshot("slot").unwrap().as_deref(), Some("{}"));
    }
}
