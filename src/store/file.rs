use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MatchdayError, Result};
use crate::store::SlotStorage;

/// One JSON file per slot inside a directory.
///
/// Writes land in a temporary file that is renamed over the slot, so a
/// crash never leaves half a document behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| MatchdayError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        debug!(dir = %dir.display(), "opened file storage");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

/// Slot keys may contain `:` and other characters that are not portable in
/// file names. Those are escaped byte-wise as `.xx` (lowercase hex); `.`
/// itself is escaped too, so distinct keys never share a file.
fn file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    for c in key.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') {
            stem.push(c);
        } else {
            let mut buf = [0; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                stem.push_str(&format!(".{byte:02x}"));
            }
        }
    }
    stem
}

fn io_error(key: &str) -> impl FnOnce(std::io::Error) -> MatchdayError + '_ {
    move |source| MatchdayError::Io {
        key: key.to_owned(),
        source,
    }
}

impl SlotStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(key)(err)),
        }
    }

    fn save(&self, key: &str, raw: &str) -> Result<()> {
        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(io_error(key))?;
        fs::rename(&tmp, &path).map_err(io_error(key))
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.slot_path(key)) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(io_error(key)(err)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::store::Store;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("matchday-test-{}", Uuid::new_v4()))
    }

    #[test]
    fn test_file_stem_is_portable() {
        assert_eq!(file_stem("ratings:abc-123"), "ratings.3aabc-123");
        assert_eq!(file_stem("matches"), "matches");
        assert_eq!(file_stem("a/é"), "a.2f.c3.a9");
    }

    #[test]
    fn test_similar_keys_do_not_collide() {
        assert_ne!(file_stem("a:b"), file_stem("a.b"));
        assert_ne!(file_stem("a.b"), file_stem("a.2eb"));

        let dir = temp_dir();
        let storage = FileStorage::open(&dir).unwrap();
        storage.save("a:b", "1").unwrap();
        storage.save("a.b", "2").unwrap();
        assert_eq!(storage.load("a:b").unwrap().as_deref(), Some("1"));
        assert_eq!(storage.load("a.b").unwrap().as_deref(), Some("2"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = temp_dir();
        {
            let store = Store::new(FileStorage::open(&dir).unwrap());
            store.write("favorites:u1", &vec![3, 1]);
        }

        let store = Store::new(FileStorage::open(&dir).unwrap());
        assert_eq!(store.read("favorites:u1", Vec::<u32>::new()), vec![3, 1]);
        assert!(dir.join("favorites.3au1.json").exists());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_and_removed_slots() {
        let dir = temp_dir();
        let storage = FileStorage::open(&dir).unwrap();
        assert_eq!(storage.load("nothing").unwrap(), None);

        storage.save("k", "1").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("1"));
        storage.remove("k").unwrap();
        storage.remove("k").unwrap();
        assert_eq!(storage.load("k").unwrap(), None);

        fs::remove_dir_all(dir).unwrap();
    }
}
