//! Remembered-email persistence across sessions.

use crate::constants::LAST_EMAIL_FILE_NAME;
use crate::error::StoreError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores at most one remembered email string.
///
/// A missing value is not an error.
pub trait EmailStore: Send {
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Remember `email`; a blank value forgets the stored one.
    fn save(&mut self, email: &str) -> Result<(), StoreError>;
}

/// Keeps the remembered email in a single file under the state directory.
#[derive(Debug, Clone)]
pub struct FileEmailStore {
    path: PathBuf,
}

impl FileEmailStore {
    pub fn in_dir(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(LAST_EMAIL_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EmailStore for FileEmailStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let trimmed = raw.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, email: &str) -> Result<(), StoreError> {
        let email = email.trim();
        if email.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            };
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, email)?;
        debug!(path = %self.path.display(), "remembered email saved");
        Ok(())
    }
}

/// In-memory store for tests and for sessions that must not touch disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryEmailStore {
    value: Option<String>,
}

impl MemoryEmailStore {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
        }
    }
}

impl EmailStore for MemoryEmailStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.value.clone())
    }

    fn save(&mut self, email: &str) -> Result<(), StoreError> {
        let email = email.trim();
        self.value = (!email.is_empty()).then(|| email.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileEmailStore::in_dir(dir.path());
        assert_eq!(store.load().expect("load"), None);
    }

    #[test]
    fn save_then_load_round_trips_and_creates_dir() {
        let dir = TempDir::new().expect("temp dir");
        let nested = dir.path().join("state").join("formatki");
        let mut store = FileEmailStore::in_dir(&nested);
        store.save(" a@obi.pl; b@obi.pl ").expect("save");
        assert_eq!(
            store.load().expect("load").as_deref(),
            Some("a@obi.pl; b@obi.pl")
        );
    }

    #[test]
    fn blank_save_forgets_value() {
        let dir = TempDir::new().expect("temp dir");
        let mut store = FileEmailStore::in_dir(dir.path());
        store.save("a@obi.pl").expect("save");
        store.save("   ").expect("forget");
        assert!(!store.path().exists());
        assert_eq!(store.load().expect("load"), None);
        store.save("").expect("forget twice is fine");
    }

    #[test]
    fn memory_store_mirrors_file_semantics() {
        let mut store = MemoryEmailStore::with_value("x@y.com");
        assert_eq!(store.load().expect("load").as_deref(), Some("x@y.com"));
        store.save("").expect("forget");
        assert_eq!(store.load().expect("load"), None);
    }
}
