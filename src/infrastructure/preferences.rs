// src/infrastructure/preferences.rs
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::services::preferences::PreferenceStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct PreferenceFile {
    #[serde(default)]
    sdcard_permissions_dialog_presented: bool,
}

/// Preferences persisted as a small TOML file next to the configuration
#[derive(Debug)]
pub struct TomlPreferenceStore {
    path: PathBuf,
    state: Mutex<PreferenceFile>,
}

impl TomlPreferenceStore {
    /// Loads the file if present; a missing or unreadable file starts from defaults
    #[instrument(skip_all, level = "debug")]
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = Self::load(&path).unwrap_or_else(|e| {
            warn!("Ignoring preference file {}: {}", path.display(), e);
            PreferenceFile::default()
        });
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> DomainResult<PreferenceFile> {
        if !path.exists() {
            debug!("No preference file at {}", path.display());
            return Ok(PreferenceFile::default());
        }
        let text = fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| DomainError::Other(format!("Invalid preference file: {}", e)))
    }

    fn save(&self, state: &PreferenceFile) -> DomainResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(state)
            .map_err(|e| DomainError::Other(format!("Cannot serialize preferences: {}", e)))?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl PreferenceStore for TomlPreferenceStore {
    fn is_permission_dialog_presented(&self) -> bool {
        self.state
            .lock()
            .map(|s| s.sdcard_permissions_dialog_presented)
            .unwrap_or(false)
    }

    #[instrument(skip(self), level = "debug")]
    fn set_permission_dialog_presented(&self) -> DomainResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| DomainError::Other(format!("Preference lock error: {}", e)))?;
        state.sdcard_permissions_dialog_presented = true;
        self.save(&state)
    }
}

/// Non-persistent store, counts writes
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    presented: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn is_permission_dialog_presented(&self) -> bool {
        self.presented.load(Ordering::SeqCst)
    }

    fn set_permission_dialog_presented(&self) -> DomainResult<()> {
        self.presented.store(true, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_missing_file_when_open_then_not_presented() {
        let dir = TempDir::new().unwrap();
        let store = TomlPreferenceStore::open(dir.path().join("state.toml"));
        assert!(!store.is_permission_dialog_presented());
    }

    #[test]
    fn given_flag_set_when_reopen_then_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/state.toml");

        let store = TomlPreferenceStore::open(&path);
        store.set_permission_dialog_presented().unwrap();
        assert!(store.is_permission_dialog_presented());

        let reopened = TomlPreferenceStore::open(&path);
        assert!(reopened.is_permission_dialog_presented());
    }

    #[test]
    fn given_corrupt_file_when_open_then_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        let store = TomlPreferenceStore::open(&path);
        assert!(!store.is_permission_dialog_presented());
    }

    #[test]
    fn given_in_memory_store_when_set_then_counted() {
        let store = InMemoryPreferenceStore::new();
        store.set_permission_dialog_presented().unwrap();
        assert!(store.is_permission_dialog_presented());
        assert_eq!(store.writes(), 1);
    }
}
