//! Persisted key-value state shared across wizard screens.
//!
//! Two JSON blobs survive app restarts: the in-progress application draft and
//! the onboarding selection. Storage is injected into every store (and every
//! store into every controller) so tests can swap the backing medium.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

mod draft;
mod onboarding;

pub use draft::{Draft, DraftData, DraftStore, SharedDraftStore};
pub use onboarding::{OnboardingState, OnboardingStore};

/// Storage key for the application draft blob.
pub const APPLICATION_STORE_KEY: &str = "turkey-visa-application-store";

/// Storage key for the onboarding blob.
pub const ONBOARDING_STORE_KEY: &str = "visa-onboarding-store";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("state storage unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt persisted state for '{name}': {source}")]
    Corrupt {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Named-blob persistence boundary.
pub trait DraftStorage: Send + Sync {
    fn load(&self, name: &str) -> Result<Option<String>, StoreError>;
    fn save(&self, name: &str, payload: &str) -> Result<(), StoreError>;
    fn remove(&self, name: &str) -> Result<(), StoreError>;
}

/// One `<name>.json` file per blob under a state directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl DraftStorage for FileStorage {
    fn load(&self, name: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(name)) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, name: &str, payload: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(name), payload)?;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(name)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory storage for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DraftStorage for MemoryStorage {
    fn load(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries().get(name).cloned())
    }

    fn save(&self, name: &str, payload: &str) -> Result<(), StoreError> {
        self.entries().insert(name.to_string(), payload.to_string());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        self.entries().remove(name);
        Ok(())
    }
}

pub(crate) fn load_blob<T>(storage: &dyn DraftStorage, name: &str) -> Result<T, StoreError>
where
    T: Default + serde::de::DeserializeOwned,
{
    match storage.load(name)? {
        Some(payload) => serde_json::from_str(&payload).map_err(|source| StoreError::Corrupt {
            name: name.to_string(),
            source,
        }),
        None => Ok(T::default()),
    }
}

pub(crate) fn save_blob<T>(storage: &dyn DraftStorage, name: &str, value: &T) -> Result<(), StoreError>
where
    T: serde::Serialize,
{
    let payload = serde_json::to_string(value).map_err(|source| StoreError::Corrupt {
        name: name.to_string(),
        source,
    })?;
    storage.save(name, &payload)
}

/// Arc+Mutex wrapper: screens share the store and the last writer wins,
/// consistent with a single-threaded UI with no true concurrent writers.
pub(crate) fn lock_shared<T>(shared: &Arc<Mutex<T>>) -> MutexGuard<'_, T> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
