//! Key-value persistence collaborators.
//!
//! The series store persists through this minimal interface: one opaque
//! string value per namespace, no transactional guarantees.

use crate::error::StoreResult;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::info;

/// Minimal key-value interface the series store persists through.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    /// Fetch the raw value stored under `namespace`, if any.
    fn get(&self, namespace: &str) -> StoreResult<Option<String>>;

    /// Replace the value stored under `namespace`.
    fn set(&self, namespace: &str, value: &str) -> StoreResult<()>;
}

/// File-backed store: one JSON document per namespace under a base directory.
///
/// Writes replace the whole file, matching the no-transactions contract.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        info!(dir = %base_dir.display(), "Opened file store");
        Ok(Self { base_dir })
    }

    /// File path for a namespace. Namespace characters outside
    /// `[A-Za-z0-9]` are mapped to `_` to keep names portable.
    fn path_for(&self, namespace: &str) -> PathBuf {
        let safe: String = namespace
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.base_dir.join(format!("{safe}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, namespace: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path_for(namespace)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, namespace: &str, value: &str) -> StoreResult<()> {
        fs::write(self.path_for(namespace), value)?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, namespace: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.lock().get(namespace).cloned())
    }

    fn set(&self, namespace: &str, value: &str) -> StoreResult<()> {
        self.entries
            .lock()
            .insert(namespace.to_string(), value.to_string());
        Ok(())
    }
}

/// Shared-reference stores are still stores; lets one backend be observed
/// from a test while the series store owns another handle to it.
impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, namespace: &str) -> StoreResult<Option<String>> {
        (**self).get(namespace)
    }

    fn set(&self, namespace: &str, value: &str) -> StoreResult<()> {
        (**self).set(namespace, value)
    }
}

/// A store that fails every operation; used to exercise fallback paths.
#[cfg(test)]
pub(crate) struct FailingStore;

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get(&self, _namespace: &str) -> StoreResult<Option<String>> {
        Err(crate::StoreError::Backend("read refused".to_string()))
    }

    fn set(&self, _namespace: &str, _value: &str) -> StoreResult<()> {
        Err(crate::StoreError::Backend("write refused".to_string()))
    }
}
