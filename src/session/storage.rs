//! Persistent key/value storage backing the session

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::warn;

use crate::error::Error;

/// Synchronous string key/value store. Each call reads or replaces one whole value.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;
    fn remove(&self, key: &str) -> Result<(), Error>;
    /// Remove a value and return what was there, as one step
    fn take(&self, key: &str) -> Result<Option<String>, Error>;
}

/// In-memory storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, Error> {
        self.values
            .lock()
            .map_err(|_| Error::storage("memory storage lock poisoned"))
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn take(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.lock()?.remove(key))
    }
}

/// Storage kept in a JSON object on disk.
///
/// Writes go to a sibling temporary file that is renamed over the original,
/// so readers never observe a half-written file. A file that does not parse
/// is reported by `get` and replaced by the next write.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_bytes(&self) -> Result<Vec<u8>, Error> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn parse(&self, bytes: &[u8]) -> Result<HashMap<String, String>, Error> {
        if bytes.is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_slice(bytes).map_err(|e| {
            Error::storage(format!("{} is not a valid session file: {}", self.path.display(), e))
        })
    }

    fn read_all(&self) -> Result<HashMap<String, String>, Error> {
        self.parse(&self.read_bytes()?)
    }

    fn write_all(&self, values: &HashMap<String, String>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F, R>(&self, f: F) -> Result<R, Error>
    where
        F: FnOnce(&mut HashMap<String, String>) -> R,
    {
        let _guard = self
            .guard
            .lock()
            .map_err(|_| Error::storage("file storage lock poisoned"))?;
        let mut values = match self.parse(&self.read_bytes()?) {
            Ok(values) => values,
            Err(e) => {
                warn!("{}, overwriting it", e);
                HashMap::new()
            }
        };
        let result = f(&mut values);
        self.write_all(&values)?;
        Ok(result)
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let _guard = self
            .guard
            .lock()
            .map_err(|_| Error::storage("file storage lock poisoned"))?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.update(|values| {
            values.remove(key);
        })
    }

    fn take(&self, key: &str) -> Result<Option<String>, Error> {
        self.update(|values| values.remove(key))
    }
}
