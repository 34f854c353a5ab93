use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::HistoryError;

/// Name of the persisted history record.
pub const HISTORY_KEY: &str = "chemKeyboardHistory";

/// Storage for the single history record.
pub trait HistoryBackend {
    /// Read the stored list. An absent record is an empty list.
    fn load(&self) -> Result<Vec<String>, HistoryError>;

    /// Replace the stored list.
    fn save(&mut self, entries: &[String]) -> Result<(), HistoryError>;
}

/// History record kept as a JSON array of strings in one file.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Store the record as `<dir>/chemKeyboardHistory.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::at(dir.join(format!("{HISTORY_KEY}.json")))
    }

    pub const fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryBackend for JsonFileBackend {
    fn load(&self) -> Result<Vec<String>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&mut self, entries: &[String]) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-process history record.
///
/// Clones share the record, so a clone can stand in for storage that
/// outlives a [`super::HistoryStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    record: Rc<RefCell<Option<String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the raw stored record.
    pub fn set_raw(&self, raw: &str) {
        *self.record.borrow_mut() = Some(raw.to_string());
    }

    /// Make subsequent writes fail, as a full or locked store would.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl HistoryBackend for MemoryBackend {
    fn load(&self) -> Result<Vec<String>, HistoryError> {
        match self.record.borrow().as_deref() {
            None => Ok(Vec::new()),
            Some(raw) => Ok(serde_json::from_str(raw)?),
        }
    }

    fn save(&mut self, entries: &[String]) -> Result<(), HistoryError> {
        if self.fail_writes.get() {
            return Err(HistoryError::Rejected);
        }
        *self.record.borrow_mut() = Some(serde_json::to_string(entries)?);
        Ok(())
    }
}
