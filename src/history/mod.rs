//! Bounded, deduplicated, most-recent-first formula history.
//!
//! The in-memory list is authoritative for the running session; every
//! mutation is written through to a [`HistoryBackend`] on a best-effort
//! basis.

mod backend;

pub use backend::{HISTORY_KEY, HistoryBackend, JsonFileBackend, MemoryBackend};

/// Maximum number of remembered formulas.
pub const MAX_HISTORY_SIZE: usize = 15;

/// Failure talking to the history record.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history storage unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("history record is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("history storage rejected the write")]
    Rejected,
}

pub struct HistoryStore {
    entries: Vec<String>,
    backend: Box<dyn HistoryBackend>,
    last_persist_error: Option<String>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("entries", &self.entries)
            .field("last_persist_error", &self.last_persist_error)
            .finish_non_exhaustive()
    }
}

impl HistoryStore {
    /// Load the history from `backend`.
    ///
    /// A missing or unreadable record yields an empty history.
    pub fn open(backend: impl HistoryBackend + 'static) -> Self {
        Self::open_boxed(Box::new(backend))
    }

    pub fn open_boxed(backend: Box<dyn HistoryBackend>) -> Self {
        let entries = match backend.load() {
            Ok(entries) => sanitize(entries),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load formula history, starting empty");
                Vec::new()
            }
        };
        Self {
            entries,
            backend,
            last_persist_error: None,
        }
    }

    /// A history that lives only in memory.
    pub fn in_memory() -> Self {
        Self::open(MemoryBackend::new())
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Error text of the most recent failed write, cleared on success.
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// Record a committed formula.
    ///
    /// Blank values are ignored. An existing value moves to the front
    /// instead of being duplicated, and the oldest entry falls off past
    /// [`MAX_HISTORY_SIZE`]. Every accepted value is written through.
    /// Returns `true` when the order or contents changed.
    pub fn add(&mut self, entry: &str) -> bool {
        if entry.trim().is_empty() {
            return false;
        }
        let changed = self.entries.first().is_none_or(|first| first != entry);
        self.entries.retain(|existing| existing != entry);
        self.entries.insert(0, entry.to_string());
        self.entries.truncate(MAX_HISTORY_SIZE);
        self.persist();
        changed
    }

    /// Write the full list back, logging instead of failing.
    fn persist(&mut self) {
        match self.backend.save(&self.entries) {
            Ok(()) => self.last_persist_error = None,
            Err(err) => {
                tracing::error!(error = %err, "failed to save formula history");
                self.last_persist_error = Some(err.to_string());
            }
        }
    }
}

/// Drop blank and repeated entries and enforce the size cap.
fn sanitize(entries: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(entries.len().min(MAX_HISTORY_SIZE));
    for entry in entries {
        if entry.trim().is_empty() || out.contains(&entry) {
            continue;
        }
        out.push(entry);
        if out.len() == MAX_HISTORY_SIZE {
            break;
        }
    }
    out
}
