use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::status::{CategoryStatus, LoadState};

#[derive(Debug)]
struct Inner<T> {
    records: Arc<Vec<T>>,
    state: LoadState,
    attempted: bool,
    source: Option<PathBuf>,
    loaded_at: Option<DateTime<Utc>>,
    error: Option<String>,
}

/// One category's records plus its load bookkeeping.
///
/// Readers take an `Arc` snapshot and never hold the lock while filtering.
/// A new record set is assembled outside the lock and swapped in whole, so a
/// query sees either the old or the new collection.
#[derive(Debug)]
pub struct Collection<T> {
    inner: RwLock<Inner<T>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: Arc::new(Vec::new()),
                state: LoadState::Unloaded,
                attempted: false,
                source: None,
                loaded_at: None,
                error: None,
            }),
        }
    }
}

impl<T> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner<T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.read().records)
    }

    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state(&self) -> LoadState {
        self.read().state
    }

    pub fn attempted(&self) -> bool {
        self.read().attempted
    }

    /// Enter `Loading`, returning the state to fall back to on failure.
    /// The current records stay queryable meanwhile.
    pub fn begin_load(&self) -> LoadState {
        let mut inner = self.write();
        let previous = match inner.state {
            LoadState::Loading if inner.records.is_empty() => LoadState::Unloaded,
            LoadState::Loading => LoadState::Loaded,
            other => other,
        };
        inner.state = LoadState::Loading;
        inner.attempted = true;
        previous
    }

    /// Swap in a fully assembled record set
    pub fn install(&self, records: Vec<T>, source: PathBuf, loaded: bool) {
        let mut inner = self.write();
        inner.records = Arc::new(records);
        inner.state = if loaded { LoadState::Loaded } else { LoadState::Unloaded };
        inner.source = Some(source);
        inner.loaded_at = loaded.then(Utc::now);
        inner.error = None;
    }

    /// Record a failed attempt; the previous records are untouched
    pub fn fail(&self, previous: LoadState, error: String) {
        let mut inner = self.write();
        inner.state = previous;
        inner.error = Some(error);
    }

    pub fn clear(&self) {
        *self.write() = Inner {
            records: Arc::new(Vec::new()),
            state: LoadState::Unloaded,
            attempted: false,
            source: None,
            loaded_at: None,
            error: None,
        };
    }

    pub fn status(&self) -> CategoryStatus {
        let inner = self.read();
        CategoryStatus {
            loaded: inner.state == LoadState::Loaded,
            count: inner.records.len(),
            source: inner.source.clone(),
            loaded_at: inner.loaded_at,
            error: inner.error.clone(),
        }
    }

    /// `None` until a load has been attempted
    pub fn optional_status(&self) -> Option<CategoryStatus> {
        self.attempted().then(|| self.status())
    }
}
