//! The catalog itself: the authoritative list of records, every operation that
//! changes it, and the load/save round trip to the key-value backend.
//!
//! Each mutation runs to completion in memory, then writes the whole list back
//! under [`BOOKS_KEY`] and notifies observers. A failed write never rolls the
//! in-memory change back; it is reported through
//! [`LibraryStore::last_persist_warning`] and a [`StoreEvent::PersistFailed`]
//! event instead.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::{KeyValueStore, BOOKS_KEY, CORRUPT_BOOKS_KEY};
use crate::error::{LibraryError, Result, StorageError};
use crate::events::{LoadOrigin, StoreEvent};
use crate::models::{BookDraft, BookInput, BookRecord};
use crate::observers::StoreObserver;
use crate::seed::SeedSource;
use crate::sort::{sort_books, SortDirection, SortField};
use crate::stats::Statistics;

/// Seed fetch attempts before giving up.
pub const DEFAULT_SEED_ATTEMPTS: u32 = 3;
/// Base delay between seed attempts; attempt `n` waits `n` times this.
pub const DEFAULT_SEED_BACKOFF: Duration = Duration::from_millis(200);

/// Outcome of [`LibraryStore::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub origin: LoadOrigin,
    pub loaded: usize,
    /// Elements dropped because they failed validation.
    pub skipped: usize,
    /// Loaded elements that repeated an earlier id and were given a new one.
    pub reassigned: usize,
}

/// Per-id outcome of a bulk operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkReport {
    pub applied: Vec<String>,
    /// Ids that matched no record.
    pub skipped: Vec<String>,
}

pub struct LibraryStore {
    books: Vec<BookRecord>,
    backend: Rc<dyn KeyValueStore>,
    seed: Box<dyn SeedSource>,
    observers: Vec<Box<dyn StoreObserver>>,
    seed_attempts: u32,
    seed_backoff: Duration,
    persist_warning: Option<String>,
}

impl fmt::Debug for LibraryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryStore")
            .field("books", &self.books)
            .field("seed", &self.seed.describe())
            .field("observers_count", &self.observers.len())
            .field("seed_attempts", &self.seed_attempts)
            .field("seed_backoff", &self.seed_backoff)
            .field("persist_warning", &self.persist_warning)
            .finish()
    }
}

impl LibraryStore {
    /// Create an empty store. Call [`initialize`](Self::initialize) before use.
    pub fn new(backend: Rc<dyn KeyValueStore>, seed: Box<dyn SeedSource>) -> Self {
        Self {
            books: Vec::new(),
            backend,
            seed,
            observers: Vec::new(),
            seed_attempts: DEFAULT_SEED_ATTEMPTS,
            seed_backoff: DEFAULT_SEED_BACKOFF,
            persist_warning: None,
        }
    }

    /// Override the seed retry policy. At least one attempt is always made.
    pub fn with_seed_retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.seed_attempts = attempts.max(1);
        self.seed_backoff = backoff;
        self
    }

    pub fn subscribe(&mut self, observer: impl StoreObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Load the saved collection, or the seed set when nothing usable is saved.
    ///
    /// A saved value that is not a JSON array is copied to
    /// [`CORRUPT_BOOKS_KEY`] and replaced by the seed set on the next save.
    /// Individual elements that fail validation are skipped, and the saved text
    /// is copied to the same key so the next save cannot lose them. An element
    /// repeating an earlier id is kept under a fresh id.
    pub fn initialize(&mut self) -> Result<LoadReport> {
        let stored = match self.backend.get(BOOKS_KEY) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "could not read saved books, using defaults");
                None
            }
        };

        if let Some(text) = stored {
            match serde_json::from_str::<Vec<Value>>(&text) {
                Ok(values) => {
                    let report = self.load_values(values, LoadOrigin::Persisted);
                    if report.skipped > 0 {
                        self.back_up(&text);
                    }
                    return Ok(report);
                }
                Err(err) => {
                    warn!(error = %err, "saved books are unreadable, using defaults");
                    self.back_up(&text);
                }
            }
        }

        let values = self.fetch_seed()?;
        Ok(self.load_values(values, LoadOrigin::Seeded))
    }

    fn fetch_seed(&mut self) -> Result<Vec<Value>> {
        let source = self.seed.describe();
        let mut last_error = String::new();

        for attempt in 1..=self.seed_attempts {
            match self.seed.fetch() {
                Ok(values) => return Ok(values),
                Err(err) => {
                    warn!(attempt, %source, error = %err, "seed fetch failed");
                    last_error = err;
                    if attempt < self.seed_attempts {
                        thread::sleep(self.seed_backoff * attempt);
                    }
                }
            }
        }

        self.books.clear();
        Err(LibraryError::SourceFetch(last_error))
    }

    fn load_values(&mut self, values: Vec<Value>, origin: LoadOrigin) -> LoadReport {
        let total = values.len();
        let mut seen = HashSet::new();
        let mut books = Vec::with_capacity(total);
        let mut reassigned = 0;

        for (idx, value) in values.into_iter().enumerate() {
            let record = serde_json::from_value::<BookInput>(value)
                .map_err(|err| err.to_string())
                .and_then(|input| BookRecord::from_input(input).map_err(|err| err.to_string()));

            match record {
                Ok(mut book) => {
                    if !seen.insert(book.id.clone()) {
                        let fresh = fresh_id(&seen);
                        warn!(
                            index = idx,
                            id = %book.id,
                            %fresh,
                            "book repeats an id, assigning a new one"
                        );
                        book.id = fresh.clone();
                        seen.insert(fresh);
                        reassigned += 1;
                    }
                    books.push(book);
                }
                Err(reason) => warn!(index = idx, %reason, "skipping invalid book"),
            }
        }

        self.books = books;
        let report = LoadReport {
            origin,
            loaded: self.books.len(),
            skipped: total - self.books.len(),
            reassigned,
        };
        info!(
            ?origin,
            loaded = report.loaded,
            skipped = report.skipped,
            reassigned = report.reassigned,
            "books loaded"
        );
        self.notify(&StoreEvent::Loaded {
            origin,
            count: report.loaded,
        });
        report
    }

    /// Append a new, active record with a fresh id.
    pub fn add_book(&mut self, draft: BookDraft) -> BookRecord {
        let book = BookRecord::create(self.generate_id(), draft, false);
        debug!(id = %book.id, title = %book.title, "adding book");
        self.books.push(book.clone());
        self.persist();
        self.notify(&StoreEvent::Added(book.id.clone()));
        book
    }

    /// Overwrite the editable fields of an existing record.
    pub fn update_book(&mut self, id: &str, draft: BookDraft) -> Result<&BookRecord> {
        let idx = self.index_of(id)?;
        self.books[idx].apply(draft);
        debug!(%id, "updated book");
        self.persist();
        self.notify(&StoreEvent::Updated(id.to_string()));
        Ok(&self.books[idx])
    }

    /// Move a record to the trash.
    pub fn delete_book(&mut self, id: &str) -> Result<()> {
        let idx = self.index_of(id)?;
        self.books[idx].mark_deleted();
        debug!(%id, "moved book to trash");
        self.persist();
        self.notify(&StoreEvent::Deleted(id.to_string()));
        Ok(())
    }

    /// Bring a record back from the trash.
    pub fn restore_book(&mut self, id: &str) -> Result<()> {
        let idx = self.index_of(id)?;
        self.books[idx].mark_restored();
        debug!(%id, "restored book");
        self.persist();
        self.notify(&StoreEvent::Restored(id.to_string()));
        Ok(())
    }

    /// Permanently remove a record. Returns `false` if no record had that id,
    /// which is not an error.
    pub fn erase_book(&mut self, id: &str) -> bool {
        let before = self.books.len();
        self.books.retain(|book| book.id != id);
        let erased = self.books.len() != before;
        self.persist();
        if erased {
            debug!(%id, "erased book");
            self.notify(&StoreEvent::Erased(id.to_string()));
        }
        erased
    }

    /// Flip read/unread and return the new status.
    pub fn toggle_status(&mut self, id: &str) -> Result<bool> {
        let idx = self.index_of(id)?;
        self.books[idx].toggle_read_status();
        let status = self.books[idx].status;
        debug!(%id, status, "toggled read status");
        self.persist();
        self.notify(&StoreEvent::Toggled {
            id: id.to_string(),
            status,
        });
        Ok(status)
    }

    /// Reorder the whole collection, trash included.
    pub fn sort_by(&mut self, field: SortField, direction: SortDirection) {
        sort_books(&mut self.books, field, direction);
        debug!(%field, ?direction, "sorted books");
        self.persist();
        self.notify(&StoreEvent::Sorted { field, direction });
    }

    pub fn delete_many<I, S>(&mut self, ids: I) -> BulkReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.bulk(ids, |store, id| store.delete_book(id).is_ok())
    }

    pub fn restore_many<I, S>(&mut self, ids: I) -> BulkReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.bulk(ids, |store, id| store.restore_book(id).is_ok())
    }

    pub fn erase_many<I, S>(&mut self, ids: I) -> BulkReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.bulk(ids, |store, id| store.erase_book(id))
    }

    /// Run one single-record operation per id. A missing id is recorded and
    /// the rest of the batch still runs.
    fn bulk<I, S>(&mut self, ids: I, mut apply: impl FnMut(&mut Self, &str) -> bool) -> BulkReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = BulkReport::default();
        for id in ids {
            let id = id.as_ref();
            if apply(self, id) {
                report.applied.push(id.to_string());
            } else {
                report.skipped.push(id.to_string());
            }
        }
        report
    }

    /// Remove the saved copy of the collection. The in-memory records stay
    /// until the session ends.
    pub fn purge(&mut self) -> Result<()> {
        self.backend.remove(BOOKS_KEY)?;
        info!("purged saved books");
        self.notify(&StoreEvent::Purged);
        Ok(())
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::from_books(&self.books)
    }

    /// Every record in current order, trash included.
    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn get(&self, id: &str) -> Option<&BookRecord> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn active_books(&self) -> impl Iterator<Item = &BookRecord> {
        self.books.iter().filter(|book| book.is_active())
    }

    pub fn trashed_books(&self) -> impl Iterator<Item = &BookRecord> {
        self.books.iter().filter(|book| book.is_deleted())
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Message from the most recent failed save, cleared by the next
    /// successful one.
    pub fn last_persist_warning(&self) -> Option<&str> {
        self.persist_warning.as_deref()
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.books
            .iter()
            .position(|book| book.id == id)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }

    fn generate_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Keep a copy of saved text the loader could not fully take in.
    fn back_up(&self, text: &str) {
        match self.backend.set(CORRUPT_BOOKS_KEY, text) {
            Ok(()) => info!(key = CORRUPT_BOOKS_KEY, "kept a copy of the saved books"),
            Err(err) => warn!(error = %err, "could not back up saved books"),
        }
    }

    fn persist(&mut self) {
        let saved = serde_json::to_string(&self.books)
            .map_err(StorageError::from)
            .and_then(|json| self.backend.set(BOOKS_KEY, &json));

        match saved {
            Ok(()) => self.persist_warning = None,
            Err(err) => {
                let message = err.to_string();
                warn!(error = %message, "failed to save books");
                self.persist_warning = Some(message.clone());
                self.notify(&StoreEvent::PersistFailed { message });
            }
        }
    }

    fn notify(&self, event: &StoreEvent) {
        for observer in &self.observers {
            observer.on_change(event);
        }
    }
}

fn fresh_id(taken: &HashSet<String>) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !taken.contains(&id) {
            return id;
        }
    }
}
