use crate::sort::{SortDirection, SortField};

/// Where the collection came from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Records saved by a previous session.
    Persisted,
    /// The default seed set, because nothing usable was saved.
    Seeded,
}

/// Change notifications emitted by the store after each operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Loaded { origin: LoadOrigin, count: usize },
    Added(String),
    Updated(String),
    Deleted(String),
    Restored(String),
    Erased(String),
    Toggled { id: String, status: bool },
    Sorted { field: SortField, direction: SortDirection },
    /// The saved copy of the collection was removed from the backend.
    Purged,
    /// Saving failed; the in-memory collection is still current.
    PersistFailed { message: String },
}
