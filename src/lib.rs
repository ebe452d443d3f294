//! Core library surface for the personal library catalog.
//!
//! The `bin` target wires these pieces together: a key-value backend from
//! [`db`], the [`store::LibraryStore`] that owns the collection, and the
//! terminal front-end in [`ui`]. Everything below `ui` is usable without a
//! terminal, which is how the integration tests drive it.
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod models;
pub mod observers;
pub mod seed;
pub mod sort;
pub mod stats;
pub mod store;
pub mod theme;
pub mod ui;

/// Persistence backends and the trait the store is written against.
pub use db::{KeyValueStore, MemoryStore, SqliteStore};

pub use error::{LibraryError, StorageError, ValidationError};

/// The record type and the validated request used to create or edit one.
pub use models::{BookDraft, BookFields, BookRecord};

pub use sort::{SortDirection, SortField};
pub use stats::Statistics;
pub use store::{BulkReport, LibraryStore, LoadReport};
pub use theme::ThemeSettings;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
