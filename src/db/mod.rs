//! Persistence backends. The catalog only ever needs whole-value reads and
//! writes by key, so every backend implements the small [`KeyValueStore`]
//! trait and the rest of the app never touches SQL.

mod connection;
mod memory;

pub use connection::SqliteStore;
pub use memory::MemoryStore;

use crate::error::StorageError;

/// Key holding the JSON array of book records.
pub const BOOKS_KEY: &str = "lib_books";
/// Key holding the JSON object with the six theme values.
pub const SETTINGS_KEY: &str = "lib_settings";
/// Key receiving a copy of an unreadable book array before it is replaced.
pub const CORRUPT_BOOKS_KEY: &str = "lib_books.corrupt";

/// String-valued key-value storage scoped to the current user.
///
/// Methods take `&self`; backends that need mutation use interior mutability
/// so one handle can be shared between the store and the theme.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }
}
