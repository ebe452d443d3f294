//! Default books used when nothing has been saved yet.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;

/// Seed list compiled into the binary.
const EMBEDDED_BOOKS: &str = include_str!("../data/books.json");

/// One-shot supplier of seed records. The result is the raw JSON array; the
/// store validates each element the same way it validates persisted data.
pub trait SeedSource {
    fn fetch(&self) -> Result<Vec<Value>, String>;

    /// Short human description used in logs.
    fn describe(&self) -> String;
}

/// The default set shipped with the application.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedSeed;

impl SeedSource for EmbeddedSeed {
    fn fetch(&self) -> Result<Vec<Value>, String> {
        parse_seed(EMBEDDED_BOOKS)
    }

    fn describe(&self) -> String {
        "embedded default books".to_string()
    }
}

/// Seed records read from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSeed {
    path: PathBuf,
}

impl FileSeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SeedSource for FileSeed {
    fn fetch(&self) -> Result<Vec<Value>, String> {
        let text = fs::read_to_string(&self.path)
            .map_err(|err| format!("failed to read {}: {err}", self.path.display()))?;
        parse_seed(&text)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn parse_seed(text: &str) -> Result<Vec<Value>, String> {
    serde_json::from_str::<Vec<Value>>(text)
        .map_err(|err| format!("seed data is not a JSON array: {err}"))
}
