//! Binary entry point: resolve config, open the SQLite file, load the
//! collection and drive the Ratatui event loop until the user exits.
use std::fs::{self, OpenOptions};
use std::rc::Rc;
use std::sync::Mutex;

use anyhow::{Context, Result};
use personal_library::config::AppConfig;
use personal_library::observers::TracingObserver;
use personal_library::seed::{EmbeddedSeed, FileSeed, SeedSource};
use personal_library::store::DEFAULT_SEED_BACKOFF;
use personal_library::{
    run_app, App, KeyValueStore, LibraryError, LibraryStore, SqliteStore, ThemeSettings,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "failed to create data directory at {}",
            config.data_dir.display()
        )
    })?;
    init_logging(&config)?;

    let backend: Rc<dyn KeyValueStore> = Rc::new(SqliteStore::open(&config.db_path())?);
    let seed: Box<dyn SeedSource> = match &config.seed_file {
        Some(path) => Box::new(FileSeed::new(path)),
        None => Box::new(EmbeddedSeed),
    };

    let mut store = LibraryStore::new(backend.clone(), seed)
        .with_seed_retry(config.seed_attempts, DEFAULT_SEED_BACKOFF);
    store.subscribe(TracingObserver);

    // A failed seed fetch leaves an empty catalog rather than refusing to start.
    let startup_error = match store.initialize() {
        Ok(report) => {
            info!(
                origin = ?report.origin,
                loaded = report.loaded,
                skipped = report.skipped,
                reassigned = report.reassigned,
                "library ready"
            );
            None
        }
        Err(err @ LibraryError::SourceFetch(_)) => {
            error!(error = %err, "starting with an empty library");
            Some(err.to_string())
        }
        Err(err) => return Err(err).context("failed to load the library"),
    };

    let theme = ThemeSettings::load(backend.as_ref());
    let mut app = App::new(store, backend, theme);
    if let Some(message) = startup_error {
        app.notify_error(message);
    }
    run_app(&mut app)
}

/// Log to a file in the data directory; the terminal belongs to the TUI.
fn init_logging(config: &AppConfig) -> Result<()> {
    let log_path = config.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file at {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
