//! Ratatui front-end for the library catalog. The app state lives in `app`,
//! form buffers in `forms`, and `terminal` owns raw mode and the event loop.

mod app;
mod forms;
mod helpers;
mod palette;
mod terminal;

pub use app::App;
pub use terminal::run_app;
