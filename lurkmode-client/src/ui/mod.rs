//! Terminal user interface

mod app;
mod event;
mod render;
mod terminal;

pub use app::App;

/// Leave raw mode and the alternate screen without a [`terminal::Terminal`]
///
/// For exit paths that skip destructors.
pub fn restore_terminal() {
    if let Err(e) = terminal::Terminal::restore() {
        tracing::debug!("Failed to restore terminal: {}", e);
    }
}
