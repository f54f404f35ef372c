pub mod error;
pub mod tui;

// Expose the main TUI entry point
pub use tui::{Tui, ViewerOptions, run_viewer};
