//! Error types for the forkline-tui crate

use std::io;
use thiserror::Error;

/// Result type alias for forkline-tui operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Terminal I/O errors
    #[error("Terminal I/O error: {0}")]
    Io(#[from] io::Error),

    /// Core errors from forkline-core
    #[error("Core error: {0}")]
    Core(#[from] forkline_core::Error),
}
