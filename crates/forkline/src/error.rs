use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize preferences: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Failed to serialize path: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] forkline_core::Error),
}
