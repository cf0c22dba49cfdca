//! Error types for division data access.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DivisionError {
    /// A bundled dataset file is missing or cannot be read.
    #[error("{dataset} dataset unavailable at {}: {source}", path.display())]
    DataUnavailable {
        dataset: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A loader panicked while holding the load guard.
    #[error("dataset load guard was poisoned by a panicking loader")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, DivisionError>;
