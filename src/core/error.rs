//! Error types for snowprint

use thiserror::Error;

use crate::deform::batch::BatchId;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid grid size: {width}x{height} (extents must be >= 1 and the lattice indexable by u32)")]
    InvalidGridSize { width: u32, height: u32 },

    #[error("Kernel execution fault in batch {batch}: {reason}")]
    KernelExecutionFault { batch: BatchId, reason: String },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the tick driver can keep running after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::KernelExecutionFault { .. })
    }
}
