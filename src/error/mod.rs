//! # Error Module
//!
//! Error types for the disk search pipeline.
//!
//! ## Design Principles
//! - **Fatal only before start** - configuration problems abort the run before
//!   any worker thread exists
//! - **Recoverable while running** - traversal and copy failures are reported
//!   per item and the stage keeps going
//! - **Include context** - paths and the underlying I/O error

use crate::events::PipelineStage;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DiskSearchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Failed to start {stage} worker: {source}")]
    Spawn {
        stage: PipelineStage,
        #[source]
        source: std::io::Error,
    },

    #[error("A {stage} worker panicked")]
    WorkerPanicked { stage: PipelineStage },

    #[error("Failed to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Problems with the run configuration, detected before any thread starts
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Root directory not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Root is not a directory: {path}")]
    RootNotDirectory { path: PathBuf },

    #[error("Destination exists but is not a directory: {path}")]
    DestinationNotDirectory { path: PathBuf },

    #[error("Destination must differ from the root directory: {path}")]
    DestinationIsRoot { path: PathBuf },

    #[error("Failed to create destination {path}: {source}")]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid number of {stage} workers: {value} (must be at least 1)")]
    InvalidWorkerCount { stage: PipelineStage, value: usize },

    #[error("Invalid {queue} queue capacity: {value} (must be at least 1)")]
    InvalidCapacity { queue: &'static str, value: usize },
}

/// Errors from constructing a bounded queue
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue capacity must be at least 1")]
    ZeroCapacity,
}

/// Errors while listing directories during discovery or matching
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O failure on `path`
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            ScanError::PermissionDenied { path }
        } else {
            ScanError::ReadDirectory { path, source }
        }
    }

    /// Path the failure refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            ScanError::PermissionDenied { path } | ScanError::ReadDirectory { path, .. } => path,
        }
    }
}

/// Errors while copying a single matched file
#[derive(Error, Debug)]
pub enum CopyError {
    #[error("Source has no file name: {path}")]
    NoFileName { path: PathBuf },

    #[error("Failed to copy {from} to {to}: {source}")]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DiskSearchError>;
