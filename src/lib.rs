//! # Disk Search
//!
//! Finds files whose names match a pattern and copies them into one
//! directory, using separate thread pools for walking, matching and copying.
//!
//! ## Architecture
//! - `core` - The queue and the three pipeline stages
//! - `events` - Best-effort diagnostics for any UI
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DiskSearchError, Result};

/// Initialize tracing for the binary.
///
/// `RUST_LOG` wins over `default_filter` when set. Returns false if a global
/// subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
