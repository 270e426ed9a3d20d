//! # Pipeline Module
//!
//! Wires the three stages to the two queues and runs them.
//!
//! ## Stages
//! 1. **Discover** - one thread walks the tree and enqueues directories
//! 2. **Match** - N threads list directories and enqueue matching files
//! 3. **Copy** - M threads copy matched files into the destination
//!
//! ## Shutdown
//! Nothing signals the workers directly. The discoverer releases its lease
//! on the directory queue when the walk ends; the matchers drain that queue
//! and release their leases on the results queue; the copiers drain the
//! results queue and return. Threads are joined in that order.

mod config;
mod executor;

pub use config::{SearchConfig, ValidatedConfig, DEFAULT_QUEUE_CAPACITY};
pub use executor::{CancelHandle, Pipeline, PipelineBuilder};
