//! # Core Module
//!
//! The search engine, independent of any UI.
//!
//! ## Modules
//! - `queue` - Bounded queue with producer-counted end-of-stream
//! - `discover` - Walks the tree and feeds directories to the matchers
//! - `matcher` - Selects files by name pattern
//! - `copier` - Copies selected files into the destination
//! - `pipeline` - Validates configuration and runs the stages

pub mod copier;
pub mod discover;
pub mod matcher;
pub mod pipeline;
pub mod queue;

// Re-export commonly used types
pub use copier::CollisionPolicy;
pub use matcher::{MatchedFile, NamePattern};
pub use pipeline::{Pipeline, SearchConfig};
pub use queue::{BoundedQueue, Producer};
