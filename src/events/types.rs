//! Event type definitions for diagnostics.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the search pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory discovery events
    Discover(DiscoverEvent),
    /// File matching events
    Match(MatchEvent),
    /// Copy events
    Copy(CopyEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events from the discovery stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DiscoverEvent {
    /// Walking has started at the given root
    Started { root: PathBuf },
    /// A directory was handed to the matchers
    DirectoryFound { path: PathBuf },
    /// A subtree could not be listed and was skipped
    Error { path: PathBuf, message: String },
    /// Walking finished
    Completed { directories: usize },
}

/// Events from the matching stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MatchEvent {
    /// A file name matched the pattern
    FileMatched { path: PathBuf },
    /// A directory or entry could not be read
    Error { path: PathBuf, message: String },
}

/// Events from the copy stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CopyEvent {
    /// A file was written to the destination
    Copied { source: PathBuf, destination: PathBuf },
    /// A file was left out because its name was taken
    Skipped { source: PathBuf },
    /// A file could not be copied
    Error { path: PathBuf, message: String },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// All workers were started
    Started,
    /// All workers finished
    Completed { summary: SearchSummary },
    /// The run was cancelled before every queue drained
    Cancelled,
}

/// Stages of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    Discover,
    Match,
    Copy,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Discover => write!(f, "discover"),
            PipelineStage::Match => write!(f, "match"),
            PipelineStage::Copy => write!(f, "copy"),
        }
    }
}

/// Final accounting of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSummary {
    /// Directories enqueued by the discoverer, root included
    pub directories_discovered: usize,
    /// Directories listed by the matchers
    pub directories_scanned: usize,
    /// Files whose name matched the pattern
    pub files_matched: usize,
    /// Files written to the destination
    pub files_copied: usize,
    /// Copies that needed a numbered name
    pub files_renamed: usize,
    /// Matches left out because their name was taken
    pub files_skipped: usize,
    /// Bytes written to the destination
    pub bytes_copied: u64,
    /// Non-fatal failures, in no particular order
    pub errors: Vec<String>,
    /// Whether the run was cancelled
    pub cancelled: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SearchSummary {
    /// Matched files that never reached the destination
    pub fn files_missed(&self) -> usize {
        self.files_matched
            .saturating_sub(self.files_copied + self.files_skipped)
    }
}
