//! # Matcher Module
//!
//! The middle stage: lists one directory at a time (non-recursively) and
//! forwards files whose name matches the pattern.
//!
//! Each matcher holds one producer lease on the results queue for its whole
//! life. The copiers see end-of-stream only after every matcher has returned.

mod pattern;

pub use pattern::NamePattern;

use crate::core::queue::{BoundedQueue, Producer};
use crate::error::ScanError;
use crate::events::{Event, EventSender, MatchEvent};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A file selected for copying
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Size in bytes when it was matched
    pub size: u64,
}

/// What a single matcher did
#[derive(Debug, Default)]
pub struct MatchStats {
    pub directories_scanned: usize,
    pub files_matched: usize,
    pub errors: Vec<ScanError>,
    /// Stopped because the results queue was closed
    pub cancelled: bool,
}

/// One worker of the matcher pool
#[derive(Debug, Clone)]
pub struct Matcher {
    pattern: NamePattern,
}

impl Matcher {
    pub fn new(pattern: NamePattern) -> Self {
        Self { pattern }
    }

    /// Consume directories until end-of-stream, then release `results`.
    pub fn run(
        &self,
        directories: &BoundedQueue<PathBuf>,
        results: Producer<MatchedFile>,
        events: &EventSender,
    ) -> MatchStats {
        let mut stats = MatchStats::default();
        debug!(pattern = self.pattern.as_str(), "Matcher started");

        for dir in directories.drain() {
            stats.directories_scanned += 1;
            if !self.scan_directory(&dir, &results, &mut stats, events) {
                stats.cancelled = true;
                break;
            }
        }

        results.unregister();
        debug!(
            directories = stats.directories_scanned,
            matched = stats.files_matched,
            "Matcher finished"
        );
        stats
    }

    /// Returns false once the results queue is closed.
    fn scan_directory(
        &self,
        dir: &Path,
        results: &Producer<MatchedFile>,
        stats: &mut MatchStats,
        events: &EventSender,
    ) -> bool {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                record(stats, events, ScanError::from_io(dir.to_path_buf(), e));
                return true;
            }
        };

        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    record(stats, events, ScanError::from_io(dir.to_path_buf(), e));
                    continue;
                }
            };

            if !self.pattern.matches_path(&path) {
                continue;
            }

            // Follows symlinks, so a link to a regular file counts as one.
            let size = match fs::metadata(&path) {
                Ok(metadata) if metadata.is_file() => metadata.len(),
                Ok(_) => continue,
                Err(e) => {
                    record(stats, events, ScanError::from_io(path, e));
                    continue;
                }
            };

            events.send(Event::Match(MatchEvent::FileMatched { path: path.clone() }));
            if results.enqueue(MatchedFile { path, size }).is_err() {
                return false;
            }
            stats.files_matched += 1;
        }

        true
    }
}

fn record(stats: &mut MatchStats, events: &EventSender, error: ScanError) {
    warn!(path = %error.path().display(), "{error}");
    events.send(Event::Match(MatchEvent::Error {
        path: error.path().clone(),
        message: error.to_string(),
    }));
    stats.errors.push(error);
}
