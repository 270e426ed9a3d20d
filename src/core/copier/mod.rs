//! # Copier Module
//!
//! The final stage. Copiers are pure consumers of the results queue and
//! hold no lease. A failed copy is logged and the worker moves on to the
//! next file.

mod collision;

pub use collision::{copy_into, CollisionPolicy, CopyOutcome};

use crate::core::matcher::MatchedFile;
use crate::core::queue::BoundedQueue;
use crate::error::CopyError;
use crate::events::{CopyEvent, Event, EventSender};
use std::path::PathBuf;
use tracing::{debug, warn};

/// What a single copier did
#[derive(Debug, Default)]
pub struct CopyStats {
    pub files_copied: usize,
    pub files_renamed: usize,
    pub files_skipped: usize,
    pub bytes_copied: u64,
    pub errors: Vec<CopyError>,
}

/// One worker of the copier pool
#[derive(Debug, Clone)]
pub struct Copier {
    destination: PathBuf,
    policy: CollisionPolicy,
}

impl Copier {
    pub fn new(destination: PathBuf, policy: CollisionPolicy) -> Self {
        Self {
            destination,
            policy,
        }
    }

    /// Copy files until the results queue reports end-of-stream
    pub fn run(&self, results: &BoundedQueue<MatchedFile>, events: &EventSender) -> CopyStats {
        let mut stats = CopyStats::default();
        debug!(destination = %self.destination.display(), policy = %self.policy, "Copier started");

        for file in results.drain() {
            match copy_into(&file.path, &self.destination, self.policy) {
                Ok(CopyOutcome::Copied { destination, bytes }) => {
                    stats.files_copied += 1;
                    stats.bytes_copied += bytes;
                    copied(events, file.path, destination);
                }
                Ok(CopyOutcome::Renamed { destination, bytes }) => {
                    stats.files_copied += 1;
                    stats.files_renamed += 1;
                    stats.bytes_copied += bytes;
                    debug!(
                        source = %file.path.display(),
                        destination = %destination.display(),
                        "Name taken, copied under a numbered name"
                    );
                    copied(events, file.path, destination);
                }
                Ok(CopyOutcome::Skipped { existing }) => {
                    stats.files_skipped += 1;
                    debug!(
                        source = %file.path.display(),
                        existing = %existing.display(),
                        "Name taken, skipped"
                    );
                    events.send(Event::Copy(CopyEvent::Skipped { source: file.path }));
                }
                Err(error) => {
                    warn!(source = %file.path.display(), "{error}");
                    events.send(Event::Copy(CopyEvent::Error {
                        path: file.path,
                        message: error.to_string(),
                    }));
                    stats.errors.push(error);
                }
            }
        }

        debug!(copied = stats.files_copied, "Copier finished");
        stats
    }
}

fn copied(events: &EventSender, source: PathBuf, destination: PathBuf) {
    events.send(Event::Copy(CopyEvent::Copied {
        source,
        destination,
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::null_sender;
    use std::fs;
    use tempfile::TempDir;

    fn queue_of(files: Vec<MatchedFile>) -> BoundedQueue<MatchedFile> {
        let queue = BoundedQueue::new(files.len().max(1)).unwrap();
        let producer = queue.register_producer();
        for file in files {
            producer.enqueue(file).unwrap();
        }
        queue
    }

    #[test]
    fn failed_copy_does_not_stop_the_worker() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let good = src.path().join("good_report.txt");
        fs::write(&good, b"ok").unwrap();

        let results = queue_of(vec![
            MatchedFile {
                path: src.path().join("missing_report.txt"),
                size: 0,
            },
            MatchedFile {
                path: good,
                size: 2,
            },
        ]);

        let stats = Copier::new(dest.path().to_path_buf(), CollisionPolicy::Rename)
            .run(&results, &null_sender());

        assert_eq!(stats.errors.len(), 1);
        assert_eq!(stats.files_copied, 1);
        assert_eq!(stats.bytes_copied, 2);
        assert!(dest.path().join("good_report.txt").exists());
    }

    #[test]
    fn same_names_from_different_directories_are_kept() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        fs::write(first.path().join("report.txt"), b"one").unwrap();
        fs::write(second.path().join("report.txt"), b"two").unwrap();

        let results = queue_of(vec![
            MatchedFile {
                path: first.path().join("report.txt"),
                size: 3,
            },
            MatchedFile {
                path: second.path().join("report.txt"),
                size: 3,
            },
        ]);

        let stats = Copier::new(dest.path().to_path_buf(), CollisionPolicy::Rename)
            .run(&results, &null_sender());

        assert_eq!(stats.files_copied, 2);
        assert_eq!(stats.files_renamed, 1);
        assert_eq!(fs::read(dest.path().join("report.txt")).unwrap(), b"one");
        assert_eq!(fs::read(dest.path().join("report (1).txt")).unwrap(), b"two");
    }

    #[test]
    fn skip_policy_counts_skips() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        fs::write(src.path().join("report.txt"), b"new").unwrap();
        fs::write(dest.path().join("report.txt"), b"old").unwrap();

        let results = queue_of(vec![MatchedFile {
            path: src.path().join("report.txt"),
            size: 3,
        }]);

        let stats = Copier::new(dest.path().to_path_buf(), CollisionPolicy::Skip)
            .run(&results, &null_sender());

        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.files_copied, 0);
    }
}
