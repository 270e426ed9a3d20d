//! # Discover Module
//!
//! The first stage: a single worker that walks the tree with walkdir and
//! feeds every directory, root included, to the matchers. Files are left
//! for the matchers to list.

use crate::core::queue::Producer;
use crate::error::ScanError;
use crate::events::{DiscoverEvent, Event, EventSender};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for the directory walk
#[derive(Debug, Clone, Default)]
pub struct DiscoverConfig {
    /// Whether to follow symbolic links to directories
    pub follow_symlinks: bool,
    /// Maximum depth below the root (None = unlimited)
    pub max_depth: Option<usize>,
    /// Directory whose subtree is never enqueued (the copy destination)
    pub exclude: Option<PathBuf>,
}

/// What the discoverer did
#[derive(Debug, Default)]
pub struct DiscoverStats {
    /// Directories enqueued, root included
    pub directories: usize,
    pub errors: Vec<ScanError>,
    /// Stopped because the directory queue was closed
    pub cancelled: bool,
}

/// The single worker of the discovery stage
#[derive(Debug, Clone)]
pub struct Discoverer {
    root: PathBuf,
    config: DiscoverConfig,
}

impl Discoverer {
    pub fn new(root: PathBuf, config: DiscoverConfig) -> Self {
        Self { root, config }
    }

    /// Enqueue the root and every directory below it, then release the lease.
    pub fn run(&self, directories: Producer<PathBuf>, events: &EventSender) -> DiscoverStats {
        let mut stats = DiscoverStats::default();
        debug!(root = %self.root.display(), "Discoverer started");
        events.send(Event::Discover(DiscoverEvent::Started {
            root: self.root.clone(),
        }));

        if self.offer(&directories, self.root.clone(), &mut stats, events) && self.root.is_dir() {
            self.walk(&directories, &mut stats, events);
        }

        directories.unregister();
        debug!(directories = stats.directories, "Discoverer finished");
        events.send(Event::Discover(DiscoverEvent::Completed {
            directories: stats.directories,
        }));
        stats
    }

    fn walk(&self, directories: &Producer<PathBuf>, stats: &mut DiscoverStats, events: &EventSender) {
        let mut walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(self.config.follow_symlinks);

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        // Only needed when following links: an alias reaches the same
        // directory through a second path.
        let mut visited = self.config.follow_symlinks.then(|| {
            let mut visited = HashSet::new();
            visited.insert(fs::canonicalize(&self.root).unwrap_or_else(|_| self.root.clone()));
            visited
        });

        let walker = walker
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry.path()));

        for entry_result in walker {
            match entry_result {
                Ok(entry) => {
                    if !entry.file_type().is_dir() {
                        continue;
                    }
                    if let Some(visited) = visited.as_mut() {
                        if let Ok(identity) = fs::canonicalize(entry.path()) {
                            if !visited.insert(identity) {
                                debug!(
                                    path = %entry.path().display(),
                                    "Skipping already discovered directory"
                                );
                                continue;
                            }
                        }
                    }
                    if !self.offer(directories, entry.into_path(), stats, events) {
                        return;
                    }
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    let error = match e.into_io_error() {
                        Some(io) => ScanError::from_io(path, io),
                        // Symlink loop; walkdir reports it without an io::Error.
                        None => ScanError::ReadDirectory {
                            source: std::io::Error::other("filesystem loop detected"),
                            path,
                        },
                    };

                    warn!(path = %error.path().display(), "{error}");
                    events.send(Event::Discover(DiscoverEvent::Error {
                        path: error.path().clone(),
                        message: error.to_string(),
                    }));
                    stats.errors.push(error);
                }
            }
        }
    }

    /// Returns false once the queue is closed.
    fn offer(
        &self,
        directories: &Producer<PathBuf>,
        path: PathBuf,
        stats: &mut DiscoverStats,
        events: &EventSender,
    ) -> bool {
        if directories.enqueue(path.clone()).is_err() {
            stats.cancelled = true;
            return false;
        }
        stats.directories += 1;
        events.send(Event::Discover(DiscoverEvent::DirectoryFound { path }));
        true
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.config
            .exclude
            .as_deref()
            .is_some_and(|excluded| path == excluded)
    }
}
