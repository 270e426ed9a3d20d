//! Pipeline execution implementation.

use super::config::{SearchConfig, ValidatedConfig};
use crate::core::copier::{CollisionPolicy, CopyStats, Copier};
use crate::core::discover::{DiscoverConfig, DiscoverStats, Discoverer};
use crate::core::matcher::{MatchStats, MatchedFile, Matcher};
use crate::core::queue::BoundedQueue;
use crate::error::{DiskSearchError, Result};
use crate::events::{null_sender, Event, EventSender, PipelineEvent, PipelineStage, SearchSummary};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{error, info};

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: SearchConfig,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    /// Set the file name pattern
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.pattern = pattern.into();
        self
    }

    /// Set the directory to search
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    /// Set the directory that receives copies
    pub fn destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.config.destination = destination.into();
        self
    }

    /// Set the number of matcher threads
    pub fn matchers(mut self, count: usize) -> Self {
        self.config.matchers = count;
        self
    }

    /// Set the number of copier threads
    pub fn copiers(mut self, count: usize) -> Self {
        self.config.copiers = count;
        self
    }

    /// Set the directory queue capacity
    pub fn directory_capacity(mut self, capacity: usize) -> Self {
        self.config.directory_capacity = capacity;
        self
    }

    /// Set the results queue capacity
    pub fn result_capacity(mut self, capacity: usize) -> Self {
        self.config.result_capacity = capacity;
        self
    }

    /// Set the destination collision policy
    pub fn on_collision(mut self, policy: CollisionPolicy) -> Self {
        self.config.on_collision = policy;
        self
    }

    /// Follow symbolic links while walking
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.follow_symlinks = follow;
        self
    }

    /// Limit the walk depth below the root
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration and create both queues.
    ///
    /// No thread is started; a configuration error leaves nothing running.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.validate()?;
        let directories = BoundedQueue::new(config.directory_capacity)?;
        let results = BoundedQueue::new(config.result_capacity)?;

        Ok(Pipeline {
            config,
            directories,
            results,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Stops a running pipeline from another thread
#[derive(Debug, Clone)]
pub struct CancelHandle {
    directories: BoundedQueue<PathBuf>,
    results: BoundedQueue<MatchedFile>,
}

impl CancelHandle {
    /// Close both queues.
    ///
    /// Blocked workers wake up, producers stop at their next enqueue and
    /// consumers stop at their next dequeue. Buffered items are dropped.
    pub fn cancel(&self) {
        self.directories.close();
        self.results.close();
    }

    /// Whether [`cancel`](Self::cancel) was called
    pub fn is_cancelled(&self) -> bool {
        self.directories.is_closed() || self.results.is_closed()
    }
}

/// The search pipeline: one discoverer, a pool of matchers and a pool of
/// copiers connected by two bounded queues.
pub struct Pipeline {
    config: ValidatedConfig,
    directories: BoundedQueue<PathBuf>,
    results: BoundedQueue<MatchedFile>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The validated configuration
    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Handle for stopping the run from another thread
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            directories: self.directories.clone(),
            results: self.results.clone(),
        }
    }

    /// Run the pipeline without events
    pub fn run(self) -> Result<SearchSummary> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(self, events: &EventSender) -> Result<SearchSummary> {
        let start_time = Instant::now();
        let config = &self.config;

        info!(
            root = %config.root.display(),
            destination = %config.destination.display(),
            pattern = config.pattern.as_str(),
            matchers = config.matchers,
            copiers = config.copiers,
            "Starting search"
        );

        // Every producer is registered before any consumer can dequeue, so
        // no consumer mistakes an early empty queue for end-of-stream.
        let discover_lease = self.directories.register_producer();
        let match_leases: Vec<_> = (0..config.matchers)
            .map(|_| self.results.register_producer())
            .collect();

        let mut workers = Workers::default();

        let discoverer = Discoverer::new(
            config.root.clone(),
            DiscoverConfig {
                follow_symlinks: config.follow_symlinks,
                max_depth: config.max_depth,
                exclude: Some(config.destination.clone()),
            },
        );
        let sender = events.clone();
        let spawned = spawn(PipelineStage::Discover, 0, move || {
            discoverer.run(discover_lease, &sender)
        })
        .map(|handle| workers.discover = Some(handle));
        self.bail_on_spawn_error(spawned, &mut workers)?;

        for (index, lease) in match_leases.into_iter().enumerate() {
            let matcher = Matcher::new(config.pattern.clone());
            let directories = self.directories.clone();
            let sender = events.clone();
            let spawned = spawn(PipelineStage::Match, index, move || {
                matcher.run(&directories, lease, &sender)
            })
            .map(|handle| workers.matchers.push(handle));
            self.bail_on_spawn_error(spawned, &mut workers)?;
        }

        for index in 0..config.copiers {
            let copier = Copier::new(config.destination.clone(), config.on_collision);
            let results = self.results.clone();
            let sender = events.clone();
            let spawned = spawn(PipelineStage::Copy, index, move || {
                copier.run(&results, &sender)
            })
            .map(|handle| workers.copiers.push(handle));
            self.bail_on_spawn_error(spawned, &mut workers)?;
        }

        events.send(Event::Pipeline(PipelineEvent::Started));

        let outcome = workers.join();
        let cancelled = self.cancel_handle().is_cancelled();

        if let Some(stage) = outcome.panicked {
            error!(%stage, "Worker panicked");
            return Err(DiskSearchError::WorkerPanicked { stage });
        }

        let mut summary = outcome.summary;
        summary.cancelled = cancelled;
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        if cancelled {
            events.send(Event::Pipeline(PipelineEvent::Cancelled));
        }
        info!(
            directories = summary.directories_discovered,
            matched = summary.files_matched,
            copied = summary.files_copied,
            errors = summary.errors.len(),
            duration_ms = summary.duration_ms,
            "Search finished"
        );
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: summary.clone(),
        }));

        Ok(summary)
    }

    /// On a failed spawn, stop the threads already running and report.
    fn bail_on_spawn_error(
        &self,
        spawned: Result<()>,
        workers: &mut Workers,
    ) -> Result<()> {
        if let Err(e) = spawned {
            self.cancel_handle().cancel();
            std::mem::take(workers).join();
            return Err(e);
        }
        Ok(())
    }
}

fn spawn<F, T>(stage: PipelineStage, index: usize, work: F) -> Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new()
        .name(format!("{stage}-{index}"))
        .spawn(work)
        .map_err(|source| DiskSearchError::Spawn { stage, source })
}

#[derive(Default)]
struct Workers {
    discover: Option<JoinHandle<DiscoverStats>>,
    matchers: Vec<JoinHandle<MatchStats>>,
    copiers: Vec<JoinHandle<CopyStats>>,
}

struct JoinOutcome {
    summary: SearchSummary,
    panicked: Option<PipelineStage>,
}

impl Workers {
    /// Join in dependency order and fold the per-worker stats together.
    fn join(self) -> JoinOutcome {
        let mut summary = SearchSummary::default();
        let mut panicked = None;

        if let Some(handle) = self.discover {
            match handle.join() {
                Ok(stats) => {
                    summary.directories_discovered += stats.directories;
                    summary
                        .errors
                        .extend(stats.errors.iter().map(ToString::to_string));
                }
                Err(_) => panicked = panicked.or(Some(PipelineStage::Discover)),
            }
        }

        for handle in self.matchers {
            match handle.join() {
                Ok(stats) => {
                    summary.directories_scanned += stats.directories_scanned;
                    summary.files_matched += stats.files_matched;
                    summary
                        .errors
                        .extend(stats.errors.iter().map(ToString::to_string));
                }
                Err(_) => panicked = panicked.or(Some(PipelineStage::Match)),
            }
        }

        for handle in self.copiers {
            match handle.join() {
                Ok(stats) => {
                    summary.files_copied += stats.files_copied;
                    summary.files_renamed += stats.files_renamed;
                    summary.files_skipped += stats.files_skipped;
                    summary.bytes_copied += stats.bytes_copied;
                    summary
                        .errors
                        .extend(stats.errors.iter().map(ToString::to_string));
                }
                Err(_) => panicked = panicked.or(Some(PipelineStage::Copy)),
            }
        }

        JoinOutcome { summary, panicked }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::events::{CopyEvent, EventChannel};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn build_rejects_invalid_config_before_running() {
        let result = Pipeline::builder()
            .pattern("x")
            .root("/nonexistent/path/12345")
            .destination("/nonexistent/out")
            .build();

        assert!(matches!(
            result,
            Err(DiskSearchError::Config(ConfigError::RootNotFound { .. }))
        ));
    }

    #[test]
    fn run_reports_events() {
        let root = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        fs::write(root.path().join("report.txt"), b"data").unwrap();

        let pipeline = Pipeline::builder()
            .pattern("report")
            .root(root.path())
            .destination(dest.path())
            .build()
            .unwrap();

        let (sender, receiver) = EventChannel::new();
        let summary = pipeline.run_with_events(&sender).unwrap();
        drop(sender);

        assert_eq!(summary.files_copied, 1);
        let events: Vec<_> = receiver.iter().collect();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::Copy(CopyEvent::Copied { .. }))));
        assert!(matches!(
            events.last(),
            Some(Event::Pipeline(PipelineEvent::Completed { .. }))
        ));
    }

    #[test]
    fn queues_are_drained_after_run() {
        let root = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        let pipeline = Pipeline::builder()
            .pattern("x")
            .root(root.path())
            .destination(dest.path())
            .matchers(3)
            .copiers(2)
            .build()
            .unwrap();
        let handle = pipeline.cancel_handle();

        pipeline.run().unwrap();

        assert!(handle.directories.is_done());
        assert!(handle.results.is_done());
        assert_eq!(handle.directories.producers(), 0);
        assert_eq!(handle.results.producers(), 0);
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn cancel_before_run_stops_every_stage() {
        let root = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        fs::create_dir(root.path().join("sub")).unwrap();
        fs::write(root.path().join("sub/report.txt"), b"data").unwrap();

        let pipeline = Pipeline::builder()
            .pattern("report")
            .root(root.path())
            .destination(dest.path())
            .build()
            .unwrap();
        pipeline.cancel_handle().cancel();

        let summary = pipeline.run().unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.directories_discovered, 0);
        assert_eq!(summary.files_copied, 0);
        assert!(!dest.path().join("report.txt").exists());
    }
}
