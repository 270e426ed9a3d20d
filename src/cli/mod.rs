//! # CLI Module
//!
//! Command-line interface for disk-search.
//!
//! ## Usage
//! ```bash
//! # Copy every file whose name contains "report" using 4 matchers, 2 copiers
//! disk-search report ~/Documents ~/found 4 2
//!
//! # Keep the first file when names collide
//! disk-search report ~/Documents ~/found 4 2 --on-collision skip
//!
//! # JSON summary
//! disk-search report ~/Documents ~/found 4 2 --output json
//! ```

use clap::{Parser, ValueEnum};
use console::{style, Term};
use disk_search::core::pipeline::{Pipeline, DEFAULT_QUEUE_CAPACITY};
use disk_search::core::CollisionPolicy;
use disk_search::error::Result;
use disk_search::events::{CopyEvent, Event, EventChannel, MatchEvent, SearchSummary};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Disk Search - find files by name and copy them in parallel
#[derive(Parser, Debug)]
#[command(name = "disk-search")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Regular expression searched for in lowercased file names
    pattern: String,

    /// Directory to search
    root: PathBuf,

    /// Directory to copy matches into (created if missing)
    destination: PathBuf,

    /// Number of matcher threads
    matchers: usize,

    /// Number of copier threads
    copiers: usize,

    /// Capacity of the directory queue
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    dir_capacity: usize,

    /// Capacity of the results queue
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    result_capacity: usize,

    /// What to do when a file name already exists in the destination
    #[arg(long, default_value = "rename")]
    on_collision: OnCollision,

    /// Follow symbolic links while walking
    #[arg(long)]
    follow_symlinks: bool,

    /// Maximum depth below the root
    #[arg(long)]
    max_depth: Option<usize>,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnCollision {
    /// Replace the existing file
    Overwrite,
    /// Keep the existing file
    Skip,
    /// Copy under a numbered name (default)
    Rename,
}

impl From<OnCollision> for CollisionPolicy {
    fn from(policy: OnCollision) -> Self {
        match policy {
            OnCollision::Overwrite => CollisionPolicy::Overwrite,
            OnCollision::Skip => CollisionPolicy::Skip,
            OnCollision::Rename => CollisionPolicy::Rename,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON summary for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    disk_search::init_tracing(if cli.verbose { "debug" } else { "warn" });

    let pipeline = Pipeline::builder()
        .pattern(cli.pattern.as_str())
        .root(cli.root.clone())
        .destination(cli.destination.clone())
        .matchers(cli.matchers)
        .copiers(cli.copiers)
        .directory_capacity(cli.dir_capacity)
        .result_capacity(cli.result_capacity)
        .on_collision(cli.on_collision.into())
        .follow_symlinks(cli.follow_symlinks)
        .max_depth(cli.max_depth)
        .build()?;

    let term = Term::stderr();
    if matches!(cli.output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Disk Search").bold().cyan(),
            style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
    }

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(cli.output, OutputFormat::Pretty) {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || {
        let mut matched = 0usize;
        let mut copied = 0usize;
        for event in receiver.iter() {
            match event {
                Event::Match(MatchEvent::FileMatched { .. }) => matched += 1,
                Event::Copy(CopyEvent::Copied { .. }) => copied += 1,
                _ => continue,
            }
            if let Some(ref pb) = progress_clone {
                pb.set_message(format!("{matched} matched, {copied} copied"));
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let summary = result?;
    match cli.output {
        OutputFormat::Pretty => print_pretty_summary(&term, &summary, cli.verbose),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(())
}

fn print_pretty_summary(term: &Term, summary: &SearchSummary, verbose: bool) {
    let headline = if summary.cancelled {
        format!("{} Search cancelled", style("!").yellow().bold())
    } else {
        format!("{} Search complete", style("✓").green().bold())
    };
    term.write_line("").ok();
    term.write_line(&headline).ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} directories searched in {:.1}s",
        style(summary.directories_scanned).cyan(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} files matched",
        style(summary.files_matched).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} files copied ({})",
        style(summary.files_copied).cyan(),
        format_bytes(summary.bytes_copied)
    ))
    .ok();

    if summary.files_renamed > 0 {
        term.write_line(&format!(
            "  {} copied under a numbered name",
            style(summary.files_renamed).yellow()
        ))
        .ok();
    }
    if summary.files_skipped > 0 {
        term.write_line(&format!(
            "  {} skipped, name already taken",
            style(summary.files_skipped).yellow()
        ))
        .ok();
    }

    if !summary.errors.is_empty() {
        term.write_line(&format!(
            "  {} errors",
            style(summary.errors.len()).red()
        ))
        .ok();
        if verbose {
            for error in &summary.errors {
                term.write_line(&format!("    {} {}", style("○").dim(), error))
                    .ok();
            }
        }
    }

    let missed = summary.files_missed();
    if missed > 0 {
        term.write_line("").ok();
        term.write_line(&format!(
            "{}",
            style(format!("{missed} matched files were not copied.")).red()
        ))
        .ok();
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
