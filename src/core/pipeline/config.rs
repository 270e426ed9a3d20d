//! Run configuration and its validation.

use crate::core::copier::CollisionPolicy;
use crate::core::matcher::NamePattern;
use crate::error::ConfigError;
use crate::events::PipelineStage;
use std::fs;
use std::path::PathBuf;

/// Default capacity of both queues
pub const DEFAULT_QUEUE_CAPACITY: usize = 50;

/// Configuration for a search run
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Regular expression fragment matched against lowercased file names
    pub pattern: String,
    /// Directory to search
    pub root: PathBuf,
    /// Directory that receives the copies (created if missing)
    pub destination: PathBuf,
    /// Number of matcher threads
    pub matchers: usize,
    /// Number of copier threads
    pub copiers: usize,
    /// Capacity of the directory queue
    pub directory_capacity: usize,
    /// Capacity of the results queue
    pub result_capacity: usize,
    /// What to do with name collisions in the destination
    pub on_collision: CollisionPolicy,
    /// Whether the walk follows symbolic links
    pub follow_symlinks: bool,
    /// Maximum walk depth below the root (None = unlimited)
    pub max_depth: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            root: PathBuf::new(),
            destination: PathBuf::new(),
            matchers: 1,
            copiers: 1,
            directory_capacity: DEFAULT_QUEUE_CAPACITY,
            result_capacity: DEFAULT_QUEUE_CAPACITY,
            on_collision: CollisionPolicy::default(),
            follow_symlinks: false,
            max_depth: None,
        }
    }
}

/// A configuration that passed [`SearchConfig::validate`]
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub pattern: NamePattern,
    /// Canonical root directory
    pub root: PathBuf,
    /// Canonical destination directory
    pub destination: PathBuf,
    pub matchers: usize,
    pub copiers: usize,
    pub directory_capacity: usize,
    pub result_capacity: usize,
    pub on_collision: CollisionPolicy,
    pub follow_symlinks: bool,
    pub max_depth: Option<usize>,
}

impl SearchConfig {
    /// Check everything that can be checked before a thread starts.
    ///
    /// Creates the destination directory if it does not exist yet; nothing
    /// else touches the filesystem.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        if self.matchers == 0 {
            return Err(ConfigError::InvalidWorkerCount {
                stage: PipelineStage::Match,
                value: self.matchers,
            });
        }
        if self.copiers == 0 {
            return Err(ConfigError::InvalidWorkerCount {
                stage: PipelineStage::Copy,
                value: self.copiers,
            });
        }
        if self.directory_capacity == 0 {
            return Err(ConfigError::InvalidCapacity {
                queue: "directory",
                value: self.directory_capacity,
            });
        }
        if self.result_capacity == 0 {
            return Err(ConfigError::InvalidCapacity {
                queue: "results",
                value: self.result_capacity,
            });
        }

        let pattern = NamePattern::new(&self.pattern)?;

        if !self.root.exists() {
            return Err(ConfigError::RootNotFound {
                path: self.root.clone(),
            });
        }
        if !self.root.is_dir() {
            return Err(ConfigError::RootNotDirectory {
                path: self.root.clone(),
            });
        }
        let root = fs::canonicalize(&self.root).map_err(|_| ConfigError::RootNotFound {
            path: self.root.clone(),
        })?;

        if self.destination.exists() {
            if !self.destination.is_dir() {
                return Err(ConfigError::DestinationNotDirectory {
                    path: self.destination.clone(),
                });
            }
            if fs::canonicalize(&self.destination).ok().as_ref() == Some(&root) {
                return Err(ConfigError::DestinationIsRoot {
                    path: self.destination.clone(),
                });
            }
        }

        fs::create_dir_all(&self.destination).map_err(|source| {
            ConfigError::CreateDestination {
                path: self.destination.clone(),
                source,
            }
        })?;
        let destination = fs::canonicalize(&self.destination).map_err(|source| {
            ConfigError::CreateDestination {
                path: self.destination.clone(),
                source,
            }
        })?;

        Ok(ValidatedConfig {
            pattern,
            root,
            destination,
            matchers: self.matchers,
            copiers: self.copiers,
            directory_capacity: self.directory_capacity,
            result_capacity: self.result_capacity,
            on_collision: self.on_collision,
            follow_symlinks: self.follow_symlinks,
            max_depth: self.max_depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_for(root: &TempDir, dest: PathBuf) -> SearchConfig {
        SearchConfig {
            pattern: "report".to_string(),
            root: root.path().to_path_buf(),
            destination: dest,
            ..Default::default()
        }
    }

    #[test]
    fn default_capacities_match_reference() {
        let config = SearchConfig::default();
        assert_eq!(config.directory_capacity, 50);
        assert_eq!(config.result_capacity, 50);
        assert_eq!(config.on_collision, CollisionPolicy::Rename);
    }

    #[test]
    fn zero_workers_are_rejected() {
        let root = TempDir::new().unwrap();
        let mut config = config_for(&root, root.path().join("out"));

        config.matchers = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWorkerCount {
                stage: PipelineStage::Match,
                ..
            })
        ));

        config.matchers = 2;
        config.copiers = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWorkerCount {
                stage: PipelineStage::Copy,
                ..
            })
        ));
        assert!(!root.path().join("out").exists());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let root = TempDir::new().unwrap();
        let mut config = config_for(&root, root.path().join("out"));
        config.result_capacity = 0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCapacity { queue: "results", .. })
        ));
    }

    #[test]
    fn missing_root_is_rejected() {
        let dest = TempDir::new().unwrap();
        let config = SearchConfig {
            pattern: "x".to_string(),
            root: PathBuf::from("/nonexistent/path/12345"),
            destination: dest.path().join("out"),
            ..Default::default()
        };

        assert!(matches!(config.validate(), Err(ConfigError::RootNotFound { .. })));
        assert!(!dest.path().join("out").exists());
    }

    #[test]
    fn file_root_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();

        let config = SearchConfig {
            pattern: "x".to_string(),
            root: file,
            destination: temp_dir.path().join("out"),
            ..Default::default()
        };

        assert!(matches!(config.validate(), Err(ConfigError::RootNotDirectory { .. })));
    }

    #[test]
    fn destination_equal_to_root_is_rejected() {
        let root = TempDir::new().unwrap();
        let config = config_for(&root, root.path().to_path_buf());

        assert!(matches!(config.validate(), Err(ConfigError::DestinationIsRoot { .. })));
    }

    #[test]
    fn destination_file_is_rejected() {
        let root = TempDir::new().unwrap();
        let file = root.path().join("taken");
        fs::write(&file, b"x").unwrap();

        let config = config_for(&root, file);

        assert!(matches!(
            config.validate(),
            Err(ConfigError::DestinationNotDirectory { .. })
        ));
    }

    #[test]
    fn missing_destination_is_created() {
        let root = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let target = dest.path().join("nested/out");

        let validated = config_for(&root, target.clone()).validate().unwrap();

        assert!(target.is_dir());
        assert_eq!(validated.destination, fs::canonicalize(&target).unwrap());
    }

    #[test]
    fn invalid_pattern_is_rejected_before_destination_is_created() {
        let root = TempDir::new().unwrap();
        let mut config = config_for(&root, root.path().join("out"));
        config.pattern = "[".to_string();

        assert!(matches!(config.validate(), Err(ConfigError::InvalidPattern { .. })));
        assert!(!root.path().join("out").exists());
    }
}
