//! Copying a single file into the destination directory.

use crate::error::CopyError;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// What to do when the destination already holds a file with the same name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Replace the existing file. The last copier to finish wins.
    Overwrite,
    /// Keep the existing file. The first copier to create the name wins.
    Skip,
    /// Write to `name (1).ext`, `name (2).ext`, ... instead
    #[default]
    Rename,
}

impl std::fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollisionPolicy::Overwrite => write!(f, "overwrite"),
            CollisionPolicy::Skip => write!(f, "skip"),
            CollisionPolicy::Rename => write!(f, "rename"),
        }
    }
}

/// Result of a successful [`copy_into`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Written under the source's own name
    Copied { destination: PathBuf, bytes: u64 },
    /// Written under a numbered name
    Renamed { destination: PathBuf, bytes: u64 },
    /// Not written; the name was already taken
    Skipped { existing: PathBuf },
}

/// Copy `source` into the `destination` directory under its base name.
pub fn copy_into(
    source: &Path,
    destination: &Path,
    policy: CollisionPolicy,
) -> Result<CopyOutcome, CopyError> {
    let file_name = source.file_name().ok_or_else(|| CopyError::NoFileName {
        path: source.to_path_buf(),
    })?;
    let target = destination.join(file_name);
    let io_error = |to: &Path, source_err: io::Error| CopyError::Io {
        from: source.to_path_buf(),
        to: to.to_path_buf(),
        source: source_err,
    };

    match policy {
        CollisionPolicy::Overwrite => {
            let bytes = fs::copy(source, &target).map_err(|e| io_error(&target, e))?;
            Ok(CopyOutcome::Copied {
                destination: target,
                bytes,
            })
        }
        CollisionPolicy::Skip => {
            let mut input = File::open(source).map_err(|e| io_error(&target, e))?;
            match create_new(&target) {
                Ok(output) => {
                    let bytes =
                        fill(&mut input, output, &target).map_err(|e| io_error(&target, e))?;
                    Ok(CopyOutcome::Copied {
                        destination: target,
                        bytes,
                    })
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    Ok(CopyOutcome::Skipped { existing: target })
                }
                Err(e) => Err(io_error(&target, e)),
            }
        }
        CollisionPolicy::Rename => {
            let mut input = File::open(source).map_err(|e| io_error(&target, e))?;
            let mut attempt = 0usize;
            loop {
                let candidate = if attempt == 0 {
                    target.clone()
                } else {
                    numbered(&target, attempt)
                };

                match create_new(&candidate) {
                    Ok(output) => {
                        let bytes = fill(&mut input, output, &candidate)
                            .map_err(|e| io_error(&candidate, e))?;
                        return Ok(if attempt == 0 {
                            CopyOutcome::Copied {
                                destination: candidate,
                                bytes,
                            }
                        } else {
                            CopyOutcome::Renamed {
                                destination: candidate,
                                bytes,
                            }
                        });
                    }
                    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                    Err(e) => return Err(io_error(&candidate, e)),
                }
            }
        }
    }
}

// Atomic with respect to other copiers racing for the same name.
fn create_new(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

fn fill(input: &mut File, mut output: File, path: &Path) -> io::Result<u64> {
    match io::copy(input, &mut output) {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            drop(output);
            let _ = fs::remove_file(path);
            Err(e)
        }
    }
}

/// `report.txt` -> `report (n).txt`
fn numbered(target: &Path, n: usize) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match target.extension() {
        Some(ext) => format!("{stem} ({n}).{}", ext.to_string_lossy()),
        None => format!("{stem} ({n})"),
    };
    target.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn copies_under_base_name() {
        let src = TempDir::new().unwrap();
        let file = source_file(&src, "report.txt", b"quarterly numbers");

        for policy in [
            CollisionPolicy::Overwrite,
            CollisionPolicy::Skip,
            CollisionPolicy::Rename,
        ] {
            let out = TempDir::new().unwrap();
            let outcome = copy_into(&file, out.path(), policy).unwrap();
            assert_eq!(
                outcome,
                CopyOutcome::Copied {
                    destination: out.path().join("report.txt"),
                    bytes: 17,
                }
            );
            assert_eq!(
                fs::read(out.path().join("report.txt")).unwrap(),
                b"quarterly numbers"
            );
        }
    }

    #[test]
    fn overwrite_replaces_existing() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let file = source_file(&src, "report.txt", b"new");
        fs::write(dest.path().join("report.txt"), b"old contents").unwrap();

        copy_into(&file, dest.path(), CollisionPolicy::Overwrite).unwrap();

        assert_eq!(fs::read(dest.path().join("report.txt")).unwrap(), b"new");
    }

    #[test]
    fn skip_keeps_existing() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let file = source_file(&src, "report.txt", b"new");
        fs::write(dest.path().join("report.txt"), b"old").unwrap();

        let outcome = copy_into(&file, dest.path(), CollisionPolicy::Skip).unwrap();

        assert!(matches!(outcome, CopyOutcome::Skipped { .. }));
        assert_eq!(fs::read(dest.path().join("report.txt")).unwrap(), b"old");
    }

    #[test]
    fn rename_picks_next_free_number() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let file = source_file(&src, "report.txt", b"third");
        fs::write(dest.path().join("report.txt"), b"first").unwrap();
        fs::write(dest.path().join("report (1).txt"), b"second").unwrap();

        let outcome = copy_into(&file, dest.path(), CollisionPolicy::Rename).unwrap();

        let expected = dest.path().join("report (2).txt");
        assert_eq!(
            outcome,
            CopyOutcome::Renamed {
                destination: expected.clone(),
                bytes: 5,
            }
        );
        assert_eq!(fs::read(expected).unwrap(), b"third");
        assert_eq!(fs::read(dest.path().join("report.txt")).unwrap(), b"first");
    }

    #[test]
    fn numbered_handles_missing_extension() {
        assert_eq!(
            numbered(Path::new("/out/README"), 3),
            PathBuf::from("/out/README (3)")
        );
        assert_eq!(
            numbered(Path::new("/out/archive.tar.gz"), 1),
            PathBuf::from("/out/archive.tar (1).gz")
        );
    }

    #[test]
    fn missing_source_is_an_error_and_leaves_nothing() {
        let dest = TempDir::new().unwrap();
        let result = copy_into(
            Path::new("/nonexistent/report.txt"),
            dest.path(),
            CollisionPolicy::Rename,
        );

        assert!(matches!(result, Err(CopyError::Io { .. })));
        assert!(!dest.path().join("report.txt").exists());
    }

    #[test]
    fn policy_display_matches_serde_name() {
        let json = serde_json::to_string(&CollisionPolicy::Rename).unwrap();
        assert_eq!(json, format!("\"{}\"", CollisionPolicy::Rename));
    }
}
