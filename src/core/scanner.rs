//! Builds the inventory: one `FileRecord` per regular file below a root directory.

use super::{CoreError, FileRecord, RecordHandle, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use walkdir::WalkDir;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ScanProgress {
    pub files_scanned: usize,
}

const DEFAULT_PROGRESS_INTERVAL: usize = 250;

pub struct DirectoryScanner {
    progress_interval: usize,
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL)
    }
}

impl DirectoryScanner {
    /// `progress_interval` is the number of files between two progress reports.
    pub fn new(progress_interval: usize) -> Self {
        Self {
            progress_interval: progress_interval.max(1),
        }
    }

    /// Fails with `InvalidPath` unless `root` exists and is a directory.
    pub fn validate_root(root: &Path) -> Result<()> {
        match std::fs::metadata(root) {
            Ok(md) if md.is_dir() => Ok(()),
            _ => Err(CoreError::InvalidPath(root.to_path_buf())),
        }
    }

    pub fn scan(&self, root: &Path) -> Result<Vec<RecordHandle>> {
        self.scan_with_progress(root, |_| {})
    }

    /// Walks `root` recursively and captures every regular file in traversal order.
    ///
    /// The root is canonicalized first, so every record path is absolute even
    /// when `root` is relative.
    ///
    /// Symbolic links and entries that cannot be read are skipped without failing
    /// the scan. Metadata is captured once per file; records are never re-queried.
    pub fn scan_with_progress<F>(&self, root: &Path, mut progress: F) -> Result<Vec<RecordHandle>>
    where
        F: FnMut(ScanProgress),
    {
        Self::validate_root(root)?;
        let root = std::fs::canonicalize(root).map_err(|e| CoreError::Io(e, root.to_path_buf()))?;
        let root = root.as_path();
        tracing::info!("Scanning {}", root.display());

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    skipped += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(md) => md,
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", entry.path().display(), e);
                    skipped += 1;
                    continue;
                }
            };

            records.push(FileRecord::from_metadata(entry.into_path(), &metadata).into_handle());

            if records.len() % self.progress_interval == 0 {
                progress(ScanProgress {
                    files_scanned: records.len(),
                });
            }
        }

        progress(ScanProgress {
            files_scanned: records.len(),
        });

        tracing::info!(
            "Scan of {} complete: {} files, {} entries skipped",
            root.display(),
            records.len(),
            skipped
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, rel).unwrap();
        path
    }

    #[test]
    fn test_scan_counts_every_regular_file_recursively() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.txt");
        write(dir.path(), "sub/b.txt");
        write(dir.path(), "sub/deeper/c.jpg");
        fs::create_dir_all(dir.path().join("empty")).unwrap();

        let records = DirectoryScanner::default().scan(dir.path()).unwrap();

        assert_eq!(records.len(), 3);
        let mut names: Vec<_> = records.iter().map(|r| r.name().to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.jpg"]);
        assert!(records.iter().all(|r| r.path().is_absolute()));
        assert!(records.iter().all(|r| r.modified().is_some()));
    }

    #[test]
    fn test_relative_root_yields_absolute_paths() {
        // `tempdir_in(".")` returns a path relative to the working directory.
        let dir = tempfile::tempdir_in(".").unwrap();
        assert!(dir.path().is_relative());
        write(dir.path(), "nested/a.txt");

        let records = DirectoryScanner::default().scan(dir.path()).unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].path().is_absolute());
        assert_eq!(
            records[0].path(),
            fs::canonicalize(dir.path().join("nested/a.txt")).unwrap()
        );
    }

    #[test]
    fn test_scan_rejects_missing_root() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = DirectoryScanner::default().scan(&missing).unwrap_err();

        assert!(matches!(err, CoreError::InvalidPath(p) if p == missing));
    }

    #[test]
    fn test_scan_rejects_file_as_root() {
        let dir = tempdir().unwrap();
        let file = write(dir.path(), "plain.txt");

        let err = DirectoryScanner::default().scan(&file).unwrap_err();

        assert!(matches!(err, CoreError::InvalidPath(_)));
    }

    #[test]
    fn test_scan_of_empty_directory_is_empty() {
        let dir = tempdir().unwrap();
        let records = DirectoryScanner::default().scan(dir.path()).unwrap();
        assert!(records.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_symlinks() {
        let dir = tempdir().unwrap();
        let target = write(dir.path(), "real.txt");
        std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

        let records = DirectoryScanner::default().scan(dir.path()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "real.txt");
    }

    #[test]
    fn test_progress_reports_at_interval_and_at_end() {
        let dir = tempdir().unwrap();
        for i in 0..5 {
            write(dir.path(), &format!("f{i}.txt"));
        }

        let mut reports = Vec::new();
        DirectoryScanner::new(2)
            .scan_with_progress(dir.path(), |p| reports.push(p.files_scanned))
            .unwrap();

        assert_eq!(reports, vec![2, 4, 5]);
    }
}
