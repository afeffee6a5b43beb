pub mod copier;
pub mod error;
pub mod filter;
pub mod filtered_set;
pub mod pagination;
pub mod scanner;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Outcome of the most recent copy pass for a single record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CopyStatus {
    #[default]
    NotAttempted,
    Copied,
    Failed(String),
}

impl CopyStatus {
    pub fn is_copied(&self) -> bool {
        matches!(self, CopyStatus::Copied)
    }
}

/// Metadata for one scanned file plus its mutable copy outcome.
///
/// Everything except the status is captured once at scan time and never changes.
/// Records are shared as [`RecordHandle`]s so a status change made by the copy
/// engine is visible through the inventory and every filtered view at once.
#[derive(Debug)]
pub struct FileRecord {
    path: PathBuf,
    name: String,
    created: Option<DateTime<Local>>,
    modified: Option<DateTime<Local>>,
    status: Mutex<CopyStatus>,
}

/// Shared handle to a [`FileRecord`]. Identity is pointer identity.
pub type RecordHandle = Arc<FileRecord>;

impl FileRecord {
    pub fn new(
        path: PathBuf,
        created: Option<DateTime<Local>>,
        modified: Option<DateTime<Local>>,
    ) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            name,
            created,
            modified,
            status: Mutex::new(CopyStatus::NotAttempted),
        }
    }

    /// Builds a record from filesystem metadata. Timestamps the platform cannot
    /// report are left as `None`.
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> Self {
        let created = metadata.created().ok().map(DateTime::<Local>::from);
        let modified = metadata.modified().ok().map(DateTime::<Local>::from);
        Self::new(path, created, modified)
    }

    pub fn into_handle(self) -> RecordHandle {
        Arc::new(self)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created(&self) -> Option<DateTime<Local>> {
        self.created
    }

    pub fn modified(&self) -> Option<DateTime<Local>> {
        self.modified
    }

    pub fn status(&self) -> CopyStatus {
        self.lock_status().clone()
    }

    pub fn is_copied(&self) -> bool {
        self.lock_status().is_copied()
    }

    pub(crate) fn set_status(&self, status: CopyStatus) {
        *self.lock_status() = status;
    }

    fn lock_status(&self) -> MutexGuard<'_, CopyStatus> {
        // A poisoned status only means a panic happened mid-assignment of a plain enum.
        self.status.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Which background unit, if any, currently owns the pipeline collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    Scanning,
    Copying,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::Scanning => "scanning",
            Phase::Copying => "copying",
        };
        write!(f, "{s}")
    }
}

pub use copier::{CopyEngine, CopyObserver, CopySummary};
pub use error::{CoreError, Result};
pub use filter::{FilterCriteria, FilterEngine, NameMatch, TimeMatch};
pub use filtered_set::FilteredSet;
pub use pagination::{Navigation, Page, Paginator, DEFAULT_PAGE_SIZE};
pub use scanner::DirectoryScanner;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_derived_from_path() {
        let record = FileRecord::new(PathBuf::from("/photos/2023/IMG_20230101.jpg"), None, None);
        assert_eq!(record.name(), "IMG_20230101.jpg");
        assert_eq!(record.status(), CopyStatus::NotAttempted);
    }

    #[test]
    fn test_status_change_is_visible_through_every_handle() {
        let record = FileRecord::new(PathBuf::from("/a/b.txt"), None, None).into_handle();
        let other = Arc::clone(&record);

        record.set_status(CopyStatus::Failed("disk full".to_string()));

        assert_eq!(other.status(), CopyStatus::Failed("disk full".to_string()));
        assert!(Arc::ptr_eq(&record, &other));
    }
}
