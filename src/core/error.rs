//! Defines the custom error type for the `core` module.

use super::Phase;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Every variant except `Io`, `NoRuntime` and `Join` is a precondition failure that is
/// reported before any background work starts, so the caller can ask the user
/// to correct the input. Failures of individual file copies are not errors; they
/// are recorded on the record as `CopyStatus::Failed`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The scan root does not exist or is not a directory.
    #[error("Path is not a valid directory: {0}")]
    InvalidPath(PathBuf),

    /// The filter's end date lies before its start date.
    #[error("End date {end} must not be earlier than start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// No copy target has been selected.
    #[error("No target directory selected")]
    NoTarget,

    /// The copy target is the scanned source directory.
    #[error("Target directory must differ from the source directory: {0}")]
    SameDirectory(PathBuf),

    /// No source directory has been selected.
    #[error("No source directory selected")]
    NoSource,

    /// Filtering was requested before a scan produced any files.
    #[error("Nothing scanned yet, or the scan found no files")]
    NothingScanned,

    /// A scan or copy is still running.
    #[error("Another operation is in progress ({0})")]
    Busy(Phase),

    /// Represents an I/O error, typically from file system operations.
    #[error("I/O error for path {1}: {0}")]
    Io(#[source] std::io::Error, PathBuf),

    /// Background work was requested outside a Tokio runtime.
    #[error("No Tokio runtime to run background work on: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// Represents an error that occurred when a Tokio task was joined.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl CoreError {
    /// `true` for errors the user can fix by changing their input.
    pub fn is_user_input(&self) -> bool {
        !matches!(
            self,
            CoreError::Io(..) | CoreError::NoRuntime(_) | CoreError::Join(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
