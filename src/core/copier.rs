//! Sequential copy of a filtered set into a flat target directory.

use super::{CopyStatus, CoreError, RecordHandle, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopySummary {
    pub success_count: usize,
    pub failure_count: usize,
}

/// Receives copy progress. Closures taking `(completed, total)` work as observers.
pub trait CopyObserver {
    /// Called once after every record, whether it was copied or not.
    fn on_progress(&mut self, completed: usize, total: usize);

    /// Called exactly once when the batch is done, including for an empty batch.
    fn on_complete(&mut self, _summary: &CopySummary) {}
}

impl<F> CopyObserver for F
where
    F: FnMut(usize, usize),
{
    fn on_progress(&mut self, completed: usize, total: usize) {
        self(completed, total)
    }
}

pub struct CopyEngine;

impl CopyEngine {
    /// Checks the user-supplied directories before any file is touched and
    /// returns the target to copy into.
    pub fn check_preconditions(source: Option<&Path>, target: Option<&Path>) -> Result<PathBuf> {
        let target = match target {
            Some(t) if !t.as_os_str().is_empty() => t,
            _ => return Err(CoreError::NoTarget),
        };
        if let Some(source) = source {
            if same_location(source, target) {
                return Err(CoreError::SameDirectory(target.to_path_buf()));
            }
        }
        Ok(target.to_path_buf())
    }

    /// Destination of `record`: the target directory joined with the record's
    /// file name. Files with equal names from different source folders map to
    /// the same destination and the later one overwrites the earlier.
    pub fn destination_for(record: &RecordHandle, target: &Path) -> PathBuf {
        target.join(record.name())
    }

    /// Copies every record in order, overwriting existing destinations.
    ///
    /// A failed copy is recorded on the record as `CopyStatus::Failed` and the
    /// batch continues. Only precondition violations return an error, and they
    /// do so before the first copy.
    pub fn copy_all<O>(
        records: &[RecordHandle],
        source: Option<&Path>,
        target: Option<&Path>,
        observer: &mut O,
    ) -> Result<CopySummary>
    where
        O: CopyObserver + ?Sized,
    {
        let target = Self::check_preconditions(source, target)?;
        let total = records.len();
        let mut summary = CopySummary::default();

        if total == 0 {
            tracing::info!("Nothing to copy");
            observer.on_complete(&summary);
            return Ok(summary);
        }

        tracing::info!("Copying {} files to {}", total, target.display());

        for (index, record) in records.iter().enumerate() {
            let destination = Self::destination_for(record, &target);
            match copy_record(record.path(), &destination) {
                Ok(()) => {
                    record.set_status(CopyStatus::Copied);
                    summary.success_count += 1;
                }
                Err(reason) => {
                    tracing::warn!(
                        "Failed to copy {} to {}: {}",
                        record.path().display(),
                        destination.display(),
                        reason
                    );
                    record.set_status(CopyStatus::Failed(reason));
                    summary.failure_count += 1;
                }
            }
            observer.on_progress(index + 1, total);
        }

        tracing::info!(
            "Copy finished: {} succeeded, {} failed",
            summary.success_count,
            summary.failure_count
        );
        observer.on_complete(&summary);
        Ok(summary)
    }
}

const SAME_FILE_REASON: &str = "source and destination are the same file";

/// Copies one file, overwriting `destination`. A file is never copied onto
/// itself, since `fs::copy` would truncate it before reading.
fn copy_record(source: &Path, destination: &Path) -> std::result::Result<(), String> {
    if same_location(source, destination) {
        return Err(SAME_FILE_REASON.to_string());
    }
    fs::copy(source, destination)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn same_location(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
