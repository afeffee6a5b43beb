//! Responsible for transforming the `PipelineState` into a `UiState` view model.
//!
//! This module acts as a presentation layer: it cuts the current page out of the
//! filtered set and renders every field a list or grid view needs as text.

use crate::core::{CopyStatus, CopySummary, FileRecord, Phase};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt::Write;

use super::state::PipelineState;

const FALLBACK_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A serializable representation of the pipeline state for display.
#[derive(Serialize, Clone, Debug)]
pub struct UiState {
    pub source_dir: Option<String>,
    pub target_dir: Option<String>,
    pub items: Vec<RecordView>,
    pub page: usize,
    pub total_pages: usize,
    pub page_label: String,
    pub inventory_count: usize,
    pub filtered_count: usize,
    pub phase: Phase,
    pub status_message: String,
    pub last_copy: Option<CopySummary>,
}

/// One record as shown in a row or tile.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct RecordView {
    pub path: String,
    pub name: String,
    pub created: String,
    pub modified: String,
    pub status: String,
}

/// Creates the complete `UiState` from the current `PipelineState`.
pub fn generate_ui_state(state: &PipelineState) -> UiState {
    let page = state.current_page_view();
    let format = state.config.timestamp_format.as_str();

    let items = page
        .items
        .iter()
        .map(|record| record_view(record, format))
        .collect();

    let status_message = match state.phase {
        Phase::Scanning => format!(
            "Scanning... {} files found",
            state.scan_progress.files_scanned
        ),
        Phase::Copying => format!(
            "Copying... {} / {}",
            state.copy_progress.0, state.copy_progress.1
        ),
        Phase::Idle => match &state.last_copy {
            Some(summary) => format!(
                "Copy complete. Succeeded: {} Failed: {}",
                summary.success_count, summary.failure_count
            ),
            None => format!("Scanned files: {}", state.inventory.len()),
        },
    };

    UiState {
        source_dir: state.source_dir.as_ref().map(|p| p.display().to_string()),
        target_dir: state.target_dir.as_ref().map(|p| p.display().to_string()),
        items,
        page: page.page,
        total_pages: page.total_pages,
        page_label: format!("{} / {}", page.page, page.total_pages),
        inventory_count: state.inventory.len(),
        filtered_count: state.filtered.len(),
        phase: state.phase,
        status_message,
        last_copy: state.last_copy,
    }
}

pub fn record_view(record: &FileRecord, timestamp_format: &str) -> RecordView {
    RecordView {
        path: record.path().display().to_string(),
        name: record.name().to_string(),
        created: format_timestamp(record.created(), timestamp_format),
        modified: format_timestamp(record.modified(), timestamp_format),
        status: status_label(&record.status()),
    }
}

/// Renders `timestamp` with a `chrono` format string. A missing timestamp is
/// rendered empty; an unusable format string falls back to the default one.
pub fn format_timestamp(timestamp: Option<DateTime<Local>>, format: &str) -> String {
    let Some(ts) = timestamp else {
        return String::new();
    };
    let mut out = String::new();
    if write!(out, "{}", ts.format(format)).is_err() {
        out.clear();
        let _ = write!(out, "{}", ts.format(FALLBACK_TIMESTAMP_FORMAT));
    }
    out
}

pub fn status_label(status: &CopyStatus) -> String {
    match status {
        CopyStatus::NotAttempted => String::new(),
        CopyStatus::Copied => "copied".to_string(),
        CopyStatus::Failed(reason) => format!("failed: {reason}"),
    }
}
