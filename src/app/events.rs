//! Defines the events a pipeline sends to whoever displays it.

use super::view_model::UiState;
use crate::core::scanner::ScanProgress;
use crate::core::CopySummary;

/// Events sent from the pipeline to the display side.
///
/// Events from one background unit arrive in the order they were produced:
/// every progress event precedes the matching completion event.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// A complete state update to re-render the view.
    StateUpdate(Box<UiState>),
    /// A progress update during a directory scan.
    ScanProgress(ScanProgress),
    /// The scan finished and the inventory holds `total` files.
    ScanComplete { total: usize },
    /// One more record has been processed by the copy engine.
    CopyProgress { completed: usize, total: usize },
    /// The copy finished. Sent exactly once per copy, also for an empty set.
    CopyComplete(CopySummary),
    /// An error message to be displayed to the user.
    ShowError(String),
}
