//! Defines the central, mutable state of the pipeline.

use crate::config::AppConfig;
use crate::core::scanner::ScanProgress;
use crate::core::{
    CoreError, CopySummary, FilterCriteria, FilteredSet, Page, Paginator, Phase, RecordHandle,
};
use std::path::PathBuf;

/// Holds the complete, mutable state of one triage session.
///
/// This struct is wrapped in an `Arc<Mutex<...>>` and passed to every command
/// and background task. Only one background unit may run at a time; `phase`
/// records which one and every mutating operation checks it first.
pub struct PipelineState {
    /// The application's configuration settings.
    pub config: AppConfig,
    /// The directory to scan.
    pub source_dir: Option<PathBuf>,
    /// The directory to copy into.
    pub target_dir: Option<PathBuf>,
    /// Every file found by the last scan.
    pub inventory: Vec<RecordHandle>,
    /// The records that passed the last filter, minus any removed since.
    pub filtered: FilteredSet,
    /// The criteria used for `filtered`.
    pub criteria: FilterCriteria,
    /// The displayed page, always within `0..=total_pages`.
    pub current_page: usize,
    /// The background unit currently running, if any.
    pub phase: Phase,
    /// The latest progress of a running scan.
    pub scan_progress: ScanProgress,
    /// `(completed, total)` of the running or last copy.
    pub copy_progress: (usize, usize),
    /// Summary of the last completed copy.
    pub last_copy: Option<CopySummary>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl PipelineState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            source_dir: config.last_source_directory.clone(),
            target_dir: config.last_target_directory.clone(),
            config,
            inventory: Vec::new(),
            filtered: FilteredSet::default(),
            criteria: FilterCriteria::default(),
            current_page: 0,
            phase: Phase::Idle,
            scan_progress: ScanProgress { files_scanned: 0 },
            copy_progress: (0, 0),
            last_copy: None,
        }
    }

    /// Fails with `Busy` while a scan or copy is running.
    pub fn ensure_idle(&self) -> Result<(), CoreError> {
        match self.phase {
            Phase::Idle => Ok(()),
            busy => Err(CoreError::Busy(busy)),
        }
    }

    pub fn paginator(&self) -> Paginator {
        Paginator::new(self.config.page_size)
    }

    /// Installs a fresh inventory. The previous filtered set referenced the old
    /// records and is discarded.
    pub fn replace_inventory(&mut self, records: Vec<RecordHandle>) {
        self.inventory = records;
        self.filtered.clear();
        self.current_page = 0;
        self.last_copy = None;
    }

    pub fn set_filtered(&mut self, criteria: FilterCriteria, filtered: FilteredSet) {
        self.criteria = criteria;
        self.filtered = filtered;
        self.go_to_page(1);
    }

    /// Moves to `requested`, clamped to an existing page. Returns the page shown.
    pub fn go_to_page(&mut self, requested: usize) -> usize {
        let total = self.total_pages();
        self.current_page = Paginator::clamp(requested, total);
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.paginator().total_pages(self.filtered.len())
    }

    pub fn current_page_view(&self) -> Page<'_> {
        self.paginator().page(&self.filtered, self.current_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FileRecord;

    fn records(count: usize) -> Vec<RecordHandle> {
        (0..count)
            .map(|i| FileRecord::new(PathBuf::from(format!("/src/{i}.txt")), None, None).into_handle())
            .collect()
    }

    #[test]
    fn test_replace_inventory_invalidates_filtered_set() {
        let mut state = PipelineState::default();
        let first = records(3);
        state.replace_inventory(first.clone());
        state.set_filtered(FilterCriteria::default(), FilteredSet::from_records(first));
        assert_eq!(state.current_page, 1);

        state.replace_inventory(records(5));

        assert_eq!(state.inventory.len(), 5);
        assert!(state.filtered.is_empty());
        assert_eq!(state.current_page, 0);
    }

    #[test]
    fn test_busy_phase_is_rejected() {
        let mut state = PipelineState::default();
        state.phase = Phase::Copying;

        assert!(matches!(state.ensure_idle(), Err(CoreError::Busy(Phase::Copying))));
    }

    #[test]
    fn test_go_to_page_clamps() {
        let mut state = PipelineState::default();
        let all = records(45);
        state.set_filtered(FilterCriteria::default(), FilteredSet::from_records(all));

        assert_eq!(state.go_to_page(99), 3);
        assert_eq!(state.current_page_view().items.len(), 5);
        assert_eq!(state.go_to_page(0), 1);
    }
}
