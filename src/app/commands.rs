//! Contains the interactive operations of the pipeline.
//!
//! Each function locks the `PipelineState`, applies one user action through the
//! `core` logic and sends a `StateUpdate` back to the display side. Actions that
//! would race a running scan or copy are rejected with `CoreError::Busy`.

use super::helpers::{lock_state, with_state_and_notify};
use super::proxy::EventProxy;
use super::state::PipelineState;
use crate::core::{CoreError, FilterCriteria, FilterEngine, Navigation, Paginator};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Records the directory chosen in the source picker. `None` means the user
/// cancelled the picker and leaves the previous choice in place.
pub fn select_source<P: EventProxy>(
    path: Option<PathBuf>,
    proxy: P,
    state: Arc<Mutex<PipelineState>>,
) -> Result<(), CoreError> {
    with_state_and_notify(&state, &proxy, |s| {
        s.ensure_idle()?;
        match path {
            Some(path) => {
                let path = absolute_directory(path);
                tracing::info!("Source directory set to {}", path.display());
                s.config.last_source_directory = Some(path.clone());
                s.source_dir = Some(path);
            }
            None => tracing::info!("User cancelled source directory selection."),
        }
        Ok(())
    })
}

/// Records the directory chosen in the target picker.
pub fn select_target<P: EventProxy>(
    path: Option<PathBuf>,
    proxy: P,
    state: Arc<Mutex<PipelineState>>,
) -> Result<(), CoreError> {
    with_state_and_notify(&state, &proxy, |s| {
        s.ensure_idle()?;
        match path {
            Some(path) => {
                let path = absolute_directory(path);
                tracing::info!("Target directory set to {}", path.display());
                s.config.last_target_directory = Some(path.clone());
                s.target_dir = Some(path);
            }
            None => tracing::info!("User cancelled target directory selection."),
        }
        Ok(())
    })
}

/// Resolves a picked directory to an absolute path. A path that does not exist
/// yet is kept as given and reported by the scan or the copy.
fn absolute_directory(path: PathBuf) -> PathBuf {
    std::fs::canonicalize(&path).unwrap_or(path)
}

/// Filters the inventory with `criteria` and shows the first page.
///
/// Returns the size of the new filtered set. An invalid date range leaves the
/// previous filtered set untouched.
pub fn apply_filter<P: EventProxy>(
    criteria: FilterCriteria,
    proxy: P,
    state: Arc<Mutex<PipelineState>>,
) -> Result<usize, CoreError> {
    with_state_and_notify(&state, &proxy, |s| {
        s.ensure_idle()?;
        if s.inventory.is_empty() {
            return Err(CoreError::NothingScanned);
        }
        let filtered = FilterEngine::apply(&s.inventory, &criteria)?;
        let count = filtered.len();
        s.set_filtered(criteria, filtered);
        Ok(count)
    })
}

/// Jumps to `page`, clamped to the existing pages. Returns the page shown.
pub fn go_to_page<P: EventProxy>(
    page: usize,
    proxy: P,
    state: Arc<Mutex<PipelineState>>,
) -> usize {
    with_state_and_notify(&state, &proxy, |s| s.go_to_page(page))
}

/// Applies a first/previous/next/last action. Returns the page shown.
pub fn navigate<P: EventProxy>(
    nav: Navigation,
    proxy: P,
    state: Arc<Mutex<PipelineState>>,
) -> usize {
    with_state_and_notify(&state, &proxy, |s| {
        let target = Paginator::navigate(nav, s.current_page, s.total_pages());
        s.go_to_page(target)
    })
}

/// Removes the record at `path` from the filtered set only. Stays on the
/// current page if it still exists. Returns `false` if no such record is listed.
pub fn remove_record<P: EventProxy>(
    path: &Path,
    proxy: P,
    state: Arc<Mutex<PipelineState>>,
) -> Result<bool, CoreError> {
    with_state_and_notify(&state, &proxy, |s| {
        s.ensure_idle()?;
        let Some(record) = s.filtered.find_by_path(path).cloned() else {
            tracing::debug!("No listed record for {}", path.display());
            return Ok(false);
        };
        let removed = s.filtered.remove_one(&record);
        let page = s.current_page;
        s.go_to_page(page);
        Ok(removed)
    })
}

/// Removes every copied record from the filtered set and returns to page 1.
/// Returns the number of records removed.
pub fn remove_all_copied<P: EventProxy>(
    proxy: P,
    state: Arc<Mutex<PipelineState>>,
) -> Result<usize, CoreError> {
    with_state_and_notify(&state, &proxy, |s| {
        s.ensure_idle()?;
        let removed = s.filtered.remove_all_copied();
        tracing::info!("Removed {} copied files from the list", removed);
        s.go_to_page(1);
        Ok(removed)
    })
}

/// The absolute path of the `index`-th item on the current page.
pub fn selected_path(index: usize, state: &Arc<Mutex<PipelineState>>) -> Option<PathBuf> {
    let state_guard = lock_state(state);
    let page = state_guard.current_page_view();
    page.items.get(index).map(|r| r.path().to_path_buf())
}

/// Opens `path` with the platform's default application.
pub fn open_record(path: &Path) -> Result<(), CoreError> {
    tracing::info!("Opening {}", path.display());
    open::that(path).map_err(|e| CoreError::Io(e, path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::events::PipelineEvent;
    use crate::core::{CopyStatus, FileRecord, Phase, RecordHandle};
    use tokio::sync::mpsc;

    fn harness(count: usize) -> (
        mpsc::UnboundedSender<PipelineEvent>,
        mpsc::UnboundedReceiver<PipelineEvent>,
        Arc<Mutex<PipelineState>>,
        Vec<RecordHandle>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let records: Vec<RecordHandle> = (0..count)
            .map(|i| FileRecord::new(PathBuf::from(format!("/src/f{i:02}.txt")), None, None).into_handle())
            .collect();
        let mut state = PipelineState::default();
        state.replace_inventory(records.clone());
        (tx, rx, Arc::new(Mutex::new(state)), records)
    }

    fn last_state_update(rx: &mut mpsc::UnboundedReceiver<PipelineEvent>) -> Option<Box<crate::app::view_model::UiState>> {
        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            if let PipelineEvent::StateUpdate(ui) = event {
                last = Some(ui);
            }
        }
        last
    }

    #[test]
    fn test_apply_filter_without_inventory_is_rejected() {
        let (tx, _rx, state, _) = harness(0);

        let err = apply_filter(FilterCriteria::default(), tx, state).unwrap_err();

        assert!(matches!(err, CoreError::NothingScanned));
    }

    #[test]
    fn test_apply_filter_shows_first_page() {
        let (tx, mut rx, state, _) = harness(45);

        let count = apply_filter(FilterCriteria::default(), tx, state.clone()).unwrap();

        assert_eq!(count, 45);
        let ui = last_state_update(&mut rx).unwrap();
        assert_eq!(ui.page_label, "1 / 3");
        assert_eq!(ui.items.len(), 20);
    }

    #[test]
    fn test_invalid_range_keeps_previous_filter() {
        let (tx, _rx, state, _) = harness(3);
        apply_filter(FilterCriteria::default(), tx.clone(), state.clone()).unwrap();

        let criteria = FilterCriteria {
            start: chrono::NaiveDate::from_ymd_opt(2024, 3, 2),
            end: chrono::NaiveDate::from_ymd_opt(2024, 3, 1),
            by_modified: true,
            ..Default::default()
        };
        let err = apply_filter(criteria, tx, state.clone()).unwrap_err();

        assert!(matches!(err, CoreError::InvalidRange { .. }));
        assert_eq!(state.lock().unwrap().filtered.len(), 3);
    }

    #[test]
    fn test_navigation_stays_in_range() {
        let (tx, _rx, state, _) = harness(45);
        apply_filter(FilterCriteria::default(), tx.clone(), state.clone()).unwrap();

        assert_eq!(navigate(Navigation::Previous, tx.clone(), state.clone()), 1);
        assert_eq!(navigate(Navigation::Next, tx.clone(), state.clone()), 2);
        assert_eq!(navigate(Navigation::Last, tx.clone(), state.clone()), 3);
        assert_eq!(navigate(Navigation::Next, tx.clone(), state.clone()), 3);
        assert_eq!(navigate(Navigation::First, tx.clone(), state.clone()), 1);
        assert_eq!(go_to_page(99, tx, state), 3);
    }

    #[test]
    fn test_remove_record_on_last_page_moves_back() {
        let (tx, _rx, state, records) = harness(21);
        apply_filter(FilterCriteria::default(), tx.clone(), state.clone()).unwrap();
        go_to_page(2, tx.clone(), state.clone());

        let removed = remove_record(records[20].path(), tx, state.clone()).unwrap();

        assert!(removed);
        let s = state.lock().unwrap();
        assert_eq!(s.current_page, 1);
        assert_eq!(s.filtered.len(), 20);
        assert_eq!(s.inventory.len(), 21);
    }

    #[test]
    fn test_remove_unknown_record_is_noop() {
        let (tx, _rx, state, _) = harness(2);
        apply_filter(FilterCriteria::default(), tx.clone(), state.clone()).unwrap();

        let removed = remove_record(Path::new("/elsewhere/x"), tx, state.clone()).unwrap();

        assert!(!removed);
        assert_eq!(state.lock().unwrap().filtered.len(), 2);
    }

    #[test]
    fn test_remove_all_copied_returns_to_first_page() {
        let (tx, _rx, state, records) = harness(45);
        apply_filter(FilterCriteria::default(), tx.clone(), state.clone()).unwrap();
        go_to_page(3, tx.clone(), state.clone());
        for record in records.iter().take(30) {
            record.set_status(CopyStatus::Copied);
        }

        let removed = remove_all_copied(tx, state.clone()).unwrap();

        assert_eq!(removed, 30);
        let s = state.lock().unwrap();
        assert_eq!(s.current_page, 1);
        assert_eq!(s.filtered.get(0).unwrap().name(), "f30.txt");
    }

    #[test]
    fn test_commands_rejected_while_busy() {
        let (tx, _rx, state, _) = harness(2);
        state.lock().unwrap().phase = Phase::Scanning;

        assert!(matches!(
            apply_filter(FilterCriteria::default(), tx.clone(), state.clone()),
            Err(CoreError::Busy(Phase::Scanning))
        ));
        assert!(matches!(
            remove_all_copied(tx.clone(), state.clone()),
            Err(CoreError::Busy(_))
        ));
        assert!(select_source(Some(PathBuf::from("/x")), tx, state).is_err());
    }

    #[test]
    fn test_cancelled_picker_keeps_previous_selection() {
        let (tx, _rx, state, _) = harness(0);
        select_target(Some(PathBuf::from("/backup")), tx.clone(), state.clone()).unwrap();

        select_target(None, tx, state.clone()).unwrap();

        assert_eq!(state.lock().unwrap().target_dir, Some(PathBuf::from("/backup")));
    }

    #[test]
    fn test_relative_source_is_stored_absolute() {
        let (tx, _rx, state, _) = harness(0);

        select_source(Some(PathBuf::from(".")), tx, state.clone()).unwrap();

        let s = state.lock().unwrap();
        let source = s.source_dir.clone().unwrap();
        assert!(source.is_absolute());
        assert_eq!(s.config.last_source_directory, Some(source));
    }

    #[test]
    fn test_selected_path_indexes_current_page() {
        let (tx, _rx, state, _) = harness(25);
        apply_filter(FilterCriteria::default(), tx.clone(), state.clone()).unwrap();
        go_to_page(2, tx, state.clone());

        assert_eq!(selected_path(0, &state), Some(PathBuf::from("/src/f20.txt")));
        assert_eq!(selected_path(5, &state), None);
    }
}
