//! Background units of work: the scan and the copy.
//!
//! Both entry points check their preconditions while holding the state lock and
//! return those errors synchronously. Calling them outside a Tokio runtime is
//! one of those errors. Only when the checks pass do they mark
//! the pipeline busy and spawn the work, so a rejected request never leaves the
//! pipeline half-run.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::events::PipelineEvent;
use super::helpers::{lock_state, notify};
use super::proxy::EventProxy;
use super::state::PipelineState;

use crate::core::scanner::ScanProgress;
use crate::core::{CopyEngine, CoreError, DirectoryScanner, Phase, RecordHandle};

/// Starts scanning the selected source directory.
///
/// On completion the inventory is replaced and the filtered set cleared, then
/// `ScanComplete` is sent. The returned handle resolves once that has happened.
pub fn start_scan<P: EventProxy>(
    proxy: P,
    state: Arc<Mutex<PipelineState>>,
) -> Result<JoinHandle<()>, CoreError> {
    let (root, interval, runtime) = {
        let mut state_guard = lock_state(&state);
        state_guard.ensure_idle()?;
        let root = state_guard.source_dir.clone().ok_or(CoreError::NoSource)?;
        DirectoryScanner::validate_root(&root)?;
        let runtime = Handle::try_current()?;

        state_guard.phase = Phase::Scanning;
        state_guard.scan_progress = ScanProgress { files_scanned: 0 };
        notify(&state_guard, &proxy);
        (root, state_guard.config.scan_progress_interval, runtime)
    };

    tracing::info!("Spawning scan task for {}", root.display());
    Ok(runtime.spawn(async move {
        scan_directory_task(proxy, state, root, interval).await;
    }))
}

async fn scan_directory_task<P: EventProxy>(
    proxy: P,
    state: Arc<Mutex<PipelineState>>,
    root: PathBuf,
    interval: usize,
) {
    let progress_proxy = proxy.clone();
    let progress_state = state.clone();
    let scan_result = tokio::task::spawn_blocking(move || {
        DirectoryScanner::new(interval).scan_with_progress(&root, |progress| {
            lock_state(&progress_state).scan_progress = progress.clone();
            progress_proxy.send_event(PipelineEvent::ScanProgress(progress));
        })
    })
    .await
    .unwrap_or_else(|e| Err(CoreError::from(e)));

    let mut state_guard = lock_state(&state);
    state_guard.phase = Phase::Idle;

    match scan_result {
        Ok(records) => {
            let total = records.len();
            state_guard.replace_inventory(records);
            tracing::info!("Scan task finished with {} files", total);
            proxy.send_event(PipelineEvent::ScanComplete { total });
        }
        Err(e) => {
            tracing::error!("Scan failed: {}", e);
            proxy.send_event(PipelineEvent::ShowError(format!("Scan failed: {e}")));
        }
    }
    notify(&state_guard, &proxy);
}

/// Starts copying the filtered set into the selected target directory.
///
/// Progress arrives as `CopyProgress` after every record and the run ends with
/// exactly one `CopyComplete`, also when the filtered set is empty.
pub fn start_copy<P: EventProxy>(
    proxy: P,
    state: Arc<Mutex<PipelineState>>,
) -> Result<JoinHandle<()>, CoreError> {
    let (records, source, target, runtime) = {
        let mut state_guard = lock_state(&state);
        state_guard.ensure_idle()?;
        let target = CopyEngine::check_preconditions(
            state_guard.source_dir.as_deref(),
            state_guard.target_dir.as_deref(),
        )?;
        let runtime = Handle::try_current()?;
        let records = state_guard.filtered.as_slice().to_vec();

        state_guard.phase = Phase::Copying;
        state_guard.copy_progress = (0, records.len());
        state_guard.last_copy = None;
        notify(&state_guard, &proxy);
        (records, state_guard.source_dir.clone(), target, runtime)
    };

    tracing::info!("Spawning copy task for {} files", records.len());
    Ok(runtime.spawn(async move {
        copy_files_task(proxy, state, records, source, target).await;
    }))
}

async fn copy_files_task<P: EventProxy>(
    proxy: P,
    state: Arc<Mutex<PipelineState>>,
    records: Vec<RecordHandle>,
    source: Option<PathBuf>,
    target: PathBuf,
) {
    let progress_proxy = proxy.clone();
    let progress_state = state.clone();
    let copy_result = tokio::task::spawn_blocking(move || {
        CopyEngine::copy_all(
            &records,
            source.as_deref(),
            Some(target.as_path()),
            &mut |completed: usize, total: usize| {
                lock_state(&progress_state).copy_progress = (completed, total);
                progress_proxy.send_event(PipelineEvent::CopyProgress { completed, total });
            },
        )
    })
    .await
    .unwrap_or_else(|e| Err(CoreError::from(e)));

    let mut state_guard = lock_state(&state);
    state_guard.phase = Phase::Idle;

    match copy_result {
        Ok(summary) => {
            state_guard.last_copy = Some(summary);
            proxy.send_event(PipelineEvent::CopyComplete(summary));
        }
        Err(e) => {
            tracing::error!("Copy failed: {}", e);
            proxy.send_event(PipelineEvent::ShowError(format!("Copy failed: {e}")));
        }
    }
    notify(&state_guard, &proxy);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::events::PipelineEvent;
    use tokio::sync::mpsc;

    fn state_with_dirs() -> (tempfile::TempDir, tempfile::TempDir, Arc<Mutex<PipelineState>>) {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let mut state = PipelineState::default();
        state.source_dir = Some(source.path().to_path_buf());
        state.target_dir = Some(target.path().to_path_buf());
        (source, target, Arc::new(Mutex::new(state)))
    }

    #[test]
    fn test_start_without_runtime_leaves_pipeline_idle() {
        let (_source, _target, state) = state_with_dirs();
        let (tx, _rx) = mpsc::unbounded_channel::<PipelineEvent>();

        let err = start_scan(tx.clone(), state.clone()).unwrap_err();
        assert!(matches!(err, CoreError::NoRuntime(_)));
        assert!(!err.is_user_input());
        assert_eq!(state.lock().unwrap().phase, Phase::Idle);

        let err = start_copy(tx, state.clone()).unwrap_err();
        assert!(matches!(err, CoreError::NoRuntime(_)));
        assert_eq!(state.lock().unwrap().phase, Phase::Idle);

        // The pipeline is still usable once a runtime is available.
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (tx, _rx) = mpsc::unbounded_channel::<PipelineEvent>();
        runtime.block_on(async {
            start_scan(tx, state.clone()).unwrap().await.unwrap();
        });
        assert_eq!(state.lock().unwrap().phase, Phase::Idle);
    }
}
