//! Contains helper functions to reduce boilerplate code in other `app` modules.

use std::sync::{Arc, Mutex, MutexGuard};

use super::events::PipelineEvent;
use super::proxy::EventProxy;
use super::state::PipelineState;
use super::view_model::generate_ui_state;

/// Locks the state, recovering the guard if a previous holder panicked.
pub fn lock_state(state: &Arc<Mutex<PipelineState>>) -> MutexGuard<'_, PipelineState> {
    state.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("Pipeline state mutex was poisoned, continuing with inner state");
        poisoned.into_inner()
    })
}

/// Sends a `StateUpdate` built from `state` through `proxy`.
pub fn notify<P: EventProxy>(state: &PipelineState, proxy: &P) {
    let event = PipelineEvent::StateUpdate(Box::new(generate_ui_state(state)));
    proxy.send_event(event);
}

/// A helper function that locks the `PipelineState`, performs a mutation,
/// and then automatically sends a `StateUpdate` event to the display side.
pub fn with_state_and_notify<F, R, P: EventProxy>(
    state: &Arc<Mutex<PipelineState>>,
    proxy: &P,
    update_fn: F,
) -> R
where
    F: FnOnce(&mut PipelineState) -> R,
{
    let mut state_guard = lock_state(state);

    let result = update_fn(&mut state_guard);

    notify(&state_guard, proxy);
    result
}
