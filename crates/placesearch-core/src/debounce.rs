// crates/placesearch-core/src/debounce.rs

//! # Debounce Gate
//!
//! Trailing-edge debounce over a single owned timer task. Rescheduling
//! aborts the pending timer before arming a new one, so a superseded task
//! never runs.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// Holds at most one pending delayed task.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Default)]
pub struct DebounceGate {
    pending: Option<JoinHandle<()>>,
}

impl DebounceGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` after `delay` of quiescence, cancelling whatever was pending.
    pub fn schedule<F>(&mut self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.cancel_all() {
            trace!("debounce: superseded pending task");
        }
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Aborts the pending task, if any. Returns whether one was still waiting.
    pub fn cancel_all(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let was_waiting = !handle.is_finished();
                handle.abort();
                was_waiting
            }
            None => false,
        }
    }

    /// `true` while a scheduled task has not yet completed.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for DebounceGate {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
