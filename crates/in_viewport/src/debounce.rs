//! Trailing-edge debouncing on host timers.

use crate::host::{ViewportHost, ViewportTask};
use runtime::TimerId;
use std::time::Duration;

/// One pending timer per debounced handler.
///
/// Each trigger replaces the pending timer, so a burst of triggers runs the
/// handler once, `delay` after the last of them.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<TimerId>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger<H: ViewportHost>(&mut self, host: &mut H, task: ViewportTask, delay: Duration) {
        if let Some(timer) = self.pending.take() {
            host.clear_timeout(timer);
        }
        self.pending = Some(host.set_timeout(task, delay));
    }

    /// Called when the timer fires. Returns false for a timer that was
    /// already cancelled.
    pub fn fire(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn cancel<H: ViewportHost>(&mut self, host: &mut H) {
        if let Some(timer) = self.pending.take() {
            host.clear_timeout(timer);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
