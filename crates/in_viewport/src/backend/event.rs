//! Debounced event-driven evaluation.

use super::{BackendScope, DetectionBackend};
use crate::debounce::Debouncer;
use crate::host::{HandlerKind, TaskTarget, ViewportHost, ViewportTask};
use dom::{ContextId, EventSpec, ListenerId};
use smallvec::SmallVec;
use std::time::Duration;

/// A configured listener after its context has been resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedListener {
    pub context: ContextId,
    pub event: EventSpec,
}

/// Binds the configured listeners; each event restarts a shared debounce
/// timer that evaluates when it elapses.
#[derive(Debug, Default)]
pub struct EventBackend {
    listeners: SmallVec<[ListenerId; 4]>,
    debounce: Debouncer,
    running: bool,
}

impl EventBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bound event fired.
    pub fn on_event<H: ViewportHost>(&mut self, target: TaskTarget, delay: Duration, host: &mut H) {
        if self.running {
            self.debounce
                .trigger(host, ViewportTask::Debounced(target, HandlerKind::Evaluate), delay);
        }
    }

    /// The debounce timer elapsed. Returns whether to evaluate.
    pub fn on_debounced(&mut self) -> bool {
        self.debounce.fire() && self.running
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_debouncing(&self) -> bool {
        self.debounce.is_pending()
    }
}

impl DetectionBackend for EventBackend {
    fn start<H: ViewportHost>(&mut self, scope: &BackendScope<'_>, host: &mut H) {
        if self.running {
            return;
        }
        self.running = true;
        for listener in scope.listeners {
            let id = host.add_listener(
                listener.context,
                listener.event.clone(),
                ViewportTask::Listener(scope.target, HandlerKind::Evaluate),
            );
            self.listeners.push(id);
        }
    }

    fn stop<H: ViewportHost>(&mut self, host: &mut H) {
        self.running = false;
        for listener in self.listeners.drain(..) {
            host.remove_listener(listener);
        }
        self.debounce.cancel(host);
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
