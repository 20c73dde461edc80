//! Animation-frame polling.

use super::{BackendScope, DetectionBackend};
use crate::host::{TaskTarget, ViewportHost, ViewportTask};
use runtime::FrameId;

/// Re-evaluates once per frame while running.
///
/// Stopping does not cancel the outstanding frame directly: the cancellation
/// is queued for the next tick, and a frame that still fires finds its
/// attachment gone and does nothing.
#[derive(Debug, Default)]
pub struct PollingBackend {
    frame: Option<FrameId>,
    running: bool,
}

impl PollingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the next frame.
    pub fn schedule<H: ViewportHost>(&mut self, target: TaskTarget, host: &mut H) {
        if self.running && self.frame.is_none() {
            self.frame = Some(host.request_animation_frame(ViewportTask::Frame(target)));
        }
    }

    /// The pending frame fired. Returns false if none was expected.
    pub fn on_frame(&mut self) -> bool {
        self.running && self.frame.take().is_some()
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.frame
    }
}

impl DetectionBackend for PollingBackend {
    fn start<H: ViewportHost>(&mut self, scope: &BackendScope<'_>, host: &mut H) {
        self.running = true;
        self.schedule(scope.target, host);
    }

    fn stop<H: ViewportHost>(&mut self, host: &mut H) {
        self.running = false;
        if let Some(frame) = self.frame.take() {
            host.queue_next_tick(ViewportTask::CancelFrame(frame));
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
