//! The platform seam.
//!
//! Everything the tracker needs from its environment goes through
//! [`ViewportHost`]: geometry reads, listener registration, timers, animation
//! frames and intersection observation. Scheduled work comes back to the
//! controller as a [`ViewportTask`] tagged with the attachment it belongs to.

use crate::capabilities::Capabilities;
use crate::options::ContextRef;
use common::Rect;
use dom::{ContextId, ContextMetrics, ElementId, EventSpec, ListenerId};
use runtime::{FrameId, TimerId};
use std::time::Duration;
use web_apis::{IntersectionObserverInit, ObserverId};

/// Identifies one attachment of one element.
///
/// The epoch changes every time an element is attached, so work scheduled
/// for an earlier attachment can be recognised and dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskTarget {
    pub element: ElementId,
    pub epoch: u64,
}

/// Which handler a listener or debounce timer drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// Re-evaluate the element against the viewport.
    Evaluate,
    /// Track scroll direction.
    Direction,
}

/// Work the host hands back to the controller.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewportTask {
    /// An animation frame for a polling element.
    Frame(TaskTarget),
    /// A bound event fired.
    Listener(TaskTarget, HandlerKind),
    /// A debounce timer elapsed.
    Debounced(TaskTarget, HandlerKind),
    /// Deferred cancellation of a polling frame.
    CancelFrame(FrameId),
}

impl ViewportTask {
    pub fn target(&self) -> Option<TaskTarget> {
        match self {
            ViewportTask::Frame(target) | ViewportTask::Listener(target, _) | ViewportTask::Debounced(target, _) => {
                Some(*target)
            }
            ViewportTask::CancelFrame(_) => None,
        }
    }
}

/// Host platform services.
pub trait ViewportHost {
    fn capabilities(&self) -> Capabilities;

    /// Resolve a configured context name.
    fn resolve_context(&self, context: &ContextRef) -> Option<ContextId>;

    /// Whether `context` scrolls the top-level viewport (window or document).
    fn is_viewport_context(&self, context: ContextId) -> bool;

    fn is_connected(&self, element: ElementId) -> bool;

    /// `getBoundingClientRect()`, or `None` once the element is gone.
    fn bounding_client_rect(&self, element: ElementId) -> Option<Rect>;

    fn context_metrics(&self, context: ContextId) -> Option<ContextMetrics>;

    fn add_listener(&mut self, context: ContextId, event: EventSpec, task: ViewportTask) -> ListenerId;

    fn remove_listener(&mut self, listener: ListenerId);

    fn set_timeout(&mut self, task: ViewportTask, delay: Duration) -> TimerId;

    fn clear_timeout(&mut self, timer: TimerId);

    fn request_animation_frame(&mut self, task: ViewportTask) -> FrameId;

    fn cancel_animation_frame(&mut self, frame: FrameId);

    /// Run `task` at the start of the next tick.
    fn queue_next_tick(&mut self, task: ViewportTask);

    /// Observe `element`. Notifications are delivered through
    /// `ViewportController::handle_intersection` with `target`.
    fn observe_intersection(&mut self, element: ElementId, init: IntersectionObserverInit, target: TaskTarget) -> ObserverId;

    fn disconnect_observer(&mut self, observer: ObserverId);
}
