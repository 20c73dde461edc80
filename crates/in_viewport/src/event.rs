//! Viewport notifications.

use crate::direction::ScrollDirection;
use dom::ElementId;
use serde::Serialize;

/// A notification for the attached element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "direction", rename_all = "camelCase")]
pub enum ViewportEvent {
    /// `didEnterViewport`
    Entered,
    /// `didExitViewport`
    Exited,
    /// `didScroll`
    Scrolled(ScrollDirection),
}

impl ViewportEvent {
    /// Name of the callback hook this event corresponds to.
    pub fn hook_name(&self) -> &'static str {
        match self {
            ViewportEvent::Entered => "didEnterViewport",
            ViewportEvent::Exited => "didExitViewport",
            ViewportEvent::Scrolled(_) => "didScroll",
        }
    }
}

/// A notification together with the element it is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementEvent {
    pub element: ElementId,
    pub event: ViewportEvent,
}
