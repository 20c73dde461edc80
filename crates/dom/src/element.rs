//! Element data.

use crate::node::ContextId;
use common::Rect;
use std::sync::Arc;

/// An element box in the render tree.
#[derive(Clone, Debug)]
pub struct Element {
    /// Stable element id (the host component's `elementId`).
    pub id: Arc<str>,
    /// Border box in the content coordinates of `scroll_parent`.
    pub layout: Rect,
    /// Scroll context the element scrolls with.
    pub scroll_parent: ContextId,
    /// Whether the element is currently inserted in the render tree.
    pub connected: bool,
}

impl Element {
    pub fn new(id: &str, layout: Rect, scroll_parent: ContextId) -> Self {
        Self {
            id: Arc::from(id),
            layout,
            scroll_parent,
            connected: true,
        }
    }
}
