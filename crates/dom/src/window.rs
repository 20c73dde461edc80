//! Scroll contexts: the window, the document, and scrollable containers.

use crate::node::ContextId;
use common::{Point, Rect, ScrollPosition, Size};
use std::sync::Arc;

/// Kind of scroll context.
#[derive(Clone, Debug, PartialEq)]
pub enum ContextKind {
    /// The browsing context's window (the viewport).
    Window,
    /// The document. Shares its viewport and scroll offset with the window.
    Document,
    /// A scrollable container box laid out inside another context.
    Container {
        /// Context the container box itself scrolls with.
        parent: ContextId,
        /// Container box in the content coordinates of `parent`.
        layout: Rect,
    },
}

/// A scroll context.
#[derive(Clone, Debug)]
pub struct ScrollContext {
    /// Context name used by configuration lookups.
    pub name: Arc<str>,
    /// Kind of context.
    pub kind: ContextKind,
    /// Inner (client) dimensions.
    pub inner: Size,
    /// Current scroll offset.
    pub scroll: ScrollPosition,
}

impl ScrollContext {
    /// Create the window context with the given viewport size.
    pub fn window(viewport: Size) -> Self {
        Self {
            name: Arc::from("window"),
            kind: ContextKind::Window,
            inner: viewport,
            scroll: ScrollPosition::ORIGIN,
        }
    }

    /// Create the document context.
    pub fn document() -> Self {
        Self {
            name: Arc::from("document"),
            kind: ContextKind::Document,
            inner: Size::ZERO,
            scroll: ScrollPosition::ORIGIN,
        }
    }

    /// Create a container context.
    pub fn container(name: &str, parent: ContextId, layout: Rect) -> Self {
        Self {
            name: Arc::from(name),
            kind: ContextKind::Container { parent, layout },
            inner: layout.size(),
            scroll: ScrollPosition::ORIGIN,
        }
    }

    /// Size and offset of this context. The origin is left at zero; only
    /// the document knows where a container sits on screen.
    pub fn metrics(&self) -> ContextMetrics {
        ContextMetrics {
            inner_width: self.inner.width,
            inner_height: self.inner.height,
            scroll: self.scroll,
            origin: Point::ZERO,
        }
    }
}

/// Snapshot of a scroll context's dimensions and offset
/// (`innerWidth`, `innerHeight`, `scrollTop`, `scrollLeft`).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContextMetrics {
    pub inner_width: f64,
    pub inner_height: f64,
    pub scroll: ScrollPosition,
    /// Client-space origin of the context's viewport.
    pub origin: Point,
}
