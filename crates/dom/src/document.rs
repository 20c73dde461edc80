//! Render tree document: elements and the scroll contexts they live in.

use crate::element::Element;
use crate::node::{ContextId, ElementId};
use crate::window::{ContextKind, ContextMetrics, ScrollContext};
use common::{Point, Rect, ScrollPosition, Size};
use indexmap::IndexMap;
use parking_lot::RwLock;
use slotmap::SlotMap;
use std::sync::Arc;

/// Shared reference to a document.
pub type DocumentRef = Arc<RwLock<Document>>;

/// Bound on container nesting walked when resolving client rects.
const MAX_CONTEXT_DEPTH: usize = 32;

/// A document.
pub struct Document {
    elements: SlotMap<ElementId, Element>,
    contexts: SlotMap<ContextId, ScrollContext>,
    /// Containers by name.
    named: IndexMap<Arc<str>, ContextId>,
    window: ContextId,
    document: ContextId,
}

impl Document {
    /// Create a document whose window has the given viewport size.
    pub fn new(viewport: Size) -> Self {
        let mut contexts = SlotMap::with_key();
        let window = contexts.insert(ScrollContext::window(viewport));
        let document = contexts.insert(ScrollContext::document());

        Self {
            elements: SlotMap::with_key(),
            contexts,
            named: IndexMap::new(),
            window,
            document,
        }
    }

    /// Create a shared document.
    pub fn new_ref(viewport: Size) -> DocumentRef {
        Arc::new(RwLock::new(Self::new(viewport)))
    }

    /// The window context.
    pub fn window(&self) -> ContextId {
        self.window
    }

    /// The document context.
    pub fn document_context(&self) -> ContextId {
        self.document
    }

    /// Insert an element laid out at `layout` inside `scroll_parent`.
    pub fn create_element(&mut self, id: &str, layout: Rect, scroll_parent: ContextId) -> ElementId {
        self.elements.insert(Element::new(id, layout, scroll_parent))
    }

    /// Insert a scrollable container named `name`, laid out at `layout`
    /// inside `parent`.
    pub fn create_container(&mut self, name: &str, parent: ContextId, layout: Rect) -> ContextId {
        let id = self.contexts.insert(ScrollContext::container(name, parent, layout));
        self.named.insert(Arc::from(name), id);
        id
    }

    /// Detach an element from the render tree. Its identity stays valid.
    pub fn disconnect(&mut self, element: ElementId) {
        if let Some(el) = self.elements.get_mut(element) {
            el.connected = false;
        }
    }

    /// Move or resize an element.
    pub fn set_layout(&mut self, element: ElementId, layout: Rect) {
        if let Some(el) = self.elements.get_mut(element) {
            el.layout = layout;
        }
    }

    pub fn element(&self, element: ElementId) -> Option<&Element> {
        self.elements.get(element)
    }

    pub fn is_connected(&self, element: ElementId) -> bool {
        self.elements.get(element).is_some_and(|el| el.connected)
    }

    pub fn context(&self, context: ContextId) -> Option<&ScrollContext> {
        self.contexts.get(context)
    }

    /// Look up a scroll context by name (`window`, `document` or a container).
    pub fn context_by_name(&self, name: &str) -> Option<ContextId> {
        match name {
            "window" => Some(self.window),
            "document" => Some(self.document),
            other => self.named.get(other).copied(),
        }
    }

    /// Context whose viewport and scroll offset `context` reports.
    fn effective(&self, context: ContextId) -> ContextId {
        if context == self.document {
            self.window
        } else {
            context
        }
    }

    /// Dimensions and scroll offset of a context.
    pub fn metrics(&self, context: ContextId) -> Option<ContextMetrics> {
        let mut metrics = self.contexts.get(self.effective(context)).map(ScrollContext::metrics)?;
        metrics.origin = self.context_client_rect(context)?.origin();
        Some(metrics)
    }

    /// Scroll a context. Scrolling the document scrolls the window.
    /// Returns the context that actually scrolled.
    pub fn scroll_to(&mut self, context: ContextId, position: ScrollPosition) -> Option<ContextId> {
        let effective = self.effective(context);
        let ctx = self.contexts.get_mut(effective)?;
        ctx.scroll = position;
        Some(effective)
    }

    /// Resize a context's viewport.
    pub fn resize(&mut self, context: ContextId, inner: Size) -> Option<ContextId> {
        let effective = self.effective(context);
        let ctx = self.contexts.get_mut(effective)?;
        ctx.inner = inner;
        if let ContextKind::Container { layout, .. } = &mut ctx.kind {
            layout.width = inner.width;
            layout.height = inner.height;
        }
        Some(effective)
    }

    /// Client-space rect of a context's viewport.
    ///
    /// The window's viewport sits at the origin; a container's viewport is
    /// its box as seen through every enclosing context.
    pub fn context_client_rect(&self, context: ContextId) -> Option<Rect> {
        let mut current = self.effective(context);
        let mut origin = Point::ZERO;
        let inner = self.contexts.get(current)?.inner;

        for _ in 0..MAX_CONTEXT_DEPTH {
            let ctx = self.contexts.get(current)?;
            match &ctx.kind {
                ContextKind::Window | ContextKind::Document => {
                    return Some(Rect::from_origin_size(origin, inner));
                }
                ContextKind::Container { parent, layout } => {
                    let parent_ctx = self.contexts.get(self.effective(*parent))?;
                    origin = origin + layout.origin()
                        - Point::new(parent_ctx.scroll.left, parent_ctx.scroll.top);
                    current = self.effective(*parent);
                }
            }
        }

        None
    }

    /// `getBoundingClientRect()` of a connected element.
    pub fn bounding_client_rect(&self, element: ElementId) -> Option<Rect> {
        let el = self.elements.get(element).filter(|el| el.connected)?;
        let parent = self.effective(el.scroll_parent);
        let ctx = self.contexts.get(parent)?;
        let viewport = self.context_client_rect(parent)?;

        Some(el.layout.translate(
            viewport.x - ctx.scroll.left,
            viewport.y - ctx.scroll.top,
        ))
    }
}
