//! Reference host.
//!
//! A [`Page`] ties a simulated [`Document`] to a [`Runtime`] and an
//! [`IntersectionObserverRegistry`] and drives a [`ViewportController`] from
//! its event loop. Time is virtual: nothing happens until the page is ticked
//! or advanced.

use crate::capabilities::Capabilities;
use crate::controller::ViewportController;
use crate::host::{TaskTarget, ViewportHost, ViewportTask};
use crate::options::ContextRef;
use common::{Rect, ScrollPosition, Size, ViewportError, ViewportResult};
use dom::{ContextId, ContextMetrics, Document, DocumentRef, ElementId, EventListeners, EventSpec, EventType, ListenerId};
use runtime::{EventLoop, FrameId, Runtime, TimerId};
use std::time::Duration;
use web_apis::{IntersectionObserverInit, IntersectionObserverRegistry, ObserverId};

/// A simulated page hosting viewport tracking.
pub struct Page {
    /// Render tree, shared with whoever lays the page out.
    document: DocumentRef,
    /// Task queues and the virtual clock.
    runtime: Runtime<ViewportTask>,
    /// Tick ordering and frame pacing.
    event_loop: EventLoop,
    /// Bound event listeners.
    listeners: EventListeners<ViewportTask>,
    /// Live intersection observers.
    observers: IntersectionObserverRegistry<TaskTarget>,
    /// Mechanisms advertised to the controller.
    capabilities: Capabilities,
}

impl Page {
    /// Create a page with a viewport of the given size.
    pub fn new(viewport: Size) -> Self {
        Self {
            document: Document::new_ref(viewport),
            runtime: Runtime::new(),
            event_loop: EventLoop::new(),
            listeners: EventListeners::new(),
            observers: IntersectionObserverRegistry::new(),
            capabilities: Capabilities::all(),
        }
    }

    /// Advertise only `capabilities`, to emulate an older or headless host.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Run animation frames at `fps` instead of 60.
    pub fn with_frame_rate(mut self, fps: f64) -> ViewportResult<Self> {
        self.event_loop = EventLoop::with_frame_rate(fps)
            .ok_or_else(|| ViewportError::configuration(format!("frame rate must be a positive finite number, got {}", fps)))?;
        Ok(self)
    }

    /// Shared handle to the render tree.
    pub fn document(&self) -> DocumentRef {
        self.document.clone()
    }

    pub fn window(&self) -> ContextId {
        self.document.read().window()
    }

    pub fn document_context(&self) -> ContextId {
        self.document.read().document_context()
    }

    /// Add an element laid out in page coordinates.
    pub fn create_element(&mut self, id: &str, layout: Rect) -> ElementId {
        let mut doc = self.document.write();
        let window = doc.window();
        doc.create_element(id, layout, window)
    }

    /// Add an element laid out inside a scroll container.
    pub fn create_element_in(&mut self, id: &str, layout: Rect, context: ContextId) -> ElementId {
        self.document.write().create_element(id, layout, context)
    }

    /// Add a named scroll container laid out in page coordinates.
    pub fn create_container(&mut self, name: &str, layout: Rect) -> ContextId {
        let mut doc = self.document.write();
        let window = doc.window();
        doc.create_container(name, window, layout)
    }

    pub fn set_layout(&mut self, element: ElementId, layout: Rect) {
        self.document.write().set_layout(element, layout);
    }

    /// Take an element out of the render tree.
    pub fn remove_element(&mut self, element: ElementId) {
        self.document.write().disconnect(element);
    }

    /// Scroll a context and queue `scroll` events for it.
    ///
    /// Viewport scrolls reach listeners on both the window and the document.
    pub fn scroll_to(&mut self, context: ContextId, position: ScrollPosition) -> bool {
        let scrolled = self.document.write().scroll_to(context, position);
        match scrolled {
            Some(target) => {
                self.fire(target, &EventType::Scroll);
                true
            }
            None => false,
        }
    }

    /// Scroll a context by a delta.
    pub fn scroll_by(&mut self, context: ContextId, top: f64, left: f64) -> bool {
        let current = self.document.read().metrics(context).map(|m| m.scroll);
        match current {
            Some(scroll) => self.scroll_to(context, ScrollPosition::new(scroll.top + top, scroll.left + left)),
            None => false,
        }
    }

    /// Resize a context's viewport and queue `resize` events for it.
    pub fn resize(&mut self, context: ContextId, width: f64, height: f64) -> bool {
        let resized = self.document.write().resize(context, Size::new(width, height));
        match resized {
            Some(target) => {
                self.fire(target, &EventType::Resize);
                true
            }
            None => false,
        }
    }

    /// Queue an arbitrary event on a context.
    pub fn dispatch_event(&mut self, context: ContextId, event: &str) {
        let event_type = EventType::from_str(event);
        self.fire(context, &event_type);
    }

    fn fire(&mut self, context: ContextId, event_type: &EventType) {
        let (window, document) = {
            let doc = self.document.read();
            (doc.window(), doc.document_context())
        };

        let mut tasks = self.listeners.matching(context, event_type);
        if context == window {
            tasks.extend(self.listeners.matching(document, event_type));
        }

        for task in tasks {
            self.runtime.queue_macrotask(task);
        }
    }

    /// Run one event loop iteration, then deliver observer notifications.
    pub fn tick(&mut self, controller: &mut ViewportController) {
        let mut plan = self.event_loop.plan(&self.runtime);
        while let Some(work) = self.event_loop.next_work(&mut plan, &mut self.runtime) {
            controller.handle_task(work.into_task(), self);
        }

        let time = self.runtime.now().as_secs_f64() * 1000.0;
        let notifications = self.observers.process(&self.document.read(), time);
        for (target, entries) in notifications {
            controller.handle_intersection(target, &entries, self);
        }
    }

    /// Move the clock forward in frame-sized steps, ticking after each.
    pub fn advance(&mut self, duration: Duration, controller: &mut ViewportController) {
        let step = self.event_loop.frame_interval();
        let mut remaining = duration;
        loop {
            let delta = remaining.min(step);
            self.runtime.advance(delta);
            self.tick(controller);
            remaining -= delta;
            if remaining.is_zero() {
                break;
            }
        }
    }

    /// Advance by exactly one frame interval.
    pub fn next_frame(&mut self, controller: &mut ViewportController) {
        self.advance(self.event_loop.frame_interval(), controller);
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.runtime.now()
    }

    pub fn frame_count(&self) -> u64 {
        self.event_loop.frame_count()
    }

    pub fn pending_animation_frames(&self) -> usize {
        self.runtime.pending_animation_frames()
    }

    pub fn pending_timers(&self) -> usize {
        self.runtime.pending_timers()
    }

    pub fn has_pending_work(&self) -> bool {
        self.runtime.has_pending_work()
    }

    /// Number of bound listeners across all contexts.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl ViewportHost for Page {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn resolve_context(&self, context: &ContextRef) -> Option<ContextId> {
        let doc = self.document.read();
        match context {
            ContextRef::Window => Some(doc.window()),
            ContextRef::Document => Some(doc.document_context()),
            ContextRef::Named(name) => doc.context_by_name(name),
        }
    }

    fn is_viewport_context(&self, context: ContextId) -> bool {
        let doc = self.document.read();
        context == doc.window() || context == doc.document_context()
    }

    fn is_connected(&self, element: ElementId) -> bool {
        self.document.read().is_connected(element)
    }

    fn bounding_client_rect(&self, element: ElementId) -> Option<Rect> {
        self.document.read().bounding_client_rect(element)
    }

    fn context_metrics(&self, context: ContextId) -> Option<ContextMetrics> {
        self.document.read().metrics(context)
    }

    fn add_listener(&mut self, context: ContextId, event: EventSpec, task: ViewportTask) -> ListenerId {
        self.listeners.add(context, event, task)
    }

    fn remove_listener(&mut self, listener: ListenerId) {
        self.listeners.remove(listener);
    }

    fn set_timeout(&mut self, task: ViewportTask, delay: Duration) -> TimerId {
        self.runtime.add_timer(task, delay)
    }

    fn clear_timeout(&mut self, timer: TimerId) {
        self.runtime.cancel_timer(timer);
    }

    fn request_animation_frame(&mut self, task: ViewportTask) -> FrameId {
        self.runtime.request_animation_frame(task)
    }

    fn cancel_animation_frame(&mut self, frame: FrameId) {
        self.runtime.cancel_animation_frame(frame);
    }

    fn queue_next_tick(&mut self, task: ViewportTask) {
        self.runtime.queue_next_tick(task);
    }

    fn observe_intersection(&mut self, element: ElementId, init: IntersectionObserverInit, target: TaskTarget) -> ObserverId {
        let observer = self.observers.create(target, init);
        self.observers.observe(observer, element);
        observer
    }

    fn disconnect_observer(&mut self, observer: ObserverId) {
        self.observers.disconnect(observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HandlerKind;

    fn target() -> TaskTarget {
        let mut page = Page::new(Size::new(100.0, 100.0));
        let element = page.create_element("x", Rect::new(0.0, 0.0, 1.0, 1.0));
        TaskTarget { element, epoch: 0 }
    }

    #[test]
    fn test_viewport_scroll_reaches_window_and_document() {
        let mut page = Page::new(Size::new(800.0, 600.0));
        let window = page.window();
        let document = page.document_context();
        let target = target();

        let spec = EventSpec::parse("scroll").unwrap();
        page.add_listener(window, spec.clone(), ViewportTask::Listener(target, HandlerKind::Evaluate));
        page.add_listener(document, spec, ViewportTask::Listener(target, HandlerKind::Direction));

        assert!(page.scroll_to(document, ScrollPosition::new(100.0, 0.0)));
        assert_eq!(page.runtime.macrotask_len(), 2);
        assert_eq!(page.document.read().metrics(window).unwrap().scroll.top, 100.0);
    }

    #[test]
    fn test_container_scroll_stays_local() {
        let mut page = Page::new(Size::new(800.0, 600.0));
        let window = page.window();
        let feed = page.create_container("feed", Rect::new(0.0, 100.0, 400.0, 300.0));
        let target = target();

        let spec = EventSpec::parse("scroll").unwrap();
        page.add_listener(window, spec, ViewportTask::Listener(target, HandlerKind::Evaluate));

        page.scroll_by(feed, 50.0, 0.0);
        assert_eq!(page.runtime.macrotask_len(), 0);
        assert_eq!(page.context_metrics(feed).unwrap().scroll.top, 50.0);
        assert_eq!(page.context_metrics(feed).unwrap().origin.y, 100.0);
    }

    #[test]
    fn test_resolve_context() {
        let mut page = Page::new(Size::new(800.0, 600.0));
        let feed = page.create_container("feed", Rect::new(0.0, 0.0, 100.0, 100.0));

        assert_eq!(page.resolve_context(&ContextRef::Window), Some(page.window()));
        assert_eq!(page.resolve_context(&ContextRef::from("feed")), Some(feed));
        assert_eq!(page.resolve_context(&ContextRef::from("missing")), None);
        assert!(page.is_viewport_context(page.document_context()));
        assert!(!page.is_viewport_context(feed));
    }

    #[test]
    fn test_advance_steps_by_frames() {
        let mut page = Page::new(Size::new(800.0, 600.0));
        let mut controller = ViewportController::new();

        page.advance(Duration::from_millis(100), &mut controller);
        assert_eq!(page.now(), Duration::from_millis(100));
        assert_eq!(page.frame_count(), 6);
    }

    #[test]
    fn test_repeated_advance_keeps_frame_rate() {
        let mut page = Page::new(Size::new(800.0, 600.0));
        let mut controller = ViewportController::new();

        for _ in 0..10 {
            page.advance(Duration::from_millis(50), &mut controller);
        }
        assert_eq!(page.now(), Duration::from_millis(500));
        assert_eq!(page.frame_count(), 30);
    }

    #[test]
    fn test_frame_rate_is_validated() {
        let page = Page::new(Size::new(800.0, 600.0)).with_frame_rate(30.0).unwrap();
        assert_eq!(page.event_loop.frame_interval(), Duration::from_nanos(33_333_333));

        for fps in [0.0, -1.0, f64::INFINITY, f64::NAN] {
            let err = Page::new(Size::new(800.0, 600.0)).with_frame_rate(fps).err().unwrap();
            assert!(err.is_configuration());
        }
    }
}
