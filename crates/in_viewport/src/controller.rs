//! Per-element viewport state and its lifecycle.
//!
//! The controller owns one [`ElementViewportState`] per attached element.
//! Hosts hand scheduled work back through [`ViewportController::handle_task`]
//! and observer notifications through
//! [`ViewportController::handle_intersection`]; work for an element that was
//! detached, re-attached or has settled is dropped.

use crate::backend::{Backend, BackendScope, DetectionBackend, ObserverBackend, ResolvedListener, Strategy};
use crate::debounce::Debouncer;
use crate::direction::{DirectionTracker, ScrollDirection};
use crate::event::{ElementEvent, ViewportEvent};
use crate::geometry::is_intersecting;
use crate::host::{HandlerKind, TaskTarget, ViewportHost, ViewportTask};
use crate::options::ViewportOptions;
use crate::policy::{self, Signal};
use common::{ScrollPosition, ViewportError, ViewportResult};
use dom::{ContextId, ElementId, EventSpec, EventType, ListenerId};
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::sync::Arc;
use web_apis::IntersectionObserverEntry;

/// Namespace of the scroll listener that tracks direction.
const DIRECTION_NAMESPACE: &str = "directional";

/// Tracking state of one attached element.
#[derive(Debug)]
pub struct ElementViewportState {
    element: ElementId,
    epoch: u64,
    options: ViewportOptions,
    context: ContextId,
    root: Option<ContextId>,
    listeners: SmallVec<[ResolvedListener; 2]>,
    entered: bool,
    /// Entered without spy: every subscription is released.
    settled: bool,
    direction: DirectionTracker,
    direction_listener: Option<ListenerId>,
    direction_debounce: Debouncer,
    backend: Backend,
}

impl ElementViewportState {
    pub fn target(&self) -> TaskTarget {
        TaskTarget {
            element: self.element,
            epoch: self.epoch,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn options(&self) -> &ViewportOptions {
        &self.options
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn entered(&self) -> bool {
        self.entered
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn strategy(&self) -> Strategy {
        self.backend.strategy()
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn last_direction(&self) -> Option<ScrollDirection> {
        self.direction.last_direction()
    }

    pub fn last_position(&self) -> Option<ScrollPosition> {
        self.direction.last_position()
    }

    fn is_live(&self, target: TaskTarget) -> bool {
        self.epoch == target.epoch && !self.settled
    }

    fn start_backend<H: ViewportHost>(&mut self, host: &mut H) {
        let scope = BackendScope {
            target: TaskTarget {
                element: self.element,
                epoch: self.epoch,
            },
            context: self.context,
            root: self.root,
            options: &self.options,
            listeners: &self.listeners,
        };
        self.backend.start(&scope, host);
    }

    /// Release every host resource held for this element.
    fn release<H: ViewportHost>(&mut self, host: &mut H) {
        self.backend.stop(host);
        if let Some(listener) = self.direction_listener.take() {
            host.remove_listener(listener);
        }
        self.direction_debounce.cancel(host);
    }
}

/// Viewport state controller.
#[derive(Debug, Default)]
pub struct ViewportController {
    states: IndexMap<ElementId, ElementViewportState>,
    events: VecDeque<ElementEvent>,
    next_epoch: u64,
}

impl ViewportController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `element`.
    ///
    /// Does nothing on a host without a render tree or when `options` are
    /// disabled. Configuration problems are reported before any state is
    /// created. Attaching an element that is already tracked replaces the
    /// previous attachment.
    pub fn attach<H: ViewportHost>(
        &mut self,
        element: ElementId,
        options: ViewportOptions,
        host: &mut H,
    ) -> ViewportResult<()> {
        let capabilities = host.capabilities();
        if !capabilities.can_use_dom() {
            tracing::debug!("No render tree, viewport tracking skipped for {:?}", element);
            return Ok(());
        }
        if !options.enabled {
            tracing::debug!("Viewport tracking disabled for {:?}", element);
            return Ok(());
        }

        options.validate()?;
        if !host.is_connected(element) {
            return Err(ViewportError::configuration(format!(
                "element {:?} is not in the render tree",
                element
            )));
        }

        let context = host.resolve_context(&options.scroll_context).ok_or_else(|| {
            ViewportError::configuration(format!(
                "you must pass a valid context: {}",
                options.scroll_context
            ))
        })?;
        let listeners = resolve_listeners(&options, &*host)?;
        let strategy = Strategy::select(&options, capabilities);
        let root = (!host.is_viewport_context(context)).then_some(context);

        if self.states.contains_key(&element) {
            tracing::debug!("Replacing viewport tracking for {:?}", element);
            self.detach(element, host);
        }

        let epoch = self.next_epoch;
        self.next_epoch += 1;
        let target = TaskTarget { element, epoch };

        self.states.insert(
            element,
            ElementViewportState {
                element,
                epoch,
                direction: DirectionTracker::new(options.scroll_sensitivity),
                options,
                context,
                root,
                listeners,
                entered: false,
                settled: false,
                direction_listener: None,
                direction_debounce: Debouncer::new(),
                backend: Backend::for_strategy(strategy),
            },
        );
        tracing::debug!("Viewport tracking attached to {:?} using {} detection", element, strategy);

        if strategy.evaluates_geometry() {
            self.evaluate(element, host);
        }

        // The first evaluation may already have settled the element. The
        // direction listener goes last so evaluation handlers bound to the
        // same event run before it.
        if let Some(state) = self.live_state_mut(target) {
            state.start_backend(host);
            state.direction_listener = Some(host.add_listener(
                context,
                EventSpec {
                    event_type: EventType::Scroll,
                    namespace: Some(Arc::from(DIRECTION_NAMESPACE)),
                },
                ViewportTask::Listener(target, HandlerKind::Direction),
            ));
        }

        Ok(())
    }

    /// Stop tracking `element`. Returns false if it was not tracked.
    pub fn detach<H: ViewportHost>(&mut self, element: ElementId, host: &mut H) -> bool {
        let Some(mut state) = self.states.shift_remove(&element) else {
            tracing::trace!("Detach of untracked element {:?} ignored", element);
            return false;
        };

        state.release(host);
        tracing::debug!("Viewport tracking detached from {:?}", element);
        true
    }

    /// Deliver scheduled work.
    pub fn handle_task<H: ViewportHost>(&mut self, task: ViewportTask, host: &mut H) {
        match task {
            ViewportTask::CancelFrame(frame) => host.cancel_animation_frame(frame),
            ViewportTask::Frame(target) => self.on_frame(target, host),
            ViewportTask::Listener(target, handler) => self.on_listener(target, handler, host),
            ViewportTask::Debounced(target, handler) => self.on_debounced(target, handler, host),
        }
    }

    /// Deliver an intersection observer notification.
    pub fn handle_intersection<H: ViewportHost>(
        &mut self,
        target: TaskTarget,
        entries: &[IntersectionObserverEntry],
        host: &mut H,
    ) {
        let Some(state) = self.live_state_mut(target) else {
            tracing::trace!("Stale intersection notification for {:?} dropped", target.element);
            return;
        };
        if !matches!(state.backend, Backend::Observer(_)) {
            return;
        }

        let signal = ObserverBackend::apply(&mut state.entered, entries);
        self.apply_signal(target.element, signal, host);
    }

    /// Re-evaluate `element` now. Returns whether an evaluation ran; observed
    /// and settled elements are left alone.
    pub fn refresh<H: ViewportHost>(&mut self, element: ElementId, host: &mut H) -> bool {
        let evaluates = self
            .states
            .get(&element)
            .map_or(false, |state| !state.settled && state.strategy().evaluates_geometry());
        if evaluates {
            self.evaluate(element, host);
        }
        evaluates
    }

    pub fn is_attached(&self, element: ElementId) -> bool {
        self.states.contains_key(&element)
    }

    pub fn state(&self, element: ElementId) -> Option<&ElementViewportState> {
        self.states.get(&element)
    }

    pub fn entered(&self, element: ElementId) -> Option<bool> {
        self.states.get(&element).map(|state| state.entered)
    }

    pub fn exited(&self, element: ElementId) -> Option<bool> {
        self.entered(element).map(|entered| !entered)
    }

    pub fn strategy(&self, element: ElementId) -> Option<Strategy> {
        self.states.get(&element).map(ElementViewportState::strategy)
    }

    pub fn is_settled(&self, element: ElementId) -> Option<bool> {
        self.states.get(&element).map(|state| state.settled)
    }

    pub fn attached_count(&self) -> usize {
        self.states.len()
    }

    /// Drain emitted events in emission order.
    pub fn take_events(&mut self) -> Vec<ElementEvent> {
        self.events.drain(..).collect()
    }

    fn live_state_mut(&mut self, target: TaskTarget) -> Option<&mut ElementViewportState> {
        self.states
            .get_mut(&target.element)
            .filter(|state| state.is_live(target))
    }

    fn on_frame<H: ViewportHost>(&mut self, target: TaskTarget, host: &mut H) {
        let Some(state) = self.live_state_mut(target) else {
            tracing::trace!("Stale animation frame for {:?} dropped", target.element);
            return;
        };
        let Backend::Polling(polling) = &mut state.backend else {
            return;
        };
        if !polling.on_frame() {
            return;
        }

        self.evaluate(target.element, host);

        if let Some(state) = self.live_state_mut(target) {
            if let Backend::Polling(polling) = &mut state.backend {
                polling.schedule(target, host);
            }
        }
    }

    fn on_listener<H: ViewportHost>(&mut self, target: TaskTarget, handler: HandlerKind, host: &mut H) {
        let Some(state) = self.live_state_mut(target) else {
            tracing::trace!("Stale listener for {:?} dropped", target.element);
            return;
        };
        let delay = state.options.refresh_interval();

        match handler {
            HandlerKind::Evaluate => {
                if let Backend::EventBased(backend) = &mut state.backend {
                    backend.on_event(target, delay, host);
                }
            }
            HandlerKind::Direction => state.direction_debounce.trigger(
                host,
                ViewportTask::Debounced(target, HandlerKind::Direction),
                delay,
            ),
        }
    }

    fn on_debounced<H: ViewportHost>(&mut self, target: TaskTarget, handler: HandlerKind, host: &mut H) {
        let Some(state) = self.live_state_mut(target) else {
            tracing::trace!("Stale debounce timer for {:?} dropped", target.element);
            return;
        };

        match handler {
            HandlerKind::Evaluate => {
                let due = match &mut state.backend {
                    Backend::EventBased(backend) => backend.on_debounced(),
                    _ => false,
                };
                if due {
                    self.evaluate(target.element, host);
                }
            }
            HandlerKind::Direction => {
                if state.direction_debounce.fire() {
                    self.track_direction(target.element, host);
                }
            }
        }
    }

    /// Run the geometry test and apply the transition policy.
    fn evaluate<H: ViewportHost>(&mut self, element: ElementId, host: &mut H) {
        let Some(state) = self.states.get_mut(&element) else {
            return;
        };
        if state.settled {
            return;
        }

        let Some(rect) = host.bounding_client_rect(element) else {
            tracing::trace!("{:?} has no layout box, evaluation skipped", element);
            return;
        };
        let Some(metrics) = host.context_metrics(state.context) else {
            return;
        };

        let rect = rect.translate(-metrics.origin.x, -metrics.origin.y);
        let in_viewport = is_intersecting(&rect, metrics.inner_height, metrics.inner_width, &state.options.tolerance);
        let signal = policy::transition(&mut state.entered, in_viewport, state.options.spy);
        self.apply_signal(element, signal, host);
    }

    fn track_direction<H: ViewportHost>(&mut self, element: ElementId, host: &mut H) {
        let Some(state) = self.states.get_mut(&element) else {
            return;
        };
        let Some(metrics) = host.context_metrics(state.context) else {
            return;
        };

        if let Some(direction) = state.direction.observe(metrics.scroll, state.entered) {
            self.emit(element, ViewportEvent::Scrolled(direction));
        }
    }

    fn apply_signal<H: ViewportHost>(&mut self, element: ElementId, signal: Option<Signal>, host: &mut H) {
        match signal {
            Some(Signal::Entered) => {
                self.emit(element, ViewportEvent::Entered);
                let spy = self.states.get(&element).map_or(true, |state| state.options.spy);
                if !spy {
                    self.settle(element, host);
                }
            }
            Some(Signal::Exited) => self.emit(element, ViewportEvent::Exited),
            None => {}
        }
    }

    /// First entry without spy: stop tracking but keep the record.
    fn settle<H: ViewportHost>(&mut self, element: ElementId, host: &mut H) {
        if let Some(state) = self.states.get_mut(&element) {
            state.settled = true;
            state.release(host);
            tracing::debug!("{:?} entered the viewport, tracking stopped", element);
        }
    }

    fn emit(&mut self, element: ElementId, event: ViewportEvent) {
        tracing::trace!("{:?}: {}", element, event.hook_name());
        self.events.push_back(ElementEvent { element, event });
    }
}

fn resolve_listeners<H: ViewportHost>(
    options: &ViewportOptions,
    host: &H,
) -> ViewportResult<SmallVec<[ResolvedListener; 2]>> {
    options
        .listeners
        .iter()
        .map(|listener| {
            let context_ref = listener
                .context
                .as_ref()
                .ok_or_else(|| ViewportError::configuration("you must pass a valid context"))?;
            let context = host.resolve_context(context_ref).ok_or_else(|| {
                ViewportError::configuration(format!("you must pass a valid context: {}", context_ref))
            })?;
            let event = listener
                .event
                .as_deref()
                .and_then(EventSpec::parse)
                .ok_or_else(|| ViewportError::configuration("you must pass a valid event"))?;
            Ok(ResolvedListener { context, event })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Capabilities;
    use crate::page::Page;
    use common::{Rect, Size};
    use std::time::Duration;

    const VIEWPORT: Size = Size::new(800.0, 600.0);

    fn below_fold(page: &mut Page) -> ElementId {
        page.create_element("ember1", Rect::new(0.0, 1000.0, 200.0, 100.0))
    }

    fn events_for(controller: &mut ViewportController) -> Vec<ViewportEvent> {
        controller.take_events().into_iter().map(|e| e.event).collect()
    }

    fn settle_time(page: &mut Page, controller: &mut ViewportController) {
        page.advance(Duration::from_millis(250), controller);
    }

    #[test]
    fn test_attach_without_dom_is_noop() {
        let mut page = Page::new(VIEWPORT).with_capabilities(Capabilities::empty());
        let mut controller = ViewportController::new();
        let element = below_fold(&mut page);

        controller.attach(element, ViewportOptions::default(), &mut page).unwrap();
        assert!(!controller.is_attached(element));
        assert_eq!(page.listener_count(), 0);
    }

    #[test]
    fn test_attach_disabled_is_noop() {
        let mut page = Page::new(VIEWPORT);
        let mut controller = ViewportController::new();
        let element = below_fold(&mut page);

        let options = ViewportOptions::default().with_enabled(false);
        controller.attach(element, options, &mut page).unwrap();
        assert!(!controller.is_attached(element));
    }

    #[test]
    fn test_configuration_errors() {
        let mut page = Page::new(VIEWPORT);
        let mut controller = ViewportController::new();
        let element = below_fold(&mut page);

        let bad = [
            ViewportOptions::default().with_scroll_sensitivity(0.0),
            ViewportOptions::default().with_scroll_sensitivity(-1.0),
            ViewportOptions::default().with_threshold(2.0),
            ViewportOptions::default().with_scroll_context("missing"),
            ViewportOptions::default().with_listener("missing", "scroll"),
            ViewportOptions::default().with_listener("window", ""),
        ];

        for options in bad {
            let err = controller.attach(element, options, &mut page).unwrap_err();
            assert!(err.is_configuration(), "{err}");
        }

        assert!(!controller.is_attached(element));
        assert_eq!(page.listener_count(), 0);
        assert_eq!(page.observer_count(), 0);
    }

    #[test]
    fn test_detached_element_is_rejected() {
        let mut page = Page::new(VIEWPORT);
        let mut controller = ViewportController::new();
        let element = below_fold(&mut page);
        page.remove_element(element);

        let err = controller.attach(element, ViewportOptions::default(), &mut page).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_errors_leave_other_elements_alone() {
        let mut page = Page::new(VIEWPORT);
        let mut controller = ViewportController::new();
        let good = page.create_element("good", Rect::new(0.0, 0.0, 10.0, 10.0));
        let bad = below_fold(&mut page);

        let options = ViewportOptions::default().with_spy(true);
        controller.attach(good, options, &mut page).unwrap();
        assert!(controller
            .attach(bad, ViewportOptions::default().with_scroll_sensitivity(0.0), &mut page)
            .is_err());

        assert!(controller.is_attached(good));
        assert_eq!(controller.attached_count(), 1);
    }

    #[test]
    fn test_double_detach_is_harmless() {
        let mut page = Page::new(VIEWPORT);
        let mut controller = ViewportController::new();
        let element = below_fold(&mut page);

        controller.attach(element, ViewportOptions::default(), &mut page).unwrap();
        assert!(controller.detach(element, &mut page));
        assert!(!controller.detach(element, &mut page));
        assert!(!controller.is_attached(element));
        assert_eq!(page.listener_count(), 0);
        assert_eq!(page.observer_count(), 0);
    }

    #[test]
    fn test_non_spy_settles_after_entry() {
        let mut page = Page::new(VIEWPORT);
        let window = page.window();
        let mut controller = ViewportController::new();
        let element = below_fold(&mut page);

        let options = ViewportOptions::default().with_intersection_observer(false);
        controller.attach(element, options, &mut page).unwrap();
        assert_eq!(controller.strategy(element), Some(Strategy::Polling));
        assert!(page.listener_count() > 0);

        page.scroll_to(window, ScrollPosition::new(700.0, 0.0));
        settle_time(&mut page, &mut controller);
        assert_eq!(events_for(&mut controller), vec![ViewportEvent::Entered]);
        assert_eq!(controller.is_settled(element), Some(true));
        assert_eq!(controller.entered(element), Some(true));
        assert_eq!(page.listener_count(), 0);

        page.scroll_to(window, ScrollPosition::new(0.0, 0.0));
        settle_time(&mut page, &mut controller);
        assert!(events_for(&mut controller).is_empty());
        assert_eq!(controller.entered(element), Some(true));
        assert_eq!(page.pending_animation_frames(), 0);
        assert_eq!(page.pending_timers(), 0);
    }

    #[test]
    fn test_spy_reports_every_transition() {
        let mut page = Page::new(VIEWPORT);
        let window = page.window();
        let mut controller = ViewportController::new();
        let element = below_fold(&mut page);

        let options = ViewportOptions::default().with_intersection_observer(false).with_spy(true);
        controller.attach(element, options, &mut page).unwrap();

        for _ in 0..2 {
            page.scroll_to(window, ScrollPosition::new(700.0, 0.0));
            page.next_frame(&mut controller);
            page.scroll_to(window, ScrollPosition::new(0.0, 0.0));
            page.next_frame(&mut controller);
        }

        assert_eq!(
            events_for(&mut controller),
            vec![
                ViewportEvent::Entered,
                ViewportEvent::Exited,
                ViewportEvent::Entered,
                ViewportEvent::Exited,
            ]
        );
        assert_eq!(controller.exited(element), Some(true));
    }

    #[test]
    fn test_observer_end_to_end() {
        let mut page = Page::new(VIEWPORT);
        let window = page.window();
        let mut controller = ViewportController::new();
        let element = page.create_element("ember1", Rect::new(0.0, 100.0, 200.0, 100.0));

        let options = ViewportOptions::default().with_spy(true);
        controller.attach(element, options, &mut page).unwrap();
        assert_eq!(controller.strategy(element), Some(Strategy::Observer));
        assert_eq!(page.observer_count(), 1);

        page.tick(&mut controller);
        assert_eq!(events_for(&mut controller), vec![ViewportEvent::Entered]);

        page.scroll_to(window, ScrollPosition::new(2000.0, 0.0));
        page.tick(&mut controller);
        assert_eq!(events_for(&mut controller), vec![ViewportEvent::Exited]);
    }

    #[test]
    fn test_observer_non_spy_disconnects() {
        let mut page = Page::new(VIEWPORT);
        let window = page.window();
        let mut controller = ViewportController::new();
        let element = page.create_element("ember1", Rect::new(0.0, 100.0, 200.0, 100.0));

        controller.attach(element, ViewportOptions::default(), &mut page).unwrap();
        page.tick(&mut controller);
        assert_eq!(events_for(&mut controller), vec![ViewportEvent::Entered]);
        assert_eq!(page.observer_count(), 0);

        page.scroll_to(window, ScrollPosition::new(2000.0, 0.0));
        page.tick(&mut controller);
        assert!(events_for(&mut controller).is_empty());
    }

    #[test]
    fn test_polling_detach_mid_flight() {
        let mut page = Page::new(VIEWPORT);
        let window = page.window();
        let mut controller = ViewportController::new();
        let element = below_fold(&mut page);

        let options = ViewportOptions::default().with_intersection_observer(false);
        controller.attach(element, options, &mut page).unwrap();
        page.next_frame(&mut controller);
        assert_eq!(page.pending_animation_frames(), 1);

        let target = controller.state(element).unwrap().target();
        controller.detach(element, &mut page);

        // A frame that was already queued when detach ran.
        controller.handle_task(ViewportTask::Frame(target), &mut page);

        page.scroll_to(window, ScrollPosition::new(700.0, 0.0));
        page.next_frame(&mut controller);
        assert!(events_for(&mut controller).is_empty());
        assert_eq!(page.pending_animation_frames(), 0);
    }

    #[test]
    fn test_polling_enters_on_first_evaluation() {
        let mut page = Page::new(VIEWPORT);
        let mut controller = ViewportController::new();
        let element = page.create_element("ember1", Rect::new(0.0, 0.0, 100.0, 100.0));

        let options = ViewportOptions::default().with_intersection_observer(false);
        controller.attach(element, options, &mut page).unwrap();
        assert_eq!(events_for(&mut controller), vec![ViewportEvent::Entered]);
        assert_eq!(page.pending_animation_frames(), 0);
    }

    #[test]
    fn test_event_backend_debounces() {
        let mut page = Page::new(VIEWPORT);
        let window = page.window();
        let mut controller = ViewportController::new();
        let element = below_fold(&mut page);

        let options = ViewportOptions::default()
            .event_based()
            .with_listener("window", "scroll.scrollable")
            .with_refresh_rate(100);
        controller.attach(element, options, &mut page).unwrap();

        for step in 1..=5 {
            page.scroll_to(window, ScrollPosition::new(step as f64 * 150.0, 0.0));
            page.advance(Duration::from_millis(20), &mut controller);
        }
        assert!(events_for(&mut controller).is_empty());

        page.advance(Duration::from_millis(150), &mut controller);
        assert_eq!(events_for(&mut controller), vec![ViewportEvent::Entered]);
    }

    #[test]
    fn test_event_backend_reacts_to_resize() {
        let mut page = Page::new(VIEWPORT);
        let window = page.window();
        let mut controller = ViewportController::new();
        let element = below_fold(&mut page);

        let options = ViewportOptions::default().event_based().with_listener("window", "resize");
        controller.attach(element, options, &mut page).unwrap();
        assert!(events_for(&mut controller).is_empty());

        assert!(page.resize(window, 800.0, 1200.0));
        page.advance(Duration::from_millis(50), &mut controller);
        assert!(events_for(&mut controller).is_empty());

        page.advance(Duration::from_millis(150), &mut controller);
        assert_eq!(events_for(&mut controller), vec![ViewportEvent::Entered]);
    }

    #[test]
    fn test_event_backend_custom_event() {
        let mut page = Page::new(VIEWPORT);
        let document = page.document_context();
        let mut controller = ViewportController::new();
        let element = below_fold(&mut page);

        let options = ViewportOptions::default()
            .event_based()
            .with_listener("document", "infinite.loader")
            .with_spy(true);
        controller.attach(element, options, &mut page).unwrap();

        page.set_layout(element, Rect::new(0.0, 10.0, 200.0, 100.0));
        page.dispatch_event(document, "unrelated");
        settle_time(&mut page, &mut controller);
        assert!(events_for(&mut controller).is_empty());

        page.dispatch_event(document, "infinite");
        settle_time(&mut page, &mut controller);
        assert_eq!(events_for(&mut controller), vec![ViewportEvent::Entered]);

        page.set_layout(element, Rect::new(0.0, 1000.0, 200.0, 100.0));
        page.dispatch_event(document, "infinite");
        settle_time(&mut page, &mut controller);
        assert_eq!(events_for(&mut controller), vec![ViewportEvent::Exited]);
    }

    #[test]
    fn test_stale_tasks_after_reattach() {
        let mut page = Page::new(VIEWPORT);
        let window = page.window();
        let mut controller = ViewportController::new();
        let element = below_fold(&mut page);

        let options = ViewportOptions::default()
            .event_based()
            .with_listener("window", "scroll")
            .with_spy(true);
        controller.attach(element, options.clone(), &mut page).unwrap();
        let old = controller.state(element).unwrap().target();

        controller.attach(element, options, &mut page).unwrap();
        let new = controller.state(element).unwrap().target();
        assert_ne!(old.epoch, new.epoch);

        page.scroll_to(window, ScrollPosition::new(700.0, 0.0));
        controller.handle_task(ViewportTask::Debounced(old, HandlerKind::Evaluate), &mut page);
        controller.handle_task(ViewportTask::Frame(old), &mut page);
        assert!(events_for(&mut controller).is_empty());

        // Two listeners per attachment: direction plus the configured one.
        assert_eq!(page.listener_count(), 2);
    }

    #[test]
    fn test_scroll_direction_reported_once_entered() {
        let mut page = Page::new(VIEWPORT);
        let window = page.window();
        let mut controller = ViewportController::new();
        let element = page.create_element("ember1", Rect::new(0.0, 100.0, 200.0, 2000.0));

        let options = ViewportOptions::default().with_intersection_observer(false).with_spy(true);
        controller.attach(element, options, &mut page).unwrap();
        assert_eq!(events_for(&mut controller), vec![ViewportEvent::Entered]);

        page.scroll_to(window, ScrollPosition::new(10.0, 0.0));
        settle_time(&mut page, &mut controller);
        page.scroll_to(window, ScrollPosition::new(60.0, 0.0));
        settle_time(&mut page, &mut controller);
        page.scroll_to(window, ScrollPosition::new(120.0, 0.0));
        settle_time(&mut page, &mut controller);
        page.scroll_to(window, ScrollPosition::new(20.0, 0.0));
        settle_time(&mut page, &mut controller);

        assert_eq!(
            events_for(&mut controller),
            vec![
                ViewportEvent::Scrolled(ScrollDirection::Down),
                ViewportEvent::Scrolled(ScrollDirection::Up),
            ]
        );
        let state = controller.state(element).unwrap();
        assert_eq!(state.last_direction(), Some(ScrollDirection::Up));
        assert_eq!(state.last_position(), Some(ScrollPosition::new(20.0, 0.0)));
    }

    #[test]
    fn test_scroll_container_context() {
        let mut page = Page::new(VIEWPORT);
        let mut controller = ViewportController::new();
        let feed = page.create_container("feed", Rect::new(0.0, 100.0, 400.0, 300.0));
        let element = page.create_element_in("row", Rect::new(0.0, 500.0, 400.0, 50.0), feed);

        let options = ViewportOptions::default()
            .with_intersection_observer(false)
            .with_scroll_context("feed")
            .with_spy(true);
        controller.attach(element, options, &mut page).unwrap();
        assert!(events_for(&mut controller).is_empty());

        page.scroll_to(feed, ScrollPosition::new(250.0, 0.0));
        page.next_frame(&mut controller);
        assert_eq!(events_for(&mut controller), vec![ViewportEvent::Entered]);
    }

    #[test]
    fn test_refresh() {
        let mut page = Page::new(VIEWPORT);
        let mut controller = ViewportController::new();
        let element = below_fold(&mut page);

        let options = ViewportOptions::default().event_based().with_spy(true);
        controller.attach(element, options, &mut page).unwrap();
        assert!(events_for(&mut controller).is_empty());

        page.set_layout(element, Rect::new(0.0, 10.0, 200.0, 100.0));
        assert!(controller.refresh(element, &mut page));
        assert_eq!(events_for(&mut controller), vec![ViewportEvent::Entered]);

        page.remove_element(element);
        assert!(controller.refresh(element, &mut page));
        assert!(events_for(&mut controller).is_empty());
    }

    #[test]
    fn test_refresh_skips_observed_and_settled() {
        let mut page = Page::new(VIEWPORT);
        let mut controller = ViewportController::new();
        let observed = below_fold(&mut page);
        let settled = page.create_element("ember2", Rect::new(0.0, 0.0, 10.0, 10.0));

        controller.attach(observed, ViewportOptions::default(), &mut page).unwrap();
        controller
            .attach(settled, ViewportOptions::default().event_based(), &mut page)
            .unwrap();

        assert!(!controller.refresh(observed, &mut page));
        assert_eq!(controller.is_settled(settled), Some(true));
        assert!(!controller.refresh(settled, &mut page));
    }
}
