//! Detection backends.
//!
//! Three interchangeable ways to learn that an element's visibility changed:
//!
//! - [`ObserverBackend`]: native intersection observation, edge-triggered
//! - [`PollingBackend`]: re-evaluate geometry on every animation frame
//! - [`EventBackend`]: re-evaluate geometry after debounced DOM events
//!
//! All three share the start/stop contract of [`DetectionBackend`]. Stopping
//! is idempotent and releases every host resource the backend holds.

pub mod event;
pub mod observer;
pub mod polling;

pub use event::{EventBackend, ResolvedListener};
pub use observer::ObserverBackend;
pub use polling::PollingBackend;

use crate::capabilities::Capabilities;
use crate::host::{TaskTarget, ViewportHost};
use crate::options::ViewportOptions;
use dom::ContextId;
use serde::Serialize;
use std::fmt;

/// Detection strategy chosen for an attachment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Observer,
    Polling,
    EventBased,
}

impl Strategy {
    /// Pick the best strategy the options ask for and the host supports.
    pub fn select(options: &ViewportOptions, capabilities: Capabilities) -> Strategy {
        if options.use_intersection_observer && capabilities.can_use_intersection_observer() {
            Strategy::Observer
        } else if options.use_frame_scheduling && capabilities.can_use_animation_frame() {
            Strategy::Polling
        } else {
            Strategy::EventBased
        }
    }

    /// Whether the controller runs the geometry test for this strategy.
    pub fn evaluates_geometry(&self) -> bool {
        !matches!(self, Strategy::Observer)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Observer => f.write_str("observer"),
            Strategy::Polling => f.write_str("polling"),
            Strategy::EventBased => f.write_str("event-based"),
        }
    }
}

/// What a backend needs to know to start.
#[derive(Clone, Copy, Debug)]
pub struct BackendScope<'a> {
    pub target: TaskTarget,
    /// Resolved scroll context.
    pub context: ContextId,
    /// Observation root; `None` means the top-level viewport.
    pub root: Option<ContextId>,
    pub options: &'a ViewportOptions,
    pub listeners: &'a [ResolvedListener],
}

pub trait DetectionBackend {
    fn start<H: ViewportHost>(&mut self, scope: &BackendScope<'_>, host: &mut H);

    fn stop<H: ViewportHost>(&mut self, host: &mut H);

    fn is_running(&self) -> bool;
}

/// The backend an attachment runs.
#[derive(Debug)]
pub enum Backend {
    Observer(ObserverBackend),
    Polling(PollingBackend),
    EventBased(EventBackend),
}

impl Backend {
    pub fn for_strategy(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Observer => Backend::Observer(ObserverBackend::new()),
            Strategy::Polling => Backend::Polling(PollingBackend::new()),
            Strategy::EventBased => Backend::EventBased(EventBackend::new()),
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Backend::Observer(_) => Strategy::Observer,
            Backend::Polling(_) => Strategy::Polling,
            Backend::EventBased(_) => Strategy::EventBased,
        }
    }
}

impl DetectionBackend for Backend {
    fn start<H: ViewportHost>(&mut self, scope: &BackendScope<'_>, host: &mut H) {
        match self {
            Backend::Observer(backend) => backend.start(scope, host),
            Backend::Polling(backend) => backend.start(scope, host),
            Backend::EventBased(backend) => backend.start(scope, host),
        }
    }

    fn stop<H: ViewportHost>(&mut self, host: &mut H) {
        match self {
            Backend::Observer(backend) => backend.stop(host),
            Backend::Polling(backend) => backend.stop(host),
            Backend::EventBased(backend) => backend.stop(host),
        }
    }

    fn is_running(&self) -> bool {
        match self {
            Backend::Observer(backend) => backend.is_running(),
            Backend::Polling(backend) => backend.is_running(),
            Backend::EventBased(backend) => backend.is_running(),
        }
    }
}
