//! Native intersection observation.

use super::{BackendScope, DetectionBackend};
use crate::host::ViewportHost;
use crate::policy::{self, IntersectionResult, Signal};
use web_apis::{IntersectionObserverEntry, IntersectionObserverInit, ObserverId, RootMargin, Threshold};

/// One observer per attached element.
#[derive(Debug, Default)]
pub struct ObserverBackend {
    observer: Option<ObserverId>,
}

impl ObserverBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observer options for `scope`. The tolerance becomes the root margin,
    /// with positive values growing the root outward.
    pub fn init_for(scope: &BackendScope<'_>) -> IntersectionObserverInit {
        IntersectionObserverInit {
            root: scope.root,
            root_margin: RootMargin::from_pixels(scope.options.tolerance),
            threshold: Threshold::Single(scope.options.intersection_threshold),
        }
    }

    /// Apply a notification for the observed element. Only the first entry
    /// is inspected.
    pub fn apply(entered: &mut bool, entries: &[IntersectionObserverEntry]) -> Option<Signal> {
        let entry = entries.first()?;
        policy::observed(entered, IntersectionResult::from(entry))
    }

    pub fn observer(&self) -> Option<ObserverId> {
        self.observer
    }
}

impl From<&IntersectionObserverEntry> for IntersectionResult {
    fn from(entry: &IntersectionObserverEntry) -> Self {
        IntersectionResult {
            is_intersecting: entry.is_intersecting,
            ratio: entry.intersection_ratio,
        }
    }
}

impl DetectionBackend for ObserverBackend {
    fn start<H: ViewportHost>(&mut self, scope: &BackendScope<'_>, host: &mut H) {
        if self.observer.is_some() {
            return;
        }
        let init = Self::init_for(scope);
        self.observer = Some(host.observe_intersection(scope.target.element, init, scope.target));
    }

    fn stop<H: ViewportHost>(&mut self, host: &mut H) {
        if let Some(observer) = self.observer.take() {
            host.disconnect_observer(observer);
        }
    }

    fn is_running(&self) -> bool {
        self.observer.is_some()
    }
}
