//! Viewport tracking options.
//!
//! Options arrive from an external configuration lookup as a
//! [`PartialViewportOptions`] document (JSON, camelCase keys). Missing keys
//! take the defaults below; the two strategy flags default to whatever the
//! host can actually do.
//!
//! | key | default |
//! |---|---|
//! | `enabled` | `true` |
//! | `useIntersectionObserver` | host supports intersection observation |
//! | `useFrameScheduling` | host supports animation frames |
//! | `spy` | `false` |
//! | `tolerance` | `{top: 0, right: 0, bottom: 0, left: 0}` |
//! | `intersectionThreshold` | `0` |
//! | `scrollSensitivity` | `1` |
//! | `refreshRate` | `100` (ms) |
//! | `listeners` | `[]` |
//! | `scrollContext` | `"window"` |

use crate::capabilities::Capabilities;
use common::{EdgeSizes, ViewportError, ViewportResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Pixel margins added around the viewport for intersection tests.
pub type Tolerance = EdgeSizes;

/// Reference to a scroll context, by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContextRef {
    Window,
    Document,
    /// A scroll container registered with the host under this name.
    Named(Arc<str>),
}

impl From<&str> for ContextRef {
    fn from(name: &str) -> Self {
        match name {
            "window" => ContextRef::Window,
            "document" => ContextRef::Document,
            other => ContextRef::Named(Arc::from(other)),
        }
    }
}

impl From<String> for ContextRef {
    fn from(name: String) -> Self {
        ContextRef::from(name.as_str())
    }
}

impl From<ContextRef> for String {
    fn from(context: ContextRef) -> Self {
        context.to_string()
    }
}

impl fmt::Display for ContextRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextRef::Window => f.write_str("window"),
            ContextRef::Document => f.write_str("document"),
            ContextRef::Named(name) => f.write_str(name),
        }
    }
}

/// An extra `(context, event)` pair the event backend listens to.
///
/// Both halves are optional so that a `null` coming out of configuration
/// survives until `attach` can report it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListenerSpec {
    pub context: Option<ContextRef>,
    pub event: Option<String>,
}

impl ListenerSpec {
    pub fn new(context: impl Into<ContextRef>, event: &str) -> Self {
        Self {
            context: Some(context.into()),
            event: Some(event.to_string()),
        }
    }
}

/// Options as found in configuration: every key optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialViewportOptions {
    pub enabled: Option<bool>,
    pub use_frame_scheduling: Option<bool>,
    pub use_intersection_observer: Option<bool>,
    pub spy: Option<bool>,
    pub tolerance: Option<Tolerance>,
    pub intersection_threshold: Option<f64>,
    pub scroll_sensitivity: Option<f64>,
    pub refresh_rate: Option<u64>,
    pub listeners: Option<Vec<ListenerSpec>>,
    pub scroll_context: Option<ContextRef>,
}

impl PartialViewportOptions {
    /// Parse a configuration document.
    pub fn from_json(json: &str) -> ViewportResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Layer `over` on top of `self`; keys set in `over` win.
    pub fn merge(self, over: PartialViewportOptions) -> Self {
        Self {
            enabled: over.enabled.or(self.enabled),
            use_frame_scheduling: over.use_frame_scheduling.or(self.use_frame_scheduling),
            use_intersection_observer: over.use_intersection_observer.or(self.use_intersection_observer),
            spy: over.spy.or(self.spy),
            tolerance: over.tolerance.or(self.tolerance),
            intersection_threshold: over.intersection_threshold.or(self.intersection_threshold),
            scroll_sensitivity: over.scroll_sensitivity.or(self.scroll_sensitivity),
            refresh_rate: over.refresh_rate.or(self.refresh_rate),
            listeners: over.listeners.or(self.listeners),
            scroll_context: over.scroll_context.or(self.scroll_context),
        }
    }

    /// Fill in every missing key from the defaults for `capabilities`.
    pub fn resolve(self, capabilities: Capabilities) -> ViewportOptions {
        let defaults = ViewportOptions::for_capabilities(capabilities);

        ViewportOptions {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            use_frame_scheduling: self.use_frame_scheduling.unwrap_or(defaults.use_frame_scheduling),
            use_intersection_observer: self
                .use_intersection_observer
                .unwrap_or(defaults.use_intersection_observer),
            spy: self.spy.unwrap_or(defaults.spy),
            tolerance: self.tolerance.unwrap_or(defaults.tolerance),
            intersection_threshold: self.intersection_threshold.unwrap_or(defaults.intersection_threshold),
            scroll_sensitivity: self.scroll_sensitivity.unwrap_or(defaults.scroll_sensitivity),
            refresh_rate: self.refresh_rate.unwrap_or(defaults.refresh_rate),
            listeners: self.listeners.unwrap_or(defaults.listeners),
            scroll_context: self.scroll_context.unwrap_or(defaults.scroll_context),
        }
    }
}

/// Fully resolved options for one attached element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportOptions {
    /// Whether tracking is enabled at all.
    pub enabled: bool,
    /// Prefer animation-frame polling when observation is not used.
    pub use_frame_scheduling: bool,
    /// Prefer native intersection observation.
    pub use_intersection_observer: bool,
    /// Keep reporting enter and exit instead of settling after first entry.
    pub spy: bool,
    /// Margins around the viewport, in pixels.
    pub tolerance: Tolerance,
    /// Observer threshold ratio in `[0, 1]`.
    pub intersection_threshold: f64,
    /// Minimum offset delta to register a direction.
    pub scroll_sensitivity: f64,
    /// Debounce interval for event handlers, in milliseconds.
    pub refresh_rate: u64,
    /// Extra `(context, event)` pairs for the event backend.
    pub listeners: Vec<ListenerSpec>,
    /// Scroll context bounding the element.
    pub scroll_context: ContextRef,
}

impl ViewportOptions {
    /// Defaults for a host with the given capabilities.
    pub fn for_capabilities(capabilities: Capabilities) -> Self {
        Self {
            enabled: true,
            use_frame_scheduling: capabilities.can_use_animation_frame(),
            use_intersection_observer: capabilities.can_use_intersection_observer(),
            spy: false,
            tolerance: Tolerance::ZERO,
            intersection_threshold: 0.0,
            scroll_sensitivity: 1.0,
            refresh_rate: 100,
            listeners: Vec::new(),
            scroll_context: ContextRef::Window,
        }
    }

    pub fn with_spy(mut self, spy: bool) -> Self {
        self.spy = spy;
        self
    }

    pub fn with_intersection_observer(mut self, enabled: bool) -> Self {
        self.use_intersection_observer = enabled;
        self
    }

    pub fn with_frame_scheduling(mut self, enabled: bool) -> Self {
        self.use_frame_scheduling = enabled;
        self
    }

    /// Use neither observation nor polling.
    pub fn event_based(self) -> Self {
        self.with_intersection_observer(false).with_frame_scheduling(false)
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.intersection_threshold = threshold;
        self
    }

    pub fn with_scroll_sensitivity(mut self, sensitivity: f64) -> Self {
        self.scroll_sensitivity = sensitivity;
        self
    }

    pub fn with_refresh_rate(mut self, millis: u64) -> Self {
        self.refresh_rate = millis;
        self
    }

    pub fn with_listener(mut self, context: impl Into<ContextRef>, event: &str) -> Self {
        self.listeners.push(ListenerSpec::new(context, event));
        self
    }

    pub fn with_scroll_context(mut self, context: impl Into<ContextRef>) -> Self {
        self.scroll_context = context.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_rate)
    }

    /// Checks that need no host. Context resolution happens at attach time.
    pub fn validate(&self) -> ViewportResult<()> {
        if !(self.scroll_sensitivity.is_finite() && self.scroll_sensitivity > 0.0) {
            return Err(ViewportError::configuration(format!(
                "sensitivity cannot be {}",
                self.scroll_sensitivity
            )));
        }

        if !(0.0..=1.0).contains(&self.intersection_threshold) {
            return Err(ViewportError::configuration(format!(
                "intersection threshold {} is outside [0, 1]",
                self.intersection_threshold
            )));
        }

        if !self.tolerance.is_finite() {
            return Err(ViewportError::configuration("tolerance must be finite"));
        }

        for (index, listener) in self.listeners.iter().enumerate() {
            if listener.context.is_none() {
                return Err(ViewportError::configuration(format!(
                    "listener {index}: you must pass a valid context"
                )));
            }
            match listener.event.as_deref().map(str::trim) {
                Some(event) if !event.is_empty() => {}
                _ => {
                    return Err(ViewportError::configuration(format!(
                        "listener {index}: you must pass a valid event"
                    )))
                }
            }
        }

        Ok(())
    }
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self::for_capabilities(Capabilities::all())
    }
}
