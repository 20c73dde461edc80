//! Intersection Observer API implementation.
//!
//! Observers are kept in an [`IntersectionObserverRegistry`]. After every
//! layout-affecting change the host calls [`IntersectionObserverRegistry::process`],
//! which computes an entry per observed target and returns the entries whose
//! threshold index or intersecting state changed since the previous run,
//! batched per observer together with the observer's callback payload.
//! The first run after `observe` always reports.

use common::{EdgeSizes, Rect};
use dom::{ContextId, Document, ElementId};
use slotmap::{new_key_type, SlotMap};
use std::fmt;

new_key_type! {
    /// Intersection observer handle.
    pub struct ObserverId;
}

/// Intersection observer options.
#[derive(Clone, Debug)]
pub struct IntersectionObserverInit {
    /// Root context (None = viewport).
    pub root: Option<ContextId>,
    /// Root margin.
    pub root_margin: RootMargin,
    /// Threshold(s).
    pub threshold: Threshold,
}

impl Default for IntersectionObserverInit {
    fn default() -> Self {
        Self {
            root: None,
            root_margin: RootMargin::default(),
            threshold: Threshold::Single(0.0),
        }
    }
}

/// Root margin specification.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl RootMargin {
    /// Margin from pixel edges. Positive values grow the root outward.
    pub fn from_pixels(edges: EdgeSizes) -> Self {
        Self {
            top: MarginValue::Pixels(edges.top),
            right: MarginValue::Pixels(edges.right),
            bottom: MarginValue::Pixels(edges.bottom),
            left: MarginValue::Pixels(edges.left),
        }
    }

    /// Parse root margin from a CSS margin shorthand string.
    pub fn parse(margin: &str) -> Result<Self, String> {
        let parts: Vec<&str> = margin.split_whitespace().collect();

        match parts.len() {
            0 => Ok(Self::default()),
            1 => {
                let value = MarginValue::parse(parts[0])?;
                Ok(Self {
                    top: value,
                    right: value,
                    bottom: value,
                    left: value,
                })
            }
            2 => {
                let vertical = MarginValue::parse(parts[0])?;
                let horizontal = MarginValue::parse(parts[1])?;
                Ok(Self {
                    top: vertical,
                    right: horizontal,
                    bottom: vertical,
                    left: horizontal,
                })
            }
            3 => {
                let horizontal = MarginValue::parse(parts[1])?;
                Ok(Self {
                    top: MarginValue::parse(parts[0])?,
                    right: horizontal,
                    bottom: MarginValue::parse(parts[2])?,
                    left: horizontal,
                })
            }
            4 => Ok(Self {
                top: MarginValue::parse(parts[0])?,
                right: MarginValue::parse(parts[1])?,
                bottom: MarginValue::parse(parts[2])?,
                left: MarginValue::parse(parts[3])?,
            }),
            _ => Err("Invalid root margin format".to_string()),
        }
    }

    /// Resolve against the root's size.
    pub fn to_edges(&self, root: &Rect) -> EdgeSizes {
        EdgeSizes::new(
            self.top.to_pixels(root.height),
            self.right.to_pixels(root.width),
            self.bottom.to_pixels(root.height),
            self.left.to_pixels(root.width),
        )
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

/// Margin value (pixels or percentage).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarginValue {
    Pixels(f64),
    Percentage(f64),
}

impl MarginValue {
    /// Parse a margin value.
    pub fn parse(value: &str) -> Result<Self, String> {
        let value = value.trim();

        if let Some(num) = value.strip_suffix('%') {
            let num = num.parse::<f64>().map_err(|_| "Invalid percentage")?;
            Ok(MarginValue::Percentage(num))
        } else if let Some(num) = value.strip_suffix("px") {
            let num = num.parse::<f64>().map_err(|_| "Invalid pixel value")?;
            Ok(MarginValue::Pixels(num))
        } else {
            // Unitless zero is the only unitless value CSS allows here.
            match value.parse::<f64>() {
                Ok(num) if num == 0.0 => Ok(MarginValue::Pixels(0.0)),
                _ => Err("Invalid value".to_string()),
            }
        }
    }

    /// Get the value in pixels given a reference size.
    pub fn to_pixels(&self, reference: f64) -> f64 {
        match self {
            MarginValue::Pixels(px) => *px,
            MarginValue::Percentage(pct) => reference * pct / 100.0,
        }
    }
}

impl Default for MarginValue {
    fn default() -> Self {
        MarginValue::Pixels(0.0)
    }
}

impl fmt::Display for MarginValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginValue::Pixels(px) => write!(f, "{}px", px),
            MarginValue::Percentage(pct) => write!(f, "{}%", pct),
        }
    }
}

/// Threshold specification.
#[derive(Clone, Debug, PartialEq)]
pub enum Threshold {
    Single(f64),
    Multiple(Vec<f64>),
}

/// Intersection observer entry.
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionObserverEntry {
    /// Target element.
    pub target: ElementId,
    /// Bounding client rect.
    pub bounding_client_rect: Rect,
    /// Intersection rect.
    pub intersection_rect: Rect,
    /// Root bounds (after margin).
    pub root_bounds: Option<Rect>,
    /// Intersection ratio.
    pub intersection_ratio: f64,
    /// Is intersecting.
    pub is_intersecting: bool,
    /// Time in milliseconds.
    pub time: f64,
}

/// Last reported state of a target.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Reported {
    threshold_index: usize,
    is_intersecting: bool,
}

#[derive(Clone, Debug)]
struct ObservedTarget {
    element: ElementId,
    last: Option<Reported>,
}

/// Intersection Observer.
pub struct IntersectionObserver<T> {
    /// Callback payload.
    callback: T,
    /// Root context (None = viewport).
    root: Option<ContextId>,
    /// Root margin.
    root_margin: RootMargin,
    /// Thresholds, sorted and clamped to `[0, 1]`.
    thresholds: Vec<f64>,
    /// Observed targets.
    targets: Vec<ObservedTarget>,
}

impl<T> IntersectionObserver<T> {
    /// Create a new Intersection Observer.
    pub fn new(callback: T, options: IntersectionObserverInit) -> Self {
        Self {
            callback,
            root: options.root,
            root_margin: options.root_margin,
            thresholds: Self::normalize_thresholds(options.threshold),
            targets: Vec::new(),
        }
    }

    /// Normalize thresholds to a sorted list.
    fn normalize_thresholds(threshold: Threshold) -> Vec<f64> {
        let mut thresholds = match threshold {
            Threshold::Single(t) => vec![t],
            Threshold::Multiple(ts) => ts,
        };

        thresholds.retain(|t| !t.is_nan());
        for t in &mut thresholds {
            *t = t.clamp(0.0, 1.0);
        }

        thresholds.sort_by(f64::total_cmp);
        thresholds.dedup();
        if thresholds.is_empty() {
            thresholds.push(0.0);
        }
        thresholds
    }

    /// Observe a target element.
    pub fn observe(&mut self, target: ElementId) {
        if !self.targets.iter().any(|t| t.element == target) {
            self.targets.push(ObservedTarget { element: target, last: None });
        }
    }

    /// Stop observing a target element.
    pub fn unobserve(&mut self, target: ElementId) {
        self.targets.retain(|t| t.element != target);
    }

    pub fn root_margin(&self) -> &RootMargin {
        &self.root_margin
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn targets(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.targets.iter().map(|t| t.element)
    }

    /// Compute an entry for `target` against `root_bounds`.
    fn compute_entry(&self, doc: &Document, target: ElementId, root_bounds: Option<Rect>, time: f64) -> IntersectionObserverEntry {
        let target_rect = doc.bounding_client_rect(target);
        let intersection = match (target_rect, root_bounds) {
            (Some(rect), Some(root)) if rect.is_well_formed() => rect.touching_intersection(&root),
            _ => None,
        };

        let intersection_ratio = match (&intersection, target_rect) {
            (Some(hit), Some(rect)) if rect.area() > 0.0 => (hit.area() / rect.area()).clamp(0.0, 1.0),
            (Some(_), _) => 1.0,
            _ => 0.0,
        };

        // The smallest threshold gates `is_intersecting` once it is above
        // zero, so partial overlaps below it do not count as visible.
        let min_threshold = self.thresholds[0];
        let is_intersecting = intersection.is_some()
            && (min_threshold <= 0.0 || intersection_ratio >= min_threshold);

        IntersectionObserverEntry {
            target,
            bounding_client_rect: target_rect.unwrap_or_default(),
            intersection_rect: intersection.unwrap_or_default(),
            root_bounds,
            intersection_ratio,
            is_intersecting,
            time,
        }
    }

    fn threshold_index(&self, ratio: f64) -> usize {
        self.thresholds.iter().take_while(|t| **t <= ratio).count()
    }
}

/// Intersection observer registry.
pub struct IntersectionObserverRegistry<T> {
    observers: SlotMap<ObserverId, IntersectionObserver<T>>,
}

impl<T: Clone> IntersectionObserverRegistry<T> {
    pub fn new() -> Self {
        Self {
            observers: SlotMap::with_key(),
        }
    }

    /// Create and register an observer.
    pub fn create(&mut self, callback: T, options: IntersectionObserverInit) -> ObserverId {
        self.observers.insert(IntersectionObserver::new(callback, options))
    }

    pub fn observe(&mut self, id: ObserverId, target: ElementId) -> bool {
        match self.observers.get_mut(id) {
            Some(observer) => {
                observer.observe(target);
                true
            }
            None => false,
        }
    }

    pub fn unobserve(&mut self, id: ObserverId, target: ElementId) {
        if let Some(observer) = self.observers.get_mut(id) {
            observer.unobserve(target);
        }
    }

    /// Stop observing all targets and release the observer.
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Recompute every observation and collect the notifications to deliver.
    pub fn process(&mut self, doc: &Document, time: f64) -> Vec<(T, Vec<IntersectionObserverEntry>)> {
        let mut notifications = Vec::new();

        for observer in self.observers.values_mut() {
            let root = observer.root.unwrap_or_else(|| doc.window());
            let root_bounds = doc
                .context_client_rect(root)
                .map(|bounds| bounds.outset(&observer.root_margin.to_edges(&bounds)));

            let mut entries = Vec::new();
            for index in 0..observer.targets.len() {
                let element = observer.targets[index].element;
                let entry = observer.compute_entry(doc, element, root_bounds, time);
                let reported = Reported {
                    threshold_index: observer.threshold_index(entry.intersection_ratio),
                    is_intersecting: entry.is_intersecting,
                };

                let target = &mut observer.targets[index];
                if target.last != Some(reported) {
                    target.last = Some(reported);
                    entries.push(entry);
                }
            }

            if !entries.is_empty() {
                notifications.push((observer.callback.clone(), entries));
            }
        }

        notifications
    }
}

impl<T: Clone> Default for IntersectionObserverRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
