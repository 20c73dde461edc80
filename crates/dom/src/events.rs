//! DOM event listener registry.

use crate::node::ContextId;
use indexmap::IndexMap;
use std::sync::Arc;

/// Event type enumeration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Scroll,
    Resize,
    Wheel,
    TouchStart,
    TouchMove,
    TouchEnd,
    Load,
    Custom(Arc<str>),
}

impl EventType {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "scroll" => EventType::Scroll,
            "resize" => EventType::Resize,
            "wheel" => EventType::Wheel,
            "touchstart" => EventType::TouchStart,
            "touchmove" => EventType::TouchMove,
            "touchend" => EventType::TouchEnd,
            "load" => EventType::Load,
            other => EventType::Custom(Arc::from(other)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::Scroll => "scroll",
            EventType::Resize => "resize",
            EventType::Wheel => "wheel",
            EventType::TouchStart => "touchstart",
            EventType::TouchMove => "touchmove",
            EventType::TouchEnd => "touchend",
            EventType::Load => "load",
            EventType::Custom(s) => s,
        }
    }
}

/// An event name with an optional namespace, as in `scroll.scrollable`.
///
/// The namespace only labels the registration; dispatch matches on the type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventSpec {
    pub event_type: EventType,
    pub namespace: Option<Arc<str>>,
}

impl EventSpec {
    /// Parse `type[.namespace]`. Returns `None` for an empty type.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        let (name, namespace) = match spec.split_once('.') {
            Some((name, ns)) if !ns.is_empty() => (name, Some(Arc::from(ns))),
            Some((name, _)) => (name, None),
            None => (spec, None),
        };

        if name.is_empty() {
            return None;
        }

        Some(Self {
            event_type: EventType::from_str(name),
            namespace,
        })
    }
}

/// Listener registration handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// A registered listener.
#[derive(Clone, Debug)]
pub struct Registration<T> {
    /// Context the listener is bound on.
    pub target: ContextId,
    /// Event the listener is bound to.
    pub event: EventSpec,
    /// Work delivered when the event fires.
    pub payload: T,
}

/// Listener registry, dispatched in registration order.
#[derive(Debug)]
pub struct EventListeners<T> {
    registrations: IndexMap<ListenerId, Registration<T>>,
    next_id: u64,
}

impl<T: Clone> EventListeners<T> {
    pub fn new() -> Self {
        Self {
            registrations: IndexMap::new(),
            next_id: 1,
        }
    }

    /// Register a listener.
    pub fn add(&mut self, target: ContextId, event: EventSpec, payload: T) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.registrations.insert(id, Registration { target, event, payload });
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.registrations.shift_remove(&id).is_some()
    }

    /// Payloads of the listeners an event of `event_type` on `target` reaches.
    pub fn matching(&self, target: ContextId, event_type: &EventType) -> Vec<T> {
        self.registrations
            .values()
            .filter(|reg| reg.target == target && &reg.event.event_type == event_type)
            .map(|reg| reg.payload.clone())
            .collect()
    }

    /// Number of listeners bound on `target`.
    pub fn count_for(&self, target: ContextId) -> usize {
        self.registrations.values().filter(|reg| reg.target == target).count()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl<T: Clone> Default for EventListeners<T> {
    fn default() -> Self {
        Self::new()
    }
}
