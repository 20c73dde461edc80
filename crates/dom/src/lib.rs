//! Simulated render tree.
//!
//! Elements are laid out in the content space of a scroll context (the
//! window, or a scrollable container). Client rects are derived from the
//! layout and the scroll offsets of every enclosing context.

pub mod document;
pub mod element;
pub mod events;
pub mod node;
pub mod window;

pub use document::{Document, DocumentRef};
pub use element::Element;
pub use events::{EventListeners, EventSpec, EventType, ListenerId};
pub use node::{ContextId, ElementId};
pub use window::{ContextKind, ContextMetrics, ScrollContext};
