//! Viewport entry/exit detection for rendered elements.
//!
//! A [`ViewportController`] tracks attached elements and reports when each
//! enters or leaves its scroll context's viewport, plus the direction of
//! scrolling while it is visible. Detection runs on one of three backends,
//! chosen per element from the options and what the host supports:
//! intersection observation, animation-frame polling, or debounced events.
//!
//! Hosts implement [`ViewportHost`]; [`Page`] is a complete host over the
//! simulated document and event loop.
//!
//! ```no_run
//! use common::{Rect, ScrollPosition, Size};
//! use in_viewport::{Page, ViewportController, ViewportOptions};
//!
//! let mut page = Page::new(Size::new(1280.0, 720.0));
//! let mut controller = ViewportController::new();
//! let footer = page.create_element("footer", Rect::new(0.0, 2000.0, 1280.0, 200.0));
//!
//! controller.attach(footer, ViewportOptions::default(), &mut page)?;
//! page.scroll_to(page.window(), ScrollPosition::new(1500.0, 0.0));
//! page.next_frame(&mut controller);
//!
//! for event in controller.take_events() {
//!     println!("{:?}: {}", event.element, event.event.hook_name());
//! }
//! # Ok::<(), common::ViewportError>(())
//! ```

pub mod backend;
pub mod capabilities;
pub mod controller;
pub mod debounce;
pub mod direction;
pub mod event;
pub mod geometry;
pub mod host;
pub mod options;
pub mod page;
pub mod policy;

pub use backend::{Backend, DetectionBackend, Strategy};
pub use capabilities::Capabilities;
pub use controller::{ElementViewportState, ViewportController};
pub use direction::{scroll_direction, DirectionTracker, ScrollDirection};
pub use event::{ElementEvent, ViewportEvent};
pub use geometry::is_intersecting;
pub use host::{HandlerKind, TaskTarget, ViewportHost, ViewportTask};
pub use options::{ContextRef, ListenerSpec, PartialViewportOptions, Tolerance, ViewportOptions};
pub use page::Page;
pub use policy::{IntersectionResult, Signal};

pub use common::{ViewportError, ViewportResult};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
