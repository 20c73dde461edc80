//! Cooperative single-threaded scheduler.
//!
//! The [`Runtime`] owns every queue a host platform offers to page code:
//! timers (`setTimeout`), animation frames (`requestAnimationFrame`), the
//! next-tick queue and event macrotasks. Time is virtual and only moves when
//! the embedder advances it, so scheduling is fully deterministic. The
//! [`EventLoop`] decides which queues are drained on each tick and in which
//! order.

pub mod event_loop;
pub mod runtime;

pub use event_loop::{EventLoop, TickPlan, Work};
pub use runtime::{FrameId, Runtime, TimerId};
