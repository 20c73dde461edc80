//! Event loop ordering.
//!
//! Each tick drains, in order: the next-tick queue, due timers, queued event
//! macrotasks, and, when a frame interval has elapsed, animation frame
//! callbacks. Work queued while a tick runs waits for a later tick, so a
//! callback that reschedules itself cannot starve the loop.

use crate::runtime::{FrameId, Runtime, TimerId};
use std::time::Duration;

/// A unit of work handed to the embedder, tagged with the queue it came from.
#[derive(Clone, Debug, PartialEq)]
pub enum Work<T> {
    NextTick(T),
    Timer(T),
    Event(T),
    Frame(T),
}

impl<T> Work<T> {
    pub fn into_task(self) -> T {
        match self {
            Work::NextTick(task) | Work::Timer(task) | Work::Event(task) | Work::Frame(task) => task,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    NextTick,
    Timers,
    Events,
    Frames,
    Done,
}

/// Snapshot of the work one tick is allowed to run.
#[derive(Clone, Debug)]
pub struct TickPlan {
    phase: Phase,
    next_tick: usize,
    timer_horizon: TimerId,
    macrotasks: usize,
    frame_horizon: Option<FrameId>,
}

impl TickPlan {
    /// Whether this tick runs animation frame callbacks.
    pub fn runs_frames(&self) -> bool {
        self.frame_horizon.is_some()
    }
}

/// Event loop for a [`Runtime`].
pub struct EventLoop {
    /// Frame rate target (for requestAnimationFrame).
    target_frame_time: Duration,
    /// Virtual time the next frame is due. Advances by whole intervals so
    /// short ticks never push it later.
    next_frame_time: Option<Duration>,
    /// Frames run so far.
    frame_count: u64,
}

impl EventLoop {
    /// Create a new event loop at 60 frames per second.
    pub fn new() -> Self {
        Self::with_interval(Duration::from_nanos(16_666_666))
    }

    /// Create an event loop running `fps` frames per second.
    ///
    /// Returns `None` unless `fps` is finite, positive, and leaves a frame
    /// interval of at least one nanosecond.
    pub fn with_frame_rate(fps: f64) -> Option<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return None;
        }
        // Truncate so whole intervals never overshoot the time they cover.
        let nanos = (1_000_000_000.0 / fps).floor();
        if nanos < 1.0 {
            return None;
        }
        Some(Self::with_interval(Duration::from_nanos(nanos as u64)))
    }

    fn with_interval(target_frame_time: Duration) -> Self {
        Self {
            target_frame_time,
            next_frame_time: None,
            frame_count: 0,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.target_frame_time
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Start a tick at the runtime's current time.
    pub fn plan<T>(&mut self, runtime: &Runtime<T>) -> TickPlan {
        let now = runtime.now();
        let frame_due = self.next_frame_time.map_or(true, |due| now >= due);

        let frame_horizon = if frame_due {
            // Keep the cadence unless the loop fell a whole interval behind.
            let next = match self.next_frame_time {
                Some(due) if now < due + self.target_frame_time => due + self.target_frame_time,
                _ => now + self.target_frame_time,
            };
            self.next_frame_time = Some(next);
            self.frame_count += 1;
            Some(runtime.frame_horizon())
        } else {
            None
        };

        TickPlan {
            phase: Phase::NextTick,
            next_tick: runtime.next_tick_len(),
            timer_horizon: runtime.timer_horizon(),
            macrotasks: runtime.macrotask_len(),
            frame_horizon,
        }
    }

    /// Pull the next piece of work for `plan`, or `None` once the tick is over.
    pub fn next_work<T>(&self, plan: &mut TickPlan, runtime: &mut Runtime<T>) -> Option<Work<T>> {
        loop {
            match plan.phase {
                Phase::NextTick => {
                    if plan.next_tick > 0 {
                        plan.next_tick -= 1;
                        if let Some(task) = runtime.pop_next_tick() {
                            return Some(Work::NextTick(task));
                        }
                    }
                    plan.phase = Phase::Timers;
                }
                Phase::Timers => match runtime.pop_ready_timer(plan.timer_horizon) {
                    Some(task) => return Some(Work::Timer(task)),
                    None => plan.phase = Phase::Events,
                },
                Phase::Events => {
                    if plan.macrotasks > 0 {
                        plan.macrotasks -= 1;
                        if let Some(task) = runtime.pop_macrotask() {
                            return Some(Work::Event(task));
                        }
                    }
                    plan.phase = Phase::Frames;
                }
                Phase::Frames => {
                    let frame = plan
                        .frame_horizon
                        .and_then(|horizon| runtime.pop_animation_frame(horizon));
                    match frame {
                        Some(task) => return Some(Work::Frame(task)),
                        None => plan.phase = Phase::Done,
                    }
                }
                Phase::Done => return None,
            }
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}
