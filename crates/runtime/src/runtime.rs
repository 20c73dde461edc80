//! Task queues and the virtual clock.

use std::collections::VecDeque;
use std::time::Duration;

/// Timer handle returned by [`Runtime::add_timer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Animation frame handle returned by [`Runtime::request_animation_frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

/// Task runtime.
pub struct Runtime<T> {
    /// Virtual time since the runtime was created.
    now: Duration,
    /// Pending timers.
    timers: Vec<Timer<T>>,
    /// Timer ID counter.
    timer_counter: u64,
    /// Tasks deferred to the next tick.
    next_tick: VecDeque<T>,
    /// Event macrotasks.
    macrotasks: VecDeque<T>,
    /// Animation frame callbacks.
    animation_frames: Vec<AnimationFrame<T>>,
    /// Animation frame ID counter.
    animation_frame_counter: u64,
}

impl<T> Runtime<T> {
    /// Create a new runtime at time zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            timers: Vec::new(),
            timer_counter: 0,
            next_tick: VecDeque::new(),
            macrotasks: VecDeque::new(),
            animation_frames: Vec::new(),
            animation_frame_counter: 0,
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move the virtual clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Add a one-shot timer.
    pub fn add_timer(&mut self, task: T, delay: Duration) -> TimerId {
        self.timer_counter += 1;
        let id = TimerId(self.timer_counter);

        self.timers.push(Timer {
            id,
            task,
            deadline: self.now + delay,
        });

        id
    }

    /// Cancel a timer. Returns whether it was still pending.
    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        let removed = before != self.timers.len();
        if !removed {
            tracing::trace!(?id, "cancel of a timer that is no longer pending");
        }
        removed
    }

    /// Highest timer id issued so far.
    pub fn timer_horizon(&self) -> TimerId {
        TimerId(self.timer_counter)
    }

    /// Remove and return the earliest due timer issued at or before `horizon`.
    ///
    /// Ties on the deadline fire in scheduling order.
    pub fn pop_ready_timer(&mut self, horizon: TimerId) -> Option<T> {
        let now = self.now;
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.id <= horizon && t.deadline <= now)
            .min_by_key(|(_, t)| (t.deadline, t.id))
            .map(|(i, _)| i)?;

        Some(self.timers.remove(index).task)
    }

    /// Number of pending timers.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Defer a task to the next tick.
    pub fn queue_next_tick(&mut self, task: T) {
        self.next_tick.push_back(task);
    }

    pub fn next_tick_len(&self) -> usize {
        self.next_tick.len()
    }

    pub fn pop_next_tick(&mut self) -> Option<T> {
        self.next_tick.pop_front()
    }

    /// Queue an event macrotask.
    pub fn queue_macrotask(&mut self, task: T) {
        self.macrotasks.push_back(task);
    }

    pub fn macrotask_len(&self) -> usize {
        self.macrotasks.len()
    }

    pub fn pop_macrotask(&mut self) -> Option<T> {
        self.macrotasks.pop_front()
    }

    /// Request an animation frame.
    pub fn request_animation_frame(&mut self, task: T) -> FrameId {
        self.animation_frame_counter += 1;
        let id = FrameId(self.animation_frame_counter);

        self.animation_frames.push(AnimationFrame {
            id,
            task,
            cancelled: false,
        });

        id
    }

    /// Cancel an animation frame. Returns whether it was still pending.
    pub fn cancel_animation_frame(&mut self, id: FrameId) -> bool {
        match self.animation_frames.iter_mut().find(|f| f.id == id && !f.cancelled) {
            Some(frame) => {
                frame.cancelled = true;
                true
            }
            None => {
                tracing::trace!(?id, "cancel of a frame that already ran");
                false
            }
        }
    }

    /// Highest frame id issued so far.
    pub fn frame_horizon(&self) -> FrameId {
        FrameId(self.animation_frame_counter)
    }

    /// Remove and return the next live frame callback requested at or before
    /// `horizon`. Cancelled callbacks are discarded along the way.
    pub fn pop_animation_frame(&mut self, horizon: FrameId) -> Option<T> {
        loop {
            let index = self.animation_frames.iter().position(|f| f.id <= horizon)?;
            let frame = self.animation_frames.remove(index);
            if !frame.cancelled {
                return Some(frame.task);
            }
        }
    }

    /// Number of frame callbacks still waiting to run.
    pub fn pending_animation_frames(&self) -> usize {
        self.animation_frames.iter().filter(|f| !f.cancelled).count()
    }

    /// Check if the runtime has any pending work.
    pub fn has_pending_work(&self) -> bool {
        !self.timers.is_empty()
            || !self.next_tick.is_empty()
            || !self.macrotasks.is_empty()
            || self.pending_animation_frames() > 0
    }
}

impl<T> Default for Runtime<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A pending timer.
struct Timer<T> {
    id: TimerId,
    task: T,
    deadline: Duration,
}

/// A pending animation frame callback.
struct AnimationFrame<T> {
    id: FrameId,
    task: T,
    cancelled: bool,
}
