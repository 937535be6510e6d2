// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A deterministic, host-driven event loop: virtual clock, one-shot timers and animation frames.
//!
//! ## Usage
//!
//! The loop never runs anything on its own. The host pops due work and runs it:
//!
//! ```
//! use understory_dom::EventLoop;
//!
//! let mut ev: EventLoop<&str> = EventLoop::new();
//! let _slow = ev.set_timeout(100, "slow");
//! let fast = ev.set_timeout(10, "fast");
//! ev.request_frame("frame");
//! ev.clear_timeout(fast);
//!
//! // Advance the clock by 150ms, draining due timers in deadline order.
//! let mut ran = Vec::new();
//! while let Some(task) = ev.pop_due(ev.now() + 150) {
//!     ran.push(task);
//! }
//! ev.settle(150);
//! assert_eq!(ran, ["slow"]);
//! assert_eq!(ev.now(), 150);
//!
//! // Run one animation frame batch.
//! let batch = ev.begin_frame();
//! assert_eq!(ev.pop_frame(batch), Some("frame"));
//! assert_eq!(ev.pop_frame(batch), None);
//! ```
//!
//! ## Ordering
//!
//! - Timers fire in `(deadline, registration)` order; the clock jumps to each deadline as it fires.
//! - Frames requested while a batch is running are deferred to the next batch.
//! - Cancelling a handle that already fired (or was cancelled) is a no-op.

use alloc::vec::Vec;

/// Handle of a pending timer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TimerId(u64);

/// Handle of a pending animation frame callback.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct FrameId(u64);

#[derive(Clone, Debug)]
struct Timer<T> {
    id: u64,
    deadline: u64,
    task: T,
}

#[derive(Clone, Debug)]
struct Frame<T> {
    id: u64,
    batch: u64,
    task: T,
}

/// Single-threaded event loop holding timers and animation-frame callbacks.
#[derive(Clone, Debug)]
pub struct EventLoop<T> {
    now: u64,
    next_id: u64,
    timers: Vec<Timer<T>>,
    frames: Vec<Frame<T>>,
    batch: u64,
}

impl<T> Default for EventLoop<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventLoop<T> {
    /// Create an empty loop at time zero.
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 1,
            timers: Vec::new(),
            frames: Vec::new(),
            batch: 0,
        }
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule `task` to run `delay_ms` from now.
    pub fn set_timeout(&mut self, delay_ms: u64, task: T) -> TimerId {
        let id = self.bump();
        self.timers.push(Timer {
            id,
            deadline: self.now.saturating_add(delay_ms),
            task,
        });
        TimerId(id)
    }

    /// Cancel a pending timer. Returns whether it was still pending.
    pub fn clear_timeout(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id.0);
        before != self.timers.len()
    }

    /// Schedule `task` for the next frame batch.
    pub fn request_frame(&mut self, task: T) -> FrameId {
        let id = self.bump();
        self.frames.push(Frame {
            id,
            batch: self.batch,
            task,
        });
        FrameId(id)
    }

    /// Cancel a pending frame callback. Returns whether it was still pending.
    pub fn cancel_frame(&mut self, id: FrameId) -> bool {
        let before = self.frames.len();
        self.frames.retain(|f| f.id != id.0);
        before != self.frames.len()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to its deadline.
    pub fn pop_due(&mut self, until: u64) -> Option<T> {
        let (idx, _) = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= until)
            .min_by_key(|(_, t)| (t.deadline, t.id))?;
        let timer = self.timers.remove(idx);
        self.now = self.now.max(timer.deadline);
        Some(timer.task)
    }

    /// Move the clock forward to `until` (never backwards) once due timers are drained.
    pub fn settle(&mut self, until: u64) {
        self.now = self.now.max(until);
    }

    /// Start a frame batch; returns the batch token for [`EventLoop::pop_frame`].
    ///
    /// Only frames requested before this call belong to the batch.
    pub fn begin_frame(&mut self) -> u64 {
        let batch = self.batch;
        self.batch += 1;
        batch
    }

    /// Pop the next frame callback of `batch`, in request order.
    pub fn pop_frame(&mut self, batch: u64) -> Option<T> {
        let idx = self.frames.iter().position(|f| f.batch <= batch)?;
        Some(self.frames.remove(idx).task)
    }

    /// Number of pending timers.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Number of pending frame callbacks.
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    fn bump(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(ev: &mut EventLoop<u32>, until: u64) -> Vec<u32> {
        let mut out = Vec::new();
        while let Some(t) = ev.pop_due(until) {
            out.push(t);
        }
        ev.settle(until);
        out
    }

    #[test]
    fn timers_fire_in_deadline_then_registration_order() {
        let mut ev = EventLoop::new();
        ev.set_timeout(20, 1);
        ev.set_timeout(10, 2);
        ev.set_timeout(10, 3);
        assert_eq!(drain(&mut ev, 5), Vec::<u32>::new());
        assert_eq!(ev.now(), 5);
        assert_eq!(drain(&mut ev, 30), [2, 3, 1]);
        assert_eq!(ev.now(), 30);
    }

    #[test]
    fn cleared_timers_never_fire() {
        let mut ev = EventLoop::new();
        let a = ev.set_timeout(10, 1);
        assert!(ev.clear_timeout(a));
        assert!(!ev.clear_timeout(a), "second clear is a no-op");
        assert!(drain(&mut ev, 100).is_empty());
    }

    #[test]
    fn clock_jumps_to_deadline_while_draining() {
        let mut ev = EventLoop::new();
        ev.set_timeout(10, 1);
        assert_eq!(ev.pop_due(50), Some(1));
        assert_eq!(ev.now(), 10);
        // A timer set from inside a callback is relative to the deadline.
        ev.set_timeout(10, 2);
        assert_eq!(ev.pop_due(50), Some(2));
        assert_eq!(ev.now(), 20);
    }

    #[test]
    fn frames_requested_during_a_batch_wait_for_the_next() {
        let mut ev = EventLoop::new();
        ev.request_frame(1);
        let batch = ev.begin_frame();
        assert_eq!(ev.pop_frame(batch), Some(1));
        ev.request_frame(2);
        assert_eq!(ev.pop_frame(batch), None);
        let next = ev.begin_frame();
        assert_eq!(ev.pop_frame(next), Some(2));
    }

    #[test]
    fn cancelled_frames_never_run() {
        let mut ev = EventLoop::new();
        let f = ev.request_frame(1);
        assert!(ev.cancel_frame(f));
        let batch = ev.begin_frame();
        assert_eq!(ev.pop_frame(batch), None);
        assert_eq!(ev.pending_frames(), 0);
    }
}
