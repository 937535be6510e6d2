// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process-wide input state shared by every instance of an engine.

use understory_dom::{Event, EventKind};

use crate::instance::InstanceId;

/// Two mouse moves closer together than this (ms) mean a real mouse is in use.
pub const MOUSE_MOVE_THRESHOLD: u64 = 20;

/// Shared state: the id counter and touch detection.
///
/// A `touchstart` anywhere switches to touch mode; two `mousemove`s within
/// [`MOUSE_MOVE_THRESHOLD`] switch back.
#[derive(Clone, Debug)]
pub struct Context {
    next_id: u32,
    is_using_touch: bool,
    supports_touch: bool,
    last_mouse_move: Option<u64>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Fresh context: mouse input, no touch support.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            is_using_touch: false,
            supports_touch: false,
            last_mouse_move: None,
        }
    }

    /// Whether touch input is currently in use.
    pub fn is_using_touch(&self) -> bool {
        self.is_using_touch
    }

    /// Whether the host reports touch support.
    pub fn supports_touch(&self) -> bool {
        self.supports_touch
    }

    /// Declare whether the host supports touch.
    pub fn set_supports_touch(&mut self, supports: bool) {
        self.supports_touch = supports;
    }

    /// Forget detected input; the id counter is kept.
    pub fn reset_input(&mut self) {
        self.is_using_touch = false;
        self.last_mouse_move = None;
    }

    pub(crate) fn next_id(&mut self) -> InstanceId {
        let id = InstanceId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Update touch detection for an event dispatched at time `now`.
    pub(crate) fn track(&mut self, event: &Event, now: u64) {
        match event.kind {
            EventKind::TouchStart => {
                if !self.is_using_touch {
                    tracing::trace!("touch input detected");
                    self.is_using_touch = true;
                    self.last_mouse_move = None;
                }
            }
            EventKind::MouseMove if self.is_using_touch => {
                if let Some(last) = self.last_mouse_move
                    && now.saturating_sub(last) < MOUSE_MOVE_THRESHOLD
                {
                    tracing::trace!("mouse input detected");
                    self.is_using_touch = false;
                }
                self.last_mouse_move = Some(now);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_dom::{Document, NodeId};

    fn node() -> NodeId {
        let doc: Document = Document::new();
        doc.body()
    }

    #[test]
    fn touch_then_fast_mouse_moves() {
        let n = node();
        let mut cx = Context::new();
        cx.track(&Event::new(EventKind::TouchStart, n), 0);
        assert!(cx.is_using_touch());
        // Emulated mouse events after a tap are far apart.
        cx.track(&Event::new(EventKind::MouseMove, n), 100);
        cx.track(&Event::new(EventKind::MouseMove, n), 300);
        assert!(cx.is_using_touch());
        cx.track(&Event::new(EventKind::MouseMove, n), 310);
        assert!(!cx.is_using_touch());
    }

    #[test]
    fn ids_are_monotonic() {
        let mut cx = Context::new();
        let a = cx.next_id();
        let b = cx.next_id();
        assert_eq!(a.get(), 1);
        assert!(b > a);
        cx.reset_input();
        assert_eq!(cx.next_id().get(), 3);
    }
}
