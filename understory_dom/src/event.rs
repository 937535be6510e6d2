// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input events fed into the document by the host.

use core::fmt;
use core::str::FromStr;

use kurbo::Point;

use crate::types::NodeId;

/// The type of an event.
///
/// Names follow the DOM spelling (`"mouseenter"`, `"focusout"`, …) for
/// [`FromStr`] and [`Display`](fmt::Display).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum EventKind {
    /// A primary button click.
    Click,
    /// Pointer entered the element (does not bubble).
    MouseEnter,
    /// Pointer left the element (does not bubble).
    MouseLeave,
    /// Pointer moved onto the element or one of its descendants.
    MouseOver,
    /// Pointer moved off the element or one of its descendants.
    MouseOut,
    /// Pointer moved.
    MouseMove,
    /// Element received focus (does not bubble).
    Focus,
    /// Element lost focus (does not bubble).
    Blur,
    /// Element or a descendant received focus.
    FocusIn,
    /// Element or a descendant lost focus.
    FocusOut,
    /// A touch started.
    TouchStart,
    /// A touch ended.
    TouchEnd,
    /// A CSS transition completed on the target.
    TransitionEnd,
    /// The target scrolled (does not bubble).
    Scroll,
    /// The viewport resized (does not bubble).
    Resize,
}

impl EventKind {
    /// All known kinds, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::Click,
        Self::MouseEnter,
        Self::MouseLeave,
        Self::MouseOver,
        Self::MouseOut,
        Self::MouseMove,
        Self::Focus,
        Self::Blur,
        Self::FocusIn,
        Self::FocusOut,
        Self::TouchStart,
        Self::TouchEnd,
        Self::TransitionEnd,
        Self::Scroll,
        Self::Resize,
    ];

    /// DOM name of the event type.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::MouseOver => "mouseover",
            Self::MouseOut => "mouseout",
            Self::MouseMove => "mousemove",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::FocusIn => "focusin",
            Self::FocusOut => "focusout",
            Self::TouchStart => "touchstart",
            Self::TouchEnd => "touchend",
            Self::TransitionEnd => "transitionend",
            Self::Scroll => "scroll",
            Self::Resize => "resize",
        }
    }

    /// Whether the event continues to ancestors after the target phase.
    pub const fn bubbles(self) -> bool {
        !matches!(
            self,
            Self::MouseEnter
                | Self::MouseLeave
                | Self::Focus
                | Self::Blur
                | Self::Scroll
                | Self::Resize
        )
    }

    /// Whether this is a pointer event carrying client coordinates.
    pub const fn is_mouse(self) -> bool {
        matches!(
            self,
            Self::Click
                | Self::MouseEnter
                | Self::MouseLeave
                | Self::MouseOver
                | Self::MouseOut
                | Self::MouseMove
        )
    }

    /// Whether this is a touch event.
    pub const fn is_touch(self) -> bool {
        matches!(self, Self::TouchStart | Self::TouchEnd)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when an event name is not recognized.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type `{0}`")]
pub struct UnknownEventKind(pub alloc::string::String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| UnknownEventKind(s.into()))
    }
}

/// An event dispatched into the document.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Type of the event.
    pub kind: EventKind,
    /// Node the event is targeted at.
    pub target: NodeId,
    /// Secondary target (for focus and pointer crossing events), if any.
    pub related_target: Option<NodeId>,
    /// Client (viewport) coordinates for pointer events.
    pub client: Point,
}

impl Event {
    /// Create an event of `kind` targeted at `target`.
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            related_target: None,
            client: Point::ZERO,
        }
    }

    /// Set the client coordinates.
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.client = Point::new(x, y);
        self
    }

    /// Set the related target.
    #[must_use]
    pub fn related(mut self, node: NodeId) -> Self {
        self.related_target = Some(node);
        self
    }

    /// Whether this is a pointer event.
    pub fn is_mouse(&self) -> bool {
        self.kind.is_mouse()
    }

    /// Whether this is a touch event.
    pub fn is_touch(&self) -> bool {
        self.kind.is_touch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for kind in EventKind::ALL {
            assert_eq!(kind.name().parse::<EventKind>(), Ok(kind));
        }
        assert!("hover".parse::<EventKind>().is_err());
    }

    #[test]
    fn crossing_and_focus_events_do_not_bubble() {
        assert!(!EventKind::MouseEnter.bubbles());
        assert!(!EventKind::Blur.bubbles());
        assert!(EventKind::MouseOver.bubbles());
        assert!(EventKind::FocusIn.bubbles());
        assert!(EventKind::Click.bubbles());
    }
}
