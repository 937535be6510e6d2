// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener payloads and scheduled tasks.
//!
//! The document stores a [`Handler`] per listener instead of a closure. When an
//! event is dispatched, the engine receives the handlers in propagation order
//! and runs the matching instance method. Equal handlers dedupe like the same
//! function passed twice to `addEventListener`.

use crate::instance::InstanceId;

/// What a registered listener does.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Handler {
    /// A configured trigger event on the trigger target.
    Trigger(InstanceId),
    /// Complementary hide for `mouseenter` (and `touchend` under touch hold).
    MouseLeave(InstanceId),
    /// Complementary hide for `focus`.
    Blur(InstanceId),
    /// Delegated show (`mouseover`, `focusin`, `click`).
    DelegateShow(InstanceId),
    /// Delegated hide (`mouseout`, `focusout`).
    DelegateHide(InstanceId),
    /// Outside-click detection on the document (capture phase).
    DocumentClick(InstanceId),
    /// Cursor following on the document.
    FollowCursor(InstanceId),
    /// Hover-exit detection for interactive overlays on the document.
    InteractiveMouseMove(InstanceId),
    /// Pointer left the body while an interactive overlay is open.
    BodyLeave(InstanceId),
    /// Pointer entered the overlay.
    OverlayEnter(InstanceId),
    /// Pointer left the overlay.
    OverlayLeave(InstanceId),
    /// Transition completion on the tooltip.
    TransitionEnd(InstanceId),
}

impl Handler {
    /// The owning instance.
    pub fn instance(self) -> InstanceId {
        match self {
            Self::Trigger(id)
            | Self::MouseLeave(id)
            | Self::Blur(id)
            | Self::DelegateShow(id)
            | Self::DelegateHide(id)
            | Self::DocumentClick(id)
            | Self::FollowCursor(id)
            | Self::InteractiveMouseMove(id)
            | Self::BodyLeave(id)
            | Self::OverlayEnter(id)
            | Self::OverlayLeave(id)
            | Self::TransitionEnd(id) => id,
        }
    }
}

/// Work queued on the event loop.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Task {
    /// Show delay elapsed.
    Show(InstanceId),
    /// Hide delay elapsed; hides only if still visible.
    Hide(InstanceId),
    /// Zero-delay hide, one frame later.
    FrameHide(InstanceId),
    /// Coalesced recompute.
    Reposition(InstanceId),
    /// Sticky loop step.
    Sticky(InstanceId),
    /// Re-enable the tooltip transition after a placement change.
    RestoreTransition(InstanceId),
    /// Debounced interactive hover-exit check.
    InteractiveMove(InstanceId),
}
