// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instance: one reference/overlay pairing.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use understory_dom::{Event, EventKind, FrameId, ListenerOptions, NodeId, TimerId};

use crate::handler::Handler;
use crate::overlay::OverlayChildren;
use crate::positioner::Positioner;
use crate::props::{Padding, Placement, Props};

/// Identifier of an instance.
///
/// Ids increase monotonically from 1 and are never reused by an engine.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct InstanceId(u32);

impl InstanceId {
    pub(crate) const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The numeric id.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle flags.
///
/// Reachable combinations:
///
/// | state            | visible | mounted | shown |
/// |------------------|---------|---------|-------|
/// | idle             | no      | no      | no    |
/// | transitioning in | yes     | yes     | no    |
/// | shown            | yes     | yes     | yes   |
/// | transitioning out| no      | yes     | no    |
///
/// `visible` implies `mounted`. Once `destroyed` is set no flag changes again.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct State {
    /// Whether show and hide are allowed.
    pub enabled: bool,
    /// Showing and not transitioning out.
    pub visible: bool,
    /// Terminal.
    pub destroyed: bool,
    /// The overlay is attached to its mount parent.
    pub mounted: bool,
    /// The show transition completed.
    pub shown: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            enabled: true,
            visible: false,
            destroyed: false,
            mounted: false,
            shown: false,
        }
    }
}

/// A trigger listener attached by the instance.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ListenerRecord {
    pub(crate) node: NodeId,
    pub(crate) kind: EventKind,
    pub(crate) handler: Handler,
    pub(crate) options: ListenerOptions,
}

/// What a pending `transitionend` completes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Completion {
    Shown,
    Hidden,
}

/// One reference/overlay pairing and its scheduling state.
///
/// Instances are owned by [`Popovers`](crate::Popovers); this is the read surface.
pub struct Instance {
    pub(crate) id: InstanceId,
    pub(crate) reference: NodeId,
    pub(crate) overlay: NodeId,
    pub(crate) children: OverlayChildren,
    pub(crate) props: Props,
    /// Props as supplied, before resolution; delegated children inherit from them.
    pub(crate) collection: Props,
    pub(crate) state: State,
    pub(crate) positioner: Option<Box<dyn Positioner>>,
    /// Set on creation; the first computation reports to `on_create` instead of `on_update`.
    pub(crate) positioner_fresh: bool,
    pub(crate) listeners: Vec<ListenerRecord>,

    pub(crate) show_timer: Option<TimerId>,
    pub(crate) hide_timer: Option<TimerId>,
    pub(crate) hide_frame: Option<FrameId>,
    pub(crate) reposition_frame: Option<FrameId>,
    pub(crate) debounce_timer: Option<TimerId>,
    pub(crate) pending_move: Option<Event>,
    pub(crate) scheduled_to_show: bool,
    pub(crate) last_trigger: Option<EventKind>,
    pub(crate) last_mouse_move: Option<Event>,

    pub(crate) mount_parent: Option<NodeId>,
    pub(crate) current_placement: Placement,
    pub(crate) previous_placement: Option<Placement>,
    pub(crate) was_visible_during_previous_update: bool,
    /// Show duration captured by the last `show`; the mount callback is armed while `Some`.
    pub(crate) mount_callback: Option<u32>,
    pub(crate) has_mount_callback_run: bool,
    pub(crate) transition_end: Option<(NodeId, Completion)>,
    pub(crate) computed_padding: Option<Padding>,
}

impl Instance {
    pub(crate) fn new(
        id: InstanceId,
        reference: NodeId,
        overlay: NodeId,
        children: OverlayChildren,
        props: Props,
        collection: Props,
    ) -> Self {
        Self {
            id,
            reference,
            overlay,
            children,
            current_placement: props.placement,
            props,
            collection,
            state: State::default(),
            positioner: None,
            positioner_fresh: false,
            listeners: Vec::new(),
            show_timer: None,
            hide_timer: None,
            hide_frame: None,
            reposition_frame: None,
            debounce_timer: None,
            pending_move: None,
            scheduled_to_show: false,
            last_trigger: None,
            last_mouse_move: None,
            mount_parent: None,
            previous_placement: None,
            was_visible_during_previous_update: false,
            mount_callback: None,
            has_mount_callback_run: false,
            transition_end: None,
            computed_padding: None,
        }
    }

    /// Identifier.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Lifecycle flags.
    pub fn state(&self) -> State {
        self.state
    }

    /// Current props snapshot.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// The reference element.
    pub fn reference(&self) -> NodeId {
        self.reference
    }

    /// The overlay root. Stale after destroy.
    pub fn overlay(&self) -> NodeId {
        self.overlay
    }

    /// Named overlay parts.
    pub fn children(&self) -> OverlayChildren {
        self.children
    }

    /// Placement from the latest computation.
    pub fn current_placement(&self) -> Placement {
        self.current_placement
    }

    /// The positioning handle, once created.
    pub fn positioner(&self) -> Option<&dyn Positioner> {
        self.positioner.as_deref()
    }

    /// The node trigger listeners are attached to.
    pub fn trigger_target(&self) -> NodeId {
        self.props.trigger_target_or(self.reference)
    }

    /// Whether a show or hide timer or frame is pending.
    pub fn has_pending_timers(&self) -> bool {
        self.show_timer.is_some() || self.hide_timer.is_some() || self.hide_frame.is_some()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("reference", &self.reference)
            .field("overlay", &self.overlay)
            .field("state", &self.state)
            .field("placement", &self.current_placement)
            .field("listeners", &self.listeners.len())
            .field("has_positioner", &self.positioner.is_some())
            .field("pending", &self.has_pending_timers())
            .finish_non_exhaustive()
    }
}
