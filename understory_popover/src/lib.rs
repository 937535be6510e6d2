// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_popover --heading-base-level=0

//! Understory Popover: tooltip and popover lifecycles over [`understory_dom`].
//!
//! An instance binds a *reference* element to a floating *overlay*. The engine
//! decides when the overlay is shown and hidden, mounts it into the document,
//! keeps it positioned, and reports every lifecycle step through hooks.
//!
//! - Triggers: `mouseenter`, `focus`, `click`, touch hold, manual, or delegated to
//!   descendants matching a selector.
//! - Show and hide delays, transition durations, and `transitionend` completion.
//! - Outside-click dismissal, interactive overlays with a hover border, cursor following.
//! - Props come from a typed builder and from `data-tippy-*` attributes on the reference.
//!
//! ## Driving the engine
//!
//! [`Popovers`] owns the [`Dom`] and a virtual clock. The host dispatches input
//! with [`Popovers::dispatch`], advances time with [`Popovers::advance`] and runs
//! animation frames with [`Popovers::run_frame`]. Everything is deterministic, which
//! makes lifecycles straightforward to test.
//!
//! ## Collaborators
//!
//! Three seams are pluggable through [`Popovers::with_collaborators`]:
//!
//! - [`PositionerFactory`] creates the positioning engine; [`AnchorFactory`] is a
//!   small built-in that places the overlay flush against a side.
//! - [`OverlayBuilder`] builds the overlay subtree; [`DefaultOverlayBuilder`] builds
//!   the classic popper, tooltip, arrow, backdrop and content structure.
//! - [`PropsResolver`] finalizes props; [`AttributeResolver`] merges attributes.
//!
//! ## Example
//!
//! ```rust
//! use understory_popover::{Event, EventKind, Popovers, PropsPatch};
//!
//! let mut popovers = Popovers::new();
//! let doc = popovers.document_mut();
//! let button = doc.create_element("button");
//! let body = doc.body();
//! doc.append_child(body, button);
//!
//! let id = popovers
//!     .create(button, &PropsPatch::new().content("Save"))
//!     .expect("first instance for this button");
//!
//! popovers.dispatch(Event::new(EventKind::MouseEnter, button));
//! assert!(popovers.instance(id).unwrap().state().visible);
//!
//! // Hiding waits a frame, then for the transition out.
//! popovers.dispatch(Event::new(EventKind::MouseLeave, button));
//! popovers.run_frame();
//! let inst = popovers.instance(id).unwrap();
//! assert!(!inst.state().visible);
//! assert!(inst.state().mounted);
//!
//! let tooltip = inst.children().tooltip.unwrap();
//! popovers.dispatch(Event::new(EventKind::TransitionEnd, tooltip));
//! assert!(!popovers.instance(id).unwrap().state().mounted);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod context;
mod engine;
mod error;
mod follow_cursor;
mod handler;
mod instance;
mod overlay;
mod positioner;
mod props;
mod registry;
mod resolver;
mod triggers;

pub use context::{Context, MOUSE_MOVE_THRESHOLD};
pub use engine::Popovers;
pub use error::PropsError;
pub use follow_cursor::clamp_to_viewport;
pub use handler::Handler;
pub use instance::{Instance, InstanceId, State};
pub use overlay::{DefaultOverlayBuilder, OverlayBuilder, OverlayChildren};
pub use positioner::{
    AnchorFactory, AnchorPositioner, OVERFLOW_PADDING, PlacementData, Positioner,
    PositionerConfig, PositionerFactory, Reference,
};
pub use props::{
    Alignment, AppendTo, AppendToFn, ArrowType, Boundary, Content, ContentFn, EventHook,
    EventVetoHook, FlipBehavior, FollowCursor, HideOnClick, Hooks, InstanceHook, Padding,
    Placement, PlacementHook, PopperOptions, Props, PropsPatch, Side, Timing, Trigger, Triggers,
    VetoHook, WaitHook,
};
pub use registry::Registry;
pub use resolver::{ATTRIBUTE_PREFIX, AttributeResolver, PropsResolver};
pub use triggers::is_cursor_outside_interactive_border;

pub use understory_dom;
pub use understory_dom::{Event, EventKind, NodeId, Point, Rect, Selector, Size};

/// The document type popovers run against.
pub type Dom = understory_dom::Document<Handler>;
