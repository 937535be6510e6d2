// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dom --heading-base-level=0

//! Understory DOM: a deterministic, host-driven document model.
//!
//! Understory DOM is the environment that overlay and popover crates run against.
//!
//! - Represents a tree of elements with attributes, classes, inline style, text, and bounding rects.
//! - Registers listeners with DOM semantics (deduplicated by node, type, payload and capture flag).
//! - Computes capture → target → bubble propagation for an [`Event`] without running anything.
//! - Provides an [`EventLoop`] with a virtual clock, one-shot timers and animation-frame batches.
//!
//! ## Not a browser
//!
//! There is no layout, no CSS cascade, and no scripting.
//! Geometry is whatever the host writes with [`Document::set_rect`]; transitions finish when the
//! host dispatches a `transitionend` event.
//! A browser binding can mirror its DOM into this model, or implement the same surface directly.
//!
//! ## Listener payloads
//!
//! [`Document`] is generic over the listener payload `L`. The document never calls back into user
//! code; [`Document::route`] returns the payloads in propagation order, and the host (for example
//! a popover engine) decides what each payload means. This keeps the document free of
//! `Rc<RefCell<..>>` callbacks and re-entrancy concerns.
//!
//! ## Example
//!
//! ```rust
//! use understory_dom::{Document, Event, EventKind, ListenerOptions, Phase};
//!
//! let mut doc: Document<&str> = Document::new();
//! let button = doc.create_element("button");
//! doc.append_child(doc.body(), button);
//! let root = doc.root();
//!
//! doc.add_listener(root, EventKind::Click, "outside-click", ListenerOptions::CAPTURE);
//! doc.add_listener(button, EventKind::Click, "toggle", ListenerOptions::empty());
//!
//! let seq = doc.route(&Event::new(EventKind::Click, button));
//! let order: Vec<_> = seq.iter().map(|d| (d.payload, d.phase)).collect();
//! assert_eq!(order, [("outside-click", Phase::Capture), ("toggle", Phase::Target)]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod event;
mod event_loop;
mod propagation;
mod selector;
mod tree;
mod types;

pub use event::{Event, EventKind, UnknownEventKind};
pub use event_loop::{EventLoop, FrameId, TimerId};
pub use propagation::{Delivery, Phase};
pub use selector::{Selector, SelectorError};
pub use tree::{DEFAULT_VIEWPORT, Document};
pub use types::{ListenerOptions, NodeId};

pub use kurbo::{Point, Rect, Size};
