// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event propagation.
//!
//! ## Overview
//!
//! [`Document::route`] turns an [`Event`] into the ordered list of listener
//! payloads it reaches: capture (root→target), target, bubble (target→root).
//!
//! - Capture listeners on ancestors run root-first.
//! - At the target, capture listeners run before non-capture listeners.
//! - Bubble runs only for event kinds that bubble (see [`EventKind::bubbles`](crate::EventKind::bubbles)).
//! - Detached subtrees propagate up to their own topmost ancestor only.
//!
//! The document does not invoke anything. The host walks the returned
//! sequence and, before running each step, should confirm with
//! [`Document::has_listener`] that the listener is still registered, so
//! listeners removed by an earlier step do not run.

use alloc::vec::Vec;

use crate::event::Event;
use crate::tree::Document;
use crate::types::{ListenerOptions, NodeId};

/// Phases of event propagation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Root-to-target traversal.
    Capture,
    /// Target node.
    Target,
    /// Target-to-root traversal.
    Bubble,
}

/// A single delivery step.
#[derive(Clone, Debug, PartialEq)]
pub struct Delivery<L> {
    /// Propagation phase for this step.
    pub phase: Phase,
    /// Node whose listener receives the event (the DOM `currentTarget`).
    pub node: NodeId,
    /// Listener payload.
    pub payload: L,
    /// Options the listener was registered with.
    pub options: ListenerOptions,
}

impl<L: Clone> Document<L> {
    /// Compute the delivery sequence for `event`.
    ///
    /// Returns an empty sequence if the target is stale.
    pub fn route(&self, event: &Event) -> Vec<Delivery<L>> {
        let path = self.path_to_root(event.target);
        let Some((&target, ancestors)) = path.split_last() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        // Capture: root→target (exclusive)
        for &n in ancestors {
            self.collect(&mut out, Phase::Capture, n, event, true);
        }
        // Target: capture listeners first, then the rest.
        self.collect(&mut out, Phase::Target, target, event, true);
        self.collect(&mut out, Phase::Target, target, event, false);
        // Bubble: target→root (exclusive)
        if event.kind.bubbles() {
            for &n in ancestors.iter().rev() {
                self.collect(&mut out, Phase::Bubble, n, event, false);
            }
        }
        out
    }

    fn collect(
        &self,
        out: &mut Vec<Delivery<L>>,
        phase: Phase,
        node: NodeId,
        event: &Event,
        capture: bool,
    ) {
        for l in &self.listeners {
            if l.node != node || l.kind != event.kind || l.options.capture() != capture {
                continue;
            }
            out.push(Delivery {
                phase,
                node,
                payload: l.payload.clone(),
                options: l.options,
            });
        }
    }
}
