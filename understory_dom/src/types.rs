// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the document: node identifiers and listener options.

/// Identifier for a node in the [`Document`](crate::Document).
///
/// This is a small, copyable handle that stays stable while the node lives but becomes
/// invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On creation, a fresh slot is allocated with generation `1`.
/// - On [`remove`](crate::Document::remove), the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Stale ids never alias a different live node, which makes `NodeId` safe to use as a
/// weak key in side tables (for example an instance registry).
/// Use [`Document::is_alive`](crate::Document::is_alive) to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Options attached to a registered listener.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ListenerOptions: u8 {
        /// Listener runs in the capture phase (root→target) instead of the bubble phase.
        const CAPTURE = 0b0000_0001;
        /// Listener promises not to cancel the event.
        const PASSIVE = 0b0000_0010;
        /// Listener is removed right before its first invocation.
        const ONCE    = 0b0000_0100;
    }
}

impl ListenerOptions {
    /// Whether this is a capture-phase listener.
    #[inline]
    pub fn capture(self) -> bool {
        self.contains(Self::CAPTURE)
    }
}
