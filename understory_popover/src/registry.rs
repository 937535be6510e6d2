// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Weak association from nodes to the instance that claims them.

use hashbrown::HashMap;
use understory_dom::NodeId;

use crate::instance::InstanceId;

/// Maps reference (and overlay) nodes to instances.
///
/// Entries do not keep nodes alive. Generational [`NodeId`]s make entries for
/// removed nodes unreachable, so a stale entry never aliases a new node.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    owners: HashMap<NodeId, InstanceId>,
}

impl Registry {
    /// Instance claiming `node`, if any.
    pub fn get(&self, node: NodeId) -> Option<InstanceId> {
        self.owners.get(&node).copied()
    }

    /// Claim `node` for `id`, replacing any previous claim.
    pub fn claim(&mut self, node: NodeId, id: InstanceId) {
        self.owners.insert(node, id);
    }

    /// Drop the claim on `node` if it belongs to `id`. Returns whether it did.
    pub fn release(&mut self, node: NodeId, id: InstanceId) -> bool {
        if self.owners.get(&node) == Some(&id) {
            self.owners.remove(&node);
            true
        } else {
            false
        }
    }

    /// Number of claims.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether there are no claims.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_dom::Document;

    #[test]
    fn release_only_by_owner() {
        let mut doc: Document = Document::new();
        let n = doc.create_element("div");
        let mut reg = Registry::default();
        reg.claim(n, InstanceId::new(1));
        reg.claim(n, InstanceId::new(2));
        assert!(!reg.release(n, InstanceId::new(1)));
        assert_eq!(reg.get(n), Some(InstanceId::new(2)));
        assert!(reg.release(n, InstanceId::new(2)));
        assert!(reg.is_empty());
    }
}
