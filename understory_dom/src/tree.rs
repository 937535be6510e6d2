// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core document implementation: structure, attributes, style, geometry, listeners.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use kurbo::{Rect, Size};

use crate::event::EventKind;
use crate::selector::Selector;
use crate::types::{ListenerOptions, NodeId};

/// Default viewport used by [`Document::new`].
pub const DEFAULT_VIEWPORT: Size = Size::new(1024.0, 768.0);

impl<L> Default for Document<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// A document: a tree of elements rooted at a document node with a `body` child.
///
/// `L` is the listener payload. The document never calls listeners itself;
/// [`Document::route`](crate::Document::route) returns the payloads in
/// propagation order and the host decides what to run.
pub struct Document<L = ()> {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    root: NodeId,
    body: NodeId,
    viewport: Size,
    pub(crate) listeners: Vec<Listener<L>>,
}

impl<L> core::fmt::Debug for Document<L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Document")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("listeners", &self.listeners.len())
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

/// A registered listener.
#[derive(Clone, Debug)]
pub(crate) struct Listener<L> {
    pub(crate) node: NodeId,
    pub(crate) kind: EventKind,
    pub(crate) options: ListenerOptions,
    pub(crate) payload: L,
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    tag: String,
    text: String,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    bounds: Rect,
}

impl Node {
    fn new(generation: u32, tag: &str) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            tag: tag.into(),
            text: String::new(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            bounds: Rect::ZERO,
        }
    }
}

impl<L> Document<L> {
    /// Create a document with a root node and an attached `body`.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: NodeId::new(0, 0),
            body: NodeId::new(0, 0),
            viewport: DEFAULT_VIEWPORT,
            listeners: Vec::new(),
        };
        doc.root = doc.create_element("#document");
        doc.body = doc.create_element("body");
        doc.link_parent(doc.body, doc.root);
        doc.set_rect(
            doc.body,
            Rect::from_origin_size((0.0, 0.0), DEFAULT_VIEWPORT),
        );
        doc
    }

    /// The document node; the root of every connected path.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `body` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Viewport size in client coordinates.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Update the viewport size.
    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = size;
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, tag));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, tag)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    /// Append `child` as the last child of `parent`, detaching it from any previous parent.
    ///
    /// Does nothing if either id is stale or if `child` is an inclusive ancestor of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.is_alive(parent) || !self.is_alive(child) || self.contains(child, parent) {
            return;
        }
        self.detach(child);
        self.link_parent(child, parent);
    }

    /// Remove `child` from `parent`. Returns false if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.unlink_parent(child, parent);
        true
    }

    /// Detach `node` from its parent, keeping it (and its subtree) alive.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.parent(node) {
            self.unlink_parent(node, parent);
        }
    }

    /// Remove a node and its subtree; their ids become stale and their listeners are dropped.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) || id == self.root {
            return;
        }
        self.detach(id);
        let mut stack = alloc::vec![id];
        while let Some(n) = stack.pop() {
            stack.extend_from_slice(&self.node(n).children);
            self.nodes[n.idx()] = None;
            self.free_list.push(n.idx());
        }
        let nodes = &self.nodes;
        self.listeners.retain(
            |l| matches!(nodes.get(l.node.idx()), Some(Some(n)) if n.generation == l.node.1),
        );
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Parent of a node, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id)?.parent
    }

    /// Children of a node in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.is_alive(ancestor) {
            return false;
        }
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    /// Whether the node is attached (transitively) to the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Path from the node's topmost ancestor to the node (inclusive).
    pub fn path_to_root(&self, mut id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.is_alive(id) {
            return out;
        }
        loop {
            out.push(id);
            match self.node(id).parent {
                Some(p) => id = p,
                None => break,
            }
        }
        out.reverse();
        out
    }

    /// Tag name of a node.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.node_opt(id).map(|n| n.tag.as_str())
    }

    // --- attributes ---

    /// Read an attribute.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node_opt(id)?.attributes.get(name).map(String::as_str)
    }

    /// Whether an attribute is present.
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Set an attribute.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.attributes.insert(name.into(), value.into());
        }
    }

    /// Remove an attribute.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(n) = self.node_opt_mut(id) {
            n.attributes.remove(name);
        }
    }

    /// Iterate all attributes of a node in name order.
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.node_opt(id)
            .into_iter()
            .flat_map(|n| n.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Whether the whitespace-separated `class` attribute contains `class`.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|c| c == class))
    }

    /// Add a class if not present.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) || !self.is_alive(id) {
            return;
        }
        let mut value = String::from(self.attribute(id, "class").unwrap_or(""));
        if !value.is_empty() {
            value.push(' ');
        }
        value.push_str(class);
        self.set_attribute(id, "class", value);
    }

    /// Remove a class if present.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let Some(current) = self.attribute(id, "class") else {
            return;
        };
        let kept: Vec<&str> = current
            .split_ascii_whitespace()
            .filter(|c| *c != class)
            .collect();
        let value = kept.join(" ");
        self.set_attribute(id, "class", value);
    }

    // --- style, text, geometry ---

    /// Read an inline style property.
    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.node_opt(id)?.style.get(property).map(String::as_str)
    }

    /// Set an inline style property. An empty value clears it.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(n) = self.node_opt_mut(id) {
            if value.is_empty() {
                n.style.remove(property);
            } else {
                n.style.insert(property.into(), value);
            }
        }
    }

    /// Text content of a node (not including descendants).
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node_opt(id).map(|n| n.text.as_str())
    }

    /// Replace the text content of a node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.text = text.into();
        }
    }

    /// Bounding client rect.
    pub fn rect(&self, id: NodeId) -> Rect {
        self.node_opt(id).map(|n| n.bounds).unwrap_or(Rect::ZERO)
    }

    /// Update the bounding client rect.
    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        if let Some(n) = self.node_opt_mut(id) {
            n.bounds = rect;
        }
    }

    // --- queries ---

    /// Whether `node` matches `selector`.
    pub fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        selector.matches(self, node)
    }

    /// Closest inclusive ancestor of `node` matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut cur = Some(node).filter(|n| self.is_alive(*n));
        while let Some(n) = cur {
            if selector.matches(self, n) {
                return Some(n);
            }
            cur = self.parent(n);
        }
        None
    }

    /// Descendants of `root` (excluding `root`) matching `selector`, in document order.
    pub fn query_selector_all(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            if selector.matches(self, n) {
                out.push(n);
            }
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    // --- internals ---

    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(parent).children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(parent).children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }
}

impl<L: PartialEq> Document<L> {
    /// Register a listener.
    ///
    /// Like the DOM, registering the same `(node, kind, payload, capture)` twice is a no-op;
    /// returns false in that case (or if `node` is stale).
    pub fn add_listener(
        &mut self,
        node: NodeId,
        kind: EventKind,
        payload: L,
        options: ListenerOptions,
    ) -> bool {
        if !self.is_alive(node) || self.has_listener(node, kind, &payload, options.capture()) {
            return false;
        }
        self.listeners.push(Listener {
            node,
            kind,
            options,
            payload,
        });
        true
    }

    /// Remove a listener matching `(node, kind, payload, capture)`. Returns whether one was removed.
    pub fn remove_listener(
        &mut self,
        node: NodeId,
        kind: EventKind,
        payload: &L,
        capture: bool,
    ) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| {
            !(l.node == node
                && l.kind == kind
                && l.options.capture() == capture
                && l.payload == *payload)
        });
        before != self.listeners.len()
    }

    /// Whether a listener matching `(node, kind, payload, capture)` is registered.
    pub fn has_listener(&self, node: NodeId, kind: EventKind, payload: &L, capture: bool) -> bool {
        self.listeners.iter().any(|l| {
            l.node == node
                && l.kind == kind
                && l.options.capture() == capture
                && l.payload == *payload
        })
    }

    /// Listeners registered on `node`, in registration order.
    pub fn listeners_on(
        &self,
        node: NodeId,
    ) -> impl Iterator<Item = (EventKind, &L, ListenerOptions)> + '_ {
        self.listeners
            .iter()
            .filter(move |l| l.node == node)
            .map(|l| (l.kind, &l.payload, l.options))
    }

    /// Total number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn new_document_has_connected_body() {
        let doc: Document = Document::new();
        assert_eq!(doc.parent(doc.body()), Some(doc.root()));
        assert!(doc.is_connected(doc.body()));
        assert_eq!(doc.tag(doc.body()), Some("body"));
    }

    #[test]
    fn append_detach_and_contains() {
        let mut doc: Document = Document::new();
        let a = doc.create_element("div");
        let b = doc.create_element("span");
        doc.append_child(doc.body(), a);
        doc.append_child(a, b);
        assert!(doc.contains(a, b));
        assert!(doc.contains(b, b), "contains is inclusive");
        assert!(!doc.contains(b, a));
        assert_eq!(doc.path_to_root(b), vec![doc.root(), doc.body(), a, b]);

        doc.detach(a);
        assert!(!doc.is_connected(b));
        assert!(doc.is_alive(b), "detached nodes stay alive");

        // Appending an ancestor under its own descendant is refused.
        doc.append_child(b, a);
        assert_eq!(doc.parent(a), None);
    }

    #[test]
    fn remove_child_requires_parentage() {
        let mut doc: Document = Document::new();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        doc.append_child(doc.body(), a);
        assert!(!doc.remove_child(b, a));
        assert!(doc.remove_child(doc.body(), a));
        assert!(doc.children(doc.body()).is_empty());
    }

    #[test]
    fn liveness_remove_and_reuse() {
        let mut doc: Document<u32> = Document::new();
        let a = doc.create_element("div");
        let child = doc.create_element("div");
        doc.append_child(a, child);
        doc.add_listener(child, EventKind::Click, 7, ListenerOptions::empty());
        doc.remove(a);
        assert!(!doc.is_alive(a));
        assert!(!doc.is_alive(child), "subtree is removed");
        assert_eq!(doc.listener_count(), 0, "listeners of removed nodes are dropped");

        let b = doc.create_element("div");
        assert!(doc.is_alive(b));
        assert!(!doc.is_alive(a));
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }
        doc.set_attribute(a, "x", "stale writes are ignored");
        assert_eq!(doc.attribute(b, "x"), None);
    }

    #[test]
    fn classes_and_styles() {
        let mut doc: Document = Document::new();
        let n = doc.create_element("div");
        doc.add_class(n, "a");
        doc.add_class(n, "b");
        doc.add_class(n, "a");
        assert_eq!(doc.attribute(n, "class"), Some("a b"));
        doc.remove_class(n, "a");
        assert!(!doc.has_class(n, "a"));
        assert!(doc.has_class(n, "b"));

        doc.set_style(n, "visibility", "hidden");
        assert_eq!(doc.style(n, "visibility"), Some("hidden"));
        doc.set_style(n, "visibility", "");
        assert_eq!(doc.style(n, "visibility"), None);
    }

    #[test]
    fn duplicate_listeners_are_ignored() {
        let mut doc: Document<u32> = Document::new();
        let n = doc.create_element("div");
        assert!(doc.add_listener(n, EventKind::Click, 1, ListenerOptions::empty()));
        assert!(!doc.add_listener(n, EventKind::Click, 1, ListenerOptions::PASSIVE));
        assert!(doc.add_listener(n, EventKind::Click, 1, ListenerOptions::CAPTURE));
        assert_eq!(doc.listeners_on(n).count(), 2);
        assert!(doc.remove_listener(n, EventKind::Click, &1, true));
        assert!(!doc.remove_listener(n, EventKind::Click, &1, true));
        assert_eq!(doc.listeners_on(n).count(), 1);
    }

    #[test]
    fn closest_and_query_selector_all() {
        let mut doc: Document = Document::new();
        let list = doc.create_element("ul");
        doc.append_child(doc.body(), list);
        let a = doc.create_element("li");
        let b = doc.create_element("li");
        doc.add_class(a, "item");
        doc.append_child(list, a);
        doc.append_child(list, b);
        let inner = doc.create_element("span");
        doc.append_child(a, inner);

        let item = Selector::parse(".item").unwrap();
        assert_eq!(doc.closest(inner, &item), Some(a));
        assert_eq!(doc.closest(b, &item), None);
        assert_eq!(doc.query_selector_all(list, &item), vec![a]);
        let li = Selector::parse("li").unwrap();
        assert_eq!(doc.query_selector_all(doc.root(), &li), vec![a, b]);
    }
}
