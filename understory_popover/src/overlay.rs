// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay construction.
//!
//! The default builder produces:
//!
//! ```text
//! div.tippy-popper#tippy-<id>
//! └── div.tippy-tooltip            data-state, data-size, data-animation, <theme>-theme
//!     ├── div.tippy-arrow          (arrow; `tippy-roundarrow` for round arrows)
//!     ├── div.tippy-backdrop       (animate_fill)
//!     └── div.tippy-content
//! ```
//!
//! Any part may be missing in a custom builder; features that need it degrade
//! silently.

use alloc::format;
use alloc::string::String;

use understory_dom::NodeId;

use crate::Dom;
use crate::instance::InstanceId;
use crate::props::{ArrowType, Content, Props};

/// Named parts of an overlay.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct OverlayChildren {
    /// The box that transitions in and out.
    pub tooltip: Option<NodeId>,
    /// Holds the content.
    pub content: Option<NodeId>,
    /// Arrow element.
    pub arrow: Option<NodeId>,
    /// Fill backdrop.
    pub backdrop: Option<NodeId>,
}

impl OverlayChildren {
    /// Elements that carry transition durations and `data-state`.
    pub fn transitionable(&self) -> impl Iterator<Item = NodeId> {
        [self.tooltip, self.backdrop, self.content].into_iter().flatten()
    }
}

/// Builds and updates the overlay subtree.
pub trait OverlayBuilder {
    /// Create a detached overlay for instance `id`.
    fn create(&self, doc: &mut Dom, id: InstanceId, props: &Props) -> NodeId;
    /// Reflect the differences between `prev` and `next`.
    fn update(&self, doc: &mut Dom, overlay: NodeId, prev: &Props, next: &Props);
    /// Locate the named parts.
    fn children(&self, doc: &Dom, overlay: NodeId) -> OverlayChildren;
}

/// Builds the `tippy-*` class structure.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultOverlayBuilder;

const ARROW_CLASSES: [&str; 2] = ["tippy-arrow", "tippy-roundarrow"];

fn arrow_class(kind: ArrowType) -> &'static str {
    match kind {
        ArrowType::Sharp => ARROW_CLASSES[0],
        ArrowType::Round => ARROW_CLASSES[1],
    }
}

fn set_content(doc: &mut Dom, content_node: NodeId, content: &Content) {
    for child in doc.children(content_node).to_vec() {
        doc.detach(child);
    }
    match content {
        Content::Text(text) => doc.set_text(content_node, text.as_str()),
        Content::Element(node) => {
            doc.set_text(content_node, String::new());
            doc.append_child(content_node, *node);
        }
        // Resolved to text before it reaches the builder.
        Content::Callback(_) => doc.set_text(content_node, String::new()),
    }
}

fn set_themes(doc: &mut Dom, tooltip: NodeId, theme: &str, add: bool) {
    for name in theme.split_whitespace() {
        let class = format!("{name}-theme");
        if add {
            doc.add_class(tooltip, &class);
        } else {
            doc.remove_class(tooltip, &class);
        }
    }
}

fn set_flag(doc: &mut Dom, node: NodeId, name: &str, on: bool) {
    if on {
        doc.set_attribute(node, name, "");
    } else {
        doc.remove_attribute(node, name);
    }
}

fn set_optional(doc: &mut Dom, node: NodeId, name: &str, value: Option<&str>) {
    match value {
        Some(v) => doc.set_attribute(node, name, v),
        None => doc.remove_attribute(node, name),
    }
}

fn set_interactive(doc: &mut Dom, popper: NodeId, tooltip: NodeId, on: bool) {
    if on {
        doc.set_attribute(popper, "tabindex", "-1");
    } else {
        doc.remove_attribute(popper, "tabindex");
    }
    set_flag(doc, tooltip, "data-interactive", on);
}

impl DefaultOverlayBuilder {
    fn add_arrow(doc: &mut Dom, tooltip: NodeId, kind: ArrowType) {
        let arrow = doc.create_element("div");
        doc.add_class(arrow, arrow_class(kind));
        doc.append_child(tooltip, arrow);
    }

    fn add_backdrop(doc: &mut Dom, tooltip: NodeId) {
        let backdrop = doc.create_element("div");
        doc.add_class(backdrop, "tippy-backdrop");
        doc.set_attribute(backdrop, "data-state", "hidden");
        doc.append_child(tooltip, backdrop);
        doc.set_attribute(tooltip, "data-animatefill", "");
    }
}

impl OverlayBuilder for DefaultOverlayBuilder {
    fn create(&self, doc: &mut Dom, id: InstanceId, props: &Props) -> NodeId {
        let popper = doc.create_element("div");
        doc.add_class(popper, "tippy-popper");
        doc.set_attribute(popper, "id", format!("tippy-{}", id.get()));
        doc.set_style(popper, "z-index", format!("{}", props.z_index));
        set_optional(doc, popper, "role", props.role.as_deref());

        let tooltip = doc.create_element("div");
        doc.add_class(tooltip, "tippy-tooltip");
        doc.set_style(tooltip, "max-width", format!("{}px", props.max_width));
        doc.set_attribute(tooltip, "data-size", props.size.as_str());
        doc.set_attribute(tooltip, "data-animation", props.animation.as_str());
        doc.set_attribute(tooltip, "data-state", "hidden");
        set_themes(doc, tooltip, &props.theme, true);

        let content = doc.create_element("div");
        doc.add_class(content, "tippy-content");
        doc.set_attribute(content, "data-state", "hidden");
        set_content(doc, content, &props.content);

        set_interactive(doc, popper, tooltip, props.interactive);
        if props.arrow {
            Self::add_arrow(doc, tooltip, props.arrow_type);
        }
        if props.animate_fill {
            Self::add_backdrop(doc, tooltip);
        }
        set_flag(doc, tooltip, "data-inertia", props.inertia);

        doc.append_child(tooltip, content);
        doc.append_child(popper, tooltip);
        popper
    }

    fn update(&self, doc: &mut Dom, overlay: NodeId, prev: &Props, next: &Props) {
        let parts = self.children(doc, overlay);
        let Some(tooltip) = parts.tooltip else {
            return;
        };

        if prev.role != next.role {
            set_optional(doc, overlay, "role", next.role.as_deref());
        }
        if prev.z_index != next.z_index {
            doc.set_style(overlay, "z-index", format!("{}", next.z_index));
        }
        if prev.max_width != next.max_width {
            doc.set_style(tooltip, "max-width", format!("{}px", next.max_width));
        }
        if prev.size != next.size {
            doc.set_attribute(tooltip, "data-size", next.size.as_str());
        }
        if prev.animation != next.animation {
            doc.set_attribute(tooltip, "data-animation", next.animation.as_str());
        }
        if prev.content != next.content
            && let Some(content) = parts.content
        {
            set_content(doc, content, &next.content);
        }

        match (prev.animate_fill, next.animate_fill) {
            (false, true) => Self::add_backdrop(doc, tooltip),
            (true, false) => {
                if let Some(backdrop) = parts.backdrop {
                    doc.remove(backdrop);
                }
                doc.remove_attribute(tooltip, "data-animatefill");
            }
            _ => {}
        }

        if !prev.arrow && next.arrow {
            Self::add_arrow(doc, tooltip, next.arrow_type);
        } else if prev.arrow && !next.arrow {
            if let Some(arrow) = parts.arrow {
                doc.remove(arrow);
            }
        } else if prev.arrow && next.arrow && prev.arrow_type != next.arrow_type {
            if let Some(arrow) = parts.arrow {
                doc.remove(arrow);
            }
            Self::add_arrow(doc, tooltip, next.arrow_type);
        }

        if prev.interactive != next.interactive {
            set_interactive(doc, overlay, tooltip, next.interactive);
        }
        if prev.inertia != next.inertia {
            set_flag(doc, tooltip, "data-inertia", next.inertia);
        }
        if prev.theme != next.theme {
            set_themes(doc, tooltip, &prev.theme, false);
            set_themes(doc, tooltip, &next.theme, true);
        }
    }

    fn children(&self, doc: &Dom, overlay: NodeId) -> OverlayChildren {
        let tooltip = doc
            .children(overlay)
            .iter()
            .copied()
            .find(|n| doc.has_class(*n, "tippy-tooltip"));
        let Some(tooltip) = tooltip else {
            return OverlayChildren::default();
        };
        let find = |class: &str| {
            doc.children(tooltip)
                .iter()
                .copied()
                .find(|n| doc.has_class(*n, class))
        };
        OverlayChildren {
            tooltip: Some(tooltip),
            content: find("tippy-content"),
            arrow: find(ARROW_CLASSES[0]).or_else(|| find(ARROW_CLASSES[1])),
            backdrop: find("tippy-backdrop"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::PropsPatch;

    fn props(patch: PropsPatch) -> Props {
        let mut p = Props::default();
        patch.apply_to(&mut p);
        p
    }

    #[test]
    fn default_structure() {
        let mut doc = Dom::new();
        let b = DefaultOverlayBuilder;
        let hi = props(PropsPatch::new().content("Hi"));
        let overlay = b.create(&mut doc, InstanceId::new(3), &hi);
        assert_eq!(doc.attribute(overlay, "id"), Some("tippy-3"));
        assert_eq!(doc.attribute(overlay, "role"), Some("tooltip"));
        let parts = b.children(&doc, overlay);
        let tooltip = parts.tooltip.unwrap();
        assert!(doc.has_class(tooltip, "dark-theme"));
        assert_eq!(doc.text(parts.content.unwrap()), Some("Hi"));
        assert!(parts.backdrop.is_some(), "animate_fill defaults on");
        assert!(parts.arrow.is_none());
        assert_eq!(parts.transitionable().count(), 3);
    }

    #[test]
    fn update_reflects_prop_differences() {
        let mut doc = Dom::new();
        let b = DefaultOverlayBuilder;
        let prev = Props::default();
        let overlay = b.create(&mut doc, InstanceId::new(1), &prev);
        let next = props(
            PropsPatch::new()
                .arrow(true)
                .arrow_type(ArrowType::Round)
                .animate_fill(false)
                .theme("light bordered")
                .interactive(true)
                .content("new"),
        );
        b.update(&mut doc, overlay, &prev, &next);
        let parts = b.children(&doc, overlay);
        let tooltip = parts.tooltip.unwrap();
        assert!(doc.has_class(parts.arrow.unwrap(), "tippy-roundarrow"));
        assert!(parts.backdrop.is_none());
        assert!(!doc.has_attribute(tooltip, "data-animatefill"));
        assert!(!doc.has_class(tooltip, "dark-theme"));
        assert!(doc.has_class(tooltip, "bordered-theme"));
        assert_eq!(doc.attribute(overlay, "tabindex"), Some("-1"));
        assert_eq!(doc.text(parts.content.unwrap()), Some("new"));
    }

    #[test]
    fn element_content_is_moved_in() {
        let mut doc = Dom::new();
        let b = DefaultOverlayBuilder;
        let card = doc.create_element("section");
        let with_card = props(PropsPatch::new().content(card));
        let overlay = b.create(&mut doc, InstanceId::new(1), &with_card);
        let content = b.children(&doc, overlay).content.unwrap();
        assert_eq!(doc.parent(card), Some(content));
    }
}
