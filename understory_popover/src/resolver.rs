// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Props resolution: supplied props plus reference attributes.

use understory_dom::NodeId;

use crate::Dom;
use crate::props::{AppendTo, Content, Props, PropsPatch};

/// Attribute prefix read by [`AttributeResolver`].
pub const ATTRIBUTE_PREFIX: &str = "data-tippy-";

/// Finalizes the props of an instance.
pub trait PropsResolver {
    /// Produce the props `reference` runs with, given the `supplied` snapshot.
    fn resolve(&self, doc: &Dom, reference: NodeId, supplied: Props) -> Props;
}

/// Merges `data-tippy-*` attributes over the supplied props.
///
/// - Attributes win over supplied values unless `ignore_attributes` is set.
/// - Invalid attribute values are logged and skipped.
/// - `arrow` turns `animate_fill` off.
/// - Callback `content` and `append_to` are evaluated against the reference.
#[derive(Copy, Clone, Debug, Default)]
pub struct AttributeResolver;

impl PropsResolver for AttributeResolver {
    fn resolve(&self, doc: &Dom, reference: NodeId, supplied: Props) -> Props {
        let mut props = supplied;
        if !props.ignore_attributes {
            let mut patch = PropsPatch::new();
            for (name, value) in doc.attributes(reference) {
                let Some(key) = name.strip_prefix(ATTRIBUTE_PREFIX) else {
                    continue;
                };
                if let Err(err) = patch.set_named(key, value) {
                    tracing::warn!(attribute = name, %err, "ignoring attribute");
                }
            }
            patch.apply_to(&mut props);
        }
        if props.arrow {
            props.animate_fill = false;
        }
        if let AppendTo::Callback(f) = props.append_to.clone() {
            props.append_to = AppendTo::Element(f(doc, reference));
        }
        if let Content::Callback(f) = props.content.clone() {
            props.content = Content::Text(f(doc, reference));
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::{HideOnClick, Placement, Timing};
    use alloc::format;

    #[test]
    fn attributes_override_supplied_props() {
        let mut doc = Dom::new();
        let r = doc.create_element("button");
        doc.set_attribute(r, "data-tippy-placement", "bottom");
        doc.set_attribute(r, "data-tippy-delay", "[100, 50]");
        doc.set_attribute(r, "data-tippy-hideonclick", "false");
        doc.set_attribute(r, "data-tippy-arrow", "");
        doc.set_attribute(r, "data-tippy-distance", "far");
        doc.set_attribute(r, "title", "not a prop");

        let props = AttributeResolver.resolve(&doc, r, Props::default());
        assert_eq!(props.placement, Placement::BOTTOM);
        assert_eq!(props.delay, Timing::Pair(100, 50));
        assert_eq!(props.hide_on_click, HideOnClick::Never);
        assert!(props.arrow);
        assert!(!props.animate_fill, "arrow disables the fill backdrop");
        assert_eq!(props.distance, 10.0, "invalid values are skipped");
    }

    #[test]
    fn ignore_attributes_skips_them() {
        let mut doc = Dom::new();
        let r = doc.create_element("button");
        doc.set_attribute(r, "data-tippy-placement", "bottom");
        let mut supplied = Props::default();
        supplied.ignore_attributes = true;
        let props = AttributeResolver.resolve(&doc, r, supplied);
        assert_eq!(props.placement, Placement::TOP);
    }

    #[test]
    fn callbacks_are_evaluated_against_the_reference() {
        let mut doc = Dom::new();
        let r = doc.create_element("button");
        doc.set_attribute(r, "aria-label", "Save");
        let mut supplied = Props::default();
        supplied.content = Content::from_fn(|doc, node| {
            format!("{}!", doc.attribute(node, "aria-label").unwrap_or_default())
        });
        let props = AttributeResolver.resolve(&doc, r, supplied);
        assert_eq!(props.content, Content::Text("Save!".into()));
    }
}
