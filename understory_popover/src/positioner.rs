// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positioning contract.
//!
//! The engine never computes geometry itself. It drives a [`Positioner`]
//! through a narrow contract: recompute, enable or disable scroll/resize
//! tracking, swap the reference, adjust placement and flip, destroy.
//! Each recompute returns a [`PlacementData`] that the engine reflects onto
//! the overlay.
//!
//! [`AnchorPositioner`] is the default implementation. It places the overlay
//! flush against the chosen side of the reference and applies the cross-axis
//! offset. It does not flip or prevent overflow.

use alloc::boxed::Box;
use alloc::format;
use core::fmt;

use kurbo::{Point, Rect};
use understory_dom::NodeId;

use crate::Dom;
use crate::props::{Alignment, Boundary, FlipBehavior, Padding, Placement, Side};

/// Default overflow padding in pixels.
pub const OVERFLOW_PADDING: f64 = 5.0;

/// What the overlay is anchored to.
///
/// A virtual reference is a bare rectangle, used for cursor following.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Reference {
    /// A real element; its bounding rect is read on each recompute.
    Element(NodeId),
    /// A synthetic bounding rect in client coordinates.
    Virtual(Rect),
}

impl Reference {
    /// Current bounding rect.
    pub fn rect(&self, doc: &Dom) -> Rect {
        match self {
            Self::Element(node) => doc.rect(*node),
            Self::Virtual(rect) => *rect,
        }
    }
}

/// Result of a computation.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementData {
    /// Placement that was used.
    pub placement: Placement,
    /// Whether it differs from the requested placement because of flipping.
    pub flipped: bool,
    /// Whether the reference lies outside the boundary.
    pub out_of_boundaries: bool,
    /// Overlay rect in client coordinates.
    pub rect: Rect,
}

/// Everything a positioner is built from.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionerConfig {
    /// Requested placement.
    pub placement: Placement,
    /// Whether flipping is enabled.
    pub flip: bool,
    /// Fallback order when flipping.
    pub flip_behavior: FlipBehavior,
    /// Padding used when deciding to flip.
    pub flip_padding: f64,
    /// Cross-axis offset.
    pub offset: f64,
    /// Overflow boundary.
    pub boundary: Boundary,
    /// Arrow element, if any.
    pub arrow: Option<NodeId>,
    /// Overflow padding.
    pub overflow_padding: Padding,
}

/// A live positioning handle for one overlay.
pub trait Positioner {
    /// Recompute the overlay position and write it to the document.
    fn update(&mut self, doc: &mut Dom) -> PlacementData;
    /// Start recomputing on scroll and resize.
    fn enable_event_listeners(&mut self);
    /// Stop recomputing on scroll and resize.
    fn disable_event_listeners(&mut self);
    /// Whether scroll and resize tracking is on.
    fn event_listeners_enabled(&self) -> bool;
    /// Release the handle; it is not used afterwards.
    fn destroy(&mut self);
    /// Current reference.
    fn reference(&self) -> Reference;
    /// Replace the reference.
    fn set_reference(&mut self, reference: Reference);
    /// Requested placement.
    fn placement(&self) -> Placement;
    /// Replace the requested placement.
    fn set_placement(&mut self, placement: Placement);
    /// Whether flipping is enabled.
    fn flip_enabled(&self) -> bool;
    /// Enable or disable flipping.
    fn set_flip_enabled(&mut self, enabled: bool);
    /// Replace the overflow padding.
    fn set_overflow_padding(&mut self, padding: Padding);
}

/// Builds positioners.
pub trait PositionerFactory {
    /// Create a handle anchoring `overlay` to `reference`. Creation does not compute.
    fn create(
        &self,
        reference: Reference,
        overlay: NodeId,
        config: PositionerConfig,
    ) -> Box<dyn Positioner>;
}

/// Factory for [`AnchorPositioner`].
#[derive(Copy, Clone, Debug, Default)]
pub struct AnchorFactory;

impl PositionerFactory for AnchorFactory {
    fn create(
        &self,
        reference: Reference,
        overlay: NodeId,
        config: PositionerConfig,
    ) -> Box<dyn Positioner> {
        Box::new(AnchorPositioner::new(reference, overlay, config))
    }
}

/// Places the overlay against a side of the reference.
pub struct AnchorPositioner {
    reference: Reference,
    overlay: NodeId,
    config: PositionerConfig,
    listening: bool,
    destroyed: bool,
}

impl fmt::Debug for AnchorPositioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorPositioner")
            .field("reference", &self.reference)
            .field("overlay", &self.overlay)
            .field("placement", &self.config.placement)
            .field("listening", &self.listening)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl AnchorPositioner {
    /// Create a positioner; scroll and resize tracking starts disabled.
    pub fn new(reference: Reference, overlay: NodeId, config: PositionerConfig) -> Self {
        Self {
            reference,
            overlay,
            config,
            listening: false,
            destroyed: false,
        }
    }

    fn origin(&self, anchor: Rect, w: f64, h: f64) -> Point {
        let placement = self.config.placement;
        let along = |start: f64, end: f64, len: f64| {
            let base = match placement.alignment {
                None => (start + end - len) / 2.0,
                Some(Alignment::Start) => start,
                Some(Alignment::End) => end - len,
            };
            base + self.config.offset
        };
        match placement.side {
            Side::Top => Point::new(along(anchor.x0, anchor.x1, w), anchor.y0 - h),
            Side::Bottom => Point::new(along(anchor.x0, anchor.x1, w), anchor.y1),
            Side::Left => Point::new(anchor.x0 - w, along(anchor.y0, anchor.y1, h)),
            Side::Right => Point::new(anchor.x1, along(anchor.y0, anchor.y1, h)),
        }
    }
}

impl Positioner for AnchorPositioner {
    fn update(&mut self, doc: &mut Dom) -> PlacementData {
        let anchor = self.reference.rect(doc);
        let size = doc.rect(self.overlay).size();
        let origin = self.origin(anchor, size.width, size.height);
        let rect = Rect::from_origin_size(origin, size);

        let bounds = match self.config.boundary {
            Boundary::Element(node) => doc.rect(node),
            _ => Rect::from_origin_size(Point::ZERO, doc.viewport()),
        };
        let out_of_boundaries = anchor.x1 < bounds.x0
            || anchor.x0 > bounds.x1
            || anchor.y1 < bounds.y0
            || anchor.y0 > bounds.y1;

        let placement = self.config.placement;
        doc.set_rect(self.overlay, rect);
        doc.set_style(
            self.overlay,
            "transform",
            format!("translate3d({}px, {}px, 0)", rect.x0, rect.y0),
        );
        doc.set_attribute(self.overlay, "x-placement", format!("{placement}"));
        if out_of_boundaries {
            doc.set_attribute(self.overlay, "x-out-of-boundaries", "");
        }

        PlacementData {
            placement,
            flipped: false,
            out_of_boundaries,
            rect,
        }
    }

    fn enable_event_listeners(&mut self) {
        self.listening = true;
    }

    fn disable_event_listeners(&mut self) {
        self.listening = false;
    }

    fn event_listeners_enabled(&self) -> bool {
        self.listening && !self.destroyed
    }

    fn destroy(&mut self) {
        self.listening = false;
        self.destroyed = true;
    }

    fn reference(&self) -> Reference {
        self.reference
    }

    fn set_reference(&mut self, reference: Reference) {
        self.reference = reference;
    }

    fn placement(&self) -> Placement {
        self.config.placement
    }

    fn set_placement(&mut self, placement: Placement) {
        self.config.placement = placement;
    }

    fn flip_enabled(&self) -> bool {
        self.config.flip
    }

    fn set_flip_enabled(&mut self, enabled: bool) {
        self.config.flip = enabled;
    }

    fn set_overflow_padding(&mut self, padding: Padding) {
        self.config.overflow_padding = padding;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;

    fn config(placement: Placement) -> PositionerConfig {
        PositionerConfig {
            placement,
            flip: true,
            flip_behavior: FlipBehavior::Flip,
            flip_padding: 15.0,
            offset: 0.0,
            boundary: Boundary::ScrollParent,
            arrow: None,
            overflow_padding: Padding::uniform(OVERFLOW_PADDING),
        }
    }

    fn setup() -> (Dom, NodeId, NodeId) {
        let mut doc = Dom::new();
        let reference = doc.create_element("button");
        let overlay = doc.create_element("div");
        doc.append_child(doc.body(), reference);
        doc.append_child(doc.body(), overlay);
        doc.set_rect(reference, Rect::new(100.0, 100.0, 140.0, 120.0));
        doc.set_rect(overlay, Rect::from_origin_size(Point::ZERO, Size::new(60.0, 30.0)));
        (doc, reference, overlay)
    }

    #[test]
    fn top_placement_is_centered_above() {
        let (mut doc, reference, overlay) = setup();
        let mut p =
            AnchorPositioner::new(Reference::Element(reference), overlay, config(Placement::TOP));
        let data = p.update(&mut doc);
        assert_eq!(data.rect, Rect::new(90.0, 70.0, 150.0, 100.0));
        assert_eq!(doc.rect(overlay), data.rect);
        assert_eq!(doc.attribute(overlay, "x-placement"), Some("top"));
        assert!(!data.out_of_boundaries);
    }

    #[test]
    fn alignment_and_offset_shift_the_cross_axis() {
        let (mut doc, reference, overlay) = setup();
        let mut cfg = config(Placement::RIGHT.with_alignment(Alignment::End));
        cfg.offset = 4.0;
        let mut p = AnchorPositioner::new(Reference::Element(reference), overlay, cfg);
        let data = p.update(&mut doc);
        assert_eq!(data.rect.origin(), Point::new(140.0, 94.0));
    }

    #[test]
    fn virtual_reference_outside_viewport_is_flagged() {
        let (mut doc, _, overlay) = setup();
        let far = Reference::Virtual(Rect::new(5000.0, 5000.0, 5000.0, 5000.0));
        let mut p = AnchorPositioner::new(far, overlay, config(Placement::BOTTOM));
        assert!(p.update(&mut doc).out_of_boundaries);
        assert_eq!(doc.attribute(overlay, "x-out-of-boundaries"), Some(""));
    }
}
