// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cursor following through a virtual reference rectangle.

use kurbo::{Rect, Size};
use understory_dom::{Event, EventKind, ListenerOptions};

use crate::engine::Popovers;
use crate::handler::Handler;
use crate::instance::InstanceId;
use crate::positioner::Reference;
use crate::props::{ArrowType, FollowCursor, Padding, Side};

/// Extra room kept clear of the viewport edge for an arrow of this type.
fn arrow_allowance(arrow: Option<ArrowType>) -> f64 {
    match arrow {
        None => 0.0,
        Some(ArrowType::Sharp) => 16.0,
        Some(ArrowType::Round) => 18.0,
    }
}

/// Clamp the pointer along the placement's cross axis so the overlay stays on screen.
///
/// Only the cross axis is clamped: x for vertical placements, y otherwise.
pub fn clamp_to_viewport(
    side: Side,
    padding: Padding,
    arrow: Option<ArrowType>,
    viewport: Size,
    x: f64,
    y: f64,
) -> (f64, f64) {
    let mut padding = padding;
    let extra = arrow_allowance(arrow);
    let vertical = side.is_vertical();
    if vertical {
        padding.left += extra;
        padding.right += extra;
    } else {
        padding.top += extra;
        padding.bottom += extra;
    }

    let mut cx = if vertical { padding.left.max(x) } else { x };
    let mut cy = if vertical { y } else { padding.top.max(y) };
    if vertical && cx > padding.right {
        cx = x.min(viewport.width - padding.right);
    }
    if !vertical && cy > padding.bottom {
        cy = y.min(viewport.height - padding.bottom);
    }
    (cx, cy)
}

impl Popovers {
    pub(crate) fn add_follow_cursor_listener(&mut self, id: InstanceId) {
        let root = self.doc.root();
        self.doc.add_listener(
            root,
            EventKind::MouseMove,
            Handler::FollowCursor(id),
            ListenerOptions::empty(),
        );
    }

    pub(crate) fn remove_follow_cursor_listener(&mut self, id: InstanceId) {
        let root = self.doc.root();
        self.doc
            .remove_listener(root, EventKind::MouseMove, &Handler::FollowCursor(id), false);
    }

    /// Point the positioner at a zero-size rect under the cursor.
    pub(crate) fn position_virtual_reference(&mut self, id: InstanceId, event: &Event) {
        let viewport = self.doc.viewport();
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        inst.last_mouse_move = Some(event.clone());
        let Some(padding) = inst.computed_padding else {
            return;
        };

        let props = &inst.props;
        let arrow = props.arrow.then_some(props.arrow_type);
        let (x, y) = clamp_to_viewport(
            inst.current_placement.side,
            padding,
            arrow,
            viewport,
            event.client.x,
            event.client.y,
        );

        let follow = props.follow_cursor;
        let over_reference = self.doc.contains(inst.reference, event.target);
        let mut moved = false;
        if over_reference || !props.interactive {
            let rect = self.doc.rect(inst.reference);
            let lock_x = follow == FollowCursor::Vertical;
            let lock_y = follow == FollowCursor::Horizontal;
            let virtual_rect = Rect::new(
                if lock_x { rect.x0 } else { x },
                if lock_y { rect.y0 } else { y },
                if lock_x { rect.x1 } else { x },
                if lock_y { rect.y1 } else { y },
            );
            if let Some(p) = inst.positioner.as_mut() {
                p.set_reference(Reference::Virtual(virtual_rect));
                moved = true;
            }
        }
        let stop = follow == FollowCursor::Initial && inst.state.visible;

        if moved {
            self.schedule_update(id);
        }
        if stop {
            self.remove_follow_cursor_listener(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size::new(800.0, 600.0);

    #[test]
    fn clamps_cross_axis_only() {
        let pad = Padding::uniform(5.0);
        // Vertical placement: x is clamped, y passes through.
        assert_eq!(clamp_to_viewport(Side::Top, pad, None, VIEWPORT, 2.0, -40.0), (5.0, -40.0));
        assert_eq!(clamp_to_viewport(Side::Top, pad, None, VIEWPORT, 799.0, 10.0), (795.0, 10.0));
        // Horizontal placement: y is clamped.
        assert_eq!(clamp_to_viewport(Side::Right, pad, None, VIEWPORT, -3.0, 598.0), (-3.0, 595.0));
    }

    #[test]
    fn arrows_widen_the_margin() {
        let pad = Padding::uniform(5.0);
        let clamp = |arrow| clamp_to_viewport(Side::Bottom, pad, Some(arrow), VIEWPORT, 0.0, 0.0);
        let sharp = clamp(ArrowType::Sharp);
        let round = clamp(ArrowType::Round);
        assert_eq!(sharp.0, 21.0);
        assert_eq!(round.0, 23.0);
    }
}
