// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trigger wiring and the event handlers behind each [`Handler`].

use alloc::vec::Vec;

use kurbo::{Point, Rect};
use understory_dom::{Event, EventKind, ListenerOptions};

use crate::engine::Popovers;
use crate::handler::Handler;
use crate::instance::{InstanceId, ListenerRecord};
use crate::props::{HideOnClick, Props, Side, Trigger};

impl Popovers {
    /// Attach the trigger listeners `props` ask for and record them.
    pub(crate) fn add_triggers(&mut self, id: InstanceId) {
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        let node = inst.trigger_target();
        let props = &inst.props;
        let delegated = props.target.is_some();

        let plain = ListenerOptions::empty();
        let mut wanted: Vec<(EventKind, Handler, ListenerOptions)> = Vec::new();
        if props.touch_hold && !delegated {
            let passive = ListenerOptions::PASSIVE;
            wanted.push((EventKind::TouchStart, Handler::Trigger(id), passive));
            wanted.push((EventKind::TouchEnd, Handler::MouseLeave(id), passive));
        }
        for trigger in props.trigger.iter() {
            let Trigger::Event(kind) = trigger else {
                continue;
            };
            if !delegated {
                wanted.push((kind, Handler::Trigger(id), plain));
                match kind {
                    EventKind::MouseEnter => {
                        wanted.push((EventKind::MouseLeave, Handler::MouseLeave(id), plain));
                    }
                    EventKind::Focus => wanted.push((EventKind::Blur, Handler::Blur(id), plain)),
                    _ => {}
                }
                continue;
            }
            // Non-bubbling triggers map to their bubbling twins.
            let (show, hide) = match kind {
                EventKind::MouseEnter => (EventKind::MouseOver, Some(EventKind::MouseOut)),
                EventKind::Focus => (EventKind::FocusIn, Some(EventKind::FocusOut)),
                EventKind::Click => (EventKind::Click, None),
                _ => continue,
            };
            wanted.push((show, Handler::DelegateShow(id), plain));
            if let Some(hide) = hide {
                wanted.push((hide, Handler::DelegateHide(id), plain));
            }
        }

        let mut records = Vec::with_capacity(wanted.len());
        for (kind, handler, options) in wanted {
            if self.doc.add_listener(node, kind, handler, options) {
                records.push(ListenerRecord {
                    node,
                    kind,
                    handler,
                    options,
                });
            }
        }
        tracing::trace!(%id, count = records.len(), "trigger listeners attached");
        inst.listeners = records;
    }

    /// Detach every recorded trigger listener.
    pub(crate) fn remove_triggers(&mut self, id: InstanceId) {
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        for record in core::mem::take(&mut inst.listeners) {
            self.doc.remove_listener(
                record.node,
                record.kind,
                &record.handler,
                record.options.capture(),
            );
        }
    }

    pub(crate) fn add_interactive_mouse_listeners(&mut self, id: InstanceId) {
        let body = self.doc.body();
        let root = self.doc.root();
        self.doc.add_listener(
            body,
            EventKind::MouseLeave,
            Handler::BodyLeave(id),
            ListenerOptions::empty(),
        );
        self.doc.add_listener(
            root,
            EventKind::MouseMove,
            Handler::InteractiveMouseMove(id),
            ListenerOptions::empty(),
        );
    }

    pub(crate) fn cleanup_interactive_mouse_listeners(&mut self, id: InstanceId) {
        let body = self.doc.body();
        let root = self.doc.root();
        self.doc
            .remove_listener(body, EventKind::MouseLeave, &Handler::BodyLeave(id), false);
        self.doc.remove_listener(
            root,
            EventKind::MouseMove,
            &Handler::InteractiveMouseMove(id),
            false,
        );
        if let Some(inst) = self.instances.get_mut(&id) {
            inst.pending_move = None;
            if let Some(t) = inst.debounce_timer.take() {
                self.events.clear_timeout(t);
            }
        }
    }

    /// Run the handler a listener was registered with.
    pub(crate) fn handle(&mut self, handler: Handler, event: &Event) {
        let id = handler.instance();
        if self.instances.get(&id).is_none_or(|i| i.state.destroyed) {
            return;
        }
        match handler {
            Handler::Trigger(_) => self.on_trigger(id, event),
            Handler::MouseLeave(_) => self.on_mouse_leave(id, event),
            Handler::Blur(_) => self.on_blur(id, event),
            Handler::DelegateShow(_) => {
                if self.delegate_matches(id, event) {
                    self.on_trigger(id, event);
                }
            }
            Handler::DelegateHide(_) => {
                if self.delegate_matches(id, event) {
                    self.on_mouse_leave(id, event);
                }
            }
            Handler::DocumentClick(_) => self.on_document_click(id, event),
            Handler::FollowCursor(_) => self.position_virtual_reference(id, event),
            Handler::InteractiveMouseMove(_) => self.on_interactive_mouse_move(id, event),
            Handler::BodyLeave(_) => self.schedule_hide(id, None),
            Handler::OverlayEnter(_) => {
                if let Some(inst) = self.instances.get(&id)
                    && inst.props.interactive
                    && inst.state.visible
                    && inst.last_trigger == Some(EventKind::MouseEnter)
                {
                    self.clear_pending_timers(id);
                }
            }
            Handler::OverlayLeave(_) => {
                if let Some(inst) = self.instances.get(&id)
                    && inst.props.interactive
                    && inst.last_trigger == Some(EventKind::MouseEnter)
                {
                    let root = self.doc.root();
                    self.doc.add_listener(
                        root,
                        EventKind::MouseMove,
                        Handler::InteractiveMouseMove(id),
                        ListenerOptions::empty(),
                    );
                }
            }
            Handler::TransitionEnd(_) => self.on_transition_end_event(id, event),
        }
    }

    /// Create an instance for the delegated child under `event`, shown at once.
    ///
    /// Children inherit the parent's props, except for `content` and `append_to`
    /// which are taken as supplied so callbacks see the child.
    pub(crate) fn create_delegate_child(&mut self, id: InstanceId, event: Option<&Event>) {
        let Some(event) = event else {
            return;
        };
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        let Some(selector) = &inst.props.target else {
            return;
        };
        let Some(child) = self.doc.closest(event.target, selector) else {
            return;
        };
        if self.registry.get(child).is_some() {
            return;
        }
        let mut props = inst.props.clone();
        props.content = inst.collection.content.clone();
        props.append_to = inst.collection.append_to.clone();
        props.target = None;
        props.show_on_init = true;
        if let Some(child_id) = self.create_with_props(child, props) {
            tracing::debug!(%id, %child_id, "created delegated child");
        }
    }

    fn delegate_matches(&self, id: InstanceId, event: &Event) -> bool {
        self.instances
            .get(&id)
            .and_then(|i| i.props.target.as_ref())
            .is_some_and(|selector| self.doc.closest(event.target, selector).is_some())
    }

    /// Whether touch settings tell this event to be ignored.
    fn is_event_listener_stopped(&self, id: InstanceId, event: &Event) -> bool {
        let Some(inst) = self.instances.get(&id) else {
            return true;
        };
        let is_touch = event.is_touch();
        let using_touch = self.context.is_using_touch();
        let hold = inst.props.touch_hold;
        (self.context.supports_touch() && using_touch && hold && !is_touch)
            || (using_touch && !hold && is_touch)
    }

    fn on_trigger(&mut self, id: InstanceId, event: &Event) {
        if self.is_event_listener_stopped(id, event) {
            return;
        }
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        if !inst.state.enabled {
            return;
        }
        if !inst.state.visible {
            inst.last_trigger = Some(event.kind);
            if event.is_mouse() {
                inst.last_mouse_move = Some(event.clone());
            }
        }

        // Toggle on click.
        if event.kind == EventKind::Click
            && inst.props.hide_on_click != HideOnClick::Never
            && inst.state.visible
        {
            self.schedule_hide(id, Some(event));
        } else {
            self.schedule_show(id, Some(event));
        }
    }

    fn on_mouse_leave(&mut self, id: InstanceId, event: &Event) {
        if self.is_event_listener_stopped(id, event) {
            return;
        }
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        if inst.props.interactive {
            self.add_interactive_mouse_listeners(id);
            return;
        }
        self.schedule_hide(id, Some(event));
    }

    fn on_blur(&mut self, id: InstanceId, event: &Event) {
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        if event.target != inst.trigger_target() {
            return;
        }
        if inst.props.interactive
            && let Some(related) = event.related_target
            && self.doc.contains(inst.overlay, related)
        {
            return;
        }
        self.schedule_hide(id, Some(event));
    }

    fn on_document_click(&mut self, id: InstanceId, event: &Event) {
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        if inst.props.interactive && self.doc.contains(inst.overlay, event.target) {
            return;
        }
        if self.doc.contains(inst.trigger_target(), event.target) {
            if self.context.is_using_touch() {
                return;
            }
            // The trigger's own click handler toggles.
            if inst.state.visible && inst.props.trigger.contains(EventKind::Click) {
                return;
            }
        }
        if inst.props.hide_on_click == HideOnClick::Always {
            self.clear_pending_timers(id);
            self.hide(id);
        }
    }

    fn on_interactive_mouse_move(&mut self, id: InstanceId, event: &Event) {
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        let debounce = inst.props.interactive_debounce;
        if debounce == 0 {
            self.check_interactive_border(id, event);
            return;
        }
        if let Some(t) = inst.debounce_timer.take() {
            self.events.clear_timeout(t);
        }
        inst.pending_move = Some(event.clone());
        inst.debounce_timer = Some(
            self.events
                .set_timeout(u64::from(debounce), crate::handler::Task::InteractiveMove(id)),
        );
    }

    /// Hide once the pointer leaves the overlay plus its interactive border.
    pub(crate) fn check_interactive_border(&mut self, id: InstanceId, event: &Event) {
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        if self.doc.contains(inst.reference, event.target)
            || self.doc.contains(inst.overlay, event.target)
        {
            return;
        }
        if let Some(hook) = &inst.props.hooks.on_mouse_move
            && !hook(inst, event)
        {
            return;
        }
        let outside = is_cursor_outside_interactive_border(
            inst.current_placement.side,
            self.doc.rect(inst.overlay),
            event.client,
            &inst.props,
        );
        if outside {
            self.cleanup_interactive_mouse_listeners(id);
            self.schedule_hide(id, None);
        }
    }
}

/// Whether `point` lies outside `overlay` grown by the interactive border.
///
/// The edge on the placement side grows by `distance` as well.
pub fn is_cursor_outside_interactive_border(
    side: Side,
    overlay: Rect,
    point: Point,
    props: &Props,
) -> bool {
    let border = props.interactive_border;
    let grow = |s: Side| {
        if s == side {
            border + props.distance
        } else {
            border
        }
    };
    overlay.y0 - point.y > grow(Side::Top)
        || point.y - overlay.y1 > grow(Side::Bottom)
        || overlay.x0 - point.x > grow(Side::Left)
        || point.x - overlay.x1 > grow(Side::Right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_side_tolerates_distance() {
        let props = Props::default();
        let overlay = Rect::new(100.0, 100.0, 200.0, 150.0);
        let outside = |side, x, y| {
            is_cursor_outside_interactive_border(side, overlay, Point::new(x, y), &props)
        };
        // Border 2 everywhere, plus distance 10 above a top-placed overlay.
        assert!(!outside(Side::Top, 150.0, 89.0));
        assert!(outside(Side::Top, 150.0, 87.0));
        assert!(outside(Side::Top, 150.0, 153.0));
        assert!(!outside(Side::Top, 201.5, 120.0));
        assert!(!outside(Side::Bottom, 150.0, 161.0));
        assert!(outside(Side::Bottom, 150.0, 97.0));
    }
}
