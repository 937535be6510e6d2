// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine: owns the document, the event loop and every instance.
//!
//! ## Driving it
//!
//! The host feeds input with [`Popovers::dispatch`], moves time with
//! [`Popovers::advance`] and runs animation frames with [`Popovers::run_frame`].
//! Nothing happens between those calls.
//!
//! ## Show
//!
//! `show` attaches the outside-click listener, marks the instance visible,
//! zeroes transition durations, arms the mount callback and mounts. The mount
//! callback runs on the first positioner computation after mounting; it sets
//! the real durations and waits for the tooltip's `transitionend` (or finishes
//! at once for a zero duration) before `on_shown`.
//!
//! ## Hide
//!
//! `hide` flips `visible` and `shown` off at once and waits for the transition
//! out. Only then is the overlay detached and `on_hidden` called. A zero-delay
//! scheduled hide runs one animation frame later, while a zero-delay scheduled
//! show runs synchronously.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use understory_dom::{Event, EventKind, EventLoop, ListenerOptions, NodeId, Selector};

use crate::Dom;
use crate::context::Context;
use crate::handler::{Handler, Task};
use crate::instance::{Completion, Instance, InstanceId};
use crate::overlay::{DefaultOverlayBuilder, OverlayBuilder};
use crate::positioner::{
    AnchorFactory, OVERFLOW_PADDING, PlacementData, PositionerConfig, PositionerFactory, Reference,
};
use crate::props::{
    AppendTo, Content, FollowCursor, Hooks, InstanceHook, Padding, Props, PropsPatch, VetoHook,
};
use crate::registry::Registry;
use crate::resolver::{AttributeResolver, PropsResolver};

fn set_transition_duration(doc: &mut Dom, nodes: impl IntoIterator<Item = NodeId>, ms: u32) {
    for node in nodes {
        doc.set_style(node, "transition-duration", format!("{ms}ms"));
    }
}

fn set_visibility_state(doc: &mut Dom, nodes: impl IntoIterator<Item = NodeId>, state: &str) {
    for node in nodes {
        doc.set_attribute(node, "data-state", state);
    }
}

/// Tooltip and popover engine.
///
/// Instances are addressed by [`InstanceId`]; methods given an unknown id do nothing.
pub struct Popovers {
    pub(crate) doc: Dom,
    pub(crate) events: EventLoop<Task>,
    pub(crate) context: Context,
    pub(crate) registry: Registry,
    pub(crate) instances: BTreeMap<InstanceId, Instance>,
    positioners: Box<dyn PositionerFactory>,
    overlays: Box<dyn OverlayBuilder>,
    resolver: Box<dyn PropsResolver>,
}

impl core::fmt::Debug for Popovers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Popovers")
            .field("document", &self.doc)
            .field("now", &self.events.now())
            .field("pending_timers", &self.events.pending_timers())
            .field("pending_frames", &self.events.pending_frames())
            .field("context", &self.context)
            .field("instances", &self.instances.len())
            .finish_non_exhaustive()
    }
}

impl Default for Popovers {
    fn default() -> Self {
        Self::new()
    }
}

impl Popovers {
    /// An engine over an empty document with the default collaborators.
    pub fn new() -> Self {
        Self::with_collaborators(AnchorFactory, DefaultOverlayBuilder, AttributeResolver)
    }

    /// An engine with custom positioning, overlay construction and props resolution.
    pub fn with_collaborators(
        positioners: impl PositionerFactory + 'static,
        overlays: impl OverlayBuilder + 'static,
        resolver: impl PropsResolver + 'static,
    ) -> Self {
        Self {
            doc: Dom::new(),
            events: EventLoop::new(),
            context: Context::new(),
            registry: Registry::default(),
            instances: BTreeMap::new(),
            positioners: Box::new(positioners),
            overlays: Box::new(overlays),
            resolver: Box::new(resolver),
        }
    }

    /// The document.
    pub fn document(&self) -> &Dom {
        &self.doc
    }

    /// The document, for building and editing the host tree.
    ///
    /// Listeners registered by the engine should not be removed through this.
    pub fn document_mut(&mut self) -> &mut Dom {
        &mut self.doc
    }

    /// Shared input state.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Shared input state, mutable.
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Node-to-instance associations.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.events.now()
    }

    /// Number of pending timers across all instances.
    pub fn pending_timers(&self) -> usize {
        self.events.pending_timers()
    }

    /// Number of pending animation-frame callbacks across all instances.
    pub fn pending_frames(&self) -> usize {
        self.events.pending_frames()
    }

    /// Look up an instance, including destroyed ones.
    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    /// The live instance claiming `node` as its reference or overlay.
    pub fn instance_for(&self, node: NodeId) -> Option<&Instance> {
        self.registry.get(node).and_then(|id| self.instances.get(&id))
    }

    /// Every instance, in creation order.
    pub fn instances(&self) -> impl Iterator<Item = &Instance> + '_ {
        self.instances.values()
    }

    // --- construction ---

    /// Create an instance for `reference` with default props overridden by `patch`.
    ///
    /// Returns `None` when `reference` is stale, or already has an instance and
    /// `multiple` is off.
    pub fn create(&mut self, reference: NodeId, patch: &PropsPatch) -> Option<InstanceId> {
        let mut props = Props::default();
        patch.apply_to(&mut props);
        self.create_with_props(reference, props)
    }

    /// Create an instance for every element matching `selector`.
    pub fn create_all(&mut self, selector: &Selector, patch: &PropsPatch) -> Vec<InstanceId> {
        let targets = self.doc.query_selector_all(self.doc.root(), selector);
        targets
            .into_iter()
            .filter_map(|node| self.create(node, patch))
            .collect()
    }

    /// Create an instance from a full props snapshot (before resolution).
    pub fn create_with_props(&mut self, reference: NodeId, supplied: Props) -> Option<InstanceId> {
        if !self.doc.is_alive(reference) {
            tracing::warn!(?reference, "cannot create an instance for a stale node");
            return None;
        }
        let props = self
            .resolver
            .resolve(&self.doc, reference, supplied.clone());
        if !props.multiple && self.registry.get(reference).is_some() {
            tracing::debug!(?reference, "reference already has an instance");
            return None;
        }

        let id = self.context.next_id();
        let overlay = self.overlays.create(&mut self.doc, id, &props);
        let children = self.overlays.children(&self.doc, overlay);
        self.registry.claim(reference, id);
        self.registry.claim(overlay, id);
        let lazy = props.lazy;
        let show_on_init = props.show_on_init;
        self.instances.insert(
            id,
            Instance::new(id, reference, overlay, children, props, supplied),
        );

        self.add_triggers(id);
        if !lazy {
            self.create_positioner(id);
            self.update_position(id);
        }
        if show_on_init {
            self.schedule_show(id, None);
        }
        self.doc.add_listener(
            overlay,
            EventKind::MouseEnter,
            Handler::OverlayEnter(id),
            ListenerOptions::empty(),
        );
        self.doc.add_listener(
            overlay,
            EventKind::MouseLeave,
            Handler::OverlayLeave(id),
            ListenerOptions::empty(),
        );

        tracing::debug!(%id, ?reference, "created instance");
        self.notify(id, |h| &h.on_create);
        Some(id)
    }

    // --- public lifecycle ---

    /// Show with the configured show duration.
    pub fn show(&mut self, id: InstanceId) {
        if let Some(inst) = self.instances.get(&id) {
            let duration = inst.props.duration.get(0);
            self.show_with_duration(id, duration);
        }
    }

    /// Hide with the configured hide duration.
    pub fn hide(&mut self, id: InstanceId) {
        if let Some(inst) = self.instances.get(&id) {
            let duration = inst.props.duration.get(1);
            self.hide_with_duration(id, duration);
        }
    }

    /// Show with an explicit transition duration in milliseconds.
    pub fn show_with_duration(&mut self, id: InstanceId, duration: u32) {
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        if inst.state.destroyed {
            tracing::warn!(%id, "show() on a destroyed instance is a no-op");
            return;
        }
        if !inst.state.enabled || (self.context.is_using_touch() && !inst.props.touch) {
            return;
        }
        if self.doc.has_attribute(inst.trigger_target(), "disabled") {
            return;
        }
        if !self.allow(id, |h| &h.on_show) {
            tracing::trace!(%id, "show vetoed");
            return;
        }

        self.add_document_click_listener(id);

        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        self.doc.set_style(inst.overlay, "visibility", "visible");
        inst.state.visible = true;
        // No transition from a previous opposite placement.
        set_transition_duration(
            &mut self.doc,
            inst.children.transitionable().chain([inst.overlay]),
            0,
        );
        inst.mount_callback = Some(duration);

        tracing::debug!(%id, duration, "show");
        self.mount(id);
    }

    /// Hide with an explicit transition duration in milliseconds.
    pub fn hide_with_duration(&mut self, id: InstanceId, duration: u32) {
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        if inst.state.destroyed {
            tracing::warn!(%id, "hide() on a destroyed instance is a no-op");
            return;
        }
        if !inst.state.enabled {
            return;
        }
        if !self.allow(id, |h| &h.on_hide) {
            tracing::trace!(%id, "hide vetoed");
            return;
        }

        self.remove_document_click_listener(id);

        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        self.doc.set_style(inst.overlay, "visibility", "hidden");
        inst.state.visible = false;
        inst.state.shown = false;
        inst.was_visible_during_previous_update = false;
        set_transition_duration(&mut self.doc, inst.children.transitionable(), duration);
        set_visibility_state(&mut self.doc, inst.children.transitionable(), "hidden");

        tracing::debug!(%id, duration, "hide");
        self.on_transition_end(id, duration, Completion::Hidden);
    }

    /// Allow show and hide.
    pub fn enable(&mut self, id: InstanceId) {
        if let Some(inst) = self.instances.get_mut(&id)
            && !inst.state.destroyed
        {
            inst.state.enabled = true;
        }
    }

    /// Disallow show and hide.
    pub fn disable(&mut self, id: InstanceId) {
        if let Some(inst) = self.instances.get_mut(&id)
            && !inst.state.destroyed
        {
            inst.state.enabled = false;
        }
    }

    /// Cancel pending show and hide timers and the pending hide frame.
    pub fn clear_pending_timers(&mut self, id: InstanceId) {
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        if let Some(t) = inst.show_timer.take() {
            self.events.clear_timeout(t);
        }
        if let Some(t) = inst.hide_timer.take() {
            self.events.clear_timeout(t);
        }
        if let Some(f) = inst.hide_frame.take() {
            self.events.cancel_frame(f);
        }
    }

    /// Merge `patch` over the current props and rewire the instance.
    ///
    /// Trigger listeners are rebuilt from scratch, so the listeners afterwards
    /// match a fresh instance built with the merged props. A change to a
    /// positioning prop recreates the positioner; otherwise it recomputes.
    pub fn set(&mut self, id: InstanceId, patch: &PropsPatch) {
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        if inst.state.destroyed {
            tracing::warn!(%id, "set() on a destroyed instance is a no-op");
            return;
        }

        self.remove_triggers(id);

        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        let prev = inst.props.clone();
        let mut merged = prev.clone();
        patch.apply_to(&mut merged);
        merged.ignore_attributes = true;
        let mut next = self.resolver.resolve(&self.doc, inst.reference, merged);
        next.ignore_attributes = patch
            .ignore_attributes_value()
            .unwrap_or(prev.ignore_attributes);
        inst.props = next;

        self.add_triggers(id);
        self.cleanup_interactive_mouse_listeners(id);

        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        self.overlays
            .update(&mut self.doc, inst.overlay, &prev, &inst.props);
        inst.children = self.overlays.children(&self.doc, inst.overlay);

        if inst.positioner.is_none() {
            return;
        }
        if patch.changes_positioning(&prev) {
            tracing::debug!(%id, "recreating positioner");
            if let Some(mut old) = inst.positioner.take() {
                old.destroy();
            }
            self.create_positioner(id);
            self.update_position(id);
            let Some(inst) = self.instances.get_mut(&id) else {
                return;
            };
            if inst.state.visible
                && let Some(p) = inst.positioner.as_mut()
            {
                p.enable_event_listeners();
            }
            if inst.props.follow_cursor != FollowCursor::Off
                && let Some(event) = inst.last_mouse_move.clone()
            {
                self.position_virtual_reference(id, &event);
            }
        } else {
            self.update_position(id);
        }
    }

    /// Replace the content.
    pub fn set_content(&mut self, id: InstanceId, content: impl Into<Content>) {
        self.set(id, &PropsPatch::new().content(content));
    }

    /// Tear the instance down. Repeated calls are no-ops.
    ///
    /// A mounted overlay is hidden instantly first. With `cascade`, instances of
    /// delegated children (descendants matching `target`) are destroyed too.
    pub fn destroy(&mut self, id: InstanceId, cascade: bool) {
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        if inst.state.destroyed {
            tracing::debug!(%id, "instance already destroyed");
            return;
        }
        if inst.state.mounted {
            self.hide_with_duration(id, 0);
        }

        self.remove_triggers(id);
        self.clear_pending_timers(id);
        self.remove_document_click_listener(id);
        self.remove_follow_cursor_listener(id);
        self.cleanup_interactive_mouse_listeners(id);

        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        if let Some(f) = inst.reposition_frame.take() {
            self.events.cancel_frame(f);
        }
        if let Some((node, _)) = inst.transition_end.take() {
            self.doc.remove_listener(
                node,
                EventKind::TransitionEnd,
                &Handler::TransitionEnd(id),
                false,
            );
        }
        let reference = inst.reference;
        let overlay = inst.overlay;
        self.registry.release(reference, id);
        self.registry.release(overlay, id);

        if cascade && let Some(selector) = inst.props.target.clone() {
            for child in self.doc.query_selector_all(reference, &selector) {
                if let Some(child_id) = self.registry.get(child)
                    && child_id != id
                {
                    self.destroy(child_id, false);
                }
            }
        }

        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        if let Some(p) = inst.positioner.as_mut() {
            p.destroy();
        }
        if let Content::Element(node) = inst.props.content {
            self.doc.detach(node);
        }
        self.doc.remove(overlay);
        inst.state.visible = false;
        inst.state.shown = false;
        inst.state.mounted = false;
        inst.state.destroyed = true;
        tracing::debug!(%id, "destroyed");
    }

    // --- host driving ---

    /// Dispatch an input event.
    pub fn dispatch(&mut self, event: Event) {
        let now = self.events.now();
        self.context.track(&event, now);

        if matches!(event.kind, EventKind::Scroll | EventKind::Resize) {
            let tracking: Vec<InstanceId> = self
                .instances
                .values()
                .filter(|i| {
                    i.state.mounted
                        && i
                            .positioner
                            .as_ref()
                            .is_some_and(|p| p.event_listeners_enabled())
                })
                .map(|i| i.id)
                .collect();
            for id in tracking {
                self.schedule_update(id);
            }
        }

        for step in self.doc.route(&event) {
            let capture = step.options.capture();
            // Earlier steps may have removed this listener.
            if !self
                .doc
                .has_listener(step.node, event.kind, &step.payload, capture)
            {
                continue;
            }
            if step.options.contains(ListenerOptions::ONCE) {
                self.doc
                    .remove_listener(step.node, event.kind, &step.payload, capture);
            }
            self.handle(step.payload, &event);
        }
    }

    /// Move the clock forward by `ms`, running due timers in order.
    pub fn advance(&mut self, ms: u64) {
        let until = self.events.now().saturating_add(ms);
        while let Some(task) = self.events.pop_due(until) {
            self.run_task(task);
        }
        self.events.settle(until);
    }

    /// Run one animation frame.
    pub fn run_frame(&mut self) {
        let batch = self.events.begin_frame();
        while let Some(task) = self.events.pop_frame(batch) {
            self.run_task(task);
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::Show(id) => {
                if let Some(inst) = self.instances.get_mut(&id) {
                    inst.show_timer = None;
                }
                self.show(id);
            }
            Task::Hide(id) => {
                let Some(inst) = self.instances.get_mut(&id) else {
                    return;
                };
                inst.hide_timer = None;
                if inst.state.visible {
                    self.hide(id);
                }
            }
            Task::FrameHide(id) => {
                if let Some(inst) = self.instances.get_mut(&id) {
                    inst.hide_frame = None;
                }
                self.hide(id);
            }
            Task::Reposition(id) => {
                let Some(inst) = self.instances.get_mut(&id) else {
                    return;
                };
                inst.reposition_frame = None;
                if !inst.state.destroyed {
                    self.update_position(id);
                }
            }
            Task::Sticky(id) => self.run_sticky(id),
            Task::RestoreTransition(id) => {
                if let Some(tooltip) = self.instances.get(&id).and_then(|i| i.children.tooltip) {
                    self.doc.set_style(tooltip, "transition", "");
                }
            }
            Task::InteractiveMove(id) => {
                let Some(inst) = self.instances.get_mut(&id) else {
                    return;
                };
                inst.debounce_timer = None;
                if let Some(event) = inst.pending_move.take() {
                    self.check_interactive_border(id, &event);
                }
            }
        }
    }

    // --- scheduling ---

    /// Cancel pending work and show after the show delay.
    pub(crate) fn schedule_show(&mut self, id: InstanceId, event: Option<&Event>) {
        self.clear_pending_timers(id);
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        if inst.state.visible {
            return;
        }
        if inst.props.target.is_some() {
            self.create_delegate_child(id, event);
            return;
        }
        inst.scheduled_to_show = true;

        let inst = &*inst;
        if let Some(event) = event
            && let Some(hook) = &inst.props.hooks.on_trigger
        {
            hook(inst, event);
        }
        if let Some(wait) = &inst.props.hooks.wait {
            tracing::trace!(%id, "show deferred to wait hook");
            wait(inst, event);
            return;
        }

        // Track the cursor from the trigger on, so the first mount is in place.
        if self.has_follow_cursor_behavior(id)
            && self.instances.get(&id).is_some_and(|i| !i.state.mounted)
        {
            if self
                .instances
                .get(&id)
                .is_some_and(|i| i.positioner.is_none())
            {
                self.create_positioner(id);
                self.update_position(id);
            }
            self.add_follow_cursor_listener(id);
        }

        self.add_document_click_listener(id);

        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        let delay = inst.props.delay.get(0);
        if delay > 0 {
            tracing::trace!(%id, delay, "show scheduled");
            inst.show_timer = Some(self.events.set_timeout(u64::from(delay), Task::Show(id)));
        } else {
            self.show(id);
        }
    }

    /// Cancel pending work and hide after the hide delay (or one frame).
    pub(crate) fn schedule_hide(&mut self, id: InstanceId, event: Option<&Event>) {
        self.clear_pending_timers(id);
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        if let Some(event) = event
            && let Some(hook) = &inst.props.hooks.on_untrigger
        {
            hook(&*inst, event);
        }
        if !inst.state.visible {
            self.remove_follow_cursor_listener(id);
            return;
        }
        inst.scheduled_to_show = false;

        let delay = inst.props.delay.get(1);
        if delay > 0 {
            tracing::trace!(%id, delay, "hide scheduled");
            inst.hide_timer = Some(self.events.set_timeout(u64::from(delay), Task::Hide(id)));
        } else {
            // One frame late, so a transitionend from the show cannot race the hide.
            inst.hide_frame = Some(self.events.request_frame(Task::FrameHide(id)));
        }
    }

    /// Request a coalesced recompute on the next frame.
    pub(crate) fn schedule_update(&mut self, id: InstanceId) {
        if let Some(inst) = self.instances.get_mut(&id)
            && inst.reposition_frame.is_none()
            && inst.positioner.is_some()
        {
            inst.reposition_frame = Some(self.events.request_frame(Task::Reposition(id)));
        }
    }

    // --- mounting and positioning ---

    pub(crate) fn has_follow_cursor_behavior(&self, id: InstanceId) -> bool {
        self.instances.get(&id).is_some_and(|i| {
            i.props.follow_cursor != FollowCursor::Off
                && !self.context.is_using_touch()
                && i.last_trigger != Some(EventKind::Focus)
        })
    }

    fn create_positioner(&mut self, id: InstanceId) {
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        let props = &inst.props;
        let options = &props.popper_options;
        let config = PositionerConfig {
            placement: props.placement,
            flip: props.flip,
            flip_behavior: props.flip_behavior.clone(),
            flip_padding: options
                .flip_padding
                .unwrap_or(props.distance + OVERFLOW_PADDING),
            offset: options.offset.unwrap_or(props.offset),
            boundary: props.boundary,
            arrow: inst.children.arrow,
            overflow_padding: options
                .padding
                .unwrap_or(Padding::uniform(OVERFLOW_PADDING)),
        };
        inst.positioner = Some(self.positioners.create(
            Reference::Element(inst.reference),
            inst.overlay,
            config,
        ));
        inst.positioner_fresh = true;
        tracing::trace!(%id, "positioner created");
    }

    /// Recompute now, reflect the result and run the mount callback.
    pub(crate) fn update_position(&mut self, id: InstanceId) {
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        let Some(positioner) = inst.positioner.as_mut() else {
            return;
        };
        let data = positioner.update(&mut self.doc);
        let fresh = core::mem::take(&mut inst.positioner_fresh);

        self.apply_mutations(id, &data);
        self.run_mount_callback(id);

        if let Some(inst) = self.instances.get(&id) {
            let options = &inst.props.popper_options;
            let hook = if fresh {
                &options.on_create
            } else {
                &options.on_update
            };
            if let Some(hook) = hook {
                hook(&data);
            }
        }
    }

    fn apply_mutations(&mut self, id: InstanceId, data: &PlacementData) {
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        inst.current_placement = data.placement;
        let placement = data.placement;

        if inst.props.flip
            && !inst.props.flip_on_update
            && let Some(p) = inst.positioner.as_mut()
        {
            if data.flipped {
                p.set_placement(placement);
            }
            p.set_flip_enabled(false);
        }

        // The placement attributes live on the tooltip, not the overlay root.
        self.doc.remove_attribute(inst.overlay, "x-placement");
        self.doc.remove_attribute(inst.overlay, "x-out-of-boundaries");

        let restore_transition = inst.previous_placement.is_some_and(|p| p != placement)
            && inst.was_visible_during_previous_update;
        inst.previous_placement = Some(placement);
        inst.was_visible_during_previous_update = inst.state.visible;

        if let Some(tooltip) = inst.children.tooltip {
            self.doc
                .set_attribute(tooltip, "data-placement", format!("{placement}"));
            if data.out_of_boundaries {
                self.doc.set_attribute(tooltip, "data-out-of-boundaries", "");
            } else {
                self.doc.remove_attribute(tooltip, "data-out-of-boundaries");
            }
            // No transition across a placement change while visible.
            if restore_transition {
                self.doc.set_style(tooltip, "transition", "none");
                self.events.request_frame(Task::RestoreTransition(id));
            }
            for side in ["top", "bottom", "left", "right"] {
                self.doc.set_style(tooltip, side, "");
            }
            self.doc.set_style(
                tooltip,
                placement.side.name(),
                format!("{}px", -inst.props.distance),
            );
        }

        let mut padding = inst
            .props
            .popper_options
            .padding
            .unwrap_or(Padding::uniform(OVERFLOW_PADDING));
        padding.set_side(
            placement.side,
            padding.side(placement.side) + inst.props.distance,
        );
        if let Some(p) = inst.positioner.as_mut() {
            p.set_overflow_padding(padding);
        }
        inst.computed_padding = Some(padding);
    }

    fn run_mount_callback(&mut self, id: InstanceId) {
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        if inst.has_mount_callback_run {
            return;
        }
        let Some(duration) = inst.mount_callback else {
            return;
        };
        inst.has_mount_callback_run = true;

        // A hide may have run between mount and this computation.
        if !inst.state.visible {
            return;
        }
        if !self.has_follow_cursor_behavior(id) {
            self.update_position(id);
        }

        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        let children = inst.children;
        let overlay = inst.overlay;
        let sticky = inst.props.sticky;
        let update_duration = inst.props.update_duration;

        if let (Some(_), Some(content)) = (children.backdrop, children.content) {
            self.doc.set_style(
                content,
                "transition-delay",
                format!("{}ms", duration.saturating_add(6) / 12),
            );
        }
        if sticky {
            self.make_sticky(id);
        }
        set_transition_duration(&mut self.doc, [overlay], update_duration);
        set_transition_duration(&mut self.doc, children.transitionable(), duration);
        set_visibility_state(&mut self.doc, children.transitionable(), "visible");

        self.on_transition_end(id, duration, Completion::Shown);
    }

    fn mount(&mut self, id: InstanceId) {
        let using_touch = self.context.is_using_touch();
        let follow = self.has_follow_cursor_behavior(id);
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        inst.has_mount_callback_run = false;
        let enable_listeners =
            !follow && !(inst.props.follow_cursor == FollowCursor::Initial && using_touch);

        let created = inst.positioner.is_none();
        if created {
            self.create_positioner(id);
        }
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        if let Some(p) = inst.positioner.as_mut() {
            if enable_listeners {
                p.enable_event_listeners();
            }
            if !created {
                p.set_flip_enabled(inst.props.flip);
            }
            // Back to the real element after an earlier cursor-follow show.
            p.set_reference(Reference::Element(inst.reference));
        }

        let arrow = inst.children.arrow;
        let last_move = inst.last_mouse_move.clone();
        let follow_initial = inst.props.follow_cursor == FollowCursor::Initial;
        if follow {
            if let Some(arrow) = arrow {
                self.doc.set_style(arrow, "margin", "0");
            }
            if let Some(event) = &last_move {
                self.position_virtual_reference(id, event);
            }
        } else if let Some(arrow) = arrow {
            self.doc.set_style(arrow, "margin", "");
        }
        if using_touch
            && follow_initial
            && let Some(event) = &last_move
        {
            self.position_virtual_reference(id, event);
            if let Some(arrow) = arrow {
                self.doc.set_style(arrow, "margin", "0");
            }
        }

        let parent = self.mount_parent(id);
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        inst.mount_parent = Some(parent);
        if !self.doc.contains(parent, inst.overlay) {
            self.doc.append_child(parent, inst.overlay);
            if self.doc.contains(parent, inst.overlay) {
                inst.state.mounted = true;
                tracing::trace!(%id, ?parent, "mounted");
                self.notify(id, |h| &h.on_mount);
            } else {
                tracing::warn!(%id, ?parent, "overlay could not be attached");
            }
        }

        if created || !follow {
            self.update_position(id);
        }
    }

    fn mount_parent(&self, id: InstanceId) -> NodeId {
        let body = self.doc.body();
        let Some(inst) = self.instances.get(&id) else {
            return body;
        };
        let parent = match &inst.props.append_to {
            AppendTo::Body => body,
            AppendTo::Parent => self.doc.parent(inst.reference).unwrap_or_else(|| {
                tracing::warn!(%id, "reference has no parent; mounting to body");
                body
            }),
            AppendTo::Element(node) => *node,
            AppendTo::Callback(f) => f(&self.doc, inst.reference),
        };
        if self.doc.is_alive(parent) && !self.doc.contains(inst.overlay, parent) {
            parent
        } else {
            tracing::warn!(%id, ?parent, "mount parent is unusable; mounting to body");
            body
        }
    }

    fn make_sticky(&mut self, id: InstanceId) {
        if let Some(inst) = self.instances.get(&id) {
            let update_duration = inst.props.update_duration;
            set_transition_duration(&mut self.doc, [inst.overlay], update_duration);
        }
        self.run_sticky(id);
    }

    fn run_sticky(&mut self, id: InstanceId) {
        self.schedule_update(id);
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        if inst.state.mounted {
            self.events.request_frame(Task::Sticky(id));
        } else {
            set_transition_duration(&mut self.doc, [inst.overlay], 0);
        }
    }

    // --- transitions ---

    /// Run `completion` once the tooltip finishes transitioning, or now for `duration == 0`.
    fn on_transition_end(&mut self, id: InstanceId, duration: u32, completion: Completion) {
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        // A newer transition supersedes any pending completion.
        let handler = Handler::TransitionEnd(id);
        if let Some((node, _)) = inst.transition_end.take() {
            self.doc
                .remove_listener(node, EventKind::TransitionEnd, &handler, false);
        }
        // Without a tooltip no transitionend can arrive.
        let tooltip = match inst.children.tooltip {
            Some(tooltip) if duration > 0 => tooltip,
            _ => {
                self.complete(id, completion);
                return;
            }
        };
        self.doc.add_listener(
            tooltip,
            EventKind::TransitionEnd,
            handler,
            ListenerOptions::empty(),
        );
        inst.transition_end = Some((tooltip, completion));
    }

    pub(crate) fn on_transition_end_event(&mut self, id: InstanceId, event: &Event) {
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        let Some((tooltip, completion)) = inst.transition_end else {
            return;
        };
        if event.target != tooltip {
            return;
        }
        inst.transition_end = None;
        self.doc.remove_listener(
            tooltip,
            EventKind::TransitionEnd,
            &Handler::TransitionEnd(id),
            false,
        );
        self.complete(id, completion);
    }

    fn complete(&mut self, id: InstanceId, completion: Completion) {
        match completion {
            Completion::Shown => self.complete_show(id),
            Completion::Hidden => self.complete_hide(id),
        }
    }

    fn complete_show(&mut self, id: InstanceId) {
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        if !inst.state.visible {
            return;
        }
        if let Some(aria) = &inst.props.aria
            && let Some(overlay_id) = self.doc.attribute(inst.overlay, "id").map(String::from)
        {
            let target = inst.trigger_target();
            self.doc
                .set_attribute(target, &format!("aria-{aria}"), overlay_id);
        }
        self.notify(id, |h| &h.on_shown);
        if let Some(inst) = self.instances.get_mut(&id) {
            inst.state.shown = true;
            tracing::trace!(%id, "shown");
        }
    }

    fn complete_hide(&mut self, id: InstanceId) {
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        let Some(parent) = inst.mount_parent else {
            return;
        };
        if inst.state.visible || !self.doc.contains(parent, inst.overlay) {
            return;
        }
        if !inst.scheduled_to_show {
            self.remove_follow_cursor_listener(id);
        }

        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        if let Some(aria) = &inst.props.aria {
            let target = inst.props.trigger_target_or(inst.reference);
            self.doc.remove_attribute(target, &format!("aria-{aria}"));
        }
        if let Some(p) = inst.positioner.as_mut() {
            p.disable_event_listeners();
            p.set_placement(inst.props.placement);
        }
        self.doc.detach(inst.overlay);

        self.notify(id, |h| &h.on_hidden);
        if let Some(inst) = self.instances.get_mut(&id) {
            inst.state.mounted = false;
            tracing::trace!(%id, "hidden");
        }
    }

    // --- document-level listeners ---

    pub(crate) fn add_document_click_listener(&mut self, id: InstanceId) {
        let root = self.doc.root();
        self.doc.add_listener(
            root,
            EventKind::Click,
            Handler::DocumentClick(id),
            ListenerOptions::CAPTURE,
        );
    }

    pub(crate) fn remove_document_click_listener(&mut self, id: InstanceId) {
        let root = self.doc.root();
        self.doc
            .remove_listener(root, EventKind::Click, &Handler::DocumentClick(id), true);
    }

    // --- hooks ---

    fn notify(&self, id: InstanceId, pick: fn(&Hooks) -> &Option<InstanceHook>) {
        if let Some(inst) = self.instances.get(&id)
            && let Some(hook) = pick(&inst.props.hooks)
        {
            hook(inst);
        }
    }

    fn allow(&self, id: InstanceId, pick: fn(&Hooks) -> &Option<VetoHook>) -> bool {
        self.instances
            .get(&id)
            .is_some_and(|inst| pick(&inst.props.hooks).as_ref().is_none_or(|h| h(inst)))
    }
}
