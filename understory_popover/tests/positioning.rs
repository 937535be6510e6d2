// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positioner integration: placement reflection, cursor following, sticky loops.

use std::cell::Cell;
use std::rc::Rc;

use understory_popover::{
    AnchorPositioner, AppendTo, AttributeResolver, DefaultOverlayBuilder, Event, EventKind,
    FollowCursor, InstanceId, NodeId, Placement, PlacementData, PopperOptions, Popovers,
    Positioner, PositionerConfig, PositionerFactory, PropsPatch, Rect, Reference,
};

fn setup_with(p: Popovers) -> (Popovers, NodeId) {
    let mut p = p;
    let doc = p.document_mut();
    let button = doc.create_element("button");
    let body = doc.body();
    doc.append_child(body, button);
    doc.set_rect(button, Rect::new(100.0, 100.0, 180.0, 130.0));
    (p, button)
}

fn setup() -> (Popovers, NodeId) {
    setup_with(Popovers::new())
}

fn reference(p: &Popovers, id: InstanceId) -> Reference {
    p.instance(id).unwrap().positioner().unwrap().reference()
}

#[test]
fn placement_is_reflected_on_the_tooltip() {
    let (mut p, button) = setup();
    let id = p
        .create(
            button,
            &PropsPatch::new().lazy(false).placement(Placement::BOTTOM),
        )
        .unwrap();
    let inst = p.instance(id).unwrap();
    assert!(inst.positioner().is_some(), "eager positioner");
    let tooltip = inst.children().tooltip.unwrap();
    let doc = p.document();
    assert_eq!(doc.attribute(tooltip, "data-placement"), Some("bottom"));
    assert_eq!(doc.style(tooltip, "bottom"), Some("-10px"));
    assert!(!doc.has_attribute(inst.overlay(), "x-placement"));
}

#[test]
fn follow_cursor_uses_clamped_pointer_coordinates() {
    let (mut p, button) = setup();
    let id = p
        .create(
            button,
            &PropsPatch::new().follow_cursor(true).duration(0_u32),
        )
        .unwrap();

    p.dispatch(Event::new(EventKind::MouseEnter, button).at(130.0, 110.0));
    assert!(p.instance(id).unwrap().state().visible);
    assert_eq!(
        reference(&p, id),
        Reference::Virtual(Rect::new(130.0, 110.0, 130.0, 110.0))
    );
    // The mount callback runs with the next computation.
    p.run_frame();
    assert!(p.instance(id).unwrap().state().shown);

    p.dispatch(Event::new(EventKind::MouseMove, button).at(150.0, 120.0));
    assert_eq!(
        reference(&p, id),
        Reference::Virtual(Rect::new(150.0, 120.0, 150.0, 120.0))
    );

    // Cross axis clamped to the 5px overflow padding.
    p.dispatch(Event::new(EventKind::MouseMove, button).at(2.0, 120.0));
    let Reference::Virtual(rect) = reference(&p, id) else {
        panic!("expected a virtual reference");
    };
    assert_eq!((rect.x0, rect.y0), (5.0, 120.0));
    assert_ne!(rect, p.document().rect(button));
}

#[test]
fn follow_cursor_axis_locks() {
    let (mut p, button) = setup();
    let id = p
        .create(
            button,
            &PropsPatch::new()
                .follow_cursor(FollowCursor::Horizontal)
                .duration(0_u32),
        )
        .unwrap();
    p.dispatch(Event::new(EventKind::MouseEnter, button).at(130.0, 110.0));
    p.dispatch(Event::new(EventKind::MouseMove, button).at(150.0, 120.0));
    assert_eq!(
        reference(&p, id),
        Reference::Virtual(Rect::new(150.0, 100.0, 150.0, 130.0))
    );
}

#[test]
fn follow_cursor_initial_stops_after_showing() {
    let (mut p, button) = setup();
    let id = p
        .create(
            button,
            &PropsPatch::new()
                .follow_cursor(FollowCursor::Initial)
                .duration(0_u32),
        )
        .unwrap();
    p.dispatch(Event::new(EventKind::MouseEnter, button).at(130.0, 110.0));
    // Positioned once at mount, then the cursor is no longer tracked.
    p.dispatch(Event::new(EventKind::MouseMove, button).at(150.0, 120.0));
    p.dispatch(Event::new(EventKind::MouseMove, button).at(170.0, 125.0));
    assert_eq!(
        reference(&p, id),
        Reference::Virtual(Rect::new(130.0, 110.0, 130.0, 110.0))
    );
    let root = p.document().root();
    assert_eq!(p.document().listeners_on(root).count(), 1, "only the outside-click listener");
}

#[test]
fn focus_shows_at_the_element_even_with_follow_cursor() {
    let (mut p, button) = setup();
    let id = p
        .create(
            button,
            &PropsPatch::new().follow_cursor(true).duration(0_u32),
        )
        .unwrap();
    p.dispatch(Event::new(EventKind::Focus, button));
    assert!(p.instance(id).unwrap().state().shown);
    assert_eq!(reference(&p, id), Reference::Element(button));
}

#[test]
fn sticky_repositions_every_frame_while_mounted() {
    let (mut p, button) = setup();
    let updates = Rc::new(Cell::new(0));
    let u = updates.clone();
    let options = PopperOptions {
        on_update: Some(Rc::new(move |_: &PlacementData| u.set(u.get() + 1))),
        ..PopperOptions::default()
    };
    let id = p
        .create(
            button,
            &PropsPatch::new()
                .sticky(true)
                .duration(0_u32)
                .popper_options(options),
        )
        .unwrap();
    p.show(id);
    let before = updates.get();
    p.run_frame();
    p.run_frame();
    assert!(updates.get() >= before + 2);
    assert!(p.pending_frames() > 0);

    p.hide(id);
    for _ in 0..3 {
        p.run_frame();
    }
    assert_eq!(p.pending_frames(), 0);
    let overlay = p.instance(id).unwrap().overlay();
    assert_eq!(
        p.document().style(overlay, "transition-duration"),
        Some("0ms")
    );
}

#[test]
fn scroll_recomputes_mounted_instances() {
    let (mut p, button) = setup();
    let id = p
        .create(button, &PropsPatch::new().duration(0_u32))
        .unwrap();
    p.show(id);
    let overlay = p.instance(id).unwrap().overlay();
    p.document_mut()
        .set_rect(button, Rect::new(300.0, 300.0, 380.0, 330.0));
    let root = p.document().root();
    p.dispatch(Event::new(EventKind::Scroll, root));
    assert_eq!(p.pending_frames(), 1);
    p.run_frame();
    assert_eq!(p.document().rect(overlay).y1, 300.0);
}

#[test]
fn append_to_parent_mounts_next_to_the_reference() {
    let (mut p, button) = setup();
    let wrapper = p.document_mut().create_element("div");
    let body = p.document().body();
    p.document_mut().append_child(body, wrapper);
    p.document_mut().append_child(wrapper, button);
    let id = p
        .create(
            button,
            &PropsPatch::new().append_to(AppendTo::Parent).duration(0_u32),
        )
        .unwrap();
    p.show(id);
    let overlay = p.instance(id).unwrap().overlay();
    assert_eq!(p.document().parent(overlay), Some(wrapper));
}

#[test]
fn stale_append_target_falls_back_to_body() {
    let (mut p, button) = setup();
    let gone = p.document_mut().create_element("div");
    p.document_mut().remove(gone);
    let id = p
        .create(
            button,
            &PropsPatch::new()
                .append_to(AppendTo::Element(gone))
                .duration(0_u32),
        )
        .unwrap();
    p.show(id);
    let overlay = p.instance(id).unwrap().overlay();
    let body = p.document().body();
    assert_eq!(p.document().parent(overlay), Some(body));
    assert!(p.instance(id).unwrap().state().mounted);

    p.hide(id);
    assert!(!p.instance(id).unwrap().state().mounted);
    assert_eq!(p.document().parent(overlay), None);
}

#[test]
fn hide_before_the_mount_callback_skips_on_shown() {
    let (mut p, button) = setup();
    let shown = Rc::new(Cell::new(0));
    let s = shown.clone();
    let id = p
        .create(
            button,
            &PropsPatch::new()
                .lazy(false)
                .follow_cursor(true)
                .duration(0_u32)
                .on_shown(move |_| s.set(s.get() + 1)),
        )
        .unwrap();

    // The existing positioner defers the mount callback to the next frame.
    p.dispatch(Event::new(EventKind::MouseEnter, button).at(130.0, 110.0));
    assert!(p.instance(id).unwrap().state().mounted);
    p.hide(id);
    p.run_frame();

    let state = p.instance(id).unwrap().state();
    assert!(!state.visible && !state.shown && !state.mounted);
    assert_eq!(shown.get(), 0);
}

#[test]
fn recreating_while_visible_keeps_tracking_the_cursor() {
    let (mut p, button) = setup();
    let id = p
        .create(
            button,
            &PropsPatch::new().follow_cursor(true).duration(0_u32),
        )
        .unwrap();
    p.dispatch(Event::new(EventKind::MouseEnter, button).at(130.0, 110.0));
    p.run_frame();
    p.dispatch(Event::new(EventKind::MouseMove, button).at(150.0, 120.0));
    assert!(p.instance(id).unwrap().state().shown);

    p.set(id, &PropsPatch::new().placement(Placement::BOTTOM));
    let inst = p.instance(id).unwrap();
    assert_eq!(inst.positioner().unwrap().placement(), Placement::BOTTOM);
    assert!(inst.positioner().unwrap().event_listeners_enabled());
    assert_eq!(
        reference(&p, id),
        Reference::Virtual(Rect::new(150.0, 120.0, 150.0, 120.0))
    );
}

struct Counting {
    created: Rc<Cell<usize>>,
}

impl PositionerFactory for Counting {
    fn create(
        &self,
        reference: Reference,
        overlay: NodeId,
        config: PositionerConfig,
    ) -> Box<dyn Positioner> {
        self.created.set(self.created.get() + 1);
        Box::new(AnchorPositioner::new(reference, overlay, config))
    }
}

#[test]
fn positioning_changes_recreate_the_positioner() {
    let created = Rc::new(Cell::new(0));
    let engine = Popovers::with_collaborators(
        Counting {
            created: created.clone(),
        },
        DefaultOverlayBuilder,
        AttributeResolver,
    );
    let (mut p, button) = setup_with(engine);
    let fresh = Rc::new(Cell::new(0));
    let f = fresh.clone();
    let options = PopperOptions {
        on_create: Some(Rc::new(move |_: &PlacementData| f.set(f.get() + 1))),
        ..PopperOptions::default()
    };
    let id = p
        .create(button, &PropsPatch::new().lazy(false).popper_options(options))
        .unwrap();
    assert_eq!((created.get(), fresh.get()), (1, 1));

    p.set_content(id, "Other words");
    assert_eq!(created.get(), 1);

    p.set(id, &PropsPatch::new().placement(Placement::RIGHT));
    assert_eq!((created.get(), fresh.get()), (2, 2));
    let inst = p.instance(id).unwrap();
    assert_eq!(inst.current_placement(), Placement::RIGHT);
    assert_eq!(inst.positioner().unwrap().placement(), Placement::RIGHT);
}

#[test]
fn destroy_releases_the_positioner() {
    let (mut p, button) = setup();
    let id = p
        .create(button, &PropsPatch::new().duration(0_u32))
        .unwrap();
    p.show(id);
    assert!(
        p.instance(id)
            .unwrap()
            .positioner()
            .unwrap()
            .event_listeners_enabled()
    );
    p.destroy(id, false);
    assert!(
        !p.instance(id)
            .unwrap()
            .positioner()
            .unwrap()
            .event_listeners_enabled()
    );
}
