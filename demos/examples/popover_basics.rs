// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A hover tooltip driven through its whole lifecycle.
//!
//! Set `RUST_LOG=understory_popover=trace` to see the engine's decisions.
//!
//! Run:
//! - `cargo run -p understory_demos --example popover_basics`

use kurbo::{Rect, Size};
use tracing_subscriber::EnvFilter;
use understory_popover::{Event, EventKind, Popovers, PropsPatch};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut popovers = Popovers::new();
    let doc = popovers.document_mut();
    let button = doc.create_element("button");
    let body = doc.body();
    doc.append_child(body, button);
    doc.set_rect(button, Rect::new(200.0, 200.0, 280.0, 230.0));

    let id = popovers
        .create(
            button,
            &PropsPatch::new()
                .content("Saves the document")
                .delay((150_u32, 0_u32))
                .on_shown(|inst| println!("  shown (instance {})", inst.id()))
                .on_hidden(|inst| println!("  hidden (instance {})", inst.id())),
        )
        .expect("first instance for the button");
    let inst = popovers.instance(id).expect("just created");
    let overlay = inst.overlay();
    let tooltip = inst.children().tooltip.expect("default overlay has a tooltip");
    popovers
        .document_mut()
        .set_rect(overlay, Rect::from_origin_size((0.0, 0.0), Size::new(140.0, 28.0)));

    println!("== hover, then wait out the delay ==");
    popovers.dispatch(Event::new(EventKind::MouseEnter, button).at(240.0, 215.0));
    popovers.advance(150);
    popovers.dispatch(Event::new(EventKind::TransitionEnd, tooltip));
    let placed = popovers.document().rect(overlay);
    println!("  overlay at {placed:?}");
    assert_eq!(placed, Rect::new(170.0, 172.0, 310.0, 200.0));

    println!("== leave ==");
    popovers.dispatch(Event::new(EventKind::MouseLeave, button));
    popovers.run_frame();
    popovers.dispatch(Event::new(EventKind::TransitionEnd, tooltip));
    assert!(!popovers.instance(id).expect("still known").state().mounted);
}
