// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An interactive click menu dismissed by an outside click.
//!
//! Run:
//! - `cargo run -p understory_demos --example popover_click_menu`

use kurbo::Rect;
use understory_popover::{Event, EventKind, Placement, Popovers, PropsPatch};

fn main() {
    let mut popovers = Popovers::new();
    let doc = popovers.document_mut();
    let body = doc.body();
    let trigger = doc.create_element("button");
    doc.append_child(body, trigger);
    doc.set_rect(trigger, Rect::new(20.0, 20.0, 100.0, 44.0));

    let menu = doc.create_element("ul");
    for label in ["Copy", "Paste", "Delete"] {
        let entry = doc.create_element("li");
        doc.set_text(entry, label);
        doc.append_child(menu, entry);
    }
    let first_entry = doc.children(menu)[0];

    let id = popovers
        .create(
            trigger,
            &PropsPatch::new()
                .content(menu)
                .trigger(EventKind::Click)
                .interactive(true)
                .placement(Placement::BOTTOM)
                .duration(0_u32),
        )
        .expect("first instance for the trigger");

    popovers.dispatch(Event::new(EventKind::Click, trigger));
    println!("open after click: {}", popovers.instance(id).expect("known").state().visible);

    // Clicking an entry keeps the menu open.
    popovers.dispatch(Event::new(EventKind::Click, first_entry));
    assert!(popovers.instance(id).expect("known").state().visible);

    popovers.dispatch(Event::new(EventKind::Click, body));
    println!("open after outside click: {}", popovers.instance(id).expect("known").state().visible);
    assert!(!popovers.instance(id).expect("known").state().visible);

    popovers.destroy(id, false);
    // The menu element is handed back intact.
    assert!(popovers.document().is_alive(menu));
    assert!(!popovers.document().is_connected(menu));
}
