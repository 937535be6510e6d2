// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capture, target and bubble routing over a small document.
//!
//! Run:
//! - `cargo run -p understory_demos --example dom_propagation`

use understory_dom::{Document, Event, EventKind, ListenerOptions, Phase, Selector};

fn main() {
    let mut doc: Document<&'static str> = Document::new();
    let body = doc.body();
    let root = doc.root();

    let menu = doc.create_element("ul");
    doc.add_class(menu, "menu");
    doc.append_child(body, menu);
    let item = doc.create_element("li");
    doc.add_class(item, "item");
    doc.append_child(menu, item);

    doc.add_listener(root, EventKind::Click, "document (capture)", ListenerOptions::CAPTURE);
    doc.add_listener(menu, EventKind::Click, "menu (bubble)", ListenerOptions::empty());
    doc.add_listener(item, EventKind::Click, "item", ListenerOptions::empty());
    // Registering the same listener twice is a no-op.
    assert!(!doc.add_listener(item, EventKind::Click, "item", ListenerOptions::empty()));

    let route = doc.route(&Event::new(EventKind::Click, item));
    println!("== click on .item ==");
    for step in &route {
        println!("  {:?} {:?}", step.phase, step.payload);
    }
    assert_eq!(
        route.iter().map(|d| d.phase).collect::<Vec<_>>(),
        vec![Phase::Capture, Phase::Target, Phase::Bubble]
    );

    // Non-bubbling events stop at the target.
    doc.add_listener(menu, EventKind::MouseEnter, "menu enter", ListenerOptions::empty());
    assert!(doc.route(&Event::new(EventKind::MouseEnter, item)).is_empty());

    let items = Selector::parse("li.item, [data-missing]").expect("valid selector");
    println!("== query ==\n  {:?}", doc.query_selector_all(root, &items));
    assert_eq!(doc.closest(item, &Selector::parse(".menu").expect("valid selector")), Some(menu));
}
