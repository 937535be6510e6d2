// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One delegated instance serving every row of a list.
//!
//! Run:
//! - `cargo run -p understory_demos --example popover_delegation`

use understory_popover::{Content, Event, EventKind, Popovers, PropsPatch, Selector};

fn main() {
    let mut popovers = Popovers::new();
    let doc = popovers.document_mut();
    let body = doc.body();
    let list = doc.create_element("ul");
    doc.append_child(body, list);
    let mut rows = Vec::new();
    for name in ["alpha", "beta", "gamma"] {
        let row = doc.create_element("li");
        doc.add_class(row, "row");
        doc.set_attribute(row, "data-name", name);
        doc.append_child(list, row);
        rows.push(row);
    }

    let parent = popovers
        .create(
            list,
            &PropsPatch::new()
                .target(Selector::parse(".row").expect("valid selector"))
                .duration(0_u32)
                .content(Content::from_fn(|doc, row| {
                    format!("Row {}", doc.attribute(row, "data-name").unwrap_or("?"))
                })),
        )
        .expect("first instance for the list");

    for &row in &rows[..2] {
        popovers.dispatch(Event::new(EventKind::MouseOver, row));
        popovers.dispatch(Event::new(EventKind::MouseOver, row));
    }

    for &row in &rows {
        match popovers.instance_for(row) {
            Some(child) => {
                let content = child.children().content.expect("default overlay has content");
                println!("{:?}: {:?}", row, popovers.document().text(content));
            }
            None => println!("{row:?}: no instance yet"),
        }
    }
    assert_eq!(popovers.instances().count(), 3);

    popovers.destroy(parent, true);
    assert!(popovers.instances().all(|i| i.state().destroyed));
}
