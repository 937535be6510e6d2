// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_dom::{Document, Event, EventKind, ListenerOptions, NodeId};
use understory_popover::{Popovers, PropsPatch};

/// A chain `depth` elements deep under the body, with a click listener on every level.
fn chain(depth: usize) -> (Document<u32>, NodeId) {
    let mut doc = Document::new();
    let mut parent = doc.body();
    for i in 0..depth {
        let node = doc.create_element("div");
        doc.append_child(parent, node);
        let capture = if i % 2 == 0 {
            ListenerOptions::CAPTURE
        } else {
            ListenerOptions::empty()
        };
        doc.add_listener(node, EventKind::Click, i as u32, capture);
        parent = node;
    }
    (doc, parent)
}

fn bench_route(c: &mut Criterion) {
    let mut group = c.benchmark_group("route");
    for depth in [8_usize, 64, 256] {
        let (doc, leaf) = chain(depth);
        let event = Event::new(EventKind::Click, leaf);
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_function(format!("click_depth_{depth}"), |b| {
            b.iter(|| black_box(doc.route(black_box(&event))));
        });
    }
    group.finish();
}

/// `n` buttons under the body, each with a default tooltip.
fn buttons(n: usize) -> (Popovers, Vec<NodeId>) {
    let mut popovers = Popovers::new();
    let mut nodes = Vec::with_capacity(n);
    for _ in 0..n {
        let doc = popovers.document_mut();
        let body = doc.body();
        let button = doc.create_element("button");
        doc.append_child(body, button);
        nodes.push(button);
    }
    let patch = PropsPatch::new().duration(0_u32);
    for &button in &nodes {
        let _ = popovers.create(button, &patch);
    }
    (popovers, nodes)
}

fn bench_hover_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("hover_cycle");
    for n in [1_usize, 32, 256] {
        group.bench_function(format!("instances_{n}"), |b| {
            b.iter_batched(
                || buttons(n),
                |(mut popovers, nodes)| {
                    let target = nodes[nodes.len() / 2];
                    popovers.dispatch(Event::new(EventKind::MouseEnter, target));
                    popovers.dispatch(Event::new(EventKind::MouseLeave, target));
                    popovers.run_frame();
                    black_box(popovers)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_route, bench_hover_cycle);
criterion_main!(benches);
