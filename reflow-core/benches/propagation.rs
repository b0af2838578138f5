//! Push/pull propagation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reflow_core::{Processor, Value};

/// A linear chain of computers over one root signal: set the root, pull the
/// tip. Exercises the push phase (flattened subscriptions) and the
/// dependency-first pull.
fn chain_propagation(c: &mut Criterion) {
    let processor = Processor::new();
    let root = processor.create_signal(Value::new(0i64));

    let mut tip = processor.create_computer(
        move |g| Value::new(g.signal_as::<i64>(root).unwrap_or(0) + 1),
        vec![root],
    );
    for _ in 0..15 {
        let parent = tip;
        tip = processor.create_computer(
            move |g| Value::new(g.computer_as::<i64>(parent).unwrap_or(0) + 1),
            vec![parent],
        );
    }

    let mut i = 0i64;
    c.bench_function("set_then_pull_chain_16", |b| {
        b.iter(|| {
            i += 1;
            processor.set_signal(root, Value::new(i));
            black_box(processor.computer_as::<i64>(tip));
        })
    });
}

/// Wide fan-out: one signal with many direct computers, only one of which is
/// ever read. Measures the cost of pushing invalidation to unread nodes.
fn fanout_propagation(c: &mut Criterion) {
    let processor = Processor::new();
    let root = processor.create_signal(Value::new(0i64));

    let mut read_target = None;
    for n in 0..100 {
        let id = processor.create_computer(
            move |g| Value::new(g.signal_as::<i64>(root).unwrap_or(0) + n),
            vec![root],
        );
        if n == 0 {
            read_target = Some(id);
        }
    }
    let target = read_target.unwrap();

    let mut i = 0i64;
    c.bench_function("set_fanout_100_pull_one", |b| {
        b.iter(|| {
            i += 1;
            processor.set_signal(root, Value::new(i));
            black_box(processor.computer_as::<i64>(target));
        })
    });
}

criterion_group!(benches, chain_propagation, fanout_propagation);
criterion_main!(benches);
