// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use criterion::{BenchmarkId, Criterion, Throughput};
use rill_core::{Push, Stream, StreamItem};
use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

fn sum_into(stream: &Stream<u64>, total: &Rc<Cell<u64>>) -> Stream<()> {
    let total = Rc::clone(total);
    stream.consume(move |item, _push: &Push<()>, next| {
        if let StreamItem::Value(x) = item {
            total.set(total.get() + x);
            next.call();
        }
    })
}

pub fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain");

    for &size in &[100u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size));

        group.bench_with_input(BenchmarkId::new("sequence", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let total = Rc::new(Cell::new(0));
                sum_into(&Stream::from_iterator(0..size), &total).resume();
                black_box(total.get());
            });
        });

        group.bench_with_input(BenchmarkId::new("generator", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut n = 0;
                let stream = Stream::generator(move |push, next| {
                    if n == size {
                        push.end();
                    } else {
                        push.value(n);
                        n += 1;
                        next.call();
                    }
                });
                let total = Rc::new(Cell::new(0));
                sum_into(&stream, &total).resume();
                black_box(total.get());
            });
        });

        group.bench_with_input(BenchmarkId::new("buffered", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let stream = Stream::new();
                for x in 0..size {
                    stream.write(StreamItem::Value(x));
                }
                let total = Rc::new(Cell::new(0));
                sum_into(&stream, &total).resume();
                black_box(total.get());
            });
        });
    }

    group.finish();
}

pub fn bench_fork(c: &mut Criterion) {
    let mut group = c.benchmark_group("fork");

    for &siblings in &[2usize, 8, 32] {
        group.throughput(Throughput::Elements(1_000));
        let id = BenchmarkId::from_parameter(format!("siblings_{siblings}"));
        group.bench_with_input(id, &siblings, |bencher, &siblings| {
            bencher.iter(|| {
                let source = Stream::from_iterator(0..1_000u64);
                let total = Rc::new(Cell::new(0));
                let outputs: Vec<_> = (0..siblings)
                    .map(|_| sum_into(&source.fork(), &total))
                    .collect();
                for out in &outputs {
                    out.resume();
                }
                black_box(total.get());
            });
        });
    }

    group.finish();
}
