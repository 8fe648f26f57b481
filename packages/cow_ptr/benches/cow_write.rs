//! Benchmarks for writing through `CowPtr` with and without sharing.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use cow_ptr::CowPtr;
use criterion::{Criterion, criterion_group, criterion_main};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

const VALUE_LEN: usize = 1024;

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("cow_write");

    group.bench_function("unshared", |b| {
        let mut value = CowPtr::new(vec![0_u8; VALUE_LEN]);

        b.iter(|| {
            CowPtr::write(&mut value)[0] = black_box(1);
        });
    });

    group.bench_function("shared", |b| {
        let value = CowPtr::new(vec![0_u8; VALUE_LEN]);

        b.iter(|| {
            let mut copy = value.clone();
            CowPtr::write(&mut copy)[0] = black_box(1);
            copy
        });
    });

    group.finish();

    let mut group = c.benchmark_group("cow_read");

    let value = CowPtr::new(vec![0_u8; VALUE_LEN]);

    group.bench_function("clone_and_read", |b| {
        b.iter(|| {
            let copy = black_box(value.clone());
            copy.len()
        });
    });

    group.finish();
}
