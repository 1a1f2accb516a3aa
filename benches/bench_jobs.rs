use asset_runtime::JobScheduler;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::cell::Cell;
use std::rc::Rc;

fn bench_submit_and_wait_all(c: &mut Criterion) {
    let mut scheduler = JobScheduler::new().unwrap();
    c.bench_function("submit_100_jobs_wait_all", |b| {
        b.iter(|| {
            let total = Rc::new(Cell::new(0u64));
            for i in 0..100u64 {
                let total = total.clone();
                scheduler.submit(
                    i,
                    |value: &mut u64| *value = value.wrapping_mul(31).wrapping_add(7),
                    move |_, value| total.set(total.get() + value),
                );
            }
            scheduler.wait_for_all();
            black_box(total.get());
        })
    });
}

fn bench_wait_single(c: &mut Criterion) {
    let mut scheduler = JobScheduler::new().unwrap();
    c.bench_function("submit_wait_single_job", |b| {
        b.iter(|| {
            let id = scheduler.submit(vec![0u8; 4096], |bytes: &mut Vec<u8>| bytes.fill(1), |_, bytes| {
                black_box(bytes);
            });
            scheduler.wait(id);
        })
    });
}

fn bench_detached(c: &mut Criterion) {
    let mut scheduler = JobScheduler::new().unwrap();
    c.bench_function("submit_100_detached_jobs", |b| {
        b.iter(|| {
            for i in 0..100u32 {
                scheduler.submit_detached(i, |value: &mut u32| {
                    black_box(*value);
                });
            }
            scheduler.wait_for_all();
        })
    });
}

criterion_group!(benches, bench_submit_and_wait_all, bench_wait_single, bench_detached);
criterion_main!(benches);
