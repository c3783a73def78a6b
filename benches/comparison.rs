use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};

use criterion::{Criterion, criterion_group, criterion_main};
use lazy_pool::{Batch, lp_define_task_fn, lp_task};
use rayon::prelude::*;

lp_task! {
    SimpleTask {
        iterations: usize,
        result: *mut u64,
    }
}

lp_task! {
    EmptyTask {
        hits: *const AtomicU64,
    }
}

lp_define_task_fn!(simple_task_fn, SimpleTask, |params| {
    let mut sum = 0u64;
    for i in 0..params.iterations {
        sum = sum.wrapping_add(i as u64 * 17);
    }
    unsafe { *params.result = sum };
});

lp_define_task_fn!(empty_task_fn, EmptyTask, |params| {
    unsafe { &*params.hits }.fetch_add(1, Ordering::Relaxed);
});

fn simple_work(iterations: usize) -> u64 {
    let mut sum = 0u64;
    for i in 0..iterations {
        sum = sum.wrapping_add(i as u64 * 17);
    }
    sum
}

// a fresh pool per iteration so that shutdown marks the end of the work
fn run_simple(task_count: usize, iterations: usize) -> Vec<u64> {
    let mut results = vec![0u64; task_count];
    let mut tasks: Vec<SimpleTask> = results
        .iter_mut()
        .map(|result| SimpleTask::new(simple_task_fn, iterations, result))
        .collect();

    let pool = lazy_pool::new();
    let batch: Batch<'_> = tasks.iter_mut().map(SimpleTask::batch).collect();
    unsafe { pool.schedule_raw(batch) }.expect("schedule failed");
    pool.shutdown();

    results
}

fn bench_simple_small(c: &mut Criterion) {
    let mut group = c.benchmark_group("simple_small_100");

    group.bench_function("lazy_pool", |b| {
        b.iter(|| black_box(run_simple(100, 1000)));
    });

    group.bench_function("rayon", |b| {
        b.iter(|| {
            let results: Vec<u64> = (0..100).into_par_iter().map(|_| simple_work(1000)).collect();
            black_box(results)
        });
    });

    group.finish();
}

fn bench_simple_large(c: &mut Criterion) {
    let mut group = c.benchmark_group("simple_large_10000");

    group.bench_function("lazy_pool", |b| {
        b.iter(|| black_box(run_simple(10_000, 1000)));
    });

    group.bench_function("rayon", |b| {
        b.iter(|| {
            let results: Vec<u64> = (0..10_000)
                .into_par_iter()
                .map(|_| simple_work(1000))
                .collect();
            black_box(results)
        });
    });

    group.finish();
}

// many single-task schedule calls against a warm pool
fn bench_minimal_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimal_overhead_1000");

    group.bench_function("lazy_pool_single_calls", |b| {
        let hits = AtomicU64::new(0);
        b.iter(|| {
            let mut tasks: Vec<EmptyTask> = (0..1000)
                .map(|_| EmptyTask::new(empty_task_fn, &hits))
                .collect();
            let pool = lazy_pool::new();
            for task in tasks.iter_mut() {
                unsafe { pool.schedule_raw(task.batch()) }.expect("schedule failed");
            }
            pool.shutdown();
        });
        black_box(hits.load(Ordering::Relaxed));
    });

    group.bench_function("rayon", |b| {
        let hits = AtomicU64::new(0);
        b.iter(|| {
            rayon::scope(|s| {
                for _ in 0..1000 {
                    s.spawn(|_| {
                        hits.fetch_add(1, Ordering::Relaxed);
                    });
                }
            });
        });
        black_box(hits.load(Ordering::Relaxed));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_simple_small,
    bench_simple_large,
    bench_minimal_overhead
);
criterion_main!(benches);
