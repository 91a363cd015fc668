use chromagc::{collect, destroy, init, Configuration, Root, Trace, TraceContext};
use criterion::{criterion_group, criterion_main, Criterion};
use std::time::Duration;

#[expect(dead_code)]
enum Data {
    Small(i32),
    Large(Vec<u8>),
}

impl Trace for Data {
    fn trace(&self, _ctx: &mut TraceContext<'_>) {}
}

fn bench_lifecycle(criterion: &mut Criterion) {
    init(Configuration::default()).expect("heap should not already be initialized");

    criterion.bench_function("gc_objects", |bencher| {
        bencher.iter(allocate_objects);
    });

    destroy().expect("benchmark should not leak roots");
}

fn allocate_objects() {
    for i in 0..1_000 {
        if i % 2 == 0 {
            let _root = Root::make(Data::Small(i));
        } else {
            let data = vec![0u8; 1024 * 1024]; // 1MB
            let _root = Root::make(Data::Large(data));
        }
    }
    collect();
}

criterion_group!(
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = bench_lifecycle
);
criterion_main!(benches);
