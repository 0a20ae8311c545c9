use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use matbench::{Element, EngineConfig, Matrix, MultType};

/// Thread-per-element spawns N² threads per call; keep it to small orders.
const ELEMENT_MAX_ORDER: usize = 64;

fn bench_order<T: Element, const N: usize>(c: &mut Criterion, config: &EngineConfig) {
    let mut a = Matrix::<T, N, N>::new();
    let mut b = Matrix::<T, N, N>::new();
    a.random_fill_seeded(1);
    b.random_fill_seeded(2);

    let mut group = c.benchmark_group(format!("matmul_{}", T::DATA_TYPE));
    group.throughput(Throughput::Elements((2 * N * N * N) as u64));
    for mult in MultType::CPU {
        if mult == MultType::MultithreadElement && N > ELEMENT_MAX_ORDER {
            continue;
        }
        group.bench_with_input(BenchmarkId::new(mult.to_string(), N), &mult, |bench, &mult| {
            bench.iter(|| black_box(a.mult_with(&b, mult, config).unwrap()))
        });
    }
    group.finish();
}

fn matmul_benchmarks(c: &mut Criterion) {
    let config = EngineConfig::default();
    bench_order::<f32, 64>(c, &config);
    bench_order::<f32, 256>(c, &config);
    bench_order::<f64, 256>(c, &config);
    bench_order::<i32, 256>(c, &config);
}

criterion_group!(benches, matmul_benchmarks);
criterion_main!(benches);
