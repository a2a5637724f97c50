//! Criterion benchmarks for bucket generation.
//!
//! Generation runs once per warmup pass, but the prefix-caching path is
//! cubic in the per-dimension bucket counts and the fill policy rescans the
//! candidate space on every collision, so regressions show up here first.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use hpu_bucketing::{
    generate_decode_buckets, generate_prompt_buckets, warmup_range_with_limit, BucketSet,
    BucketingConfig, ExponentialBucketingStrategy, RangeConfig,
};

fn cfg(min: usize, step: usize, max: usize, bucket_count: usize) -> RangeConfig {
    RangeConfig::new(min, step, max, bucket_count).expect("valid range config")
}

fn bench_range_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("warmup_range");
    for &max in &[2048usize, 32768, 131072] {
        let config = cfg(128, 128, max, 16);
        group.bench_with_input(BenchmarkId::new("fill", max), &config, |b, config| {
            b.iter(|| warmup_range_with_limit(black_box(config), max >= 8192, true))
        });
    }
    group.finish();
}

fn bench_prompt_generation(c: &mut Criterion) {
    let bs = cfg(1, 2, 64, 7);
    let seq = cfg(128, 128, 32768, 16);

    let mut group = c.benchmark_group("prompt_buckets");
    group.bench_function("cross_product", |b| {
        b.iter(|| {
            generate_prompt_buckets(
                black_box(&bs),
                black_box(&seq),
                128,
                false,
                Some(131072),
                Some(32768),
            )
        })
    });
    group.bench_function("prefix_caching", |b| {
        b.iter(|| {
            generate_prompt_buckets(
                black_box(&bs),
                black_box(&seq),
                128,
                true,
                Some(131072),
                Some(32768),
            )
        })
    });
    group.finish();
}

fn bench_decode_generation(c: &mut Criterion) {
    let bs = cfg(1, 2, 256, 9);
    let blocks = cfg(128, 128, 8192, 14);

    c.bench_function("decode_buckets/cross_product", |b| {
        b.iter(|| {
            generate_decode_buckets(
                black_box(&bs),
                black_box(&blocks),
                8192,
                32768,
                128,
                false,
                false,
            )
        })
    });
}

fn bench_round_up_lookup(c: &mut Criterion) {
    let strategy = ExponentialBucketingStrategy::new(BucketingConfig {
        prefix_caching: true,
        ..Default::default()
    });
    let set: BucketSet = strategy
        .get_prompt_buckets(64, 128, 131072, 32768)
        .expect("prompt generation")
        .into_iter()
        .collect();

    c.bench_function("bucket_set/find", |b| {
        b.iter(|| set.find(black_box(7), black_box(1000), black_box(3)))
    });
}

criterion_group!(
    benches,
    bench_range_generation,
    bench_prompt_generation,
    bench_decode_generation,
    bench_round_up_lookup
);
criterion_main!(benches);
