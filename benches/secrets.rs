use criterion::{black_box, criterion_group, criterion_main, Criterion};
use secretsmanager::crypto::Argon2Generator;
use secretsmanager::secrets::SecretStore;
use secretsmanager::store::{CachedStore, MemoryStore};
use std::sync::Arc;

fn secrets_over_memory() -> SecretStore {
    let generator = Argon2Generator::new()
        .with_params(256, 1, 1)
        .expect("valid argon2 params");

    SecretStore::builder("bench")
        .with_store(Arc::new(MemoryStore::new()))
        .with_generator(Arc::new(generator))
        .build()
        .expect("valid policy")
}

fn key_benchmark(c: &mut Criterion) {
    let secrets = secrets_over_memory();

    c.bench_function("key", |b| b.iter(|| secrets.key(black_box("user42"))));
}

fn store_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");

    let secrets = secrets_over_memory();
    group.bench_function("memory_set_get", |b| {
        b.iter(|| {
            secrets.set(black_box("user42"), "hash");
            secrets.get(black_box("user42"))
        })
    });

    let cached = SecretStore::builder("bench")
        .with_store(Arc::new(CachedStore::with_default_capacity(MemoryStore::new())))
        .without_generator()
        .build()
        .expect("valid policy");
    group.bench_function("cached_set_get", |b| {
        b.iter(|| {
            cached.set(black_box("user42"), "hash");
            cached.get(black_box("user42"))
        })
    });

    group.finish();
}

fn init_benchmark(c: &mut Criterion) {
    let secrets = secrets_over_memory();

    c.bench_function("init_low_cost_argon2", |b| b.iter(|| secrets.init(black_box("user42"))));
}

criterion_group!(benches, key_benchmark, store_benchmark, init_benchmark);
criterion_main!(benches);
