//! Benchmarks for the resolution engine

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use wirebox::{Container, DescriptorRegistry, TypeDescriptor};

struct Config {
    url: String,
}

struct Repository {
    config: Arc<Config>,
}

struct Service {
    repository: Arc<Repository>,
}

fn metadata() -> Arc<DescriptorRegistry> {
    let registry = DescriptorRegistry::new();
    registry.register(
        TypeDescriptor::concrete::<Config>()
            .injectable()
            .singleton()
            .constructor(|_| {
                Ok(Config {
                    url: "postgres://localhost".into(),
                })
            }),
    );
    registry.register(
        TypeDescriptor::concrete::<Repository>()
            .injectable()
            .param::<Config>()
            .constructor(|args| {
                Ok(Repository {
                    config: args.take()?,
                })
            }),
    );
    registry.register(
        TypeDescriptor::concrete::<Service>()
            .injectable()
            .param::<Repository>()
            .constructor(|args| {
                Ok(Service {
                    repository: args.take()?,
                })
            }),
    );
    Arc::new(registry)
}

fn bench_provide(c: &mut Criterion) {
    let mut group = c.benchmark_group("provide");

    group.bench_function("concrete", |b| {
        b.iter(|| {
            let container = Container::new(Arc::new(DescriptorRegistry::new()));
            container
                .provide(Config {
                    url: "postgres://localhost".into(),
                })
                .unwrap();
            black_box(container)
        })
    });

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    group.bench_function("singleton_fast_path", |b| {
        let container = Container::new(metadata());
        let _ = container.resolve::<Config>().unwrap();
        b.iter(|| black_box(container.resolve::<Config>().unwrap()))
    });

    group.bench_function("transient_chain", |b| {
        let container = Container::new(metadata());
        let _ = container.resolve::<Config>().unwrap();
        b.iter(|| black_box(container.resolve::<Service>().unwrap()))
    });

    group.bench_function("qualified_provided_value", |b| {
        let container = Container::new(metadata());
        container
            .provide_named("hello".to_string(), "greeting")
            .unwrap();
        b.iter(|| black_box(container.resolve_named::<String>("greeting").unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_provide, bench_resolve);
criterion_main!(benches);
