use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_injector::*;

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let mut descriptors = DescriptorCollection::new();
    descriptors.add_singleton("answer", Vec::<String>::new(), |_| Ok(42u64));
    let injector = descriptors.build().create_injector();

    // Prime the cache and the resolver memo
    let _ = injector.get_required::<u64>("answer").unwrap();

    c.bench_function("singleton_hit_u64", |b| {
        b.iter(|| {
            let v = injector.get_required::<u64>(black_box("answer")).unwrap();
            black_box(v);
        })
    });
}

fn bench_singleton_cold(c: &mut Criterion) {
    struct ExpensiveToCreate {
        data: Vec<u64>,
    }

    c.bench_function("singleton_cold_expensive", |b| {
        b.iter_batched(
            || {
                let mut descriptors = DescriptorCollection::new();
                descriptors.add_singleton("expensive", Vec::<String>::new(), |_| {
                    Ok(ExpensiveToCreate {
                        data: (0..1000).collect(),
                    })
                });
                descriptors.build().create_injector()
            },
            |injector| {
                let v = injector.get_required::<ExpensiveToCreate>("expensive").unwrap();
                black_box(v.data.len());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_lifetimes(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifetime");

    for lifetime in [
        Lifetime::Transient,
        Lifetime::Singleton,
        Lifetime::State,
        Lifetime::Root,
        Lifetime::Parent,
    ] {
        let mut descriptors = DescriptorCollection::new();
        descriptors.add_with_lifetime("service", lifetime.clone(), Vec::<String>::new(), |_| {
            Ok([0u8; 64])
        });
        let injector = descriptors.build().create_injector();

        group.bench_function(lifetime.as_str(), |b| {
            b.iter(|| {
                let v = injector.resolve(black_box("service")).unwrap();
                black_box(v);
            })
        });
    }

    group.finish();
}

// ===== Macro Benchmarks =====

fn bench_transient_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("transient_chain");

    for depth in [1usize, 8, 32, 128] {
        let mut descriptors = DescriptorCollection::new();
        for i in 0..depth {
            let deps = if i + 1 < depth { vec![format!("n{}", i + 1)] } else { Vec::new() };
            descriptors.add_transient(format!("n{}", i), deps, move |_| Ok(i));
        }
        let injector = descriptors.build().create_injector();

        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| black_box(injector.resolve("n0").unwrap()))
        });
    }

    group.finish();
}

fn bench_parent_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("parent_tree");

    for width in [2usize, 8, 32] {
        let mut descriptors = DescriptorCollection::new();
        descriptors.add_parent("tx", Vec::<String>::new(), |_| Ok(0u64));
        let mut repos = vec!["tx".to_string()];
        for i in 0..width {
            let name = format!("repo{}", i);
            descriptors.add_transient(name.clone(), ["tx"], |_| Ok(()));
            repos.push(name);
        }
        descriptors.add_transient("work", repos, |deps| Ok(deps.len()));
        let injector = descriptors.build().create_injector();

        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            b.iter(|| black_box(injector.get_required::<usize>("work").unwrap()))
        });
    }

    group.finish();
}

fn bench_large_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_registry");

    for count in [10usize, 100, 1000] {
        let mut descriptors = DescriptorCollection::new();
        for i in 0..count {
            descriptors.add_singleton(format!("service{}", i), Vec::<String>::new(), move |_| Ok(i));
        }
        let injector = descriptors.build().create_injector();
        let target = format!("service{}", count / 2);
        let _ = injector.resolve(&target).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(injector.resolve(&target).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    micro_benches,
    bench_singleton_hit,
    bench_singleton_cold,
    bench_lifetimes
);

criterion_group!(
    macro_benches,
    bench_transient_chain,
    bench_parent_tree,
    bench_large_registry
);

criterion_main!(micro_benches, macro_benches);
