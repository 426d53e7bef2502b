use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use incr_hashmap::{IncrHashMap, MapConfig};

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_insert(c: &mut Criterion) {
    // Starting from capacity 4, 10k inserts cross several incremental
    // resizes; the amortized migration cost is part of what is measured.
    c.bench_function("incr_hashmap_insert_10k", |b| {
        b.iter_batched(
            IncrHashMap::<String, u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.insert(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("incr_hashmap_get_hit", |b| {
        let mut m = IncrHashMap::new();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().cloned().enumerate() {
            m.insert(k, i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            let v = m.get(k.as_str()).unwrap();
            black_box(v);
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("incr_hashmap_get_miss", |b| {
        let mut m = IncrHashMap::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            m.insert(key(x), i as u64);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            let k = key(miss.next().unwrap());
            black_box(m.get(k.as_str()));
        })
    });
}

fn bench_get_mid_resize(c: &mut Criterion) {
    // Reads while a large resize drains: each get pays the bounded
    // migration slice on top of the probe.
    let cfg = MapConfig {
        initial_capacity: 16_384,
        growth_factor: 2,
        work_budget: 128,
    };
    c.bench_function("incr_hashmap_get_mid_resize", |b| {
        b.iter_batched(
            || {
                let mut m = IncrHashMap::with_config(cfg).unwrap();
                let keys: Vec<_> = lcg(13).take(16_384).map(key).collect();
                for (i, k) in keys.iter().cloned().enumerate() {
                    m.insert(k, i as u64);
                }
                assert!(m.is_resizing());
                (m, keys)
            },
            |(mut m, keys)| {
                for k in keys.iter().take(64) {
                    black_box(m.get(k.as_str()));
                }
                black_box(m)
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_insert,
    bench_get_hit,
    bench_get_miss,
    bench_get_mid_resize
);
criterion_main!(benches);
