use chained_hashtab::{Handle, IntHashTable, StrHashTable, TableConfig, Value};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn int_key(x: u64) -> u32 {
    (x >> 32) as u32
}

fn config() -> TableConfig {
    TableConfig::new(1024, 0, 4096, 16_383)
}

fn filled_int(seed: u64, n: usize) -> (IntHashTable, Vec<Handle>) {
    let mut t = IntHashTable::new("bench", config()).unwrap();
    let handles = lcg(seed)
        .take(n)
        .filter_map(|x| t.add_if_absent(int_key(x), Value::from_uint(x as usize)).ok())
        .collect();
    (t, handles)
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("int::insert_fresh_100k", |b| {
        b.iter_batched(
            || IntHashTable::new("bench", config()).unwrap(),
            |mut t| {
                for x in lcg(1).take(100_000) {
                    let _ = t.add_if_absent(int_key(x), Value::from_uint(x as usize));
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_recycled_100k(c: &mut Criterion) {
    c.bench_function("int::insert_recycled_100k", |b| {
        b.iter_batched(
            || {
                // Grow once, then hand every slot back to the freelist.
                let (mut t, handles) = filled_int(2, 110_000);
                for h in handles {
                    let _ = t.delete_entry(h);
                }
                t
            },
            |mut t| {
                for x in lcg(3).take(100_000) {
                    let _ = t.add_if_absent(int_key(x), Value::NULL);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_set_or_insert_100k(c: &mut Criterion) {
    c.bench_function("int::set_or_insert_half_present_100k", |b| {
        b.iter_batched(
            || filled_int(4, 50_000).0,
            |mut t| {
                for x in lcg(4).take(100_000) {
                    let _ = t.set_or_insert(int_key(x), Value::from_uint(1));
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_delete_random_10k(c: &mut Criterion) {
    c.bench_function("int::delete_random_10k_of_110k", |b| {
        b.iter_batched(
            || {
                let (t, handles) = filled_int(5, 110_000);
                let n = handles.len();
                let mut sel = std::collections::HashSet::with_capacity(10_000);
                let mut s = 0x9e3779b97f4a7c15u64;
                while sel.len() < 10_000 {
                    s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                    sel.insert((s as usize) % n);
                }
                let keys: Vec<u32> = sel
                    .into_iter()
                    .filter_map(|i| handles[i].key(&t).copied())
                    .collect();
                (t, keys)
            },
            |(mut t, keys)| {
                for k in keys {
                    let _ = t.delete(&k);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_find_hit_10k(c: &mut Criterion) {
    c.bench_function("int::find_hit_10k_on_100k", |b| {
        let (t, handles) = filled_int(7, 100_000);
        let n = handles.len();
        let mut s = 0x9e3779b97f4a7c15u64;
        let queries: Vec<u32> = (0..10_000)
            .filter_map(|_| {
                s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                handles[(s as usize) % n].key(&t).copied()
            })
            .collect();
        b.iter(|| {
            for k in &queries {
                black_box(t.find(k));
            }
        })
    });
}

fn bench_find_miss_10k(c: &mut Criterion) {
    c.bench_function("int::find_miss_10k_on_100k", |b| {
        let (t, _) = filled_int(11, 100_000);
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            for _ in 0..10_000 {
                let k = miss.next().map(int_key).unwrap_or_default();
                black_box(t.find(&k));
            }
        })
    });
}

fn bench_str_insert_and_find(c: &mut Criterion) {
    let words: Vec<String> = lcg(13)
        .take(50_000)
        .map(|x| format!("k{:016x}", x))
        .collect();
    c.bench_function("str::insert_fresh_50k", |b| {
        b.iter_batched(
            || StrHashTable::new("bench", config()).unwrap(),
            |mut t| {
                for w in &words {
                    let _ = t.add_if_absent(w.as_str(), Value::NULL);
                }
                black_box(t.len())
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("str::find_hit_50k", |b| {
        let mut t = StrHashTable::new("bench", config()).unwrap();
        for w in &words {
            let _ = t.add_if_absent(w.as_str(), Value::NULL);
        }
        b.iter(|| {
            for w in &words {
                black_box(t.find(w.as_str()));
            }
        })
    });
}

fn bench_iterate(c: &mut Criterion) {
    c.bench_function("int::iter_all_100k", |b| {
        let (t, _) = filled_int(999, 100_000);
        b.iter(|| {
            let mut sum = 0usize;
            for (_h, _k, v) in t.iter() {
                sum = sum.wrapping_add(v.as_uint());
            }
            black_box(sum)
        })
    });

    c.bench_function("int::cursor_drain_100k", |b| {
        b.iter_batched(
            || filled_int(1001, 100_000).0,
            |mut t| {
                let mut cursor = t.cursor();
                while let Some(h) = cursor.next(&t) {
                    let _ = t.delete_entry(h);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_fresh_100k, bench_insert_recycled_100k, bench_set_or_insert_100k
}

criterion_group! {
    name = benches_lookup;
    config = bench_config();
    targets = bench_find_hit_10k, bench_find_miss_10k, bench_str_insert_and_find
}

criterion_group! {
    name = benches_delete_iter;
    config = bench_config();
    targets = bench_delete_random_10k, bench_iterate
}

criterion_main!(benches_insert, benches_lookup, benches_delete_iter);
