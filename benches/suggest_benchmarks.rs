//! Benchmarks for grammar construction and suggestion queries
//!
//! These benchmarks measure:
//! - Pattern insertion into a scope
//! - Suggestions for word prefixes
//! - Suggestions that match through nested lookups
//! - Lookahead resolution of placeholders

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use phrase_trie::Dictionary;

/// Distinct pseudo-words of at least two letters
fn words(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let mut word = String::new();
            let mut n = i + 26;
            while n > 0 {
                word.insert(0, char::from(b'a' + (n % 26) as u8));
                n /= 26;
            }
            word
        })
        .collect()
}

fn patterns(count: usize) -> Vec<String> {
    let vocabulary = words(64);
    (0..count)
        .map(|i| {
            format!(
                "{} {} {}",
                vocabulary[i % 64],
                vocabulary[(i / 64) % 64],
                vocabulary[(i * 7) % 64]
            )
        })
        .collect()
}

/// A device-control grammar with two levels of lookups
fn nested_dictionary(devices: usize) -> Dictionary {
    let mut dictionary = Dictionary::new();
    dictionary
        .define("colors", ["red", "green", "blue", "warm white"])
        .unwrap();
    dictionary
        .define(
            "devices",
            words(devices)
                .into_iter()
                .map(|w| format!("{} light", w))
                .chain(["<color:colors> lamp".to_string()]),
        )
        .unwrap();
    dictionary
        .define(
            "main",
            [
                "turn on <device:devices>",
                "turn off <device:devices>",
                "dim <device:devices> please",
            ],
        )
        .unwrap();
    dictionary
}

/// Benchmark pattern insertion
fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for size in [100, 1_000, 10_000].iter() {
        let patterns = patterns(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &patterns, |b, patterns| {
            b.iter(|| {
                let mut dictionary = Dictionary::new();
                dictionary.define("main", black_box(patterns)).unwrap();
                black_box(dictionary.node_count());
            });
        });
    }

    group.finish();
}

/// Benchmark prefix suggestions on a flat scope
fn bench_suggest_prefix(c: &mut Criterion) {
    let mut group = c.benchmark_group("suggest_prefix");

    for size in [100, 1_000, 10_000].iter() {
        let mut dictionary = Dictionary::new();
        dictionary.define("main", patterns(*size)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &dictionary, |b, dictionary| {
            let main = dictionary.scope("main").unwrap();
            b.iter(|| {
                let suggestions = main.suggest(black_box("b"), 0);
                black_box(suggestions);
            });
        });
    }

    group.finish();
}

/// Benchmark suggestions that match through lookups
fn bench_suggest_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("suggest_nested");

    for devices in [10, 100, 1_000].iter() {
        let dictionary = nested_dictionary(*devices);

        group.bench_with_input(BenchmarkId::new("partial", devices), &dictionary, |b, dictionary| {
            let main = dictionary.scope("main").unwrap();
            b.iter(|| {
                let suggestions = main.suggest(black_box("turn on warm"), 0);
                black_box(suggestions);
            });
        });
    }

    group.finish();
}

/// Benchmark placeholder resolution
fn bench_lookahead(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookahead");
    let dictionary = nested_dictionary(100);
    let main = dictionary.scope("main").unwrap();

    for lookahead in [0, 1, 2, 3].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(lookahead),
            lookahead,
            |b, &lookahead| {
                b.iter(|| {
                    let suggestions = main.suggest(black_box("turn on"), lookahead);
                    black_box(suggestions);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_suggest_prefix,
    bench_suggest_nested,
    bench_lookahead
);

criterion_main!(benches);
