use criterion::{criterion_group, criterion_main, Criterion};
use placesearch_core::{CountryTable, Resolver};
use std::hint::black_box;

fn bench_resolve(c: &mut Criterion) {
    let table = CountryTable::embedded().expect("embedded table");

    c.bench_function("resolve exact name", |b| {
        b.iter(|| table.resolve(black_box("France")))
    });
    c.bench_function("resolve folded alias", |b| {
        b.iter(|| table.resolve(black_box("  côte D'IVOIRE ")))
    });
    c.bench_function("resolve miss", |b| {
        b.iter(|| table.resolve(black_box("Nowhereland")))
    });
    c.bench_function("parse embedded table", |b| {
        b.iter(|| CountryTable::from_json_str(black_box(include_str!("../data/countries.json"))))
    });
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
