use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use betfair_prices::config::PivotConflict;
use betfair_prices::extract::extract;
use betfair_prices::generator::MarketGenerator;
use betfair_prices::loader::parse_records;
use betfair_prices::table::{build_long, build_wide, RunnerIndex};

fn market_text(ticks: usize) -> String {
    let mut gen = MarketGenerator::new(42, 8, MarketGenerator::now_ms());
    gen.redefine_every = 500;
    gen.orphan_rate = 0.01;
    gen.generate_lines(ticks).unwrap()
}

fn parse_and_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_and_extract");
    for ticks in [1_000, 10_000, 50_000] {
        let text = market_text(ticks);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(ticks), &text, |b, text| {
            b.iter(|| {
                let records = parse_records(text.as_bytes()).unwrap();
                extract(&records).unwrap()
            });
        });
    }
    group.finish();
}

fn build_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_tables");
    for ticks in [1_000, 10_000, 50_000] {
        let records = parse_records(market_text(ticks).as_bytes()).unwrap();
        let extracted = extract(&records).unwrap();
        let runners = RunnerIndex::dedup(&extracted.runners);
        group.throughput(Throughput::Elements(extracted.prices.len() as u64));

        group.bench_with_input(BenchmarkId::new("long", ticks), &extracted, |b, ex| {
            b.iter(|| build_long(&ex.prices, &runners).unwrap());
        });

        let long = build_long(&extracted.prices, &runners).unwrap();
        group.bench_with_input(BenchmarkId::new("wide", ticks), &long, |b, long| {
            b.iter(|| build_wide(long, PivotConflict::KeepLast).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, parse_and_extract, build_tables);
criterion_main!(benches);
