//! Criterion benchmarks for the route lookup and value parsing hot path.
//!
//! Every inbound update costs one route lookup plus one value parse, so these
//! two operations bound the per-update overhead of the bridge before any
//! render-surface work happens.
//!
//! Run with:
//! ```bash
//! cargo bench --package domlink-core --bench dispatch_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use domlink_core::{parse_update_line, RouteTable, StyleMap};

/// Channel names from the stock route table plus one miss.
const BENCH_CHANNELS: &[&str] = &[
    "laptop.active",
    "hdmi.disable",
    "computer.hidden",
    "conference.invisible",
    "lights.info",
    "lights.off.style",
    "unknown.channel",
];

// ── Benchmarks: route lookup ──────────────────────────────────────────────────

fn bench_route_lookup(c: &mut Criterion) {
    let table = RouteTable::default_routes();
    let mut group = c.benchmark_group("route_lookup");

    group.bench_function("hit_single", |b| {
        b.iter(|| table.get(black_box("lights.off.style")))
    });

    group.bench_function("batch_7_mixed", |b| {
        b.iter(|| {
            BENCH_CHANNELS
                .iter()
                .filter(|&&ch| table.get(black_box(ch)).is_some())
                .count()
        })
    });

    group.finish();
}

// ── Benchmarks: value parsing ─────────────────────────────────────────────────

fn bench_effect_for(c: &mut Criterion) {
    let table = RouteTable::default_routes();
    let mut group = c.benchmark_group("effect_for");

    let cases = [
        ("lights.info", "100%"),
        ("hdmi.disable", "1"),
        ("lights.off.style", r#"{ "color": "red", "font-weight": "bold" }"#),
    ];

    for (channel, raw) in cases {
        // Looked up once outside the timed closure; only parsing is measured.
        let Some(route) = table.get(channel) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("parse", channel), &raw, |b, &raw| {
            b.iter(|| route.effect_for(black_box(raw)))
        });
    }

    group.finish();
}

fn bench_style_parse_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("style_parse");

    for props in [1usize, 8, 32] {
        let raw = format!(
            "{{{}}}",
            (0..props)
                .map(|i| format!(r#""--prop-{i}": "value-{i}""#))
                .collect::<Vec<_>>()
                .join(",")
        );
        group.bench_with_input(BenchmarkId::from_parameter(props), &raw, |b, raw| {
            b.iter(|| StyleMap::parse(black_box(raw)))
        });
    }

    group.finish();
}

// ── Benchmarks: update line codec ─────────────────────────────────────────────

fn bench_parse_update_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_line");

    group.bench_function("key_value", |b| {
        b.iter(|| parse_update_line(black_box("lights.info=50%")))
    });

    group.bench_function("json", |b| {
        b.iter(|| {
            parse_update_line(black_box(
                r#"{"channel":"lights.off.style","value":"{\"color\":\"red\"}"}"#,
            ))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_route_lookup,
    bench_effect_for,
    bench_style_parse_sizes,
    bench_parse_update_line
);
criterion_main!(benches);
