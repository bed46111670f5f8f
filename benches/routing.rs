//! Decision-layer benchmarks
//!
//! Detection, classification and routing are pure and run on every chat
//! turn; they should stay well under a millisecond.
//!
//! Run with: `cargo bench`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tolkroute::cli::generate_config_template;
use tolkroute::config::Config;
use tolkroute::pipeline::{DecisionEngine, TableKind};

const MESSAGES: &[(&str, &str)] = &[
    ("english_short", "hello how are you"),
    ("zulu_legal", "Sawubona, ngicela usizo ngomthetho wami"),
    ("venda_distinctive", "Ndaa, ndi khou humbela thuso zwavhuḓi"),
    (
        "english_document",
        "Please draft a detailed business plan for my spaza shop in Soweto, \
         covering marketing, cash flow and a three year revenue forecast.",
    ),
];

fn engine() -> DecisionEngine {
    DecisionEngine::new(&Config::default()).expect("engine should build")
}

fn bench_detection(c: &mut Criterion) {
    let engine = engine();
    let mut group = c.benchmark_group("detect");
    for (name, text) in MESSAGES {
        group.bench_with_input(BenchmarkId::from_parameter(name), text, |b, t| {
            b.iter(|| engine.detect(black_box(t)));
        });
    }
    group.finish();
}

fn bench_classification(c: &mut Criterion) {
    let engine = engine();
    let mut group = c.benchmark_group("classify_chat");
    for (name, text) in MESSAGES {
        group.bench_with_input(BenchmarkId::from_parameter(name), text, |b, t| {
            b.iter(|| engine.classify(black_box(t), TableKind::Chat));
        });
    }
    group.finish();
}

fn bench_route(c: &mut Criterion) {
    let engine = engine();
    let mut group = c.benchmark_group("route");
    for (name, text) in MESSAGES {
        group.bench_with_input(BenchmarkId::from_parameter(name), text, |b, t| {
            b.iter(|| engine.route(Some("pro"), black_box(t)));
        });
    }
    group.finish();
}

/// Startup cost: template parse, validation and table compilation
fn bench_engine_startup(c: &mut Criterion) {
    let template = generate_config_template();
    c.bench_function("engine_startup", |b| {
        b.iter(|| {
            let config: Config = template.parse().unwrap();
            DecisionEngine::new(&config).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_detection,
    bench_classification,
    bench_route,
    bench_engine_startup,
);
criterion_main!(benches);
