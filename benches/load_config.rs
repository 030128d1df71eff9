//! Benchmark: full config-file load (scan + parse + model population) over an
//! in-memory copy of the generated default file.

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dppconf::{defaults, load, ParamSet};

fn default_text() -> String {
    let mut buf = Vec::new();
    defaults::render(&mut buf, &ParamSet::default()).expect("render defaults");
    String::from_utf8(buf).expect("utf8")
}

fn bench_load_config(c: &mut Criterion) {
    let text = default_text();
    eprintln!(
        "load_config: {} bytes, {} lines",
        text.len(),
        text.lines().count()
    );

    c.bench_function("load_default_config", |b| {
        b.iter(|| {
            let r = load::load_from_reader(Cursor::new(black_box(text.as_str())), "bench");
            black_box(r.expect("load"))
        });
    });
}

criterion_group!(benches, bench_load_config);
criterion_main!(benches);
