use criterion::{black_box, criterion_group, Criterion};
use tabrows::sources::xlsx::date_format::{translate, DateRenderer};

const FORMATS: [&str; 4] = ["yyyy-mm-dd", "m/d/yy", "dd/mm/yyyy hh:mm", "[$-409]d-mmm-yy;@"];

fn bench_translate(c: &mut Criterion) {
    c.bench_function("date_format::translate", |b| {
        b.iter(|| FORMATS.map(|format| translate(black_box(format))))
    });
}

fn bench_render(c: &mut Criterion) {
    let mut renderer = DateRenderer::new();
    c.bench_function("DateRenderer::render [cached pattern]", move |b| {
        b.iter(|| renderer.render(black_box("2024-03-07 13:45:10"), black_box("yyyy-mm-dd hh:mm:ss")))
    });
}

criterion_group!(benches, bench_translate, bench_render);
