use crate::util::generate_csv;
use crate::{ParseResult, SCENARIOS};
use criterion::{black_box, criterion_group, BenchmarkId, Criterion};
use tabrows::source::RowSource;
use tabrows::sources::csv::CsvSource;

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("CsvSource::rows");
    for num_elements in SCENARIOS {
        let buffer = generate_csv(num_elements);
        group.throughput(criterion::Throughput::Elements(num_elements));
        group.bench_with_input(
            BenchmarkId::new("sniffed", num_elements), &buffer,
            |b, buffer| b.iter(|| {
                CsvSource::new(black_box(buffer.as_slice()))
                    .rows()
                    .expect("Benchmark: unable to create csv reader")
                    .collect::<ParseResult>()
            }),
        );
        group.bench_with_input(
            BenchmarkId::new("configured", num_elements), &buffer,
            |b, buffer| b.iter(|| {
                CsvSource::new(black_box(buffer.as_slice()))
                    .with_delimiter(";")
                    .rows()
                    .expect("Benchmark: unable to create csv reader")
                    .collect::<ParseResult>()
            }),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_parsing);
