use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lockdiff::{
    CsvDialect, Cylinder, JsonLinesSink, Key, PermissionModel, extract_matrix, read_table,
    try_diff_models, try_diff_models_streaming,
};
use std::time::Duration;

const MAX_BENCH_TIME_SECS: u64 = 30;
const WARMUP_SECS: u64 = 3;
const SAMPLE_SIZE: usize = 10;
const CYLINDER_COUNT: u32 = 200;

/// Builds a model where every key opens every `stride`-th cylinder, offset
/// by the key index so neighboring keys have different permission sets.
/// `skip` drops a single (key index, cylinder index) pair.
fn build_model(
    key_count: u32,
    cylinder_count: u32,
    stride: u32,
    skip: Option<(u32, u32)>,
) -> PermissionModel {
    let keys: Vec<Key> = (0..key_count)
        .map(|k| Key {
            last_name: Some(format!("Name{k}")),
            first_name: Some(format!("Vorname{k}")),
            ..Key::new(format!("K{k}"))
        })
        .collect();

    let cylinders: Vec<Cylinder> = (0..cylinder_count)
        .map(|c| Cylinder::new(format!("C{c}"), format!("Tür {c}")))
        .collect();

    let permissions: Vec<(String, Vec<String>)> = (0..key_count)
        .map(|k| {
            let permitted = (0..cylinder_count)
                .filter(|&c| (c + k) % stride == 0)
                .filter(|&c| skip != Some((k, c)))
                .map(|c| format!("C{c}"))
                .collect();
            (format!("K{k}"), permitted)
        })
        .collect();

    PermissionModel::new(keys, cylinders, permissions)
}

/// Renders a pivot-matrix CSV with the vendor's fixed block offsets.
fn synthetic_matrix_csv(key_count: u32, cylinder_count: u32) -> String {
    fn banner_row(key_count: u32, render: impl Fn(u32) -> String) -> String {
        let values = (0..key_count).map(render).collect::<Vec<_>>().join(";");
        format!(";;;;{values}\n")
    }

    let mut text = String::new();
    text.push_str(&banner_row(key_count, |k| format!("G{k}")));
    text.push_str(&banner_row(key_count, |k| format!("F{k}")));
    text.push_str(&banner_row(key_count, |k| format!("L{k}")));
    text.push('\n');
    text.push_str(&banner_row(key_count, |k| format!("K{k}")));

    for c in 0..cylinder_count {
        let marks = (0..key_count)
            .map(|k| if (c + k) % 3 == 0 { "X" } else { "" })
            .collect::<Vec<_>>()
            .join(";");
        text.push_str(&format!("Haus A;C{c};Tür {c};;{marks}\n"));
    }

    text
}

fn bench_identical_models(c: &mut Criterion) {
    let mut group = c.benchmark_group("identical_models");
    group.measurement_time(Duration::from_secs(MAX_BENCH_TIME_SECS));
    group.warm_up_time(Duration::from_secs(WARMUP_SECS));
    group.sample_size(SAMPLE_SIZE);

    for size in [100u32, 500, 1000, 2000].iter() {
        let source = build_model(*size, CYLINDER_COUNT, 3, None);
        let destination = build_model(*size, CYLINDER_COUNT, 3, None);

        group.throughput(Throughput::Elements(*size as u64 * CYLINDER_COUNT as u64));
        group.bench_with_input(BenchmarkId::new("keys", size), size, move |b, _| {
            b.iter(|| {
                let report =
                    try_diff_models(&source, &destination).expect("diff should succeed");
                criterion::black_box(report);
            });
        });
    }
    group.finish();
}

fn bench_single_revocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_revocation");
    group.measurement_time(Duration::from_secs(MAX_BENCH_TIME_SECS));
    group.warm_up_time(Duration::from_secs(WARMUP_SECS));
    group.sample_size(SAMPLE_SIZE);

    for size in [100u32, 500, 1000, 2000].iter() {
        let source = build_model(*size, CYLINDER_COUNT, 3, None);
        let destination = build_model(*size, CYLINDER_COUNT, 3, Some((size / 2, 0)));

        group.throughput(Throughput::Elements(*size as u64 * CYLINDER_COUNT as u64));
        group.bench_with_input(BenchmarkId::new("keys", size), size, move |b, _| {
            b.iter(|| {
                let report =
                    try_diff_models(&source, &destination).expect("diff should succeed");
                criterion::black_box(report);
            });
        });
    }
    group.finish();
}

fn bench_all_permissions_shifted(c: &mut Criterion) {
    let mut group = c.benchmark_group("all_permissions_shifted");
    group.measurement_time(Duration::from_secs(MAX_BENCH_TIME_SECS));
    group.warm_up_time(Duration::from_secs(WARMUP_SECS));
    group.sample_size(SAMPLE_SIZE);

    for size in [100u32, 500, 1000].iter() {
        let source = build_model(*size, CYLINDER_COUNT, 3, None);
        let destination = build_model(*size, CYLINDER_COUNT, 4, None);

        group.throughput(Throughput::Elements(*size as u64 * CYLINDER_COUNT as u64));
        group.bench_with_input(BenchmarkId::new("keys", size), size, move |b, _| {
            b.iter(|| {
                let report =
                    try_diff_models(&source, &destination).expect("diff should succeed");
                criterion::black_box(report);
            });
        });
    }
    group.finish();
}

fn bench_jsonl_streaming(c: &mut Criterion) {
    let mut group = c.benchmark_group("jsonl_streaming");
    group.measurement_time(Duration::from_secs(MAX_BENCH_TIME_SECS));
    group.warm_up_time(Duration::from_secs(WARMUP_SECS));
    group.sample_size(SAMPLE_SIZE);

    for size in [100u32, 500, 1000].iter() {
        let source = build_model(*size, CYLINDER_COUNT, 3, None);
        let destination = build_model(*size, CYLINDER_COUNT, 4, None);

        group.throughput(Throughput::Elements(*size as u64 * CYLINDER_COUNT as u64));
        group.bench_with_input(BenchmarkId::new("keys", size), size, move |b, _| {
            b.iter(|| {
                let mut sink = JsonLinesSink::new(Vec::new());
                let summary = try_diff_models_streaming(&source, &destination, &mut sink)
                    .expect("streaming should succeed");
                criterion::black_box((summary, sink.into_inner()));
            });
        });
    }
    group.finish();
}

fn bench_matrix_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix_extract");
    group.measurement_time(Duration::from_secs(MAX_BENCH_TIME_SECS));
    group.warm_up_time(Duration::from_secs(WARMUP_SECS));
    group.sample_size(SAMPLE_SIZE);

    for size in [50u32, 200, 500].iter() {
        let bytes = synthetic_matrix_csv(*size, CYLINDER_COUNT).into_bytes();
        let dialect = CsvDialect::default();

        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("keys", size), size, move |b, _| {
            b.iter(|| {
                let table = read_table(&bytes, &dialect).expect("CSV should parse");
                let model = extract_matrix(&table).expect("matrix should extract");
                criterion::black_box(model);
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_identical_models,
    bench_single_revocation,
    bench_all_permissions_shifted,
    bench_jsonl_streaming,
    bench_matrix_extract,
);

criterion_main!(benches);
