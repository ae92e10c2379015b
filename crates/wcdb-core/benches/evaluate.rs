//! Write-path evaluation and metadata codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wcdb_core::constraint::codec;
use wcdb_core::{
    ColumnIdentifier, ColumnMetadata, ColumnType, ConstraintConfig, ConstraintEnforcer,
    TableMetadata,
};
use wcdb_proto::Version;

fn readings_table() -> TableMetadata {
    TableMetadata::new("bench", "readings")
        .with_column(ColumnMetadata::partition_key("sensor", ColumnType::Uuid))
        .with_column(ColumnMetadata::clustering("ts", ColumnType::Timestamp))
        .with_column(ColumnMetadata::regular("value", ColumnType::Double))
        .with_column(ColumnMetadata::regular("unit", ColumnType::Text))
        .with_check("value", "value >= -273.15 AND value < 10000")
        .unwrap()
        .with_check("unit", "NOT_NULL(unit) AND LENGTH(unit) <= 8")
        .unwrap()
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("constraint/evaluate");

    let table = readings_table();
    let value = table.get_column(&ColumnIdentifier::from_cql("value")).unwrap();
    let reading = ColumnType::Double.from_string("21.5").unwrap();

    group.bench_function("scalar_range", |b| {
        b.iter(|| {
            for constraint in &value.constraints {
                constraint
                    .evaluate(&value.column_type, black_box(&reading))
                    .unwrap();
            }
        });
    });

    let unit = table.get_column(&ColumnIdentifier::from_cql("unit")).unwrap();
    group.bench_function("not_null_and_length", |b| {
        b.iter(|| {
            for constraint in &unit.constraints {
                constraint
                    .evaluate(&unit.column_type, black_box(b"celsius"))
                    .unwrap();
            }
        });
    });

    group.bench_function("violation", |b| {
        let too_hot = ColumnType::Double.from_string("1e6").unwrap();
        b.iter(|| {
            let result = value
                .constraints
                .iter()
                .try_for_each(|c| c.evaluate(&value.column_type, black_box(&too_hot)));
            black_box(result.unwrap_err());
        });
    });

    group.finish();
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("constraint/insert");

    let table = readings_table();
    let config = ConstraintConfig::default();
    let sensor = ColumnType::Uuid
        .from_string("123e4567-e89b-12d3-a456-426614174000")
        .unwrap();
    let ts = ColumnType::Timestamp.from_string("1700000000000").unwrap();
    let reading = ColumnType::Double.from_string("21.5").unwrap();
    let row = vec![
        (ColumnIdentifier::from_cql("sensor"), sensor.as_slice()),
        (ColumnIdentifier::from_cql("ts"), ts.as_slice()),
        (ColumnIdentifier::from_cql("value"), reading.as_slice()),
        (ColumnIdentifier::from_cql("unit"), b"celsius".as_slice()),
    ];

    for enforce in [true, false] {
        let config = config.clone().with_enforce_on_write(enforce);
        group.bench_with_input(BenchmarkId::new("row", enforce), &row, |b, row| {
            let enforcer = ConstraintEnforcer::new(&table, &config);
            b.iter(|| enforcer.check_insert(black_box(row)).unwrap());
        });
    }

    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("constraint/codec");

    let table = readings_table();
    let unit = table.get_column(&ColumnIdentifier::from_cql("unit")).unwrap();
    let constraints = unit.constraints.as_slice();

    group.bench_function("serialize_all", |b| {
        let mut buf = Vec::with_capacity(codec::serialized_size_all(constraints, Version::CURRENT));
        b.iter(|| {
            buf.clear();
            codec::serialize_all(black_box(constraints), &mut buf, Version::CURRENT).unwrap();
        });
    });

    group.bench_function("deserialize_all", |b| {
        let mut buf = Vec::new();
        codec::serialize_all(constraints, &mut buf, Version::CURRENT).unwrap();
        b.iter(|| {
            let mut input = black_box(buf.as_slice());
            black_box(codec::deserialize_all(&mut input, Version::CURRENT).unwrap());
        });
    });

    group.bench_function("snapshot_round_trip", |b| {
        b.iter(|| {
            let bytes = table.to_snapshot_bytes(Version::CURRENT).unwrap();
            black_box(TableMetadata::from_snapshot_bytes(&bytes).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_insert, bench_codec);
criterion_main!(benches);
