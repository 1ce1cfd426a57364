// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `understory_reflect`.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::sync::Once;
use std::string::String;

use understory_reflect::{
    Container, ContainerTypeId, Property, PropertyFlags, PropertySpecBuilder, Schema,
    SchemaBuilder, TypeTag, Value, format as text, restore, save,
};

struct Model {
    schema: Schema,
    leaf: ContainerTypeId,
    first: Property<f64>,
    last: Property<f64>,
}

/// A chain of `depth` types with `per_type` float properties each.
fn model(depth: u16, per_type: u16) -> Model {
    let mut builder = SchemaBuilder::new();
    let mut base = None;
    let mut first = None;
    let mut last = None;
    for level in 0..depth {
        let ty = builder.define_type(format!("Level{level}"), base).unwrap();
        for idx in 0..per_type {
            let key = builder
                .register_static(
                    ty,
                    PropertySpecBuilder::new(format!("P{level}_{idx}"), 0.0_f64),
                )
                .unwrap();
            first.get_or_insert(key);
            last = Some(key);
        }
        base = Some(ty);
    }
    Model {
        schema: builder.build(),
        leaf: base.unwrap(),
        first: first.unwrap(),
        last: last.unwrap(),
    }
}

fn with_dynamic(container: &mut Container, count: usize) {
    for idx in 0..count {
        container
            .add_dynamic(
                &format!("D{idx}"),
                TypeTag::Integer,
                "",
                "",
                PropertyFlags::empty(),
            )
            .unwrap();
    }
}

fn bench_property(c: &mut Criterion) {
    static PRINT_SIZES: Once = Once::new();
    PRINT_SIZES.call_once(|| {
        eprintln!(
            "sizes: Container={} Value={} PropertyId={}",
            size_of::<Container>(),
            size_of::<Value>(),
            size_of::<understory_reflect::PropertyId>(),
        );
    });

    let m = model(4, 16);
    let mut container = m.schema.instantiate(m.leaf).unwrap();
    with_dynamic(&mut container, 16);
    container.set(m.last, 1.0).unwrap();

    let mut group = c.benchmark_group("property/resolve");

    group.bench_function("typed/first", |b| {
        b.iter(|| black_box(container.get(black_box(m.first))))
    });

    group.bench_function("typed/last", |b| {
        b.iter(|| black_box(container.get(black_box(m.last))))
    });

    group.bench_function("name/static", |b| {
        b.iter(|| black_box(container.value(black_box("P3_15"))))
    });

    group.bench_function("name/dynamic", |b| {
        b.iter(|| black_box(container.value(black_box("D15"))))
    });

    group.bench_function("name/missing", |b| {
        b.iter(|| black_box(container.resolve(black_box("Nope")).is_none()))
    });

    group.finish();

    let mut group = c.benchmark_group("property/mutate");

    group.bench_function("set/typed", |b| {
        b.iter_batched(
            || m.schema.instantiate(m.leaf).unwrap(),
            |mut container| {
                container.set(m.last, 123.0).unwrap();
                black_box(container);
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("set/name", |b| {
        b.iter_batched(
            || m.schema.instantiate(m.leaf).unwrap(),
            |mut container| {
                container.set_value("P3_15", Value::Float(123.0)).unwrap();
                black_box(container);
            },
            BatchSize::SmallInput,
        )
    });

    for count in [1_usize, 16, 64] {
        group.bench_function(BenchmarkId::new("add_remove_dynamic", count), |b| {
            b.iter_batched(
                || m.schema.instantiate(m.leaf).unwrap(),
                |mut container| {
                    with_dynamic(&mut container, count);
                    for idx in 0..count {
                        container.remove_dynamic(&format!("D{idx}")).unwrap();
                    }
                    black_box(container);
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();

    let mut group = c.benchmark_group("property/serialize");

    group.bench_function("save", |b| b.iter(|| black_box(save(&container))));

    let records = save(&container);
    group.bench_function("restore", |b| {
        b.iter_batched(
            || m.schema.instantiate(m.leaf).unwrap(),
            |mut fresh| {
                let report = restore(&mut fresh, &records);
                black_box((fresh, report));
            },
            BatchSize::SmallInput,
        )
    });

    let rendered: String = text::records_to_string(&records);
    group.bench_function("text/write", |b| {
        b.iter(|| black_box(text::records_to_string(&records)))
    });
    group.bench_function("text/read", |b| {
        b.iter(|| black_box(text::read_records(&rendered).unwrap()))
    });

    group.bench_function("iterate_names", |b| {
        b.iter(|| black_box(container.property_names().count()))
    });

    group.finish();
}

criterion_group!(benches, bench_property);
criterion_main!(benches);
