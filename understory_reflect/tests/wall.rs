// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end tests for `understory_reflect`.
//!
//! These walk a small building model through registration, dynamic
//! properties, locking and save/restore.

use understory_reflect::{
    ContainerTypeId, Property, PropertyError, PropertyFlags, PropertySpecBuilder, RestoreMode,
    Schema, SchemaBuilder, TextCodec, TypeTag, Value, format, restore, restore_with, save,
};

struct Model {
    schema: Schema,
    wall: ContainerTypeId,
    height: Property<f64>,
    material: Property<String>,
}

fn model() -> Model {
    let mut builder = SchemaBuilder::new();
    let wall = builder.define_type("Wall", None).unwrap();
    let height = builder
        .register_static(
            wall,
            PropertySpecBuilder::new("Height", 3000.0_f64).group("Geometry"),
        )
        .unwrap();
    let material = builder
        .register_static(
            wall,
            PropertySpecBuilder::new("Material", String::from("Concrete")).group("Properties"),
        )
        .unwrap();
    Model {
        schema: builder.build(),
        wall,
        height,
        material,
    }
}

#[test]
fn wall_scenario() {
    let m = model();
    let spec = m.schema.lookup(m.wall, "Height").unwrap();
    assert_eq!(spec.group(), "Geometry");
    assert_eq!(m.schema.lookup(m.wall, "Material").unwrap().group(), "Properties");

    let mut w1 = m.schema.instantiate(m.wall).unwrap();
    w1.add_dynamic(
        "ClassificationCode",
        TypeTag::String,
        "Properties",
        "Classification reference",
        PropertyFlags::empty(),
    )
    .unwrap();
    assert!(w1.resolve("ClassificationCode").unwrap().is_dynamic());

    w1.resolve_mut("ClassificationCode").unwrap().lock();
    assert_eq!(
        w1.remove_dynamic("ClassificationCode"),
        Err(PropertyError::Locked {
            name: "ClassificationCode".into()
        })
    );
    assert!(w1.resolve("ClassificationCode").is_some());

    w1.resolve_mut("ClassificationCode").unwrap().unlock();
    w1.remove_dynamic("ClassificationCode").unwrap();
    assert!(w1.resolve("ClassificationCode").is_none());

    let names: Vec<_> = save(&w1).into_iter().map(|record| record.name).collect();
    assert_eq!(names, ["Height", "Material"]);
}

#[test]
fn lookup_is_stable() {
    let m = model();
    let first = m.schema.lookup(m.wall, "Height").unwrap();
    let second = m.schema.lookup(m.wall, "Height").unwrap();
    assert!(core::ptr::eq(first, second));
    assert_eq!(first.static_id(), Some(m.height.id()));
}

#[test]
fn save_then_restore_reproduces_values() {
    let m = model();
    let mut w1 = m.schema.instantiate(m.wall).unwrap();
    w1.set(m.height, 2750.5).unwrap();
    w1.set(m.material, String::from("Brick \"Red\"\nrow 2")).unwrap();
    w1.add_dynamic("Tags", TypeTag::StringList, "", "", PropertyFlags::empty())
        .unwrap()
        .set(Value::StringList(vec!["a;b".into(), "c\\d".into()]))
        .unwrap();
    w1.add_dynamic("Axis", TypeTag::Vector, "", "", PropertyFlags::empty())
        .unwrap()
        .set(Value::Vector([0.0, -1.0, 0.5]))
        .unwrap();
    w1.add_dynamic("Scratch", TypeTag::Integer, "", "", PropertyFlags::TRANSIENT)
        .unwrap()
        .set(Value::Integer(9))
        .unwrap();

    // Through the text format and back.
    let text = format::records_to_string(&save(&w1));
    let records = format::read_records(&text).unwrap();

    let mut w2 = m.schema.instantiate(m.wall).unwrap();
    let report = restore_with(&mut w2, &records, &TextCodec, RestoreMode::RecreateDynamic);
    assert!(report.is_complete(), "{report:?}");

    for property in w1.properties() {
        if property.status().contains(PropertyFlags::TRANSIENT) {
            assert!(w2.resolve(property.name()).is_none());
            continue;
        }
        let restored = w2.resolve(property.name()).unwrap();
        assert_eq!(restored.value(), property.value(), "{}", property.name());
        assert_eq!(restored.is_dynamic(), property.is_dynamic());
    }
    assert!(!w2.is_modified());
}

#[test]
fn unknown_records_do_not_fail_restore() {
    let m = model();
    let text = "properties 3\n\
        Height Float \"2600\"\n\
        Thickness Float \"200\"\n\
        Material String \"Timber\"\n\
        end\n";
    let records = format::read_records(text).unwrap();

    let mut w1 = m.schema.instantiate(m.wall).unwrap();
    let report = restore(&mut w1, &records);
    assert_eq!(report.applied, 2);
    assert_eq!(report.unknown, ["Thickness"]);
    assert!(report.rejected.is_empty());
    assert_eq!(w1.get(m.height), Some(&2600.0));
    assert_eq!(w1.get(m.material).map(String::as_str), Some("Timber"));
}

#[test]
fn inherited_properties_come_first() {
    let mut builder = SchemaBuilder::new();
    let object = builder.define_type("DocumentObject", None).unwrap();
    builder
        .register_static(object, PropertySpecBuilder::new("Label", String::new()))
        .unwrap();
    let wall = builder.define_type("Wall", Some(object)).unwrap();
    builder
        .register_static(wall, PropertySpecBuilder::new("Height", 3000.0_f64))
        .unwrap();
    assert_eq!(
        builder
            .register_static(wall, PropertySpecBuilder::new("Label", 0_i64))
            .err(),
        Some(PropertyError::StaticConflict {
            type_name: "Wall".into(),
            name: "Label".into(),
        })
    );
    let schema = builder.build();

    let names: Vec<_> = schema.all_specs_for(wall).map(|spec| spec.name()).collect();
    assert_eq!(names, ["Label", "Height"]);

    let mut w1 = schema.instantiate(wall).unwrap();
    assert_eq!(
        w1.add_dynamic("Label", TypeTag::String, "", "", PropertyFlags::empty())
            .err(),
        Some(PropertyError::DuplicateName {
            name: "Label".into()
        })
    );
}

#[test]
fn schema_is_shareable_across_threads() {
    let m = model();
    let schema = std::sync::Arc::new(m.schema);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let schema = std::sync::Arc::clone(&schema);
            let (wall, height) = (m.wall, m.height);
            std::thread::spawn(move || {
                let mut container = schema.instantiate(wall).unwrap();
                container.set(height, f64::from(i)).unwrap();
                *container.get(height).unwrap()
            })
        })
        .collect();
    let results: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, [0.0, 1.0, 2.0, 3.0]);
}
