// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Saving and restoring container state as flat records.
//!
//! [`save`] emits one [`PropertyRecord`] per property: static properties in
//! declaration order, then dynamic ones in insertion order. Properties whose
//! status has [`PropertyFlags::TRANSIENT`] are skipped. Dynamic records carry a
//! [`DynamicDecl`] so a loader can recreate them.
//!
//! [`restore`] applies records by name and never aborts: records naming
//! unknown properties and records that do not decode into the property's type
//! are skipped and listed in the [`RestoreReport`]. Restoring is loading, not
//! editing, so it does not touch the container's change tracking.
//!
//! ```rust
//! use understory_reflect::{PropertySpecBuilder, SchemaBuilder, restore, save};
//!
//! let mut builder = SchemaBuilder::new();
//! let wall = builder.define_type("Wall", None).unwrap();
//! let height = builder
//!     .register_static(wall, PropertySpecBuilder::new("Height", 3000.0_f64))
//!     .unwrap();
//! let schema = builder.build();
//!
//! let mut w1 = schema.instantiate(wall).unwrap();
//! w1.set(height, 2750.0).unwrap();
//! let records = save(&w1);
//! assert_eq!(records[0].value, "2750");
//!
//! let mut w2 = schema.instantiate(wall).unwrap();
//! let report = restore(&mut w2, &records);
//! assert!(report.is_complete());
//! assert_eq!(w2.get(height), Some(&2750.0));
//! assert!(!w2.is_modified());
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use crate::codec::{TextCodec, ValueCodec};
use crate::container::{Container, Slot};
use crate::error::PropertyError;
use crate::flags::PropertyFlags;
use crate::spec::PropertySpec;
use crate::value::{TypeTag, Value};

/// One saved property.
///
/// `E` is the codec's encoded value type; the default `String` matches
/// [`TextCodec`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyRecord<E = String> {
    /// Property name.
    pub name: String,
    /// Declared value type at save time.
    pub type_tag: TypeTag,
    /// Encoded value.
    pub value: E,
    /// Present for dynamic properties.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub dynamic: Option<DynamicDecl>,
}

/// What is needed to recreate a dynamic property on load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicDecl {
    /// Editor group.
    pub group: String,
    /// Documentation string.
    pub documentation: String,
    /// Status flags at save time.
    pub flags: PropertyFlags,
}

/// How [`restore_with`] treats records that name no existing property.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RestoreMode {
    /// Skip them and list them in [`RestoreReport::unknown`].
    #[default]
    IgnoreUnknown,
    /// Re-add records carrying a [`DynamicDecl`] as dynamic properties; skip
    /// the rest as in [`IgnoreUnknown`](Self::IgnoreUnknown).
    RecreateDynamic,
}

/// Outcome of a restore.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Number of records whose value was applied.
    pub applied: usize,
    /// Names of records that matched no property.
    pub unknown: Vec<String>,
    /// Records that matched a property but could not be applied.
    ///
    /// Values that do not decode into the property's type are reported as
    /// [`PropertyError::TypeMismatch`] with the record's type tag as `found`.
    pub rejected: Vec<PropertyError>,
}

impl RestoreReport {
    /// Returns `true` if every record was applied.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unknown.is_empty() && self.rejected.is_empty()
    }
}

/// Saves a container with [`TextCodec`].
#[must_use]
pub fn save(container: &Container) -> Vec<PropertyRecord> {
    save_with(container, &TextCodec)
}

/// Saves a container, encoding values with `codec`.
#[must_use]
pub fn save_with<C: ValueCodec>(container: &Container, codec: &C) -> Vec<PropertyRecord<C::Encoded>> {
    container
        .properties()
        .filter(|property| !property.status().contains(PropertyFlags::TRANSIENT))
        .map(|property| {
            let spec = property.spec();
            PropertyRecord {
                name: spec.name().into(),
                type_tag: spec.value_type(),
                value: codec.encode(property.value()),
                dynamic: property.is_dynamic().then(|| DynamicDecl {
                    group: spec.group().into(),
                    documentation: spec.documentation().into(),
                    flags: property.status(),
                }),
            }
        })
        .collect()
}

/// Restores a container from [`TextCodec`] records, ignoring unknown names.
pub fn restore(container: &mut Container, records: &[PropertyRecord]) -> RestoreReport {
    restore_with(container, records, &TextCodec, RestoreMode::default())
}

/// Restores a container from records encoded with `codec`.
pub fn restore_with<C: ValueCodec>(
    container: &mut Container,
    records: &[PropertyRecord<C::Encoded>],
    codec: &C,
    mode: RestoreMode,
) -> RestoreReport {
    let mut report = RestoreReport::default();
    for record in records {
        let applied = match container.locate(&record.name) {
            Some(slot) => apply(container, slot, record, codec),
            None => match (&record.dynamic, mode) {
                (Some(decl), RestoreMode::RecreateDynamic) => {
                    recreate(container, record, decl, codec)
                }
                _ => {
                    tracing::debug!(
                        type_name = container.container_type().name(),
                        property = %record.name,
                        "skipping record for unknown property"
                    );
                    report.unknown.push(record.name.clone());
                    continue;
                }
            },
        };
        match applied {
            Ok(()) => report.applied += 1,
            Err(err) => {
                tracing::warn!(
                    type_name = container.container_type().name(),
                    property = %record.name,
                    %err,
                    "skipping record"
                );
                report.rejected.push(err);
            }
        }
    }
    report
}

fn decode<C: ValueCodec>(
    codec: &C,
    expected: TypeTag,
    record: &PropertyRecord<C::Encoded>,
) -> Result<Value, PropertyError> {
    codec
        .decode(expected, &record.value)
        .map_err(|_| PropertyError::TypeMismatch {
            name: record.name.clone(),
            expected,
            found: record.type_tag,
        })
}

fn apply<C: ValueCodec>(
    container: &mut Container,
    slot: Slot,
    record: &PropertyRecord<C::Encoded>,
    codec: &C,
) -> Result<(), PropertyError> {
    let expected = container.spec_at(slot).value_type();
    let value = decode(codec, expected, record)?;
    container.replace_untracked(slot, value).map(drop)
}

fn recreate<C: ValueCodec>(
    container: &mut Container,
    record: &PropertyRecord<C::Encoded>,
    decl: &DynamicDecl,
    codec: &C,
) -> Result<(), PropertyError> {
    // Decode first so a bad value does not leave a half-restored property.
    let value = decode(codec, record.type_tag, record)?;
    let slot = container.insert_dynamic(PropertySpec::dynamic(
        record.name.clone(),
        record.type_tag,
        decl.group.clone(),
        decl.documentation.clone(),
        decl.flags,
    ))?;
    container.replace_untracked(slot, value).map(drop)
}
