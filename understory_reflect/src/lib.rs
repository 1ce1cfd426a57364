// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Reflect: name-addressable property containers.
//!
//! This crate lets a host object model describe its objects as bags of named,
//! typed properties. Static properties are declared once per container type;
//! dynamic properties are added to individual containers at runtime. Both are
//! read, written and persisted through the same name-based interface.
//!
//! ## Core Concepts
//!
//! ### Schema
//!
//! A [`SchemaBuilder`] defines container types (each with an optional base
//! type) and registers static [`PropertySpec`]s on them. [`SchemaBuilder::build`]
//! freezes everything into an immutable [`Schema`], which can be shared
//! between threads.
//!
//! Each type sees its own properties plus those of all its ancestors, base
//! first. Names are unique within that view.
//!
//! ### Containers
//!
//! [`Schema::instantiate`] creates a [`Container`]. Names resolve to a
//! [`PropertyRef`] or [`PropertyMut`] regardless of whether the property is
//! static or dynamic; typed [`Property`] keys returned at registration skip
//! the name lookup.
//!
//! | Operation | Static | Dynamic |
//! |-----------|--------|---------|
//! | resolve / get / set | yes | yes |
//! | lock / unlock | yes | yes |
//! | remove | [`NotDynamic`](PropertyError::NotDynamic) | unless locked |
//!
//! ### Persistence
//!
//! [`save`] turns a container into flat [`PropertyRecord`]s and [`restore`]
//! applies them back, skipping what it cannot apply. Values are encoded by a
//! [`ValueCodec`]; the [`format`] module renders records as text.
//!
//! ## Quick Start
//!
//! ```rust
//! use understory_reflect::{
//!     PropertyError, PropertyFlags, PropertySpecBuilder, SchemaBuilder, TypeTag, Value, restore,
//!     save,
//! };
//!
//! let mut builder = SchemaBuilder::new();
//! let wall = builder.define_type("Wall", None).unwrap();
//! let height = builder
//!     .register_static(
//!         wall,
//!         PropertySpecBuilder::new("Height", 3000.0_f64).group("Geometry"),
//!     )
//!     .unwrap();
//! let schema = builder.build();
//!
//! let mut w1 = schema.instantiate(wall).unwrap();
//! w1.set(height, 2750.0).unwrap();
//!
//! let mut code = w1
//!     .add_dynamic("ClassificationCode", TypeTag::String, "Properties", "", PropertyFlags::empty())
//!     .unwrap();
//! code.set(Value::from("Pr_20_31")).unwrap();
//! code.lock();
//!
//! assert_eq!(
//!     w1.remove_dynamic("ClassificationCode"),
//!     Err(PropertyError::Locked { name: "ClassificationCode".into() })
//! );
//!
//! let records = save(&w1);
//! assert_eq!(records.len(), 2);
//!
//! let mut w2 = schema.instantiate(wall).unwrap();
//! let report = restore(&mut w2, &records);
//! assert_eq!(report.unknown, ["ClassificationCode"]);
//! assert_eq!(w2.get(height), Some(&2750.0));
//! ```
//!
//! ## Memory
//!
//! | Optimization | Description |
//! |--------------|-------------|
//! | **Shared specs** | Static specs live once per type, behind `Arc` |
//! | **Sparse statics** | Containers store only non-default static values and status |
//! | **Inline storage** | `SmallVec` for small numbers of changed statics |
//! | **Lazy dynamic store** | Allocated on the first dynamic property |
//!
//! ## Features
//!
//! - `std` (default): `std::error::Error` integration for the error types.
//! - `serde`: `Serialize`/`Deserialize` for values, flags and records.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod codec;
mod container;
mod dynamic;
mod error;
mod flags;
pub mod format;
mod id;
mod object;
mod registry;
mod resolve;
mod serialize;
mod spec;
mod store;
mod value;

pub use codec::{IdentityCodec, TextCodec, ValueCodec};
pub use container::{ChangeKind, ChangeObserver, Container, PropertyChange};
pub use dynamic::{DynamicProperty, DynamicPropertyStore};
pub use error::{DecodeError, FormatError, FormatErrorKind, PropertyError};
pub use flags::PropertyFlags;
pub use id::{ContainerTypeId, Property, PropertyId};
pub use object::{HasProperties, HasPropertiesExt};
pub use registry::{ContainerType, Schema, SchemaBuilder};
pub use resolve::{PropertyMut, PropertyRef};
pub use serialize::{
    DynamicDecl, PropertyRecord, RestoreMode, RestoreReport, restore, restore_with, save,
    save_with,
};
pub use spec::{PropertySpec, PropertySpecBuilder, RESERVED_PREFIX};
pub use value::{PropertyValue, TypeTag, Value};
