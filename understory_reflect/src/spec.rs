// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property specifications.
//!
//! This module provides [`PropertySpec`], the immutable description of one
//! property, and [`PropertySpecBuilder`] for declaring static properties.

use alloc::string::String;
use core::marker::PhantomData;

use crate::error::PropertyError;
use crate::flags::PropertyFlags;
use crate::id::PropertyId;
use crate::value::{PropertyValue, TypeTag, Value};

/// Names starting with this prefix are reserved for the host application.
pub const RESERVED_PREFIX: &str = "__";

/// Immutable description of a property.
///
/// Static specs are created by
/// [`SchemaBuilder::register_static`](crate::SchemaBuilder::register_static)
/// and shared by every container of the declaring type and its subtypes.
/// Dynamic specs are created per container by
/// [`Container::add_dynamic`](crate::Container::add_dynamic).
#[derive(Clone, Debug, PartialEq)]
pub struct PropertySpec {
    name: String,
    group: String,
    documentation: String,
    value_type: TypeTag,
    flags: PropertyFlags,
    default: Value,
    static_id: Option<PropertyId>,
}

impl PropertySpec {
    pub(crate) fn dynamic(
        name: String,
        value_type: TypeTag,
        group: String,
        documentation: String,
        flags: PropertyFlags,
    ) -> Self {
        Self {
            name,
            group,
            documentation,
            value_type,
            flags,
            default: value_type.default_value(),
            static_id: None,
        }
    }

    /// Returns the property name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the group editors file the property under.
    #[must_use]
    #[inline]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Returns the documentation string.
    #[must_use]
    #[inline]
    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    /// Returns the declared value type.
    #[must_use]
    #[inline]
    pub fn value_type(&self) -> TypeTag {
        self.value_type
    }

    /// Returns the default flags.
    #[must_use]
    #[inline]
    pub fn flags(&self) -> PropertyFlags {
        self.flags
    }

    /// Returns the default value.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Returns the static id, or `None` for a dynamic property.
    #[must_use]
    #[inline]
    pub fn static_id(&self) -> Option<PropertyId> {
        self.static_id
    }

    /// Returns `true` if this spec describes a static property.
    #[must_use]
    #[inline]
    pub fn is_static(&self) -> bool {
        self.static_id.is_some()
    }
}

/// Builder for statically declared properties.
///
/// # Example
///
/// ```rust
/// use understory_reflect::{PropertyFlags, PropertySpecBuilder, SchemaBuilder};
///
/// let mut builder = SchemaBuilder::new();
/// let wall = builder.define_type("Wall", None).unwrap();
/// builder
///     .register_static(
///         wall,
///         PropertySpecBuilder::new("Material", String::from("Concrete"))
///             .group("Properties")
///             .documentation("Structural material")
///             .flags(PropertyFlags::LOCKED),
///     )
///     .unwrap();
///
/// let schema = builder.build();
/// let spec = schema.lookup(wall, "Material").unwrap();
/// assert_eq!(spec.group(), "Properties");
/// assert!(spec.flags().contains(PropertyFlags::LOCKED));
/// ```
#[derive(Debug)]
pub struct PropertySpecBuilder<T: PropertyValue> {
    name: String,
    group: String,
    documentation: String,
    flags: PropertyFlags,
    default: Value,
    _marker: PhantomData<fn() -> T>,
}

impl<T: PropertyValue> PropertySpecBuilder<T> {
    /// Creates a builder for a property with the given name and default value.
    ///
    /// The group and documentation start out empty and the flags clear.
    #[must_use]
    pub fn new(name: impl Into<String>, default: T) -> Self {
        Self {
            name: name.into(),
            group: String::new(),
            documentation: String::new(),
            flags: PropertyFlags::empty(),
            default: default.into_value(),
            _marker: PhantomData,
        }
    }

    /// Sets the group editors file the property under.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Sets the documentation string.
    #[must_use]
    pub fn documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }

    /// Sets the default flags.
    #[must_use]
    pub fn flags(mut self, flags: PropertyFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Returns the name this builder declares.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_spec(self, id: PropertyId) -> PropertySpec {
        PropertySpec {
            name: self.name,
            group: self.group,
            documentation: self.documentation,
            value_type: T::TYPE,
            flags: self.flags,
            default: self.default,
            static_id: Some(id),
        }
    }
}

/// Checks that `name` can be used as a property name.
///
/// Names must be non-empty identifiers (an ASCII letter or `_`, followed by
/// ASCII letters, digits or `_`) and must not start with [`RESERVED_PREFIX`].
pub(crate) fn validate_name(name: &str) -> Result<(), PropertyError> {
    let invalid = |reason| {
        Err(PropertyError::InvalidName {
            name: name.into(),
            reason,
        })
    };
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return invalid("name is empty");
    };
    if name.starts_with(RESERVED_PREFIX) {
        return invalid("name uses the reserved prefix");
    }
    if !(first.is_ascii_alphabetic() || first == '_') {
        return invalid("name must start with a letter or '_'");
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return invalid("name may only contain letters, digits and '_'");
    }
    Ok(())
}
