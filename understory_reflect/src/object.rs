// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host object traits.
//!
//! A host application usually wraps a [`Container`] in its own document
//! object. Implementing [`HasProperties`] for that object gives it the
//! [`HasPropertiesExt`] methods.

use alloc::vec::Vec;

use crate::container::Container;
use crate::error::PropertyError;
use crate::flags::PropertyFlags;
use crate::id::Property;
use crate::resolve::{PropertyMut, PropertyRef};
use crate::serialize::{PropertyRecord, RestoreReport, restore, save};
use crate::value::{PropertyValue, TypeTag, Value};

/// An object that owns a property container.
///
/// # Example
///
/// ```rust
/// use understory_reflect::{
///     Container, HasProperties, HasPropertiesExt, PropertyFlags, PropertySpecBuilder,
///     SchemaBuilder, TypeTag,
/// };
///
/// struct Wall {
///     label: String,
///     properties: Container,
/// }
///
/// impl HasProperties for Wall {
///     fn container(&self) -> &Container {
///         &self.properties
///     }
///
///     fn container_mut(&mut self) -> &mut Container {
///         &mut self.properties
///     }
/// }
///
/// let mut builder = SchemaBuilder::new();
/// let wall_type = builder.define_type("Wall", None).unwrap();
/// let height = builder
///     .register_static(wall_type, PropertySpecBuilder::new("Height", 3000.0_f64))
///     .unwrap();
/// let schema = builder.build();
///
/// let mut wall = Wall {
///     label: "W1".into(),
///     properties: schema.instantiate(wall_type).unwrap(),
/// };
/// wall.set_property(height, 2800.0).unwrap();
/// wall.add_dynamic_property("FireRating", TypeTag::Integer, "Safety", "", PropertyFlags::empty())
///     .unwrap();
///
/// assert_eq!(wall.get_property(height), Some(&2800.0));
/// assert_eq!(wall.save_properties().len(), 2);
/// # let _ = &wall.label;
/// ```
pub trait HasProperties {
    /// Returns the object's container.
    fn container(&self) -> &Container;

    /// Returns the object's container for writing.
    fn container_mut(&mut self) -> &mut Container;
}

impl HasProperties for Container {
    fn container(&self) -> &Container {
        self
    }

    fn container_mut(&mut self) -> &mut Container {
        self
    }
}

/// Extension methods for [`HasProperties`].
pub trait HasPropertiesExt: HasProperties {
    /// Reads a static property through its typed key.
    fn get_property<T: PropertyValue>(&self, property: Property<T>) -> Option<&T> {
        self.container().get(property)
    }

    /// Writes a static property through its typed key.
    ///
    /// # Errors
    ///
    /// See [`Container::set`].
    fn set_property<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        value: T,
    ) -> Result<(), PropertyError> {
        self.container_mut().set(property, value)
    }

    /// Resolves a property by name.
    fn property(&self, name: &str) -> Option<PropertyRef<'_>> {
        self.container().resolve(name)
    }

    /// Resolves a property by name for writing.
    fn property_mut(&mut self, name: &str) -> Option<PropertyMut<'_>> {
        self.container_mut().resolve_mut(name)
    }

    /// Returns the value of a property by name.
    fn property_value(&self, name: &str) -> Option<&Value> {
        self.container().value(name)
    }

    /// Adds a dynamic property.
    ///
    /// # Errors
    ///
    /// See [`Container::add_dynamic`].
    fn add_dynamic_property(
        &mut self,
        name: &str,
        value_type: TypeTag,
        group: &str,
        documentation: &str,
        flags: PropertyFlags,
    ) -> Result<PropertyMut<'_>, PropertyError> {
        self.container_mut()
            .add_dynamic(name, value_type, group, documentation, flags)
    }

    /// Removes a dynamic property.
    ///
    /// # Errors
    ///
    /// See [`Container::remove_dynamic`].
    fn remove_dynamic_property(&mut self, name: &str) -> Result<(), PropertyError> {
        self.container_mut().remove_dynamic(name)
    }

    /// Saves the container with the default text codec.
    fn save_properties(&self) -> Vec<PropertyRecord> {
        save(self.container())
    }

    /// Restores the container from text-codec records.
    fn restore_properties(&mut self, records: &[PropertyRecord]) -> RestoreReport {
        restore(self.container_mut(), records)
    }
}

impl<T: HasProperties + ?Sized> HasPropertiesExt for T {}
