// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property handles returned by name resolution.
//!
//! [`Container::resolve`](crate::Container::resolve) returns a [`PropertyRef`]
//! and [`Container::resolve_mut`](crate::Container::resolve_mut) a
//! [`PropertyMut`]. Both work the same for static and dynamic properties.

use core::fmt;

use crate::container::{Container, Slot};
use crate::error::PropertyError;
use crate::flags::PropertyFlags;
use crate::spec::PropertySpec;
use crate::value::{PropertyValue, TypeTag, Value};

/// A read-only handle to one property of a container.
#[derive(Copy, Clone)]
pub struct PropertyRef<'a> {
    container: &'a Container,
    slot: Slot,
}

impl<'a> PropertyRef<'a> {
    pub(crate) fn new(container: &'a Container, slot: Slot) -> Self {
        Self { container, slot }
    }

    /// Returns the property's spec.
    #[must_use]
    pub fn spec(&self) -> &'a PropertySpec {
        self.container.spec_at(self.slot)
    }

    /// Returns the property name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.spec().name()
    }

    /// Returns the declared value type.
    #[must_use]
    pub fn value_type(&self) -> TypeTag {
        self.spec().value_type()
    }

    /// Returns the current value.
    #[must_use]
    pub fn value(&self) -> &'a Value {
        self.container.value_at(self.slot)
    }

    /// Borrows the current value as `T`.
    ///
    /// Returns `None` if the property is not of type `T`.
    #[must_use]
    pub fn get<T: PropertyValue>(&self) -> Option<&'a T> {
        self.value().get::<T>()
    }

    /// Returns the runtime status flags.
    #[must_use]
    pub fn status(&self) -> PropertyFlags {
        self.container.status_at(self.slot)
    }

    /// Returns `true` if the property was added at runtime.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        matches!(self.slot, Slot::Dynamic(_))
    }

    /// Returns `true` if the property is locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.status().contains(PropertyFlags::LOCKED)
    }
}

impl fmt::Debug for PropertyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRef")
            .field("name", &self.name())
            .field("value", self.value())
            .field("status", &self.status())
            .field("dynamic", &self.is_dynamic())
            .finish_non_exhaustive()
    }
}

/// A writable handle to one property of a container.
///
/// Writes go through the container's change tracking.
pub struct PropertyMut<'a> {
    container: &'a mut Container,
    slot: Slot,
}

impl<'a> PropertyMut<'a> {
    pub(crate) fn new(container: &'a mut Container, slot: Slot) -> Self {
        Self { container, slot }
    }

    /// Reborrows as a read-only handle.
    #[must_use]
    pub fn to_ref(&self) -> PropertyRef<'_> {
        PropertyRef::new(self.container, self.slot)
    }

    /// Returns the property name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.container.spec_at(self.slot).name()
    }

    /// Returns the current value.
    #[must_use]
    pub fn value(&self) -> &Value {
        self.container.value_at(self.slot)
    }

    /// Returns the runtime status flags.
    #[must_use]
    pub fn status(&self) -> PropertyFlags {
        self.container.status_at(self.slot)
    }

    /// Replaces the value and returns the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::TypeMismatch`] if `value` is not of the
    /// property's declared type; the property is left unchanged.
    pub fn set(&mut self, value: Value) -> Result<Value, PropertyError> {
        self.container.write(self.slot, value)
    }

    /// Typed variant of [`set`](Self::set).
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::TypeMismatch`] if `T` is not the property's
    /// declared type.
    pub fn set_typed<T: PropertyValue>(&mut self, value: T) -> Result<(), PropertyError> {
        self.set(value.into_value()).map(drop)
    }

    /// Sets or clears `flags` in the runtime status.
    pub fn set_status(&mut self, flags: PropertyFlags, enabled: bool) {
        let mut status = self.status();
        status.set(flags, enabled);
        self.container.write_status(self.slot, status);
    }

    /// Sets [`PropertyFlags::LOCKED`].
    pub fn lock(&mut self) {
        self.set_status(PropertyFlags::LOCKED, true);
    }

    /// Clears [`PropertyFlags::LOCKED`].
    pub fn unlock(&mut self) {
        self.set_status(PropertyFlags::LOCKED, false);
    }
}

impl fmt::Debug for PropertyMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMut")
            .field("name", &self.name())
            .field("value", self.value())
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ContainerTypeId;
    use crate::registry::{Schema, SchemaBuilder};
    use crate::spec::PropertySpecBuilder;
    use alloc::format;
    use alloc::string::String;

    fn schema() -> (Schema, ContainerTypeId) {
        let mut builder = SchemaBuilder::new();
        let wall = builder.define_type("Wall", None).unwrap();
        builder
            .register_static(
                wall,
                PropertySpecBuilder::new("Height", 3000.0_f64)
                    .group("Geometry")
                    .documentation("Height above the base level")
                    .flags(PropertyFlags::READ_ONLY),
            )
            .unwrap();
        (builder.build(), wall)
    }

    #[test]
    fn static_handle_reads_spec_and_value() {
        let (schema, wall) = schema();
        let w1 = schema.instantiate(wall).unwrap();
        let height = w1.resolve("Height").unwrap();
        assert_eq!(height.name(), "Height");
        assert_eq!(height.spec().group(), "Geometry");
        assert_eq!(height.spec().documentation(), "Height above the base level");
        assert_eq!(height.value_type(), TypeTag::Float);
        assert_eq!(height.get::<f64>(), Some(&3000.0));
        assert_eq!(height.get::<i64>(), None);
        assert_eq!(height.status(), PropertyFlags::READ_ONLY);
        assert!(!height.is_dynamic());
        assert!(!height.is_locked());
    }

    #[test]
    fn missing_name_resolves_to_none() {
        let (schema, wall) = schema();
        let mut w1 = schema.instantiate(wall).unwrap();
        assert!(w1.resolve("Width").is_none());
        assert!(w1.resolve_mut("Width").is_none());
    }

    #[test]
    fn set_checks_type() {
        let (schema, wall) = schema();
        let mut w1 = schema.instantiate(wall).unwrap();
        let mut height = w1.resolve_mut("Height").unwrap();

        assert_eq!(
            height.set(Value::Integer(3)),
            Err(PropertyError::TypeMismatch {
                name: "Height".into(),
                expected: TypeTag::Float,
                found: TypeTag::Integer,
            })
        );
        assert_eq!(height.value(), &Value::Float(3000.0));

        // READ_ONLY is an editor hint only.
        assert_eq!(height.set(Value::Float(2800.0)), Ok(Value::Float(3000.0)));
        height.set_typed(2900.0_f64).unwrap();
        assert!(height.set_typed(String::from("tall")).is_err());
        assert_eq!(height.to_ref().get::<f64>(), Some(&2900.0));
    }

    #[test]
    fn status_changes_are_per_instance() {
        let (schema, wall) = schema();
        let mut a = schema.instantiate(wall).unwrap();
        let b = schema.instantiate(wall).unwrap();

        let mut height = a.resolve_mut("Height").unwrap();
        height.set_status(PropertyFlags::HIDDEN, true);
        height.set_status(PropertyFlags::READ_ONLY, false);
        assert_eq!(height.status(), PropertyFlags::HIDDEN);

        assert_eq!(b.resolve("Height").unwrap().status(), PropertyFlags::READ_ONLY);
        // The spec itself is untouched.
        assert_eq!(
            a.resolve("Height").unwrap().spec().flags(),
            PropertyFlags::READ_ONLY
        );
    }

    #[test]
    fn dynamic_handle() {
        let (schema, wall) = schema();
        let mut w1 = schema.instantiate(wall).unwrap();
        let mut code = w1
            .add_dynamic(
                "ClassificationCode",
                TypeTag::String,
                "Properties",
                "",
                PropertyFlags::empty(),
            )
            .unwrap();
        code.set_typed(String::from("Pr_20_31")).unwrap();
        code.lock();
        assert!(code.to_ref().is_locked());
        assert!(code.to_ref().is_dynamic());
        code.unlock();
        assert!(code.status().is_empty());

        let code = w1.resolve("ClassificationCode").unwrap();
        assert_eq!(code.get::<String>().map(String::as_str), Some("Pr_20_31"));
        assert_eq!(code.spec().static_id(), None);
    }

    #[test]
    fn handle_debug() {
        let (schema, wall) = schema();
        let w1 = schema.instantiate(wall).unwrap();
        let debug = format!("{:?}", w1.resolve("Height").unwrap());
        assert!(debug.contains("PropertyRef"));
        assert!(debug.contains("Height"));
    }
}
