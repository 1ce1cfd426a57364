// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property container instances.
//!
//! A [`Container`] pairs a shared [`ContainerType`] (the static spec table)
//! with per-instance state: sparse static values, an optional
//! [`DynamicPropertyStore`], and change tracking.
//!
//! Names resolve against the static table first and the dynamic store second.
//! Names are unique across both, so the order only matters for speed.

use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use core::fmt;

use crate::dynamic::DynamicPropertyStore;
use crate::error::PropertyError;
use crate::flags::PropertyFlags;
use crate::id::{ContainerTypeId, Property};
use crate::registry::ContainerType;
use crate::resolve::{PropertyMut, PropertyRef};
use crate::spec::{PropertySpec, validate_name};
use crate::store::StaticStore;
use crate::value::{PropertyValue, TypeTag, Value};

/// What happened to a property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A dynamic property was added.
    Added,
    /// A dynamic property was removed.
    Removed,
    /// A property's value changed.
    Value,
    /// A property's status flags changed.
    Status,
}

/// A change notification delivered to a container's observer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PropertyChange<'a> {
    /// The affected property.
    pub name: &'a str,
    /// What happened.
    pub kind: ChangeKind,
}

/// Callback invoked after every tracked change to a container.
pub type ChangeObserver = Box<dyn Fn(&PropertyChange<'_>) + Send + Sync>;

/// Where a resolved property lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    /// Index into the type's merged spec table.
    Static(usize),
    /// Index into the dynamic store.
    Dynamic(usize),
}

#[derive(Default)]
struct ChangeTracker {
    modified: bool,
    revision: u64,
    observer: Option<ChangeObserver>,
}

impl ChangeTracker {
    fn record(&mut self, change: &PropertyChange<'_>) {
        self.modified = true;
        self.revision += 1;
        if let Some(observer) = &self.observer {
            observer(change);
        }
    }
}

/// A property container instance.
///
/// Created by [`Schema::instantiate`](crate::Schema::instantiate). Every static
/// property of the container's type (inherited ones included) is present from
/// the start at its default value; dynamic properties are added and removed
/// per instance.
///
/// # Change tracking
///
/// Adding or removing a dynamic property and changing any value or status
/// through the container sets the modified flag, bumps the revision and
/// notifies the observer. Restoring from records does not.
///
/// # Example
///
/// ```rust
/// use understory_reflect::{PropertyFlags, PropertySpecBuilder, SchemaBuilder, TypeTag, Value};
///
/// let mut builder = SchemaBuilder::new();
/// let wall = builder.define_type("Wall", None).unwrap();
/// let height = builder
///     .register_static(wall, PropertySpecBuilder::new("Height", 3000.0_f64))
///     .unwrap();
/// let schema = builder.build();
///
/// let mut w1 = schema.instantiate(wall).unwrap();
/// assert_eq!(w1.get(height), Some(&3000.0));
///
/// w1.add_dynamic("ClassificationCode", TypeTag::String, "Properties", "", PropertyFlags::empty())
///     .unwrap()
///     .set(Value::from("Pr_20_31"))
///     .unwrap();
///
/// let code = w1.resolve("ClassificationCode").unwrap();
/// assert_eq!(code.get::<String>().map(String::as_str), Some("Pr_20_31"));
/// assert!(w1.is_modified());
/// ```
pub struct Container {
    ty: Arc<ContainerType>,
    statics: StaticStore,
    dynamic: Option<DynamicPropertyStore>,
    tracker: ChangeTracker,
}

impl Container {
    pub(crate) fn new(ty: Arc<ContainerType>) -> Self {
        Self {
            ty,
            statics: StaticStore::default(),
            dynamic: None,
            tracker: ChangeTracker::default(),
        }
    }

    /// Returns the container's type.
    #[must_use]
    #[inline]
    pub fn container_type(&self) -> &Arc<ContainerType> {
        &self.ty
    }

    /// Returns the id of the container's type.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> ContainerTypeId {
        self.ty.id()
    }

    /// Returns the dynamic store, if any dynamic property was ever added.
    #[must_use]
    #[inline]
    pub fn dynamic_properties(&self) -> Option<&DynamicPropertyStore> {
        self.dynamic.as_ref()
    }

    /// Returns the number of properties, static and dynamic.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ty.len() + self.dynamic.as_ref().map_or(0, DynamicPropertyStore::len)
    }

    /// Returns `true` if the container has no properties at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if a property with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.locate(name).is_some()
    }

    /// Returns all property names: static in declaration order, then dynamic
    /// in insertion order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.ty
            .specs()
            .map(PropertySpec::name)
            .chain(self.dynamic.iter().flat_map(DynamicPropertyStore::names))
    }

    /// Returns handles to all properties, in [`property_names`](Self::property_names) order.
    pub fn properties(&self) -> impl Iterator<Item = PropertyRef<'_>> + '_ {
        let dynamic = self.dynamic.as_ref().map_or(0, DynamicPropertyStore::len);
        (0..self.ty.len())
            .map(Slot::Static)
            .chain((0..dynamic).map(Slot::Dynamic))
            .map(move |slot| PropertyRef::new(self, slot))
    }

    /// Resolves a property by name.
    ///
    /// Returns `None` if no static or dynamic property has this name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<PropertyRef<'_>> {
        self.locate(name).map(|slot| PropertyRef::new(self, slot))
    }

    /// Resolves a property by name for writing.
    ///
    /// Returns `None` if no static or dynamic property has this name.
    #[must_use]
    pub fn resolve_mut(&mut self, name: &str) -> Option<PropertyMut<'_>> {
        self.locate(name).map(|slot| PropertyMut::new(self, slot))
    }

    /// Returns the value of a property by name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.locate(name).map(|slot| self.value_at(slot))
    }

    /// Sets the value of a property by name and returns the previous value.
    ///
    /// # Errors
    ///
    /// [`PropertyError::NotFound`] if the name does not resolve and
    /// [`PropertyError::TypeMismatch`] if the value has the wrong type.
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<Value, PropertyError> {
        let slot = self
            .locate(name)
            .ok_or_else(|| PropertyError::NotFound { name: name.into() })?;
        self.write(slot, value)
    }

    /// Reads a static property through its typed key.
    ///
    /// Returns `None` if the key was declared on a type this container does
    /// not derive from.
    #[must_use]
    pub fn get<T: PropertyValue>(&self, property: Property<T>) -> Option<&T> {
        let slot = self.ty.slot_of(property.id())?;
        self.value_at(Slot::Static(slot)).get::<T>()
    }

    /// Writes a static property through its typed key.
    ///
    /// # Errors
    ///
    /// [`PropertyError::NotFound`] if the key was declared on a type this
    /// container does not derive from, and [`PropertyError::TypeMismatch`] if
    /// the key was built with the wrong value type.
    pub fn set<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        value: T,
    ) -> Result<(), PropertyError> {
        let slot = self
            .ty
            .slot_of(property.id())
            .ok_or_else(|| PropertyError::NotFound {
                name: property.id().to_string(),
            })?;
        self.write(Slot::Static(slot), value.into_value())
            .map(drop)
    }

    /// Adds a dynamic property and returns a handle to it.
    ///
    /// The property starts at the default value of `value_type` with `flags`
    /// as its status.
    ///
    /// # Errors
    ///
    /// - [`PropertyError::InvalidName`] if the name is empty, uses the
    ///   reserved prefix, or is not an identifier.
    /// - [`PropertyError::DuplicateName`] if a static or dynamic property with
    ///   this name exists.
    pub fn add_dynamic(
        &mut self,
        name: &str,
        value_type: TypeTag,
        group: &str,
        documentation: &str,
        flags: PropertyFlags,
    ) -> Result<PropertyMut<'_>, PropertyError> {
        let spec = PropertySpec::dynamic(
            name.into(),
            value_type,
            group.into(),
            documentation.into(),
            flags,
        );
        let slot = self.insert_dynamic(spec)?;
        tracing::debug!(
            type_name = self.ty.name(),
            property = name,
            %value_type,
            "added dynamic property"
        );
        self.tracker.record(&PropertyChange {
            name,
            kind: ChangeKind::Added,
        });
        Ok(PropertyMut::new(self, slot))
    }

    /// Removes a dynamic property.
    ///
    /// # Errors
    ///
    /// - [`PropertyError::NotDynamic`] if the name is a static property.
    /// - [`PropertyError::NotFound`] if no property has this name.
    /// - [`PropertyError::Locked`] if the property's status has
    ///   [`PropertyFlags::LOCKED`].
    pub fn remove_dynamic(&mut self, name: &str) -> Result<(), PropertyError> {
        if self.ty.slot_by_name(name).is_some() {
            return Err(PropertyError::NotDynamic { name: name.into() });
        }
        let Some(store) = self.dynamic.as_mut() else {
            return Err(PropertyError::NotFound { name: name.into() });
        };
        let removed = store.remove(name)?;
        tracing::debug!(
            type_name = self.ty.name(),
            property = removed.name(),
            "removed dynamic property"
        );
        self.tracker.record(&PropertyChange {
            name: removed.name(),
            kind: ChangeKind::Removed,
        });
        Ok(())
    }

    /// Returns `true` if the container changed since the last
    /// [`clear_modified`](Self::clear_modified).
    #[must_use]
    #[inline]
    pub fn is_modified(&self) -> bool {
        self.tracker.modified
    }

    /// Resets the modified flag, e.g. after the host saved the container.
    #[inline]
    pub fn clear_modified(&mut self) {
        self.tracker.modified = false;
    }

    /// Returns a counter bumped by every tracked change.
    #[must_use]
    #[inline]
    pub fn revision(&self) -> u64 {
        self.tracker.revision
    }

    /// Installs the change observer, replacing any previous one.
    pub fn set_observer<F>(&mut self, observer: F)
    where
        F: Fn(&PropertyChange<'_>) + Send + Sync + 'static,
    {
        self.tracker.observer = Some(Box::new(observer));
    }

    /// Removes the change observer.
    pub fn clear_observer(&mut self) {
        self.tracker.observer = None;
    }

    // =========================================================================
    // Slot access
    // =========================================================================

    pub(crate) fn locate(&self, name: &str) -> Option<Slot> {
        if let Some(slot) = self.ty.slot_by_name(name) {
            return Some(Slot::Static(slot));
        }
        self.dynamic
            .as_ref()
            .and_then(|store| store.index_of(name))
            .map(Slot::Dynamic)
    }

    /// Returns the slot's spec, borrowing only the fields it lives in.
    fn spec_in<'a>(
        ty: &'a ContainerType,
        dynamic: Option<&'a DynamicPropertyStore>,
        slot: Slot,
    ) -> &'a PropertySpec {
        match slot {
            Slot::Static(slot) => ty.spec_at(slot),
            Slot::Dynamic(idx) => dynamic
                .expect("dynamic slot without a dynamic store")
                .entry(idx)
                .spec(),
        }
    }

    pub(crate) fn spec_at(&self, slot: Slot) -> &PropertySpec {
        Self::spec_in(&self.ty, self.dynamic.as_ref(), slot)
    }

    pub(crate) fn shared_spec_at(&self, slot: usize) -> &Arc<PropertySpec> {
        self.ty.shared_spec_at(slot)
    }

    pub(crate) fn value_at(&self, slot: Slot) -> &Value {
        match slot {
            Slot::Static(slot) => self
                .statics
                .value(slot)
                .unwrap_or_else(|| self.ty.spec_at(slot).default_value()),
            Slot::Dynamic(idx) => self.dynamic_store().entry(idx).value(),
        }
    }

    pub(crate) fn status_at(&self, slot: Slot) -> PropertyFlags {
        match slot {
            Slot::Static(slot) => self.statics.status(slot, self.ty.spec_at(slot).flags()),
            Slot::Dynamic(idx) => self.dynamic_store().entry(idx).status(),
        }
    }

    fn dynamic_store(&self) -> &DynamicPropertyStore {
        self.dynamic
            .as_ref()
            .expect("dynamic slot without a dynamic store")
    }

    /// Replaces a slot's value without change tracking.
    pub(crate) fn replace_untracked(
        &mut self,
        slot: Slot,
        value: Value,
    ) -> Result<Value, PropertyError> {
        let spec = Self::spec_in(&self.ty, self.dynamic.as_ref(), slot);
        if value.type_tag() != spec.value_type() {
            return Err(PropertyError::TypeMismatch {
                name: spec.name().into(),
                expected: spec.value_type(),
                found: value.type_tag(),
            });
        }
        Ok(match slot {
            Slot::Static(slot) => {
                let default = self.ty.spec_at(slot).default_value();
                self.statics.replace(slot, value, default)
            }
            Slot::Dynamic(idx) => self
                .dynamic
                .as_mut()
                .expect("dynamic slot without a dynamic store")
                .entry_mut(idx)
                .replace_value(value),
        })
    }

    /// Replaces a slot's value, recording the change if the value differs.
    pub(crate) fn write(&mut self, slot: Slot, value: Value) -> Result<Value, PropertyError> {
        let old = self.replace_untracked(slot, value)?;
        if !old.same_as(self.value_at(slot)) {
            let name = Self::spec_in(&self.ty, self.dynamic.as_ref(), slot).name();
            self.tracker.record(&PropertyChange {
                name,
                kind: ChangeKind::Value,
            });
        }
        Ok(old)
    }

    /// Sets a slot's status, recording the change if it differs.
    pub(crate) fn write_status(&mut self, slot: Slot, status: PropertyFlags) {
        if self.status_at(slot) == status {
            return;
        }
        match slot {
            Slot::Static(slot) => {
                let default = self.ty.spec_at(slot).flags();
                self.statics.set_status(slot, status, default);
            }
            Slot::Dynamic(idx) => self
                .dynamic
                .as_mut()
                .expect("dynamic slot without a dynamic store")
                .entry_mut(idx)
                .set_status(status),
        }
        let name = Self::spec_in(&self.ty, self.dynamic.as_ref(), slot).name();
        self.tracker.record(&PropertyChange {
            name,
            kind: ChangeKind::Status,
        });
    }

    /// Adds a dynamic property without change tracking.
    pub(crate) fn insert_dynamic(&mut self, spec: PropertySpec) -> Result<Slot, PropertyError> {
        validate_name(spec.name())?;
        if self.contains(spec.name()) {
            return Err(PropertyError::DuplicateName {
                name: spec.name().into(),
            });
        }
        self.dynamic
            .get_or_insert_with(DynamicPropertyStore::default)
            .add(spec)
            .map(Slot::Dynamic)
    }
}

impl Clone for Container {
    /// Clones the properties and change state; the observer is not cloned.
    fn clone(&self) -> Self {
        Self {
            ty: Arc::clone(&self.ty),
            statics: self.statics.clone(),
            dynamic: self.dynamic.clone(),
            tracker: ChangeTracker {
                modified: self.tracker.modified,
                revision: self.tracker.revision,
                observer: None,
            },
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("type", &self.ty.name())
            .field("static_values", &self.statics.len())
            .field("dynamic", &self.dynamic)
            .field("modified", &self.tracker.modified)
            .field("revision", &self.tracker.revision)
            .field("has_observer", &self.tracker.observer.is_some())
            .finish()
    }
}

impl fmt::Debug for ChangeTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeTracker")
            .field("modified", &self.modified)
            .field("revision", &self.revision)
            .field("has_observer", &self.observer.is_some())
            .finish()
    }
}
