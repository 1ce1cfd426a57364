// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-container storage for properties added at runtime.
//!
//! A [`DynamicPropertyStore`] is owned by exactly one
//! [`Container`](crate::Container) and is only mutated through it, which is
//! where name uniqueness against the static table and change tracking are
//! enforced.

use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;

use crate::error::PropertyError;
use crate::flags::PropertyFlags;
use crate::spec::{PropertySpec, validate_name};
use crate::value::Value;

/// A property added to one container at runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicProperty {
    spec: PropertySpec,
    value: Value,
    status: PropertyFlags,
}

impl DynamicProperty {
    /// Returns the property's spec.
    #[must_use]
    #[inline]
    pub fn spec(&self) -> &PropertySpec {
        &self.spec
    }

    /// Returns the property name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        self.spec.name()
    }

    /// Returns the current value.
    #[must_use]
    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the runtime status.
    #[must_use]
    #[inline]
    pub fn status(&self) -> PropertyFlags {
        self.status
    }

    pub(crate) fn replace_value(&mut self, value: Value) -> Value {
        core::mem::replace(&mut self.value, value)
    }

    pub(crate) fn set_status(&mut self, status: PropertyFlags) {
        self.status = status;
    }
}

/// Ordered store of a container's dynamic properties.
///
/// Iteration follows insertion order; removing a property keeps the relative
/// order of the remaining ones.
#[derive(Clone, Debug, Default)]
pub struct DynamicPropertyStore {
    entries: Vec<DynamicProperty>,
    by_name: HashMap<String, usize>,
}

impl DynamicPropertyStore {
    /// Returns the number of dynamic properties.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store holds no properties.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a dynamic property by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DynamicProperty> {
        self.index_of(name).map(|idx| &self.entries[idx])
    }

    /// Returns the properties in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &DynamicProperty> + '_ {
        self.entries.iter()
    }

    /// Returns the property names in insertion order.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.entries.iter().map(DynamicProperty::name)
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn entry(&self, idx: usize) -> &DynamicProperty {
        &self.entries[idx]
    }

    pub(crate) fn entry_mut(&mut self, idx: usize) -> &mut DynamicProperty {
        &mut self.entries[idx]
    }

    /// Appends a property described by `spec`, starting at its default value
    /// with its default flags as status.
    ///
    /// Only checks uniqueness among dynamic properties; the container checks
    /// the static table.
    pub(crate) fn add(&mut self, spec: PropertySpec) -> Result<usize, PropertyError> {
        validate_name(spec.name())?;
        if self.by_name.contains_key(spec.name()) {
            return Err(PropertyError::DuplicateName {
                name: spec.name().into(),
            });
        }
        let idx = self.entries.len();
        self.by_name.insert(spec.name().into(), idx);
        self.entries.push(DynamicProperty {
            value: spec.default_value().clone(),
            status: spec.flags(),
            spec,
        });
        Ok(idx)
    }

    /// Removes a property unless it is locked.
    pub(crate) fn remove(&mut self, name: &str) -> Result<DynamicProperty, PropertyError> {
        let Some(idx) = self.index_of(name) else {
            return Err(PropertyError::NotFound { name: name.into() });
        };
        if self.entries[idx].status.contains(PropertyFlags::LOCKED) {
            return Err(PropertyError::Locked { name: name.into() });
        }
        self.by_name.remove(name);
        for slot in self.by_name.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        Ok(self.entries.remove(idx))
    }
}
