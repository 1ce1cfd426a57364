// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type and property identification.
//!
//! This module provides [`ContainerTypeId`] for registered container types,
//! [`PropertyId`] for statically declared properties, and [`Property<T>`] for
//! type-safe static property keys.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// Identifies a container type within a [`Schema`](crate::Schema).
///
/// Ids are handed out by [`SchemaBuilder::define_type`](crate::SchemaBuilder::define_type)
/// in definition order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerTypeId(u16);

impl ContainerTypeId {
    /// Creates a type id from a raw index.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the underlying index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for ContainerTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContainerTypeId").field(&self.0).finish()
    }
}

/// Identifies a statically declared property.
///
/// A static property is addressed by the type that declared it and its
/// declaration index within that type. The same id is valid on every subtype
/// of the declaring type: a container resolves it to a slot through the
/// per-ancestor offsets of its [`ContainerType`](crate::ContainerType).
///
/// # Example
///
/// ```rust
/// use understory_reflect::{ContainerTypeId, PropertyId};
///
/// let id = PropertyId::new(ContainerTypeId::new(3), 1);
/// assert_eq!(id.owner(), ContainerTypeId::new(3));
/// assert_eq!(id.index(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId {
    owner: ContainerTypeId,
    index: u16,
}

impl PropertyId {
    /// Creates a property id from its declaring type and declaration index.
    ///
    /// This is typically called by
    /// [`SchemaBuilder::register_static`](crate::SchemaBuilder::register_static)
    /// rather than directly.
    #[must_use]
    #[inline]
    pub const fn new(owner: ContainerTypeId, index: u16) -> Self {
        Self { owner, index }
    }

    /// Returns the type that declared this property.
    #[must_use]
    #[inline]
    pub const fn owner(self) -> ContainerTypeId {
        self.owner
    }

    /// Returns the declaration index within the owning type.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.index
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyId({}:{})", self.owner.0, self.index)
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyId({}:{})", self.owner.0, self.index)
    }
}

/// A type-safe static property key.
///
/// This wraps a [`PropertyId`] with a phantom type parameter `T` naming the
/// property's value type, so that typed reads and writes through
/// [`Container::get`](crate::Container::get) and
/// [`Container::set`](crate::Container::set) are checked at compile time.
///
/// ```rust
/// use understory_reflect::{PropertySpecBuilder, SchemaBuilder};
///
/// let mut builder = SchemaBuilder::new();
/// let wall = builder.define_type("Wall", None).unwrap();
/// let height = builder
///     .register_static(wall, PropertySpecBuilder::new("Height", 3000.0_f64))
///     .unwrap();
///
/// let schema = builder.build();
/// let mut w1 = schema.instantiate(wall).unwrap();
/// w1.set(height, 2750.0).unwrap();
/// // w1.set(height, "tall"); // Would not compile!
/// assert_eq!(w1.get(height), Some(&2750.0));
/// ```
pub struct Property<T> {
    id: PropertyId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    /// Creates a typed property key from a property id.
    ///
    /// The caller must make sure the id was registered with value type `T`;
    /// a mismatched key reads as absent and fails to write.
    #[must_use]
    #[inline]
    pub const fn from_id(id: PropertyId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying property id.
    #[must_use]
    #[inline]
    pub const fn id(self) -> PropertyId {
        self.id
    }
}

// Manual trait implementations to avoid requiring T: Clone, etc.

impl<T> Copy for Property<T> {}

impl<T> Clone for Property<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Property<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Property<T> {}

impl<T> Hash for Property<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("type", &core::any::type_name::<T>())
            .finish()
    }
}
