// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Container types and their property spec tables.
//!
//! Registration happens in two phases. A [`SchemaBuilder`] collects type
//! definitions and static property declarations; [`SchemaBuilder::build`]
//! then merges every type's ancestry into one ordered spec table per type and
//! freezes the result into a [`Schema`]. Containers can only be created from
//! a `Schema`, so registration is always complete before the first instance
//! exists.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::container::Container;
use crate::error::PropertyError;
use crate::id::{ContainerTypeId, Property, PropertyId};
use crate::spec::{PropertySpec, PropertySpecBuilder, validate_name};
use crate::value::PropertyValue;

/// Ancestry entries are stored inline up to this depth.
const INLINE_DEPTH: usize = 4;

/// One ancestor's share of a merged spec table.
#[derive(Copy, Clone, Debug)]
struct AncestorSpan {
    id: ContainerTypeId,
    offset: usize,
    len: usize,
}

/// A registered container type with its merged spec table.
///
/// The table lists the specs of the root type first, then those of each
/// subtype down to this one, each in declaration order. Subtypes add specs but
/// never remove inherited ones.
#[derive(Debug)]
pub struct ContainerType {
    id: ContainerTypeId,
    name: String,
    base: Option<ContainerTypeId>,
    /// Root first, this type last.
    ancestry: SmallVec<[AncestorSpan; INLINE_DEPTH]>,
    specs: Vec<Arc<PropertySpec>>,
    by_name: HashMap<String, usize>,
}

impl ContainerType {
    /// Returns this type's id.
    #[must_use]
    #[inline]
    pub fn id(&self) -> ContainerTypeId {
        self.id
    }

    /// Returns this type's name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the direct base type, if any.
    #[must_use]
    #[inline]
    pub fn base(&self) -> Option<ContainerTypeId> {
        self.base
    }

    /// Returns `true` if this type is `other` or derives from it.
    #[must_use]
    pub fn is_a(&self, other: ContainerTypeId) -> bool {
        self.ancestry.iter().any(|span| span.id == other)
    }

    /// Returns the ancestry, root first and this type last.
    pub fn ancestry(&self) -> impl Iterator<Item = ContainerTypeId> + '_ {
        self.ancestry.iter().map(|span| span.id)
    }

    /// Returns the number of static properties, inherited ones included.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns `true` if the type has no static properties.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Returns all static specs, base-type specs first, in declaration order.
    pub fn specs(&self) -> impl ExactSizeIterator<Item = &PropertySpec> + '_ {
        self.specs.iter().map(|spec| &**spec)
    }

    /// Looks up a static spec by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&PropertySpec> {
        self.slot_by_name(name).map(|slot| self.spec_at(slot))
    }

    pub(crate) fn slot_by_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Maps a static property id to its slot in this type's table.
    ///
    /// Returns `None` if the declaring type is not an ancestor of this type.
    pub(crate) fn slot_of(&self, id: PropertyId) -> Option<usize> {
        let span = self.ancestry.iter().find(|span| span.id == id.owner())?;
        let index = usize::from(id.index());
        (index < span.len).then_some(span.offset + index)
    }

    pub(crate) fn spec_at(&self, slot: usize) -> &PropertySpec {
        &self.specs[slot]
    }

    pub(crate) fn shared_spec_at(&self, slot: usize) -> &Arc<PropertySpec> {
        &self.specs[slot]
    }
}

/// A type as declared to the builder, before merging.
#[derive(Debug)]
struct TypeDecl {
    name: String,
    base: Option<ContainerTypeId>,
    specs: Vec<Arc<PropertySpec>>,
}

/// Collects container types and their static property declarations.
///
/// # Example
///
/// ```rust
/// use understory_reflect::{PropertySpecBuilder, SchemaBuilder};
///
/// let mut builder = SchemaBuilder::new();
/// let object = builder.define_type("DocumentObject", None).unwrap();
/// builder
///     .register_static(object, PropertySpecBuilder::new("Label", String::new()))
///     .unwrap();
///
/// let wall = builder.define_type("Wall", Some(object)).unwrap();
/// builder
///     .register_static(
///         wall,
///         PropertySpecBuilder::new("Height", 3000.0_f64).group("Geometry"),
///     )
///     .unwrap();
///
/// let schema = builder.build();
/// let names: Vec<_> = schema.all_specs_for(wall).map(|s| s.name()).collect();
/// assert_eq!(names, ["Label", "Height"]);
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    types: Vec<TypeDecl>,
    by_name: HashMap<String, ContainerTypeId>,
}

impl SchemaBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a container type, optionally deriving from `base`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::DuplicateType`] if the name is taken and
    /// [`PropertyError::UnknownType`] if `base` was not defined by this builder.
    ///
    /// # Panics
    ///
    /// Panics if more than 65,535 types are defined.
    pub fn define_type(
        &mut self,
        name: impl Into<String>,
        base: Option<ContainerTypeId>,
    ) -> Result<ContainerTypeId, PropertyError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(PropertyError::DuplicateType { name });
        }
        if let Some(base) = base
            && self.decl(base).is_none()
        {
            return Err(PropertyError::UnknownType(base));
        }
        assert!(
            self.types.len() < usize::from(u16::MAX),
            "Too many container types defined (max {})",
            u16::MAX
        );

        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let id = ContainerTypeId::new(self.types.len() as u16);
        tracing::debug!(type_name = %name, ?base, "defined container type");
        self.by_name.insert(name.clone(), id);
        self.types.push(TypeDecl {
            name,
            base,
            specs: Vec::new(),
        });
        Ok(id)
    }

    /// Registers a static property on `ty`.
    ///
    /// Returns a typed [`Property<T>`] key valid on `ty` and all its subtypes.
    ///
    /// # Errors
    ///
    /// - [`PropertyError::UnknownType`] if `ty` was not defined by this builder.
    /// - [`PropertyError::InvalidName`] if the name is not a valid property name.
    /// - [`PropertyError::StaticConflict`] if the name is already declared on
    ///   `ty`, one of its ancestors, or one of its subtypes.
    ///
    /// # Panics
    ///
    /// Panics if more than 65,535 properties are declared on one type.
    pub fn register_static<T: PropertyValue>(
        &mut self,
        ty: ContainerTypeId,
        spec: PropertySpecBuilder<T>,
    ) -> Result<Property<T>, PropertyError> {
        let Some(decl) = self.decl(ty) else {
            return Err(PropertyError::UnknownType(ty));
        };
        validate_name(spec.name())?;
        if self.is_visible(ty, spec.name()) {
            return Err(PropertyError::StaticConflict {
                type_name: decl.name.clone(),
                name: spec.name().into(),
            });
        }
        assert!(
            decl.specs.len() < usize::from(u16::MAX),
            "Too many properties declared on '{}' (max {})",
            decl.name,
            u16::MAX
        );

        let decl = &mut self.types[usize::from(ty.index())];
        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let id = PropertyId::new(ty, decl.specs.len() as u16);
        let spec = spec.into_spec(id);
        tracing::debug!(
            type_name = %decl.name,
            property = spec.name(),
            value_type = %spec.value_type(),
            "registered static property"
        );
        decl.specs.push(Arc::new(spec));
        Ok(Property::from_id(id))
    }

    /// Looks up a static spec visible on `ty`, inherited ones included.
    #[must_use]
    pub fn lookup(&self, ty: ContainerTypeId, name: &str) -> Option<&PropertySpec> {
        self.lineage(ty)
            .flat_map(|decl| decl.specs.iter())
            .find(|spec| spec.name() == name)
            .map(|spec| &**spec)
    }

    /// Freezes the builder into a [`Schema`].
    #[must_use]
    pub fn build(self) -> Schema {
        let mut types: Vec<Arc<ContainerType>> = Vec::with_capacity(self.types.len());
        for (index, decl) in self.types.into_iter().enumerate() {
            #[expect(clippy::cast_possible_truncation, reason = "define_type caps the count")]
            let id = ContainerTypeId::new(index as u16);
            // Bases are always defined before their subtypes.
            let (mut ancestry, mut specs) = match decl.base {
                Some(base) => {
                    let base = &types[usize::from(base.index())];
                    (base.ancestry.clone(), base.specs.clone())
                }
                None => (SmallVec::new(), Vec::new()),
            };
            ancestry.push(AncestorSpan {
                id,
                offset: specs.len(),
                len: decl.specs.len(),
            });
            specs.extend(decl.specs);
            let by_name = specs
                .iter()
                .enumerate()
                .map(|(slot, spec)| (String::from(spec.name()), slot))
                .collect();
            types.push(Arc::new(ContainerType {
                id,
                name: decl.name,
                base: decl.base,
                ancestry,
                specs,
                by_name,
            }));
        }
        tracing::debug!(types = types.len(), "built property schema");
        Schema {
            types,
            by_name: self.by_name,
        }
    }

    fn decl(&self, ty: ContainerTypeId) -> Option<&TypeDecl> {
        self.types.get(usize::from(ty.index()))
    }

    /// Walks from `ty` up to its root.
    fn lineage(&self, ty: ContainerTypeId) -> impl Iterator<Item = &TypeDecl> + '_ {
        let mut next = Some(ty);
        core::iter::from_fn(move || {
            let decl = self.decl(next?)?;
            next = decl.base;
            Some(decl)
        })
    }

    /// Returns `true` if `candidate` derives, directly or not, from `ty`.
    fn derives_from(&self, candidate: ContainerTypeId, ty: ContainerTypeId) -> bool {
        let mut next = self.decl(candidate).and_then(|decl| decl.base);
        while let Some(base) = next {
            if base == ty {
                return true;
            }
            next = self.decl(base).and_then(|decl| decl.base);
        }
        false
    }

    /// Returns `true` if `name` is declared on `ty`, an ancestor, or a subtype.
    fn is_visible(&self, ty: ContainerTypeId, name: &str) -> bool {
        if self.lookup(ty, name).is_some() {
            return true;
        }
        // Subtypes always have larger ids than their bases.
        (usize::from(ty.index()) + 1..self.types.len()).any(|index| {
            #[expect(clippy::cast_possible_truncation, reason = "index < types.len()")]
            let candidate = ContainerTypeId::new(index as u16);
            self.types[index].specs.iter().any(|spec| spec.name() == name)
                && self.derives_from(candidate, ty)
        })
    }
}

/// A frozen set of container types.
///
/// A `Schema` is immutable and can be shared across threads; containers hold
/// their [`ContainerType`] by `Arc`, so the schema itself may be dropped once
/// instances exist.
#[derive(Clone)]
pub struct Schema {
    types: Vec<Arc<ContainerType>>,
    by_name: HashMap<String, ContainerTypeId>,
}

impl Schema {
    /// Returns the number of types.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are defined.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn type_by_name(&self, name: &str) -> Option<ContainerTypeId> {
        self.by_name.get(name).copied()
    }

    /// Returns the type with the given id.
    #[must_use]
    pub fn container_type(&self, ty: ContainerTypeId) -> Option<&Arc<ContainerType>> {
        self.types.get(usize::from(ty.index()))
    }

    /// Looks up a static spec visible on `ty`, inherited ones included.
    #[must_use]
    pub fn lookup(&self, ty: ContainerTypeId, name: &str) -> Option<&PropertySpec> {
        self.container_type(ty)?.lookup(name)
    }

    /// Returns the spec registered under a static property id.
    #[must_use]
    pub fn spec(&self, id: PropertyId) -> Option<&PropertySpec> {
        let owner = self.container_type(id.owner())?;
        owner.slot_of(id).map(|slot| owner.spec_at(slot))
    }

    /// Returns every static spec of `ty`, base-type specs first.
    ///
    /// Yields nothing if `ty` is not part of this schema.
    pub fn all_specs_for(&self, ty: ContainerTypeId) -> impl Iterator<Item = &PropertySpec> + '_ {
        self.container_type(ty)
            .into_iter()
            .flat_map(|ty| ty.specs())
    }

    /// Returns all types in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &ContainerType> + '_ {
        self.types.iter().map(|ty| &**ty)
    }

    /// Creates a container of type `ty` with every static property at its
    /// default value.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::UnknownType`] if `ty` is not part of this schema.
    pub fn instantiate(&self, ty: ContainerTypeId) -> Result<Container, PropertyError> {
        self.container_type(ty)
            .map(|ty| Container::new(Arc::clone(ty)))
            .ok_or(PropertyError::UnknownType(ty))
    }
}

impl core::fmt::Debug for Schema {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Schema")
            .field("count", &self.types.len())
            .field(
                "types",
                &self.types.iter().map(|ty| ty.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
