// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property values.
//!
//! This module provides [`Value`], the tagged union every property slot holds,
//! [`TypeTag`] naming each variant, and the [`PropertyValue`] trait mapping
//! Rust types onto both.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// The declared type of a property.
///
/// Each tag has a canonical name (see [`TypeTag::name`]) used by records and
/// the text format.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeTag {
    /// `bool`
    Bool,
    /// `i64`
    Integer,
    /// `f64`
    Float,
    /// `String`
    String,
    /// `Vec<String>`
    StringList,
    /// `[f64; 3]`
    Vector,
}

impl TypeTag {
    /// All tags, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Bool,
        Self::Integer,
        Self::Float,
        Self::String,
        Self::StringList,
        Self::Vector,
    ];

    /// Returns the canonical name of this tag.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::String => "String",
            Self::StringList => "StringList",
            Self::Vector => "Vector",
        }
    }

    /// Looks up a tag by its canonical name.
    ///
    /// ```rust
    /// use understory_reflect::TypeTag;
    ///
    /// assert_eq!(TypeTag::from_name("Float"), Some(TypeTag::Float));
    /// assert_eq!(TypeTag::from_name("Quaternion"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.name() == name)
    }

    /// Returns the value a freshly added property of this type starts with.
    #[must_use]
    pub fn default_value(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Integer => Value::Integer(0),
            Self::Float => Value::Float(0.0),
            Self::String => Value::String(String::new()),
            Self::StringList => Value::StringList(Vec::new()),
            Self::Vector => Value::Vector([0.0; 3]),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A property value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
    /// An ordered list of strings.
    StringList(Vec<String>),
    /// A 3D vector.
    Vector([f64; 3]),
}

impl Value {
    /// Returns the tag of this value's variant.
    #[must_use]
    pub const fn type_tag(&self) -> TypeTag {
        match self {
            Self::Bool(_) => TypeTag::Bool,
            Self::Integer(_) => TypeTag::Integer,
            Self::Float(_) => TypeTag::Float,
            Self::String(_) => TypeTag::String,
            Self::StringList(_) => TypeTag::StringList,
            Self::Vector(_) => TypeTag::Vector,
        }
    }

    /// Borrows the contents as `T`, if this value holds a `T`.
    ///
    /// ```rust
    /// use understory_reflect::Value;
    ///
    /// let value = Value::from(42_i64);
    /// assert_eq!(value.get::<i64>(), Some(&42));
    /// assert_eq!(value.get::<f64>(), None);
    /// ```
    #[must_use]
    #[inline]
    pub fn get<T: PropertyValue>(&self) -> Option<&T> {
        T::from_value(self)
    }

    /// Returns `true` if both values are identical.
    ///
    /// Floats compare by bit pattern: `-0.0` differs from `0.0` and a `NaN`
    /// equals itself.
    pub(crate) fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Vector(a), Self::Vector(b)) => {
                a.iter().zip(b).all(|(a, b)| a.to_bits() == b.to_bits())
            }
            _ => self == other,
        }
    }
}

/// A Rust type that can be stored in a property.
///
/// Implemented for `bool`, `i64`, `f64`, `String`, `Vec<String>` and
/// `[f64; 3]`.
pub trait PropertyValue: Clone + 'static {
    /// The tag properties of this type are declared with.
    const TYPE: TypeTag;

    /// Wraps `self` in a [`Value`].
    fn into_value(self) -> Value;

    /// Borrows the contents of `value` if it holds this type.
    fn from_value(value: &Value) -> Option<&Self>;
}

macro_rules! impl_property_value {
    ($ty:ty, $variant:ident) => {
        impl PropertyValue for $ty {
            const TYPE: TypeTag = TypeTag::$variant;

            #[inline]
            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            #[inline]
            fn from_value(value: &Value) -> Option<&Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Value {
            #[inline]
            fn from(value: $ty) -> Self {
                Self::$variant(value)
            }
        }
    };
}

impl_property_value!(bool, Bool);
impl_property_value!(i64, Integer);
impl_property_value!(f64, Float);
impl_property_value!(String, String);
impl_property_value!(Vec<String>, StringList);
impl_property_value!([f64; 3], Vector);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn tags_round_trip_through_names() {
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::from_name(tag.name()), Some(tag));
        }
        assert_eq!(TypeTag::from_name("float"), None);
    }

    #[test]
    fn default_values_carry_their_tag() {
        for tag in TypeTag::ALL {
            assert_eq!(tag.default_value().type_tag(), tag);
        }
    }

    #[test]
    fn typed_access() {
        let value = Value::from(String::from("Concrete"));
        assert!(matches!(value.type_tag(), TypeTag::String));
        assert_eq!(value.get::<String>().map(String::as_str), Some("Concrete"));
        assert_eq!(value.get::<i64>(), None);

        let list = Value::from(vec![String::from("a"), String::from("b")]);
        assert_eq!(list.get::<Vec<String>>().map(Vec::len), Some(2));

        let v = Value::from([1.0, 2.0, 3.0]);
        assert_eq!(v.get::<[f64; 3]>(), Some(&[1.0, 2.0, 3.0]));
    }

    #[test]
    fn same_as_compares_float_bits() {
        assert!(!Value::Float(-0.0).same_as(&Value::Float(0.0)));
        assert!(Value::Float(f64::NAN).same_as(&Value::Float(f64::NAN)));
        assert!(Value::Float(1.5).same_as(&Value::Float(1.5)));
        let signed = Value::Vector([0.0, -0.0, 1.0]);
        assert!(!signed.same_as(&Value::Vector([0.0, 0.0, 1.0])));
        assert!(signed.same_as(&signed));
        let nan = Value::Vector([f64::NAN, 0.0, 1.0]);
        assert!(nan.same_as(&nan));
        assert!(Value::from("a").same_as(&Value::from("a")));
        assert!(!Value::Integer(0).same_as(&Value::Float(0.0)));
    }

    #[test]
    fn property_value_tags() {
        assert_eq!(<bool as PropertyValue>::TYPE, TypeTag::Bool);
        assert_eq!(<i64 as PropertyValue>::TYPE, TypeTag::Integer);
        assert_eq!(<f64 as PropertyValue>::TYPE, TypeTag::Float);
        assert_eq!(<String as PropertyValue>::TYPE, TypeTag::String);
        assert_eq!(<Vec<String> as PropertyValue>::TYPE, TypeTag::StringList);
        assert_eq!(<[f64; 3] as PropertyValue>::TYPE, TypeTag::Vector);
    }
}
