// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for registration, property access and decoding.

use alloc::string::String;
use thiserror::Error;

use crate::id::ContainerTypeId;
use crate::value::TypeTag;

/// Errors returned by schema registration and container operations.
///
/// Every fallible operation is atomic: when an error is returned, the schema
/// builder or container is left exactly as it was before the call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// A property with this name already exists on the container.
    #[error("property '{name}' already exists")]
    DuplicateName {
        /// The rejected name.
        name: String,
    },
    /// The name is empty, uses a reserved prefix, or is not an identifier.
    #[error("invalid property name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why the name was rejected.
        reason: &'static str,
    },
    /// No property with this name exists on the container.
    #[error("property '{name}' not found")]
    NotFound {
        /// The name that was looked up.
        name: String,
    },
    /// The property is locked and cannot be removed.
    #[error("property '{name}' is locked")]
    Locked {
        /// The locked property.
        name: String,
    },
    /// A value of the wrong type was supplied for a property.
    #[error("type mismatch for '{name}': expected {expected}, found {found}")]
    TypeMismatch {
        /// The property being written.
        name: String,
        /// The property's declared type.
        expected: TypeTag,
        /// The type that was supplied.
        found: TypeTag,
    },
    /// A static property with this name is already visible on the type.
    #[error("static property '{name}' is already registered for type '{type_name}'")]
    StaticConflict {
        /// The type the registration targeted.
        type_name: String,
        /// The conflicting property name.
        name: String,
    },
    /// The operation requires a dynamic property, but the name is static.
    #[error("property '{name}' is static and cannot be removed")]
    NotDynamic {
        /// The static property's name.
        name: String,
    },
    /// A container type with this name is already defined.
    #[error("container type '{name}' is already defined")]
    DuplicateType {
        /// The rejected type name.
        name: String,
    },
    /// The container type id does not belong to this schema.
    #[error("unknown container type {0:?}")]
    UnknownType(ContainerTypeId),
}

/// Errors returned by a [`ValueCodec`](crate::ValueCodec) when decoding.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The encoded text is not a valid rendition of the requested type.
    #[error("cannot decode {text:?} as {expected}")]
    Malformed {
        /// The type decoding was attempted for.
        expected: TypeTag,
        /// The offending encoded text.
        text: String,
    },
    /// The encoded value carries a different type than requested.
    #[error("encoded value has type {found}, expected {expected}")]
    WrongType {
        /// The type decoding was attempted for.
        expected: TypeTag,
        /// The type carried by the encoded value.
        found: TypeTag,
    },
}

/// A syntax error in the record text format.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct FormatError {
    /// 1-based line number.
    pub line: usize,
    /// What went wrong.
    pub kind: FormatErrorKind,
}

/// The kind of a [`FormatError`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormatErrorKind {
    /// The text does not start with `properties <count>`.
    #[error("expected `properties <count>` header")]
    MissingHeader,
    /// A required field is missing from a record line.
    #[error("missing {0}")]
    MissingField(&'static str),
    /// A token appeared where it does not belong.
    #[error("unexpected {0}")]
    Unexpected(String),
    /// A quoted string has no closing quote.
    #[error("unterminated string")]
    UnterminatedString,
    /// A quoted string uses an unsupported escape.
    #[error("unknown escape `\\{0}`")]
    BadEscape(char),
    /// The flag bits are not a valid [`PropertyFlags`](crate::PropertyFlags) value.
    #[error("invalid flag bits `{0}`")]
    BadFlags(String),
    /// The number of record lines differs from the header.
    #[error("header declares {declared} records, found {found}")]
    CountMismatch {
        /// Count from the header.
        declared: usize,
        /// Record lines actually present.
        found: usize,
    },
    /// The text ends without the closing `end` line.
    #[error("missing `end` line")]
    MissingEnd,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_property() {
        let err = PropertyError::Locked {
            name: "ClassificationCode".into(),
        };
        assert_eq!(err.to_string(), "property 'ClassificationCode' is locked");

        let err = PropertyError::TypeMismatch {
            name: "Height".into(),
            expected: TypeTag::Float,
            found: TypeTag::String,
        };
        assert_eq!(
            err.to_string(),
            "type mismatch for 'Height': expected Float, found String"
        );
    }

    #[test]
    fn decode_error_message() {
        let err = DecodeError::Malformed {
            expected: TypeTag::Integer,
            text: "twelve".into(),
        };
        assert_eq!(err.to_string(), "cannot decode \"twelve\" as Integer");
    }

    #[test]
    fn format_error_carries_line() {
        let err = FormatError {
            line: 4,
            kind: FormatErrorKind::CountMismatch {
                declared: 3,
                found: 2,
            },
        };
        assert_eq!(err.to_string(), "line 4: header declares 3 records, found 2");
    }
}
