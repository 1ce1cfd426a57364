// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value encoding for records.
//!
//! The persistence layer decides how a [`Value`] is represented inside a
//! record. [`TextCodec`] renders values as plain strings (the default used by
//! [`save`](crate::save) and [`restore`](crate::restore));
//! [`IdentityCodec`] keeps them as [`Value`]s, which is convenient together with
//! the `serde` feature.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Write;

use crate::error::DecodeError;
use crate::value::{TypeTag, Value};

/// Encodes and decodes property values.
pub trait ValueCodec {
    /// The encoded representation.
    type Encoded;

    /// Encodes a value.
    fn encode(&self, value: &Value) -> Self::Encoded;

    /// Decodes `encoded` as a value of type `value_type`.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if `encoded` cannot be read as `value_type`.
    fn decode(&self, value_type: TypeTag, encoded: &Self::Encoded) -> Result<Value, DecodeError>;
}

/// Keeps values as they are; decoding only checks the type.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdentityCodec;

impl ValueCodec for IdentityCodec {
    type Encoded = Value;

    fn encode(&self, value: &Value) -> Value {
        value.clone()
    }

    fn decode(&self, value_type: TypeTag, encoded: &Value) -> Result<Value, DecodeError> {
        if encoded.type_tag() == value_type {
            Ok(encoded.clone())
        } else {
            Err(DecodeError::WrongType {
                expected: value_type,
                found: encoded.type_tag(),
            })
        }
    }
}

/// Renders values as strings.
///
/// | Type | Text |
/// |------|------|
/// | `Bool` | `true` / `false` |
/// | `Integer`, `Float` | decimal, as printed by `Display` |
/// | `String` | verbatim |
/// | `StringList` | item count, then each item after a `;`, with `\` and `;` escaped by `\` |
/// | `Vector` | three floats separated by single spaces |
///
/// Decoding is driven by the requested type, not by what the text looks like,
/// so an integer rendition decodes fine as a `Float`.
///
/// ```rust
/// use understory_reflect::{TextCodec, TypeTag, Value, ValueCodec};
///
/// let list = Value::StringList(vec!["a;b".into(), String::new()]);
/// let text = TextCodec.encode(&list);
/// assert_eq!(text, r"2;a\;b;");
/// assert_eq!(TextCodec.decode(TypeTag::StringList, &text), Ok(list));
///
/// assert_eq!(TextCodec.decode(TypeTag::Float, &"3000".into()), Ok(Value::Float(3000.0)));
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct TextCodec;

impl ValueCodec for TextCodec {
    type Encoded = String;

    fn encode(&self, value: &Value) -> String {
        match value {
            Value::Bool(v) => v.to_string(),
            Value::Integer(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::String(v) => v.clone(),
            Value::StringList(items) => {
                let mut out = items.len().to_string();
                for item in items {
                    out.push(';');
                    for c in item.chars() {
                        if matches!(c, '\\' | ';') {
                            out.push('\\');
                        }
                        out.push(c);
                    }
                }
                out
            }
            Value::Vector([x, y, z]) => {
                let mut out = String::new();
                write!(out, "{x} {y} {z}").expect("writing to a String cannot fail");
                out
            }
        }
    }

    fn decode(&self, value_type: TypeTag, encoded: &String) -> Result<Value, DecodeError> {
        let text = encoded.as_str();
        let malformed = || DecodeError::Malformed {
            expected: value_type,
            text: encoded.clone(),
        };
        match value_type {
            TypeTag::Bool => match text {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(malformed()),
            },
            TypeTag::Integer => text.parse().map(Value::Integer).map_err(|_| malformed()),
            TypeTag::Float => text.parse().map(Value::Float).map_err(|_| malformed()),
            TypeTag::String => Ok(Value::String(encoded.clone())),
            TypeTag::StringList => decode_list(text)
                .map(Value::StringList)
                .ok_or_else(malformed),
            TypeTag::Vector => {
                let mut parts = text.split(' ').map(str::parse::<f64>);
                match (parts.next(), parts.next(), parts.next(), parts.next()) {
                    (Some(Ok(x)), Some(Ok(y)), Some(Ok(z)), None) => Ok(Value::Vector([x, y, z])),
                    _ => Err(malformed()),
                }
            }
        }
    }
}

fn decode_list(text: &str) -> Option<Vec<String>> {
    let (count, mut rest) = match text.split_once(';') {
        Some((count, rest)) => (count.parse::<usize>().ok()?, Some(rest)),
        None => (text.parse::<usize>().ok()?, None),
    };
    let mut items = Vec::with_capacity(count.min(64));
    while let Some(remaining) = rest {
        let mut item = String::new();
        let mut chars = remaining.char_indices();
        rest = None;
        while let Some((at, c)) = chars.next() {
            match c {
                '\\' => item.push(chars.next()?.1),
                ';' => {
                    rest = Some(&remaining[at + 1..]);
                    break;
                }
                _ => item.push(c),
            }
        }
        items.push(item);
    }
    (items.len() == count).then_some(items)
}
