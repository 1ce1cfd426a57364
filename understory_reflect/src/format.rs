// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A line-oriented text format for [`PropertyRecord`]s.
//!
//! ```text
//! properties 3
//! Height Float "2750"
//! Material String "Brick"
//! ClassificationCode String "Pr_20_31" dynamic "Properties" "IFC reference" 4
//! end
//! ```
//!
//! Each record line holds the property name, the type tag and the quoted
//! value. Identifier names are written bare; any other name is quoted.
//! Dynamic records append `dynamic`, the quoted group and
//! documentation, and the status flag bits. Quoted strings escape `\`, `"`,
//! newline, carriage return and tab with a backslash, so every record stays
//! on one line. Blank lines are ignored.
//!
//! Records whose type tag this build does not know are skipped with a
//! warning; they still count towards the header.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write};

use crate::error::{FormatError, FormatErrorKind};
use crate::flags::PropertyFlags;
use crate::serialize::{DynamicDecl, PropertyRecord};
use crate::spec::validate_name;
use crate::value::TypeTag;

const HEADER: &str = "properties";
const END: &str = "end";
const DYNAMIC: &str = "dynamic";

/// Writes `records` in the text format.
pub fn write_records<W: Write>(records: &[PropertyRecord], out: &mut W) -> fmt::Result {
    writeln!(out, "{HEADER} {}", records.len())?;
    for record in records {
        if validate_name(&record.name).is_ok() {
            out.write_str(&record.name)?;
        } else {
            write_quoted(out, &record.name)?;
        }
        write!(out, " {} ", record.type_tag.name())?;
        write_quoted(out, &record.value)?;
        if let Some(decl) = &record.dynamic {
            write!(out, " {DYNAMIC} ")?;
            write_quoted(out, &decl.group)?;
            out.write_char(' ')?;
            write_quoted(out, &decl.documentation)?;
            write!(out, " {}", decl.flags.bits())?;
        }
        out.write_char('\n')?;
    }
    writeln!(out, "{END}")
}

/// Renders `records` in the text format.
#[must_use]
pub fn records_to_string(records: &[PropertyRecord]) -> String {
    let mut out = String::new();
    write_records(records, &mut out).expect("writing to a String cannot fail");
    out
}

/// Parses records from the text format.
///
/// # Errors
///
/// Returns a [`FormatError`] with the offending line for a missing or bad
/// header, a malformed record line, a record count that differs from the
/// header, a missing `end` line, or content after it.
pub fn read_records(text: &str) -> Result<Vec<PropertyRecord>, FormatError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (header_line, header) = lines.next().ok_or(FormatError {
        line: 1,
        kind: FormatErrorKind::MissingHeader,
    })?;
    let declared = parse_header(header).map_err(|kind| FormatError {
        line: header_line,
        kind,
    })?;

    let mut records = Vec::with_capacity(declared.min(1024));
    let mut found = 0;
    let mut last_line = header_line;
    while let Some((line, content)) = lines.next() {
        last_line = line;
        if content == END {
            if found != declared {
                return Err(FormatError {
                    line,
                    kind: FormatErrorKind::CountMismatch { declared, found },
                });
            }
            if let Some((line, content)) = lines.next() {
                return Err(FormatError {
                    line,
                    kind: FormatErrorKind::Unexpected(format!("`{content}` after `{END}`")),
                });
            }
            return Ok(records);
        }
        found += 1;
        let (record, type_name) =
            parse_record(content).map_err(|kind| FormatError { line, kind })?;
        match record {
            Some(record) => records.push(record),
            None => tracing::warn!(line, type_name, "skipping record with unknown type tag"),
        }
    }
    Err(FormatError {
        line: last_line + 1,
        kind: FormatErrorKind::MissingEnd,
    })
}

fn parse_header(line: &str) -> Result<usize, FormatErrorKind> {
    let mut tokens = Tokens::new(line);
    if tokens.word("header")? != HEADER {
        return Err(FormatErrorKind::MissingHeader);
    }
    let count = tokens.word("record count")?;
    let count = count
        .parse()
        .map_err(|_| FormatErrorKind::Unexpected(format!("record count `{count}`")))?;
    tokens.finish()?;
    Ok(count)
}

/// Parses one record line; the record is `None` if its type tag is unknown.
fn parse_record(line: &str) -> Result<(Option<PropertyRecord>, &str), FormatErrorKind> {
    let mut tokens = Tokens::new(line);
    let name = tokens.text("name")?;
    let type_name = tokens.word("type tag")?;
    let value = tokens.quoted("value")?;
    let dynamic = match tokens.next_token()? {
        None => None,
        Some(Token::Word(DYNAMIC)) => {
            let group = tokens.quoted("group")?;
            let documentation = tokens.quoted("documentation")?;
            let bits = tokens.word("flag bits")?;
            let flags = bits
                .parse()
                .ok()
                .and_then(PropertyFlags::from_bits)
                .ok_or_else(|| FormatErrorKind::BadFlags(bits.into()))?;
            tokens.finish()?;
            Some(DynamicDecl {
                group,
                documentation,
                flags,
            })
        }
        Some(token) => return Err(FormatErrorKind::Unexpected(token.describe())),
    };
    let record = TypeTag::from_name(type_name).map(|type_tag| PropertyRecord {
        name,
        type_tag,
        value,
        dynamic,
    });
    Ok((record, type_name))
}

fn write_quoted<W: Write>(out: &mut W, text: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in text.chars() {
        match c {
            '\\' => out.write_str("\\\\")?,
            '"' => out.write_str("\\\"")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            _ => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

enum Token<'a> {
    Word(&'a str),
    Quoted(String),
}

impl Token<'_> {
    fn describe(&self) -> String {
        match self {
            Self::Word(word) => format!("`{word}`"),
            Self::Quoted(text) => format!("string {text:?}"),
        }
    }
}

/// Splits a line into bare words and quoted strings.
struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    fn new(line: &'a str) -> Self {
        Self { rest: line }
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, FormatErrorKind> {
        self.rest = self.rest.trim_start();
        if self.rest.is_empty() {
            return Ok(None);
        }
        let Some(body) = self.rest.strip_prefix('"') else {
            let end = self.rest.find(char::is_whitespace).unwrap_or(self.rest.len());
            let (word, rest) = self.rest.split_at(end);
            self.rest = rest;
            return Ok(Some(Token::Word(word)));
        };
        let mut text = String::new();
        let mut chars = body.char_indices();
        while let Some((at, c)) = chars.next() {
            match c {
                '"' => {
                    self.rest = &body[at + 1..];
                    return Ok(Some(Token::Quoted(text)));
                }
                '\\' => match chars.next() {
                    Some((_, '\\')) => text.push('\\'),
                    Some((_, '"')) => text.push('"'),
                    Some((_, 'n')) => text.push('\n'),
                    Some((_, 'r')) => text.push('\r'),
                    Some((_, 't')) => text.push('\t'),
                    Some((_, other)) => return Err(FormatErrorKind::BadEscape(other)),
                    None => return Err(FormatErrorKind::UnterminatedString),
                },
                _ => text.push(c),
            }
        }
        Err(FormatErrorKind::UnterminatedString)
    }

    fn word(&mut self, what: &'static str) -> Result<&'a str, FormatErrorKind> {
        match self.next_token()? {
            Some(Token::Word(word)) => Ok(word),
            Some(token) => Err(FormatErrorKind::Unexpected(token.describe())),
            None => Err(FormatErrorKind::MissingField(what)),
        }
    }

    fn quoted(&mut self, what: &'static str) -> Result<String, FormatErrorKind> {
        match self.next_token()? {
            Some(Token::Quoted(text)) => Ok(text),
            Some(token) => Err(FormatErrorKind::Unexpected(token.describe())),
            None => Err(FormatErrorKind::MissingField(what)),
        }
    }

    /// Takes a bare word or a quoted string.
    fn text(&mut self, what: &'static str) -> Result<String, FormatErrorKind> {
        match self.next_token()? {
            Some(Token::Word(word)) => Ok(word.into()),
            Some(Token::Quoted(text)) => Ok(text),
            None => Err(FormatErrorKind::MissingField(what)),
        }
    }

    fn finish(&mut self) -> Result<(), FormatErrorKind> {
        match self.next_token()? {
            None => Ok(()),
            Some(token) => Err(FormatErrorKind::Unexpected(token.describe())),
        }
    }
}
