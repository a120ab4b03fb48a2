//! Recursive-descent parser for the MI value grammar.
//!
//! ```text
//! value  -> const | tuple | list
//! const  -> c-string
//! tuple  -> "{}" | "{" result ( "," result )* "}"
//! list   -> "[]" | "[" value ( "," value )* "]" | "[" result ( "," result )* "]"
//! result -> name "=" value
//! ```
//!
//! The debugger's output is not under our control, so a child that fails to
//! parse is dropped from its parent, the error is recorded, and parsing
//! resumes at the next `,` or closing bracket on the same nesting level. A
//! container left open at the end of the input is closed with the children
//! read so far.

use crate::cstring;
use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::value::{MiEntry, MiValue};

/// Parses a single MI value such as `{addr="0x1",args=[]}`.
///
/// Malformed children are dropped; use [`parse_value_lenient`] to inspect
/// them.
///
/// # Errors
///
/// Returns a [`ParseError`] when the text does not start with a value or when
/// input remains after the value.
pub fn parse_value(text: &str) -> Result<MiValue, ParseError> {
    parse_value_lenient(text).0
}

/// Parses a single MI value and reports every dropped fragment.
#[must_use]
pub fn parse_value_lenient(text: &str) -> (Result<MiValue, ParseError>, Vec<ParseError>) {
    let mut cursor = Cursor::new(text);
    let mut dropped = Vec::new();
    let parsed = value(&mut cursor, &mut dropped).and_then(|parsed_value| {
        if cursor.is_at_end() {
            Ok(parsed_value)
        } else {
            Err(ParseError::TrailingInput {
                offset: cursor.offset(),
            })
        }
    });
    (parsed, dropped)
}

pub(crate) fn value(
    cursor: &mut Cursor<'_>,
    dropped: &mut Vec<ParseError>,
) -> Result<MiValue, ParseError> {
    let offset = cursor.offset();
    match cursor.peek() {
        Some(b'"') => cstring::parse(cursor).map(MiValue::Const),
        Some(b'{') => {
            cursor.bump();
            Ok(MiValue::Tuple(container(cursor, dropped, b'}')))
        }
        Some(b'[') => {
            cursor.bump();
            Ok(MiValue::List(container(cursor, dropped, b']')))
        }
        Some(found) => Err(ParseError::UnexpectedChar {
            found: char::from(found),
            offset,
        }),
        None => Err(ParseError::UnexpectedEnd { offset }),
    }
}

/// Parses `name=value` or a bare value.
pub(crate) fn entry(
    cursor: &mut Cursor<'_>,
    dropped: &mut Vec<ParseError>,
) -> Result<MiEntry, ParseError> {
    let name_length = cursor.run_length(is_name_char);
    if name_length == 0 {
        return value(cursor, dropped).map(MiEntry::unnamed);
    }
    if cursor.peek_at(name_length) != Some(b'=') {
        return Err(ParseError::MissingName {
            offset: cursor.offset(),
        });
    }
    let name = cursor.take_while(is_name_char).to_owned();
    cursor.bump();
    value(cursor, dropped).map(|parsed| MiEntry::named(name, parsed))
}

/// Parses the members of a container whose opening bracket was consumed.
fn container(cursor: &mut Cursor<'_>, dropped: &mut Vec<ParseError>, close: u8) -> Vec<MiEntry> {
    let mut entries = Vec::new();
    if cursor.eat(close) {
        return entries;
    }

    loop {
        match entry(cursor, dropped) {
            Ok(parsed) => entries.push(parsed),
            Err(error) => {
                dropped.push(error);
                recover(cursor);
            }
        }

        match cursor.peek() {
            Some(b',') => {
                cursor.bump();
            }
            Some(b'}' | b']') | None => {
                // A mismatched closer still ends this container.
                cursor.bump();
                return entries;
            }
            Some(found) => {
                dropped.push(ParseError::UnexpectedChar {
                    found: char::from(found),
                    offset: cursor.offset(),
                });
                recover(cursor);
                if cursor.eat(b',') {
                    continue;
                }
                cursor.bump();
                return entries;
            }
        }
    }
}

/// Parses `entry ( "," entry )*` up to the end of the input.
///
/// Used for the top level of result and async records, which are not
/// enclosed in brackets.
pub(crate) fn body(cursor: &mut Cursor<'_>, dropped: &mut Vec<ParseError>) -> Vec<MiEntry> {
    let mut entries = Vec::new();
    while !cursor.is_at_end() {
        match entry(cursor, dropped) {
            Ok(parsed) => entries.push(parsed),
            Err(error) => {
                dropped.push(error);
                recover(cursor);
            }
        }

        match cursor.peek() {
            Some(b',') | None => {
                cursor.eat(b',');
            }
            Some(found) => {
                dropped.push(ParseError::UnexpectedChar {
                    found: char::from(found),
                    offset: cursor.offset(),
                });
                // Skip the stray byte so the loop always makes progress.
                cursor.bump();
                recover(cursor);
                cursor.eat(b',');
            }
        }
    }
    entries
}

/// Skips to the next `,`, `}` or `]` on the current nesting level.
fn recover(cursor: &mut Cursor<'_>) {
    let mut depth = 0usize;
    let mut in_string = false;
    while let Some(byte) = cursor.peek() {
        if in_string {
            match byte {
                b'\\' => {
                    cursor.bump();
                }
                b'"' => in_string = false,
                _ => {}
            }
            cursor.bump();
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' if depth == 0 => return,
            b'}' | b']' => depth -= 1,
            b',' if depth == 0 => return,
            _ => {}
        }
        cursor.bump();
    }
}

/// Characters permitted in a result name.
pub(crate) const fn is_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_'
}
