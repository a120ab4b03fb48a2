//! C-string constants as written by the debugger.
//!
//! Decoding understands the usual C escapes plus octal (`\303`) and hex
//! (`\xc3`) byte escapes; the decoded bytes are reassembled as UTF-8 so that
//! non-ASCII text escaped byte-by-byte survives intact. Unknown escapes keep
//! the escaped character.

use crate::cursor::Cursor;
use crate::error::ParseError;

/// Decodes a complete quoted C-string such as `"Starting program\n"`.
///
/// # Errors
///
/// Returns a [`ParseError`] when the text is not a single well-formed quoted
/// string.
pub fn unquote(text: &str) -> Result<String, ParseError> {
    let mut cursor = Cursor::new(text);
    let decoded = parse(&mut cursor)?;
    if cursor.is_at_end() {
        Ok(decoded)
    } else {
        Err(ParseError::TrailingInput {
            offset: cursor.offset(),
        })
    }
}

/// Encodes `text` as a quoted C-string that [`unquote`] decodes back to `text`.
#[must_use]
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            control if control.is_ascii_control() => {
                quoted.push_str(&format!("\\{:03o}", u32::from(control)));
            }
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

pub(crate) fn parse(cursor: &mut Cursor<'_>) -> Result<String, ParseError> {
    let start = cursor.offset();
    match cursor.bump() {
        Some(b'"') => {}
        Some(found) => {
            return Err(ParseError::UnexpectedChar {
                found: char::from(found),
                offset: start,
            });
        }
        None => return Err(ParseError::UnexpectedEnd { offset: start }),
    }

    let mut bytes = Vec::new();
    loop {
        match cursor.bump() {
            None => return Err(ParseError::UnterminatedString { offset: start }),
            Some(b'"') => break,
            Some(b'\\') => {
                if let Err(error) = decode_escape(cursor, &mut bytes, start) {
                    skip_past_closing_quote(cursor);
                    return Err(error);
                }
            }
            Some(byte) => bytes.push(byte),
        }
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Moves past the rest of a string whose escape failed to decode, so that
/// callers resume after the closing quote rather than inside the string.
fn skip_past_closing_quote(cursor: &mut Cursor<'_>) {
    while let Some(byte) = cursor.bump() {
        match byte {
            b'"' => return,
            b'\\' => {
                cursor.bump();
            }
            _ => {}
        }
    }
}

fn decode_escape(
    cursor: &mut Cursor<'_>,
    bytes: &mut Vec<u8>,
    string_start: usize,
) -> Result<(), ParseError> {
    let escape_offset = cursor.offset().saturating_sub(1);
    let Some(escaped) = cursor.bump() else {
        return Err(ParseError::UnterminatedString {
            offset: string_start,
        });
    };

    let decoded = match escaped {
        b'n' => b'\n',
        b't' => b'\t',
        b'r' => b'\r',
        b'a' => 0x07,
        b'b' => 0x08,
        b'f' => 0x0c,
        b'v' => 0x0b,
        b'e' => 0x1b,
        b'0'..=b'7' => octal_escape(cursor, escaped, escape_offset)?,
        b'x' => hex_escape(cursor, escape_offset)?,
        other => other,
    };
    bytes.push(decoded);
    Ok(())
}

fn octal_escape(cursor: &mut Cursor<'_>, first: u8, offset: usize) -> Result<u8, ParseError> {
    let mut value = u32::from(first - b'0');
    for _ in 0..2 {
        match cursor.peek() {
            Some(digit @ b'0'..=b'7') => {
                cursor.bump();
                value = value * 8 + u32::from(digit - b'0');
            }
            _ => break,
        }
    }
    u8::try_from(value).map_err(|_| ParseError::InvalidEscape { offset })
}

fn hex_escape(cursor: &mut Cursor<'_>, offset: usize) -> Result<u8, ParseError> {
    let mut value: u32 = 0;
    let mut digits = 0;
    while digits < 2 {
        let Some(digit) = cursor.peek().and_then(|byte| char::from(byte).to_digit(16)) else {
            break;
        };
        cursor.bump();
        value = value * 16 + digit;
        digits += 1;
    }
    if digits == 0 {
        return Err(ParseError::InvalidEscape { offset });
    }
    u8::try_from(value).map_err(|_| ParseError::InvalidEscape { offset })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(r#""plain""#, "plain")]
    #[case(r#""Starting program\n""#, "Starting program\n")]
    #[case(r#""tab\there""#, "tab\there")]
    #[case(r#""say \"hi\"""#, "say \"hi\"")]
    #[case(r#""back\\slash""#, "back\\slash")]
    #[case(r#""\303\251t\303\251""#, "été")]
    #[case(r#""\xc3\xa9""#, "é")]
    #[case(r#""\101\102""#, "AB")]
    #[case(r#""\q""#, "q")]
    #[case(r#""""#, "")]
    fn decodes_escapes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(unquote(input).ok().as_deref(), Some(expected));
    }

    #[rstest]
    fn rejects_unterminated_string() {
        assert_eq!(
            unquote(r#""no end"#),
            Err(ParseError::UnterminatedString { offset: 0 })
        );
    }

    #[rstest]
    fn rejects_missing_opening_quote() {
        assert!(matches!(
            unquote("bare"),
            Err(ParseError::UnexpectedChar { found: 'b', .. })
        ));
    }

    #[rstest]
    fn rejects_hex_escape_without_digits() {
        assert_eq!(
            unquote(r#""\xzz""#),
            Err(ParseError::InvalidEscape { offset: 1 })
        );
    }

    #[rstest]
    #[case(r#""\xzz" tail"#, 6)]
    #[case(r#""\400 and \"more\"" tail"#, 19)]
    fn invalid_escape_leaves_cursor_after_string(#[case] input: &str, #[case] resume: usize) {
        let mut cursor = Cursor::new(input);

        assert!(matches!(
            parse(&mut cursor),
            Err(ParseError::InvalidEscape { offset: 1 })
        ));
        assert_eq!(cursor.offset(), resume);
    }

    #[rstest]
    #[case("plain")]
    #[case("quote \" and backslash \\")]
    #[case("line\nbreak\tand\rreturn")]
    #[case("bell\u{7} and escape\u{1b}")]
    #[case("unicode ✓")]
    fn quote_inverts_unquote(#[case] text: &str) {
        assert_eq!(unquote(&quote(text)).ok().as_deref(), Some(text));
    }
}
