//! Classification and parsing of complete MI output lines.
//!
//! Every line the debugger prints is one record:
//!
//! ```text
//! [token] "^" class ( "," result )*        result record
//! [token] ("*" | "+" | "=") class ( "," result )*   async record
//! ("~" | "@" | "&") c-string               stream record
//! "(gdb)"                                  prompt
//! ```
//!
//! Lines that match none of these shapes are returned as
//! [`Record::Unknown`] rather than rejected, so a chatty debugger never stops
//! the session.

use std::fmt;

use strum::{AsRefStr, Display};

use crate::cstring;
use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::parser;
use crate::value::MiValue;

/// Text the debugger prints when it is ready for the next command.
pub const PROMPT: &str = "(gdb)";

/// One classified MI output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Synchronous reply to a command (`^done`, `^error`, ...).
    Result(ResultRecord),
    /// Asynchronous exec, status or notify record.
    Async(AsyncRecord),
    /// Console, target or log text.
    Stream(StreamRecord),
    /// The `(gdb)` prompt.
    Prompt,
    /// A line that is not valid MI.
    Unknown(UnknownRecord),
}

/// A `^class,...` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    /// Token echoed from the command, if any.
    pub token: Option<u64>,
    /// Result class.
    pub class: ResultClass,
    /// Results as a tuple; empty when the record carries none.
    pub data: MiValue,
}

/// A `*class,...`, `+class,...` or `=class,...` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncRecord {
    /// Token echoed from the command, if any.
    pub token: Option<u64>,
    /// Exec, status or notify.
    pub kind: AsyncKind,
    /// Class name such as `stopped` or `thread-group-started`.
    pub class: String,
    /// Results as a tuple; empty when the record carries none.
    pub results: MiValue,
}

/// A `~"..."`, `@"..."` or `&"..."` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRecord {
    /// Which stream the text belongs to.
    pub kind: StreamKind,
    /// Unescaped text.
    pub text: String,
}

/// A line that did not match any record shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRecord {
    /// Leading token, if the line started with digits.
    pub token: Option<u64>,
    /// First character after the token.
    pub discriminator: Option<char>,
    /// The line as received.
    pub line: String,
}

/// Result record classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ResultClass {
    /// `^done`
    Done,
    /// `^running`
    Running,
    /// `^connected`
    Connected,
    /// `^error`
    Error,
    /// `^exit`
    Exit,
    /// Any other class word.
    Unknown,
}

impl ResultClass {
    /// Maps a class word to its variant.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "done" => Self::Done,
            "running" => Self::Running,
            "connected" => Self::Connected,
            "error" => Self::Error,
            "exit" => Self::Exit,
            _ => Self::Unknown,
        }
    }
}

/// Async record families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum AsyncKind {
    /// `*`: changes in the target's execution state.
    Exec,
    /// `+`: progress of long-running operations.
    Status,
    /// `=`: supplementary notifications.
    Notify,
}

impl AsyncKind {
    const fn from_discriminator(byte: u8) -> Option<Self> {
        match byte {
            b'*' => Some(Self::Exec),
            b'+' => Some(Self::Status),
            b'=' => Some(Self::Notify),
            _ => None,
        }
    }
}

/// Stream record channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum StreamKind {
    /// `~`: debugger console output.
    Console,
    /// `@`: output of the program being debugged.
    Target,
    /// `&`: the debugger's own log messages.
    Log,
}

impl StreamKind {
    const fn from_discriminator(byte: u8) -> Option<Self> {
        match byte {
            b'~' => Some(Self::Console),
            b'@' => Some(Self::Target),
            b'&' => Some(Self::Log),
            _ => None,
        }
    }
}

/// A record together with the fragments dropped while parsing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    /// The classified record.
    pub record: Record,
    /// Value fragments that failed to parse and were omitted.
    pub dropped: Vec<ParseError>,
}

impl ParsedRecord {
    const fn clean(record: Record) -> Self {
        Self {
            record,
            dropped: Vec::new(),
        }
    }
}

/// Parses one complete line (without its terminator).
///
/// # Errors
///
/// Returns a [`ParseError`] when a stream record's C-string is malformed.
/// Malformed result and async payloads never fail the record; the affected
/// children are listed in [`ParsedRecord::dropped`] instead.
pub fn parse_record(line: &str) -> Result<ParsedRecord, ParseError> {
    if line.trim_end() == PROMPT {
        return Ok(ParsedRecord::clean(Record::Prompt));
    }

    let mut cursor = Cursor::new(line);
    let token = parse_token(&mut cursor);
    let Some(discriminator) = cursor.peek() else {
        return Ok(ParsedRecord::clean(unknown(line, token, None)));
    };

    if discriminator == b'^' {
        cursor.bump();
        return Ok(parse_result(&mut cursor, token));
    }
    if let Some(kind) = AsyncKind::from_discriminator(discriminator) {
        cursor.bump();
        return Ok(parse_async(&mut cursor, token, kind));
    }
    if let Some(kind) = StreamKind::from_discriminator(discriminator) {
        cursor.bump();
        let text = cstring::unquote(cursor.rest()).map_err(|error| shift(error, cursor.offset()))?;
        return Ok(ParsedRecord::clean(Record::Stream(StreamRecord {
            kind,
            text,
        })));
    }

    let found = cursor.rest().chars().next();
    Ok(ParsedRecord::clean(unknown(line, token, found)))
}

impl fmt::Display for Record {
    /// Writes the canonical MI line for the record.
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Result(result) => {
                write_token(formatter, result.token)?;
                write!(formatter, "^{}", result.class)?;
                write_payload(formatter, &result.data)
            }
            Self::Async(notification) => {
                write_token(formatter, notification.token)?;
                let discriminator = match notification.kind {
                    AsyncKind::Exec => '*',
                    AsyncKind::Status => '+',
                    AsyncKind::Notify => '=',
                };
                write!(formatter, "{discriminator}{}", notification.class)?;
                write_payload(formatter, &notification.results)
            }
            Self::Stream(stream) => {
                let discriminator = match stream.kind {
                    StreamKind::Console => '~',
                    StreamKind::Target => '@',
                    StreamKind::Log => '&',
                };
                write!(formatter, "{discriminator}{}", cstring::quote(&stream.text))
            }
            Self::Prompt => formatter.write_str(PROMPT),
            Self::Unknown(unknown_record) => formatter.write_str(&unknown_record.line),
        }
    }
}

fn write_token(formatter: &mut fmt::Formatter<'_>, token: Option<u64>) -> fmt::Result {
    match token {
        Some(value) => write!(formatter, "{value}"),
        None => Ok(()),
    }
}

fn write_payload(formatter: &mut fmt::Formatter<'_>, payload: &MiValue) -> fmt::Result {
    for entry in payload.entries() {
        write!(formatter, ",{entry}")?;
    }
    Ok(())
}

fn parse_token(cursor: &mut Cursor<'_>) -> Option<u64> {
    let digits = cursor.take_while(|byte| byte.is_ascii_digit());
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

fn parse_result(cursor: &mut Cursor<'_>, token: Option<u64>) -> ParsedRecord {
    let class = ResultClass::from_keyword(cursor.take_while(|byte| byte.is_ascii_lowercase()));
    let (data, dropped) = parse_payload(cursor);
    ParsedRecord {
        record: Record::Result(ResultRecord { token, class, data }),
        dropped,
    }
}

fn parse_async(cursor: &mut Cursor<'_>, token: Option<u64>, kind: AsyncKind) -> ParsedRecord {
    let class = cursor
        .take_while(|byte| byte.is_ascii_lowercase() || byte == b'-')
        .to_owned();
    let (results, dropped) = parse_payload(cursor);
    ParsedRecord {
        record: Record::Async(AsyncRecord {
            token,
            kind,
            class,
            results,
        }),
        dropped,
    }
}

/// Parses `( "," result )*` after a class word into a tuple.
///
/// Anything other than a comma after the class word leaves the payload empty.
fn parse_payload(cursor: &mut Cursor<'_>) -> (MiValue, Vec<ParseError>) {
    let mut dropped = Vec::new();
    if cursor.is_at_end() {
        return (MiValue::empty_tuple(), dropped);
    }
    if !cursor.eat(b',') {
        let offset = cursor.offset();
        if let Some(found) = cursor.rest().chars().next() {
            dropped.push(ParseError::UnexpectedChar { found, offset });
        }
        return (MiValue::empty_tuple(), dropped);
    }
    let entries = parser::body(cursor, &mut dropped);
    (MiValue::Tuple(entries), dropped)
}

fn unknown(line: &str, token: Option<u64>, discriminator: Option<char>) -> Record {
    Record::Unknown(UnknownRecord {
        token,
        discriminator,
        line: line.to_owned(),
    })
}

/// Rebases an error offset from a sub-slice onto the whole line.
const fn shift(error: ParseError, base: usize) -> ParseError {
    match error {
        ParseError::UnexpectedEnd { offset } => ParseError::UnexpectedEnd {
            offset: offset + base,
        },
        ParseError::UnexpectedChar { found, offset } => ParseError::UnexpectedChar {
            found,
            offset: offset + base,
        },
        ParseError::UnterminatedString { offset } => ParseError::UnterminatedString {
            offset: offset + base,
        },
        ParseError::InvalidEscape { offset } => ParseError::InvalidEscape {
            offset: offset + base,
        },
        ParseError::MissingName { offset } => ParseError::MissingName {
            offset: offset + base,
        },
        ParseError::TrailingInput { offset } => ParseError::TrailingInput {
            offset: offset + base,
        },
    }
}
