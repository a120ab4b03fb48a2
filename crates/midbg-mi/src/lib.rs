//! GDB/MI wire protocol: values, records and line framing.
//!
//! The debugger speaks a line-oriented text protocol. [`LineFramer`] turns
//! its byte stream into lines, [`parse_record`] classifies each line, and
//! [`MiValue`] holds the structured payload of result and async records.
//! Nothing here performs I/O.

mod cstring;
mod cursor;
mod error;
mod framer;
mod parser;
mod record;
mod value;

pub use cstring::{quote, unquote};
pub use error::ParseError;
pub use framer::{LineFramer, Lines};
pub use parser::{parse_value, parse_value_lenient};
pub use record::{
    AsyncKind, AsyncRecord, PROMPT, ParsedRecord, Record, ResultClass, ResultRecord, StreamKind,
    StreamRecord, UnknownRecord, parse_record,
};
pub use value::{MiEntry, MiValue};
