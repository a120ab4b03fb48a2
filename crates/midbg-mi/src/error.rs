//! Errors raised while parsing MI output.

use thiserror::Error;

/// A malformed record or value fragment.
///
/// Offsets are byte positions within the line (or value text) being parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input ended where a value was expected.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEnd {
        /// Position where more input was required.
        offset: usize,
    },

    /// A character that cannot start or continue the current production.
    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedChar {
        /// The offending character.
        found: char,
        /// Position of the character.
        offset: usize,
    },

    /// A C-string without its closing quote.
    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString {
        /// Position of the opening quote.
        offset: usize,
    },

    /// An escape sequence that does not decode to a byte.
    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape {
        /// Position of the backslash.
        offset: usize,
    },

    /// A tuple member or result without a `name=` prefix.
    #[error("expected a result name at offset {offset}")]
    MissingName {
        /// Position where the name was expected.
        offset: usize,
    },

    /// Text left over after a complete value.
    #[error("unexpected trailing input at offset {offset}")]
    TrailingInput {
        /// Position of the first unconsumed byte.
        offset: usize,
    },
}

impl ParseError {
    /// Byte offset the error refers to.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::UnexpectedEnd { offset }
            | Self::UnexpectedChar { offset, .. }
            | Self::UnterminatedString { offset }
            | Self::InvalidEscape { offset }
            | Self::MissingName { offset }
            | Self::TrailingInput { offset } => *offset,
        }
    }
}
