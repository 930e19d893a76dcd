use alloc::string::{String, ToString};
use core::fmt;

use thiserror::Error;

/// A location in the input stream, used for diagnostics.
///
/// `line` and `column` are 1-based; `column` counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Byte offset from the start of the stream.
    pub offset: usize,
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number, starting at 1.
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Position {
    /// Computes the position of `offset` within `input`.
    ///
    /// Only called on error paths, so the scan from the start is acceptable.
    #[must_use]
    pub fn locate(input: &[u8], offset: usize) -> Self {
        let offset = offset.min(input.len());
        let consumed = &input[..offset];
        let line_start = consumed
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |nl| nl + 1);
        let line = 1 + consumed.iter().filter(|b| **b == b'\n').count();
        // Count UTF-8 leading bytes so multi-byte characters occupy one column.
        let column = 1 + consumed[line_start..]
            .iter()
            .filter(|b| (**b & 0xC0) != 0x80)
            .count();
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors produced while encoding or decoding.
///
/// Every error aborts the current decode call and is returned to the caller
/// unchanged through all recursion levels.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// No capability of the destination matched a non-nil value.
    ///
    /// This indicates a mismatch between the data and the destination type,
    /// not a recoverable condition.
    #[error("codec: {kind} not supported")]
    NotSupported {
        /// The kind of value that could not be handled, e.g. `"string"`.
        kind: &'static str,
    },

    /// Scalar text did not fit the destination's numeric domain or syntax.
    #[error("codec: invalid {kind} {text:?}: {reason}")]
    InvalidNumber {
        /// The original text.
        text: String,
        /// The destination kind, e.g. `"u8"`.
        kind: &'static str,
        /// The underlying parse failure.
        reason: String,
    },

    /// The tokenizer rejected the input.
    #[error("syntax error: {message} at {position}")]
    Syntax {
        /// Description of the malformed input.
        message: String,
        /// Where the tokenizer stopped.
        position: Position,
    },

    /// A token appeared where the nesting rules do not allow it.
    #[error("unexpected {found}, expected {expected} at {position}")]
    UnexpectedToken {
        /// Description of the token that was read.
        found: String,
        /// Description of what was required instead.
        expected: &'static str,
        /// Where the token was read.
        position: Position,
    },

    /// An XML end tag did not close the active element.
    #[error("mismatched end tag {found:?} != {expected:?} at line {line}, column {column}")]
    MismatchedEndTag {
        /// Flattened name of the end tag that was read.
        found: String,
        /// Flattened name of the element that is open.
        expected: String,
        /// Line of the end tag.
        line: usize,
        /// Column just past the end tag.
        column: usize,
    },

    /// The input ended inside an unfinished aggregate or element.
    #[error("unexpected end of input at {position}")]
    UnexpectedEof {
        /// Where the input ended.
        position: Position,
    },

    /// Nesting exceeded [`DecoderOptions::max_depth`](crate::DecoderOptions::max_depth).
    #[error("nesting deeper than {limit} at {position}")]
    DepthLimitExceeded {
        /// The configured limit.
        limit: usize,
        /// Where the limit was crossed.
        position: Position,
    },

    /// A destination consumed more than one value in a single dispatch step.
    ///
    /// This is a programming error in the destination type.
    #[error("unexpected call to decode ({calls} > 1)")]
    Arity {
        /// How many decode calls the step attempted.
        calls: usize,
    },

    /// An XML document contained more than one root element.
    #[error("xml: multiple root elements")]
    MultipleRootElements,

    /// A failure reported by application code.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Builds an [`Error::Custom`] from any displayable message.
    pub fn custom(msg: impl fmt::Display) -> Self {
        Self::Custom(msg.to_string())
    }

    /// Returns `true` for errors caused by the shape of the input stream
    /// rather than by the destination.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Syntax { .. }
                | Self::UnexpectedToken { .. }
                | Self::MismatchedEndTag { .. }
                | Self::UnexpectedEof { .. }
                | Self::DepthLimitExceeded { .. }
                | Self::MultipleRootElements
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_counts_lines_and_characters() {
        let input = "{\n  \"é\": x".as_bytes();
        let pos = Position::locate(input, input.len() - 1);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 8);
    }

    #[test]
    fn locate_clamps_past_end() {
        let pos = Position::locate(b"ab", 10);
        assert_eq!(pos.offset, 2);
        assert_eq!(pos.column, 3);
    }
}
