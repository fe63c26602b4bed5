//! The status surface shared by both codecs.
//!
//! Every fallible operation in the crate reports exactly one [`Error`]
//! value, propagated up the recursion with `?`. Decoders never report a
//! partial success: on error the output value never escapes, and any
//! partially built state is released by scope.

use std::fmt::{self, Display, Formatter};

pub type Result<T> = std::result::Result<T, Error>;

/// Enumerated status for everything that can go wrong while decoding
/// binary input or parsing text.
///
/// Encoding into a growable buffer is infallible and has no error arm.
/// The payload fields exist for diagnostics; matching on the variant is
/// how callers branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The stream carries more fields, alternatives, or entries than the
    /// reader's schema knows, with no framing available to skip them.
    Incompatible { expected: usize, actual: usize },
    /// Input ended in the middle of a field.
    DataUnderrun {
        offset: usize,
        requested: usize,
        limit: usize,
    },
    /// Byte-level corruption: an overlong varint, or a payload that does
    /// not decode as its declared shape (e.g. invalid UTF-8 in a string).
    BadData { offset: usize },
    /// Text recursion exceeded the configured depth cap.
    StackOverflow { max_depth: u32 },
    /// Text input violates the table-literal grammar.
    BadFormat { offset: usize },
    /// No alternative of a sum type could parse the value, under the
    /// strict variant option.
    BadVariantValue { offset: usize },
    /// A key named no declared field, under the strict key option.
    UnknownKey { offset: usize },
    /// A decoded container count exceeds the element cap; reported before
    /// any allocation takes place.
    OutOfMemory { requested: usize, limit: usize },
    /// The byte-stream target cannot accept writes. Reserved for adapters
    /// and custom codecs over one-directional streams.
    WriteDisallowed,
    /// The byte-stream source cannot be read. Reserved for adapters and
    /// custom codecs over one-directional streams.
    ReadDisallowed,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Incompatible { expected, actual } => {
                write!(
                    f,
                    "incompatible schema: reader knows {} slots, stream carries {}",
                    expected, actual
                )
            }
            Error::DataUnderrun {
                offset,
                requested,
                limit,
            } => {
                write!(
                    f,
                    "data underrun: cannot read {} byte(s) at offset {} (buffer holds {})",
                    requested, offset, limit
                )
            }
            Error::BadData { offset } => {
                write!(f, "malformed data at offset {}", offset)
            }
            Error::StackOverflow { max_depth } => {
                write!(f, "nesting exceeds maximum parse depth {}", max_depth)
            }
            Error::BadFormat { offset } => {
                write!(f, "text syntax error at offset {}", offset)
            }
            Error::BadVariantValue { offset } => {
                write!(
                    f,
                    "no variant alternative accepts the value at offset {}",
                    offset
                )
            }
            Error::UnknownKey { offset } => {
                write!(f, "unknown field key at offset {}", offset)
            }
            Error::OutOfMemory { requested, limit } => {
                write!(
                    f,
                    "declared element count {} exceeds decode cap {}",
                    requested, limit
                )
            }
            Error::WriteDisallowed => write!(f, "byte-stream target does not accept writes"),
            Error::ReadDisallowed => write!(f, "byte-stream source does not accept reads"),
        }
    }
}

impl std::error::Error for Error {}
