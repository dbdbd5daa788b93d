// SPDX-License-Identifier: Apache-2.0 OR MIT

//! MessagePack wire codec.
//!
//! One self-describing message per tree. The writer produces minimal
//! encodings into a growable buffer; the reader materializes the whole
//! message into an immutable [`WireNode`] parse tree before any traversal
//! (two-phase decode, no streaming).

pub mod node;
pub mod reader;
pub mod writer;

pub use node::WireNode;
pub use reader::parse;
pub use writer::WireWriter;

use std::fmt;

/// Maximum nesting depth accepted by the parser. Telemetry trees are
/// shallow; anything deeper is treated as corrupt input.
pub const MAX_PARSE_DEPTH: usize = 64;

/// Parse-level failure at the codec boundary.
///
/// Never surfaced as a structural error: mutation entry points log the
/// failure and leave the target tree unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Input ended before the message was complete.
    Truncated { offset: usize },
    /// Reserved or ext-family marker byte we do not materialize.
    UnsupportedMarker { marker: u8, offset: usize },
    /// A map key was not a string.
    InvalidKey { offset: usize },
    /// A string payload was not valid UTF-8.
    InvalidUtf8 { offset: usize },
    /// Nesting exceeded [`MAX_PARSE_DEPTH`].
    DepthExceeded { limit: usize },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { offset } => {
                write!(f, "truncated message at offset {}", offset)
            }
            Self::UnsupportedMarker { marker, offset } => {
                write!(f, "unsupported marker 0x{:02x} at offset {}", marker, offset)
            }
            Self::InvalidKey { offset } => {
                write!(f, "non-string map key at offset {}", offset)
            }
            Self::InvalidUtf8 { offset } => {
                write!(f, "invalid UTF-8 in string at offset {}", offset)
            }
            Self::DepthExceeded { limit } => {
                write!(f, "nesting exceeds maximum depth {}", limit)
            }
        }
    }
}

impl std::error::Error for WireError {}

pub type WireResult<T> = core::result::Result<T, WireError>;
