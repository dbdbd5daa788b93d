// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy for tree operations.
//!
//! Structural and typing violations always propagate to the caller;
//! wire-level corruption is handled at the codec boundary instead (see
//! [`crate::wire::WireError`]).

use std::fmt;

/// Errors raised by dictionary operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A read-only lookup, `pop` or `pop_item` found no entry.
    KeyNotFound { message: String },
    /// A stored concrete type conflicts with the requested or incoming one.
    TypeMismatch { message: String },
    /// A map-only operation was called on a value node.
    NotAMap { message: String },
    /// A value-only operation was called on a map node.
    NotAValue { message: String },
}

impl Error {
    pub(crate) fn key_not_found(key: &str) -> Self {
        Self::KeyNotFound {
            message: format!("key \"{}\" not found", key),
        }
    }

    pub(crate) fn nothing_to_pop() -> Self {
        Self::KeyNotFound {
            message: "dictionary is empty, nothing to pop".to_owned(),
        }
    }

    pub(crate) fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            message: message.into(),
        }
    }

    pub(crate) fn not_a_map(message: impl Into<String>) -> Self {
        Self::NotAMap {
            message: message.into(),
        }
    }

    pub(crate) fn not_a_value(message: impl Into<String>) -> Self {
        Self::NotAValue {
            message: message.into(),
        }
    }

    /// Prefix a type mismatch with the key it occurred at, so that errors
    /// raised deep inside a merge point back to the offending entry.
    pub(crate) fn at_key(self, key: &str) -> Self {
        match self {
            Self::TypeMismatch { message } => Self::TypeMismatch {
                message: format!("(at key \"{}\") {}", key, message),
            },
            other => other,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyNotFound { message } => f.write_str(message),
            Self::TypeMismatch { message } => write!(f, "type mismatch: {}", message),
            Self::NotAMap { message } => write!(f, "not a map: {}", message),
            Self::NotAValue { message } => write!(f, "not a value: {}", message),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
