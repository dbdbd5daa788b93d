// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Teledict - Self-describing telemetry dictionaries
//!
//! A heterogeneous, type-erased tree container for robot telemetry with
//! a compact MessagePack wire format. Producers publish their full state
//! tree without a shared schema; consumers reconstruct it from the bytes
//! alone, with concrete types inferred from the wire shape.
//!
//! ## Quick Start
//!
//! ```rust
//! use teledict::{Dict, Vector3, Result};
//!
//! fn main() -> Result<()> {
//!     // Producer side: build and serialize a state tree
//!     let mut state = Dict::new();
//!     let imu = state.child_mut("imu")?;
//!     imu.insert("orientation", Vector3::new(0.0, 0.01, -0.02))?;
//!     imu.insert("sequence", 42u32)?;
//!     let bytes = state.serialize();
//!
//!     // Consumer side: rebuild from the bytes alone
//!     let mut mirror = Dict::new();
//!     mirror.update(&bytes)?;
//!     let imu = mirror.child("imu")?;
//!     assert_eq!(*imu.get::<u8>("sequence")?, 42);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Dict`] | Recursive tree node: empty, a typed value, or a map of children |
//! | [`DictValue`] | Trait a type implements to be storable as a leaf |
//! | [`Vector2`], [`Vector3`], [`Quaternion`], [`Matrix3`] | Fixed-size numeric leaves common in telemetry |
//! | [`Observer`] | Injectable sink for soft failures (parse errors, duplicate keys) |
//!
//! ## Wire Behavior
//!
//! - [`Dict::serialize`] emits one MessagePack message per tree, always
//!   with minimal integer encodings.
//! - [`Dict::update`] merges wire data in, inferring types for fresh
//!   keys; a malformed buffer is reported and leaves the tree unchanged.
//! - [`Dict::difference`] computes the subtree a receiver would need to
//!   catch up, comparing values by their encoded bytes.
//!
//! ## Modules Overview
//!
//! - [`dict`] - The tree container and its operations (start here)
//! - [`wire`] - MessagePack reader and writer
//! - [`linalg`] - Fixed-size vector, quaternion and matrix leaves
//! - [`observe`] - Soft-failure reporting

/// The tree container and its operations.
pub mod dict;
mod diff;
/// Error type shared by all fallible dictionary operations.
pub mod error;
/// Fixed-size linear-algebra leaf types.
pub mod linalg;
mod merge;
/// Soft-failure events and observer sinks.
pub mod observe;
/// Type-erased value storage.
pub mod value;
/// MessagePack wire reader and writer.
pub mod wire;

pub use dict::Dict;
pub use error::{Error, Result};
pub use linalg::{Matrix3, Quaternion, Vector2, Vector3};
pub use observe::{Capture, Event, LogObserver, Observer};
pub use value::{DictValue, ValueSlot};
pub use wire::{parse, WireError, WireNode, WireWriter, MAX_PARSE_DEPTH};
