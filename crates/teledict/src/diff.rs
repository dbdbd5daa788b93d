// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural difference between two dictionary trees.
//!
//! `a.difference(&b)` answers "what would a receiver holding `b` need
//! to apply to end up with `a`'s content". Values compare by their
//! wire bytes, so `1u8` and `1u16` are equal here even though their
//! stored types differ.
//!
//! The result is a snapshot, not a view: it owns structural copies of
//! the differing subtrees (concrete types preserved, no wire round
//! trip) and stays valid after either input changes.

use crate::dict::{Dict, Payload};

impl Dict {
    /// Subtree of `self` that differs from `other`.
    ///
    /// Keys only in `other` do not appear in the result; removals are
    /// not expressible. Diffing a tree against itself, or any tree
    /// against an empty one, follows directly: the former is empty, the
    /// latter is a full copy.
    pub fn difference(&self, other: &Dict) -> Dict {
        match &self.payload {
            Payload::Empty => Dict::new(),
            Payload::Value(slot) => {
                let same = match &other.payload {
                    Payload::Value(other_slot) => slot.to_bytes() == other_slot.to_bytes(),
                    _ => false,
                };
                if same {
                    Dict::new()
                } else {
                    Dict {
                        payload: Payload::Value(slot.duplicate()),
                    }
                }
            }
            Payload::Map(map) => {
                let mut out = Dict::new();
                for (key, child) in map {
                    if other.is_map() {
                        if let Ok(counterpart) = other.child(key) {
                            let sub = child.difference(counterpart);
                            if !sub.is_empty() {
                                out.insert_child(key, sub);
                            }
                            continue;
                        }
                    }
                    out.insert_child(key, child.snapshot());
                }
                out
            }
        }
    }
}
