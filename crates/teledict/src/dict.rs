// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The recursive dictionary tree.
//!
//! A [`Dict`] is exactly one of: empty, a single typed value, or a map of
//! named child dictionaries. An empty node counts as a map (a map with no
//! entries), so `is_map()` is simply the negation of `is_value()`; this
//! identification is load-bearing for merge and diff traversal.
//!
//! Trees own their children exclusively and are move-only. The only
//! sanctioned duplication path is [`Dict::deepcopy`], an explicit wire
//! round trip.
//!
//! ```rust
//! use teledict::{Dict, Vector3};
//!
//! let mut dict = Dict::new();
//! let imu = dict.child_mut("imu")?;
//! imu.insert("gyro", Vector3::new(0.0, 0.1, -0.2))?;
//! imu.insert("count", 42u32)?;
//!
//! let bytes = dict.serialize();
//! let mut mirror = Dict::new();
//! mirror.update(&bytes)?;
//! assert!(mirror.child("imu")?.has("gyro"));
//! # Ok::<(), teledict::Error>(())
//! ```

use std::fmt;
use std::io;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::observe::{Event, LogObserver, Observer};
use crate::value::{write_json_string, DictValue, ValueSlot};
use crate::wire::{self, WireWriter};

/// Dictionary of values and sub-dictionaries.
///
/// Keys are unique strings; iteration order is an implementation detail
/// and carries no semantics.
#[derive(Debug, Default)]
pub struct Dict {
    pub(crate) payload: Payload,
}

#[derive(Debug, Default)]
pub(crate) enum Payload {
    #[default]
    Empty,
    Value(ValueSlot),
    Map(IndexMap<String, Dict>),
}

impl Dict {
    /// New empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a flat map with one empty child per key.
    pub fn from_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let map = keys
            .into_iter()
            .map(|key| (key.into(), Dict::new()))
            .collect();
        Self {
            payload: Payload::Map(map),
        }
    }

    /// Build a flat map assigning a clone of `value` to every key.
    pub fn from_keys_with<I, K, T>(keys: I, value: &T) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        T: DictValue + Clone,
    {
        let map = keys
            .into_iter()
            .map(|key| {
                (
                    key.into(),
                    Dict {
                        payload: Payload::Value(ValueSlot::new(value.clone())),
                    },
                )
            })
            .collect();
        Self {
            payload: Payload::Map(map),
        }
    }

    /// This node holds a single typed value.
    pub fn is_value(&self) -> bool {
        matches!(self.payload, Payload::Value(_))
    }

    /// This node is a (possibly empty) map. Always the negation of
    /// [`is_value`](Self::is_value).
    pub fn is_map(&self) -> bool {
        !self.is_value()
    }

    /// This node is a map with no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.is_map()
    }

    /// Number of entries (zero unless this node is a populated map).
    pub fn len(&self) -> usize {
        match &self.payload {
            Payload::Map(map) => map.len(),
            _ => 0,
        }
    }

    /// Check whether a key is present. False on value and empty nodes.
    pub fn has(&self, key: &str) -> bool {
        match &self.payload {
            Payload::Map(map) => map.contains_key(key),
            _ => false,
        }
    }

    /// Snapshot of the keys.
    pub fn keys(&self) -> Vec<&str> {
        match &self.payload {
            Payload::Map(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Snapshot of the entries.
    pub fn items(&self) -> Vec<(&str, &Dict)> {
        match &self.payload {
            Payload::Map(map) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
            _ => Vec::new(),
        }
    }

    /// Child at `key`, read-only. Fails with `KeyNotFound` when absent
    /// (a read-only path cannot materialize entries) and `NotAMap` on a
    /// value node.
    pub fn child(&self, key: &str) -> Result<&Dict> {
        match &self.payload {
            Payload::Value(slot) => Err(Error::not_a_map(format!(
                "cannot look up key \"{}\" in value of type \"{}\"",
                key,
                slot.type_label()
            ))),
            Payload::Map(map) => map.get(key).ok_or_else(|| Error::key_not_found(key)),
            Payload::Empty => Err(Error::key_not_found(key)),
        }
    }

    /// Child at `key`, inserting a new empty child if the key does not
    /// exist yet. Fails with `NotAMap` on a value node.
    pub fn child_mut(&mut self, key: &str) -> Result<&mut Dict> {
        if let Payload::Value(slot) = &self.payload {
            return Err(Error::not_a_map(format!(
                "cannot look up key \"{}\" in value of type \"{}\"",
                key,
                slot.type_label()
            )));
        }
        if matches!(self.payload, Payload::Empty) {
            self.payload = Payload::Map(IndexMap::new());
        }
        match &mut self.payload {
            Payload::Map(map) => Ok(map.entry(key.to_owned()).or_default()),
            _ => Err(Error::not_a_map("node did not become a map")),
        }
    }

    /// Typed reference to this node's own value.
    pub fn value<T: DictValue>(&self) -> Result<&T> {
        match &self.payload {
            Payload::Value(slot) => slot.get::<T>(),
            _ => Err(Error::not_a_value("node does not hold a value")),
        }
    }

    /// Mutable variant of [`value`](Self::value).
    pub fn value_mut<T: DictValue>(&mut self) -> Result<&mut T> {
        match &mut self.payload {
            Payload::Value(slot) => slot.get_mut::<T>(),
            _ => Err(Error::not_a_value("node does not hold a value")),
        }
    }

    /// Typed reference to the value at `key`.
    pub fn get<T: DictValue>(&self, key: &str) -> Result<&T> {
        let child = self.child(key)?;
        match &child.payload {
            Payload::Value(slot) => slot.get::<T>().map_err(|e| e.at_key(key)),
            _ => Err(Error::type_mismatch(format!(
                "entry at key \"{}\" is a dictionary, not a single value",
                key
            ))),
        }
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut<T: DictValue>(&mut self, key: &str) -> Result<&mut T> {
        if let Payload::Value(slot) = &self.payload {
            return Err(Error::not_a_map(format!(
                "cannot look up key \"{}\" in value of type \"{}\"",
                key,
                slot.type_label()
            )));
        }
        let child = match &mut self.payload {
            Payload::Map(map) => map.get_mut(key).ok_or_else(|| Error::key_not_found(key))?,
            _ => return Err(Error::key_not_found(key)),
        };
        match &mut child.payload {
            Payload::Value(slot) => slot.get_mut::<T>().map_err(|e| e.at_key(key)),
            _ => Err(Error::type_mismatch(format!(
                "entry at key \"{}\" is a dictionary, not a single value",
                key
            ))),
        }
    }

    /// Value at `key`, or `default` when the key is absent. Type
    /// conflicts still fail: an existing entry of another type is never
    /// silently shadowed by the default.
    pub fn get_or<'a, T: DictValue>(&'a self, key: &str, default: &'a T) -> Result<&'a T> {
        match self.get::<T>(key) {
            Err(Error::KeyNotFound { .. }) => Ok(default),
            other => other,
        }
    }

    /// Insert a value at `key` and return a reference to it.
    ///
    /// If the key already holds a value of the same type, the existing
    /// value is kept (a warning is logged) and returned instead of being
    /// overwritten. A type conflict or an existing sub-dictionary at the
    /// key fails with `TypeMismatch`.
    pub fn insert<T: DictValue>(&mut self, key: &str, value: T) -> Result<&mut T> {
        self.insert_impl(key, value, true)
    }

    /// Like [`insert`](Self::insert) but silent when the key already
    /// holds a value of the same type.
    pub fn set_default<T: DictValue>(&mut self, key: &str, default: T) -> Result<&mut T> {
        self.insert_impl(key, default, false)
    }

    fn insert_impl<T: DictValue>(&mut self, key: &str, value: T, warn: bool) -> Result<&mut T> {
        if let Payload::Value(slot) = &self.payload {
            return Err(Error::not_a_map(format!(
                "cannot insert at key \"{}\" in value of type \"{}\"",
                key,
                slot.type_label()
            )));
        }
        let child = self.child_mut(key)?;
        if !child.is_empty() {
            if warn {
                log::warn!(
                    "[dict] key \"{}\" already exists, returning existing value",
                    key
                );
            }
            return match &mut child.payload {
                Payload::Value(slot) => slot.get_mut::<T>().map_err(|e| e.at_key(key)),
                _ => Err(Error::type_mismatch(format!(
                    "entry at key \"{}\" is a dictionary, not a single value",
                    key
                ))),
            };
        }
        child.payload = Payload::Value(ValueSlot::new(value));
        child.value_mut::<T>()
    }

    /// Become this value.
    ///
    /// A map node is cleared first; an empty node becomes a value of type
    /// `T`; a value node of the same type is assigned in place. Assigning
    /// a different type to an established value fails with
    /// `TypeMismatch`. This is the only operation that fixes a node's
    /// kind and concrete type.
    pub fn assign<T: DictValue>(&mut self, value: T) -> Result<&mut T> {
        match &mut self.payload {
            Payload::Value(slot) => slot.assign(value)?,
            _ => self.payload = Payload::Value(ValueSlot::new(value)),
        }
        self.value_mut::<T>()
    }

    /// Remove the entry at `key`. Logs and does nothing when absent.
    pub fn remove(&mut self, key: &str) {
        if let Payload::Map(map) = &mut self.payload {
            if map.swap_remove(key).is_some() {
                return;
            }
        }
        log::error!("[dict] no key to remove at \"{}\"", key);
    }

    /// Reset this node to empty, recursively dropping any children.
    pub fn clear(&mut self) {
        self.payload = Payload::Empty;
    }

    /// Remove the entry at `key` and move its value out.
    pub fn pop<T: DictValue>(&mut self, key: &str) -> Result<T> {
        let map = match &mut self.payload {
            Payload::Value(slot) => {
                return Err(Error::not_a_map(format!(
                    "cannot pop key \"{}\" from value of type \"{}\"",
                    key,
                    slot.type_label()
                )))
            }
            Payload::Map(map) => map,
            Payload::Empty => return Err(Error::key_not_found(key)),
        };
        let child = map.get(key).ok_or_else(|| Error::key_not_found(key))?;
        // Type-check before removal so a failed pop leaves the tree intact.
        match &child.payload {
            Payload::Value(slot) if slot.holds::<T>() => {}
            Payload::Value(slot) => {
                return Err(Error::type_mismatch(format!(
                    "stored type is \"{}\", requested \"{}\"",
                    slot.type_label(),
                    std::any::type_name::<T>()
                ))
                .at_key(key))
            }
            _ => {
                return Err(Error::type_mismatch(format!(
                    "entry at key \"{}\" is a dictionary, not a single value",
                    key
                )))
            }
        }
        match map.swap_remove(key).map(|child| child.payload) {
            Some(Payload::Value(slot)) => slot.into_inner::<T>(),
            _ => Err(Error::key_not_found(key)),
        }
    }

    /// Like [`pop`](Self::pop), returning `default` when the key is
    /// absent. Type conflicts still fail.
    pub fn pop_or<T: DictValue>(&mut self, key: &str, default: T) -> Result<T> {
        match self.pop::<T>(key) {
            Err(Error::KeyNotFound { .. }) => Ok(default),
            other => other,
        }
    }

    /// Remove and return an arbitrary entry. No ordering guarantee.
    pub fn pop_item(&mut self) -> Result<(String, Dict)> {
        match &mut self.payload {
            Payload::Value(slot) => Err(Error::not_a_map(format!(
                "cannot pop an entry from value of type \"{}\"",
                slot.type_label()
            ))),
            Payload::Map(map) => map.pop().ok_or_else(Error::nothing_to_pop),
            Payload::Empty => Err(Error::nothing_to_pop()),
        }
    }

    /// Insert a fully-built child, replacing any existing entry.
    /// Internal: callers guarantee this node is map-kind.
    pub(crate) fn insert_child(&mut self, key: &str, child: Dict) {
        debug_assert!(!self.is_value());
        if matches!(self.payload, Payload::Empty) {
            self.payload = Payload::Map(IndexMap::new());
        }
        if let Payload::Map(map) = &mut self.payload {
            map.insert(key.to_owned(), child);
        }
    }

    /// Structural copy preserving every concrete type, no wire round
    /// trip. Internal: `deepcopy` is the public duplication path.
    pub(crate) fn snapshot(&self) -> Dict {
        match &self.payload {
            Payload::Empty => Dict::new(),
            Payload::Value(slot) => Dict {
                payload: Payload::Value(slot.duplicate()),
            },
            Payload::Map(map) => {
                let entries = map
                    .iter()
                    .map(|(key, child)| (key.clone(), child.snapshot()))
                    .collect();
                Dict {
                    payload: Payload::Map(entries),
                }
            }
        }
    }

    /// Serialize the whole tree to one MessagePack message.
    pub fn serialize(&self) -> Vec<u8> {
        let mut writer = WireWriter::new();
        self.encode_into(&mut writer);
        writer.into_bytes()
    }

    pub(crate) fn encode_into(&self, writer: &mut WireWriter) {
        match &self.payload {
            Payload::Empty => writer.start_map(0),
            Payload::Value(slot) => slot.encode(writer),
            Payload::Map(map) => {
                writer.start_map(map.len());
                for (key, child) in map {
                    writer.write_str(key);
                    child.encode_into(writer);
                }
            }
        }
    }

    /// Merge wire data into this tree.
    ///
    /// Fresh keys get their type inferred from the wire shape; existing
    /// values of a compatible shape are decoded in place; kind conflicts
    /// (map vs value) replace the existing subtree wholesale. A malformed
    /// buffer is logged and leaves the tree unchanged; structural type
    /// conflicts propagate as `TypeMismatch`.
    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        self.update_with(data, &LogObserver)
    }

    /// [`update`](Self::update) with an explicit soft-failure observer.
    pub fn update_with(&mut self, data: &[u8], observer: &dyn Observer) -> Result<()> {
        let node = match wire::parse(data) {
            Ok(node) => node,
            Err(err) => {
                let reason = err.to_string();
                observer.notice(Event::ParseFailure { reason: &reason });
                return Ok(());
            }
        };
        self.merge_update(&node)
    }

    /// Insert-only merge: adds keys missing from this tree, keeps
    /// existing entries untouched (reporting a duplicate-key notice).
    /// Both this node and the wire payload must be maps.
    pub fn extend(&mut self, data: &[u8]) -> Result<()> {
        self.extend_with(data, &LogObserver)
    }

    /// [`extend`](Self::extend) with an explicit soft-failure observer.
    pub fn extend_with(&mut self, data: &[u8], observer: &dyn Observer) -> Result<()> {
        let node = match wire::parse(data) {
            Ok(node) => node,
            Err(err) => {
                let reason = err.to_string();
                observer.notice(Event::ParseFailure { reason: &reason });
                return Ok(());
            }
        };
        self.merge_extend(&node, observer)
    }

    /// Duplicate this tree through an explicit wire round trip.
    ///
    /// Concrete types are re-inferred from the wire shape, so they can
    /// legitimately change: a small signed integer comes back as the
    /// matching unsigned width, a three-element dynamic vector comes back
    /// as a `Vector3`. Byte-level equality is preserved.
    pub fn deepcopy(&self) -> Result<Dict> {
        let bytes = self.serialize();
        let mut copy = Dict::new();
        copy.merge_update(&wire::parse(&bytes).map_err(|err| {
            Error::type_mismatch(format!("cannot reparse own serialization: {}", err))
        })?)?;
        Ok(copy)
    }

    /// Serialize and write the tree to a binary file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        std::fs::write(path, self.serialize())
    }

    /// Read a binary file and merge its content into this tree, with
    /// [`update`](Self::update) semantics. OS-level failures surface as
    /// `io::Error`; wire corruption is logged and leaves the tree
    /// unchanged.
    pub fn read<P: AsRef<Path>>(&mut self, path: P) -> io::Result<()> {
        let data = std::fs::read(path)?;
        self.update(&data)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

/// Equality by structure and wire bytes: maps compare per key ignoring
/// order, values compare by their encoded bytes.
impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        match (&self.payload, &other.payload) {
            (Payload::Value(a), Payload::Value(b)) => a.to_bytes() == b.to_bytes(),
            (Payload::Value(_), _) | (_, Payload::Value(_)) => false,
            _ => {
                if self.len() != other.len() {
                    return false;
                }
                match &self.payload {
                    Payload::Map(map) => map
                        .iter()
                        .all(|(key, child)| other.child(key).is_ok_and(|c| c == child)),
                    _ => true,
                }
            }
        }
    }
}

/// Diagnostic JSON-like rendering. Not a wire format and not required to
/// round-trip.
impl fmt::Display for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::Empty => f.write_str("{}"),
            Payload::Value(slot) => slot.render(f),
            Payload::Map(map) => {
                f.write_str("{")?;
                for (i, (key, child)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_json_string(f, key)?;
                    f.write_str(": ")?;
                    write!(f, "{}", child)?;
                }
                f.write_str("}")
            }
        }
    }
}
