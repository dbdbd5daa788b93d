// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Merge of parsed wire trees into a [`Dict`], including the type
//! inference applied to keys the receiving tree has never seen.
//!
//! Inference maps wire shape to a concrete stored type: booleans,
//! strings and floats map directly, integers take the smallest width
//! that fits, and flat numeric arrays map by length (2, 3, 4 and 9
//! become [`Vector2`](crate::linalg::Vector2),
//! [`Vector3`](crate::linalg::Vector3),
//! [`Quaternion`](crate::linalg::Quaternion) and
//! [`Matrix3`](crate::linalg::Matrix3); any other length becomes
//! `Vec<f64>`). An empty array carries no usable shape and is rejected.

use crate::dict::{Dict, Payload};
use crate::error::{Error, Result};
use crate::linalg::{Matrix3, Quaternion, Vector2, Vector3};
use crate::observe::{Event, Observer};
use crate::value::ValueSlot;
use crate::wire::WireNode;

impl Dict {
    /// Merge a parsed wire map into this tree.
    ///
    /// Per key: a fresh key gets an inferred value or a recursively
    /// built subtree; an existing value of matching kind is decoded in
    /// place; a kind conflict replaces the existing entry wholesale. A
    /// value-kind node at the root is replaced by whatever the wire
    /// says, established concrete types never silently change.
    pub(crate) fn merge_update(&mut self, node: &WireNode) -> Result<()> {
        match node {
            WireNode::Map(entries) => {
                if self.is_value() {
                    self.clear();
                }
                for (key, incoming) in entries {
                    match &mut self.payload {
                        Payload::Map(map) if map.contains_key(key.as_str()) => {
                            let child = match map.get_mut(key.as_str()) {
                                Some(child) => child,
                                None => continue,
                            };
                            merge_into_child(child, incoming).map_err(|e| e.at_key(key))?;
                        }
                        _ => {
                            let built = build_from_node(incoming).map_err(|e| e.at_key(key))?;
                            self.insert_child(key, built);
                        }
                    }
                }
                Ok(())
            }
            _ => {
                // Value-shaped payload at this node.
                match &mut self.payload {
                    Payload::Value(slot) => slot.decode_in_place(node),
                    _ => {
                        self.payload = Payload::Value(infer_slot(node)?);
                        Ok(())
                    }
                }
            }
        }
    }

    /// Insert-only merge: keys already present are left untouched and
    /// reported to `observer`, everything else is built fresh.
    pub(crate) fn merge_extend(&mut self, node: &WireNode, observer: &dyn Observer) -> Result<()> {
        let entries = match node {
            WireNode::Map(entries) => entries,
            other => {
                return Err(Error::type_mismatch(format!(
                    "can only extend from a map, not from {}",
                    other.kind_label()
                )))
            }
        };
        if self.is_value() {
            return Err(Error::not_a_map(
                "cannot extend a value node with map entries",
            ));
        }
        for (key, incoming) in entries {
            if self.has(key) {
                observer.notice(Event::DuplicateKey { key: key.as_str() });
                continue;
            }
            let built = build_from_node(incoming).map_err(|e| e.at_key(key))?;
            self.insert_child(key, built);
        }
        Ok(())
    }
}

/// Merge a wire node into an existing child, honoring its established
/// kind and concrete type where the wire shape is compatible.
fn merge_into_child(child: &mut Dict, node: &WireNode) -> Result<()> {
    match (&mut child.payload, node.is_map()) {
        (Payload::Value(slot), false) => slot.decode_in_place(node),
        (Payload::Value(_), true) => {
            // Kind conflict: the wire map replaces the stored value.
            child.clear();
            child.merge_update(node)
        }
        (_, true) => child.merge_update(node),
        (Payload::Map(_), false) | (Payload::Empty, false) => {
            // Kind conflict the other way: the wire value replaces the
            // subtree.
            child.payload = Payload::Value(infer_slot(node)?);
            Ok(())
        }
    }
}

/// Build a fresh dictionary node from a wire node: maps recurse,
/// anything else becomes an inferred value.
fn build_from_node(node: &WireNode) -> Result<Dict> {
    if node.is_map() {
        let mut child = Dict::new();
        child.merge_update(node)?;
        Ok(child)
    } else {
        Ok(Dict {
            payload: Payload::Value(infer_slot(node)?),
        })
    }
}

/// Infer a concrete stored type from a wire node and decode it.
pub(crate) fn infer_slot(node: &WireNode) -> Result<ValueSlot> {
    let slot = match node {
        WireNode::Bool(v) => ValueSlot::new(*v),
        WireNode::Str(v) => ValueSlot::new(v.clone()),
        WireNode::F32(v) => ValueSlot::new(*v),
        WireNode::F64(v) => ValueSlot::new(*v),
        WireNode::Uint(v) => infer_unsigned(*v),
        WireNode::Int(v) => infer_signed(*v)?,
        WireNode::Array(items) => return infer_array(items),
        other => {
            return Err(Error::type_mismatch(format!(
                "cannot infer a value type from {}",
                other.kind_label()
            )))
        }
    };
    Ok(slot)
}

/// Smallest unsigned width that fits.
fn infer_unsigned(v: u64) -> ValueSlot {
    if let Ok(v) = u8::try_from(v) {
        ValueSlot::new(v)
    } else if let Ok(v) = u16::try_from(v) {
        ValueSlot::new(v)
    } else if let Ok(v) = u32::try_from(v) {
        ValueSlot::new(v)
    } else {
        ValueSlot::new(v)
    }
}

/// Smallest signed width that fits. The parser normalizes non-negative
/// integers to `Uint`, so `v` is always negative here.
fn infer_signed(v: i64) -> Result<ValueSlot> {
    if v >= 0 {
        return Err(Error::type_mismatch(
            "non-negative integer reached signed inference",
        ));
    }
    Ok(if let Ok(v) = i8::try_from(v) {
        ValueSlot::new(v)
    } else if let Ok(v) = i16::try_from(v) {
        ValueSlot::new(v)
    } else if let Ok(v) = i32::try_from(v) {
        ValueSlot::new(v)
    } else {
        ValueSlot::new(v)
    })
}

fn infer_array(items: &[WireNode]) -> Result<ValueSlot> {
    if items.is_empty() {
        return Err(Error::type_mismatch(
            "cannot infer an element type from an empty array",
        ));
    }
    if items.iter().all(|item| item.as_f64().is_some()) {
        let values: Vec<f64> = items.iter().filter_map(WireNode::as_f64).collect();
        return Ok(match values.len() {
            2 => ValueSlot::new(Vector2::new(values[0], values[1])),
            3 => ValueSlot::new(Vector3::new(values[0], values[1], values[2])),
            4 => ValueSlot::new(Quaternion::new(values[0], values[1], values[2], values[3])),
            9 => {
                let mut elements = [0.0; 9];
                elements.copy_from_slice(&values);
                ValueSlot::new(Matrix3::from_rows(elements))
            }
            _ => ValueSlot::new(values),
        });
    }
    if items.iter().all(|item| item.numeric_array().is_some()) {
        let rows: Vec<Vec<f64>> = items
            .iter()
            .filter_map(WireNode::numeric_array)
            .collect();
        return Ok(ValueSlot::new(rows));
    }
    Err(Error::type_mismatch(
        "array elements have no common numeric type",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::WireWriter;

    fn single(key: &str, write: impl FnOnce(&mut WireWriter)) -> Vec<u8> {
        let mut writer = WireWriter::new();
        writer.start_map(1);
        writer.write_str(key);
        write(&mut writer);
        writer.into_bytes()
    }

    #[test]
    fn test_infer_integer_widths() {
        let mut dict = Dict::new();
        dict.update(&single("small", |w| w.write_u64(200)))
            .expect("update");
        assert_eq!(*dict.get::<u8>("small").expect("u8"), 200);

        dict.update(&single("wide", |w| w.write_u64(70_000)))
            .expect("update");
        assert_eq!(*dict.get::<u32>("wide").expect("u32"), 70_000);

        dict.update(&single("neg", |w| w.write_i64(-3)))
            .expect("update");
        assert_eq!(*dict.get::<i8>("neg").expect("i8"), -3);

        dict.update(&single("deep_neg", |w| w.write_i64(-40_000)))
            .expect("update");
        assert_eq!(*dict.get::<i32>("deep_neg").expect("i32"), -40_000);
    }

    #[test]
    fn test_infer_vector_lengths() {
        let mut dict = Dict::new();
        dict.update(&single("quat", |w| {
            w.start_array(4);
            for v in [1.0, 0.0, 0.0, 0.0] {
                w.write_f64(v);
            }
        }))
        .expect("update");
        let q = dict.get::<Quaternion>("quat").expect("quaternion");
        assert_eq!(q.w, 1.0);

        dict.update(&single("rot", |w| {
            w.start_array(9);
            for i in 0..9 {
                w.write_f64(i as f64);
            }
        }))
        .expect("update");
        let m = dict.get::<Matrix3>("rot").expect("matrix");
        assert_eq!(m.get(1, 2), 5.0);

        dict.update(&single("traj", |w| {
            w.start_array(5);
            for i in 0..5 {
                w.write_u64(i);
            }
        }))
        .expect("update");
        assert_eq!(
            dict.get::<Vec<f64>>("traj").expect("vec"),
            &vec![0.0, 1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_infer_nested_numeric_arrays() {
        let mut dict = Dict::new();
        dict.update(&single("rows", |w| {
            w.start_array(2);
            w.start_array(2);
            w.write_f64(1.0);
            w.write_f64(2.0);
            w.start_array(2);
            w.write_f64(3.0);
            w.write_f64(4.0);
        }))
        .expect("update");
        assert_eq!(
            dict.get::<Vec<Vec<f64>>>("rows").expect("rows"),
            &vec![vec![1.0, 2.0], vec![3.0, 4.0]]
        );
    }

    #[test]
    fn test_empty_array_rejected() {
        let mut dict = Dict::new();
        let err = dict
            .update(&single("empty", |w| w.start_array(0)))
            .expect_err("empty array");
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_mixed_array_rejected() {
        let mut dict = Dict::new();
        let err = dict
            .update(&single("mixed", |w| {
                w.start_array(2);
                w.write_f64(1.0);
                w.write_str("two");
            }))
            .expect_err("mixed array");
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_update_decodes_in_place() {
        let mut dict = Dict::new();
        dict.insert("count", 1u32).expect("insert");
        dict.update(&single("count", |w| w.write_u64(9)))
            .expect("update");
        // concrete type survives, only the payload changes
        assert_eq!(*dict.get::<u32>("count").expect("get"), 9);
    }

    #[test]
    fn test_update_type_conflict() {
        let mut dict = Dict::new();
        dict.insert("count", 1u32).expect("insert");
        let err = dict
            .update(&single("count", |w| w.write_str("nine")))
            .expect_err("conflict");
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_update_kind_conflict_replaces() {
        // value replaced by map
        let mut dict = Dict::new();
        dict.insert("node", 1u8).expect("insert");
        dict.update(&single("node", |w| {
            w.start_map(1);
            w.write_str("inner");
            w.write_u64(2);
        }))
        .expect("update");
        assert_eq!(*dict.child("node").expect("child").get::<u8>("inner").expect("get"), 2);

        // map replaced by value
        let mut dict = Dict::new();
        dict.child_mut("node")
            .expect("child")
            .insert("inner", 2u8)
            .expect("insert");
        dict.update(&single("node", |w| w.write_u64(7)))
            .expect("update");
        assert_eq!(*dict.get::<u8>("node").expect("get"), 7);
    }

    #[test]
    fn test_extend_skips_existing_keys() {
        let mut dict = Dict::new();
        dict.insert("kept", 1u8).expect("insert");

        let mut writer = WireWriter::new();
        writer.start_map(2);
        writer.write_str("kept");
        writer.write_u64(99);
        writer.write_str("fresh");
        writer.write_u64(5);
        dict.extend(&writer.into_bytes()).expect("extend");

        assert_eq!(*dict.get::<u8>("kept").expect("kept"), 1);
        assert_eq!(*dict.get::<u8>("fresh").expect("fresh"), 5);
    }

    #[test]
    fn test_extend_requires_map_payload() {
        let mut dict = Dict::new();
        let mut writer = WireWriter::new();
        writer.write_u64(1);
        assert!(matches!(
            dict.extend(&writer.into_bytes()),
            Err(Error::TypeMismatch { .. })
        ));
    }
}
