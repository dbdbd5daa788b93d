// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value registration contract and the type-erased slot.
//!
//! Any type stored in a tree implements [`DictValue`]: how it encodes to
//! the wire, decodes in place from a parsed wire node, and renders for
//! diagnostics. A [`ValueSlot`] owns exactly one such value behind a boxed
//! trait object; its concrete type is fixed at construction and can only
//! change by clearing the owning node back to empty first.

use std::any::{type_name, Any, TypeId};
use std::fmt;

use crate::error::{Error, Result};
use crate::wire::{WireNode, WireWriter};

/// Contract for types that can live in a dictionary.
///
/// `wire_encode` never fails (the writer grows as needed). `wire_decode`
/// updates the existing value in place and fails with
/// [`Error::TypeMismatch`] when the wire shape is incompatible with the
/// established type.
pub trait DictValue: Any {
    fn wire_encode(&self, writer: &mut WireWriter);
    fn wire_decode(&mut self, node: &WireNode) -> Result<()>;
    fn render_json(&self, out: &mut dyn fmt::Write) -> fmt::Result;
    /// Short type name used in error messages and logs.
    fn type_label(&self) -> &'static str;
    /// Duplicate behind the erasure, preserving the concrete type.
    fn clone_boxed(&self) -> Box<dyn DictValue>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Single type-erased value holder.
///
/// No public `Clone`: callers duplicate whole trees through
/// `Dict::deepcopy`, which is a wire round trip by contract. Crate
/// internals that must preserve the concrete type use
/// [`duplicate`](Self::duplicate) instead.
pub struct ValueSlot {
    value: Box<dyn DictValue>,
    type_id: TypeId,
}

impl ValueSlot {
    pub fn new<T: DictValue>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_id: TypeId::of::<T>(),
        }
    }

    /// Exact identity check against a requested type.
    pub fn holds<T: DictValue>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub fn type_label(&self) -> &'static str {
        self.value.type_label()
    }

    pub fn get<T: DictValue>(&self) -> Result<&T> {
        self.value
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| self.cast_error::<T>())
    }

    pub fn get_mut<T: DictValue>(&mut self) -> Result<&mut T> {
        if !self.holds::<T>() {
            return Err(self.cast_error::<T>());
        }
        self.value
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| Error::type_mismatch("downcast failed after identity check"))
    }

    /// Assign without reallocating; the slot must already hold a `T`.
    pub fn assign<T: DictValue>(&mut self, value: T) -> Result<()> {
        *self.get_mut::<T>()? = value;
        Ok(())
    }

    /// Copy of this slot with the same concrete type, no wire round trip.
    pub(crate) fn duplicate(&self) -> ValueSlot {
        ValueSlot {
            value: self.value.clone_boxed(),
            type_id: self.type_id,
        }
    }

    /// Move the value out of the slot.
    pub fn into_inner<T: DictValue>(self) -> Result<T> {
        let label = self.type_label();
        match self.value.into_any().downcast::<T>() {
            Ok(boxed) => Ok(*boxed),
            Err(_) => Err(Error::type_mismatch(format!(
                "stored type is \"{}\", requested \"{}\"",
                label,
                type_name::<T>()
            ))),
        }
    }

    pub fn encode(&self, writer: &mut WireWriter) {
        self.value.wire_encode(writer);
    }

    /// Wire bytes of this value alone, used for byte-exact comparison.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = WireWriter::new();
        self.encode(&mut writer);
        writer.into_bytes()
    }

    pub fn decode_in_place(&mut self, node: &WireNode) -> Result<()> {
        self.value.wire_decode(node)
    }

    pub fn render(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        self.value.render_json(out)
    }

    fn cast_error<T: DictValue>(&self) -> Error {
        Error::type_mismatch(format!(
            "stored type is \"{}\", requested \"{}\"",
            self.type_label(),
            type_name::<T>()
        ))
    }
}

impl fmt::Debug for ValueSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueSlot({}: ", self.type_label())?;
        self.render(f)?;
        write!(f, ")")
    }
}

/// Render a string as a quoted JSON string.
pub(crate) fn write_json_string(out: &mut dyn fmt::Write, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

fn mismatch(label: &'static str, node: &WireNode) -> Error {
    Error::type_mismatch(format!(
        "cannot decode wire {} into \"{}\"",
        node.kind_label(),
        label
    ))
}

/// Generate [`DictValue`] impls for the signed integer widths.
macro_rules! impl_signed_value {
    ($($type:ty => $label:expr),* $(,)?) => {$(
        impl DictValue for $type {
            fn wire_encode(&self, writer: &mut WireWriter) {
                writer.write_i64(i64::from(*self));
            }

            fn wire_decode(&mut self, node: &WireNode) -> Result<()> {
                let wide = node.as_i64().ok_or_else(|| mismatch($label, node))?;
                *self = <$type>::try_from(wide).map_err(|_| {
                    Error::type_mismatch(format!(
                        "wire integer {} does not fit \"{}\"",
                        wide, $label
                    ))
                })?;
                Ok(())
            }

            fn render_json(&self, out: &mut dyn fmt::Write) -> fmt::Result {
                write!(out, "{}", self)
            }

            fn type_label(&self) -> &'static str {
                $label
            }

            fn clone_boxed(&self) -> Box<dyn DictValue> {
                Box::new(*self)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn Any> {
                self
            }
        }
    )*};
}

/// Generate [`DictValue`] impls for the unsigned integer widths.
macro_rules! impl_unsigned_value {
    ($($type:ty => $label:expr),* $(,)?) => {$(
        impl DictValue for $type {
            fn wire_encode(&self, writer: &mut WireWriter) {
                writer.write_u64(u64::from(*self));
            }

            fn wire_decode(&mut self, node: &WireNode) -> Result<()> {
                let wide = node.as_u64().ok_or_else(|| mismatch($label, node))?;
                *self = <$type>::try_from(wide).map_err(|_| {
                    Error::type_mismatch(format!(
                        "wire integer {} does not fit \"{}\"",
                        wide, $label
                    ))
                })?;
                Ok(())
            }

            fn render_json(&self, out: &mut dyn fmt::Write) -> fmt::Result {
                write!(out, "{}", self)
            }

            fn type_label(&self) -> &'static str {
                $label
            }

            fn clone_boxed(&self) -> Box<dyn DictValue> {
                Box::new(*self)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn Any> {
                self
            }
        }
    )*};
}

impl_signed_value! {
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
}

impl_unsigned_value! {
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
}

impl DictValue for bool {
    fn wire_encode(&self, writer: &mut WireWriter) {
        writer.write_bool(*self);
    }

    fn wire_decode(&mut self, node: &WireNode) -> Result<()> {
        *self = node.as_bool().ok_or_else(|| mismatch("bool", node))?;
        Ok(())
    }

    fn render_json(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{}", self)
    }

    fn type_label(&self) -> &'static str {
        "bool"
    }

    fn clone_boxed(&self) -> Box<dyn DictValue> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl DictValue for f32 {
    fn wire_encode(&self, writer: &mut WireWriter) {
        writer.write_f32(*self);
    }

    fn wire_decode(&mut self, node: &WireNode) -> Result<()> {
        let wide = node.as_f64().ok_or_else(|| mismatch("f32", node))?;
        *self = wide as f32;
        Ok(())
    }

    fn render_json(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{}", self)
    }

    fn type_label(&self) -> &'static str {
        "f32"
    }

    fn clone_boxed(&self) -> Box<dyn DictValue> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl DictValue for f64 {
    fn wire_encode(&self, writer: &mut WireWriter) {
        writer.write_f64(*self);
    }

    fn wire_decode(&mut self, node: &WireNode) -> Result<()> {
        *self = node.as_f64().ok_or_else(|| mismatch("f64", node))?;
        Ok(())
    }

    fn render_json(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(out, "{}", self)
    }

    fn type_label(&self) -> &'static str {
        "f64"
    }

    fn clone_boxed(&self) -> Box<dyn DictValue> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl DictValue for String {
    fn wire_encode(&self, writer: &mut WireWriter) {
        writer.write_str(self);
    }

    fn wire_decode(&mut self, node: &WireNode) -> Result<()> {
        let s = node.as_str().ok_or_else(|| mismatch("string", node))?;
        self.clear();
        self.push_str(s);
        Ok(())
    }

    fn render_json(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write_json_string(out, self)
    }

    fn type_label(&self) -> &'static str {
        "string"
    }

    fn clone_boxed(&self) -> Box<dyn DictValue> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_identity() {
        let slot = ValueSlot::new(42u32);
        assert!(slot.holds::<u32>());
        assert!(!slot.holds::<i32>());
        assert_eq!(slot.type_label(), "u32");
        assert_eq!(*slot.get::<u32>().expect("typed get"), 42);
        assert!(matches!(
            slot.get::<i32>(),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_slot_assign_in_place() {
        let mut slot = ValueSlot::new(1.5f64);
        slot.assign(2.5f64).expect("same-type assign");
        assert_eq!(*slot.get::<f64>().expect("typed get"), 2.5);
        assert!(matches!(
            slot.assign(3.0f32),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_slot_duplicate_preserves_type() {
        let slot = ValueSlot::new(Vec::<f64>::new());
        let copy = slot.duplicate();
        assert!(copy.holds::<Vec<f64>>());
        assert!(copy.get::<Vec<f64>>().expect("typed get").is_empty());
        assert_eq!(copy.to_bytes(), slot.to_bytes());
    }

    #[test]
    fn test_slot_into_inner() {
        let slot = ValueSlot::new(String::from("hello"));
        let s: String = slot.into_inner().expect("move out");
        assert_eq!(s, "hello");

        let slot = ValueSlot::new(7u8);
        assert!(matches!(
            slot.into_inner::<u16>(),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_integer_decode_coercion() {
        let mut value = 0i32;
        value
            .wire_decode(&WireNode::Uint(1000))
            .expect("uint fits i32");
        assert_eq!(value, 1000);

        let mut value = 0u8;
        assert!(matches!(
            value.wire_decode(&WireNode::Uint(1000)),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            value.wire_decode(&WireNode::Int(-1)),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_float_decode_coercion() {
        let mut value = 0.0f64;
        value.wire_decode(&WireNode::Uint(3)).expect("int into f64");
        assert_eq!(value, 3.0);
        assert!(matches!(
            value.wire_decode(&WireNode::Str("x".into())),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_string_strictness() {
        let mut value = String::new();
        value
            .wire_decode(&WireNode::Str("telemetry".into()))
            .expect("str into string");
        assert_eq!(value, "telemetry");
        assert!(matches!(
            value.wire_decode(&WireNode::Uint(1)),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_json_string_escaping() {
        let mut out = String::new();
        write_json_string(&mut out, "a\"b\\c\nd\u{1}").expect("render");
        assert_eq!(out, "\"a\\\"b\\\\c\\nd\\u0001\"");
    }

    #[test]
    fn test_slot_bytes() {
        let slot = ValueSlot::new(127u8);
        assert_eq!(slot.to_bytes(), vec![0x7f]);
        let slot = ValueSlot::new(true);
        assert_eq!(slot.to_bytes(), vec![0xc3]);
    }
}
