// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Numeric adapter types for telemetry payloads.
//!
//! These are ordinary registered value types, not special-cased by the
//! tree: each one encodes as a MessagePack array of doubles and is what
//! type inference installs for fresh numeric-array keys (see
//! [`crate::merge`]). Quaternions use wire order (w, x, y, z); matrices
//! are row-major.

use std::any::Any;
use std::fmt;

use crate::error::{Error, Result};
use crate::value::DictValue;
use crate::wire::{WireNode, WireWriter};

/// 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 3D vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Quaternion, stored and serialized in (w, x, y, z) order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

/// 3x3 matrix, row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3 {
    elements: [f64; 9],
}

impl Matrix3 {
    /// Build from row-major elements.
    pub fn from_rows(elements: [f64; 9]) -> Self {
        Self { elements }
    }

    pub fn identity() -> Self {
        Self::from_rows([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.elements[row * 3 + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.elements[row * 3 + col] = value;
    }

    /// Row-major element slice.
    pub fn as_slice(&self) -> &[f64; 9] {
        &self.elements
    }
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::identity()
    }
}

fn expect_doubles(node: &WireNode, len: usize, label: &'static str) -> Result<Vec<f64>> {
    let values = node.numeric_array().ok_or_else(|| {
        Error::type_mismatch(format!(
            "cannot decode wire {} into \"{}\"",
            node.kind_label(),
            label
        ))
    })?;
    if values.len() != len {
        return Err(Error::type_mismatch(format!(
            "expecting array[{}] for \"{}\", got array[{}]",
            len,
            label,
            values.len()
        )));
    }
    Ok(values)
}

fn write_doubles(writer: &mut WireWriter, values: &[f64]) {
    writer.start_array(values.len());
    for v in values {
        writer.write_f64(*v);
    }
}

fn render_doubles(out: &mut dyn fmt::Write, values: &[f64]) -> fmt::Result {
    out.write_char('[')?;
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write!(out, "{}", v)?;
    }
    out.write_char(']')
}

macro_rules! impl_value_plumbing {
    () => {
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
    };
}

impl DictValue for Vector2 {
    fn wire_encode(&self, writer: &mut WireWriter) {
        write_doubles(writer, &[self.x, self.y]);
    }

    fn wire_decode(&mut self, node: &WireNode) -> Result<()> {
        let v = expect_doubles(node, 2, "Vector2")?;
        *self = Self::new(v[0], v[1]);
        Ok(())
    }

    fn render_json(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        render_doubles(out, &[self.x, self.y])
    }

    fn type_label(&self) -> &'static str {
        "Vector2"
    }

    impl_value_plumbing!();
}

impl DictValue for Vector3 {
    fn wire_encode(&self, writer: &mut WireWriter) {
        write_doubles(writer, &[self.x, self.y, self.z]);
    }

    fn wire_decode(&mut self, node: &WireNode) -> Result<()> {
        let v = expect_doubles(node, 3, "Vector3")?;
        *self = Self::new(v[0], v[1], v[2]);
        Ok(())
    }

    fn render_json(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        render_doubles(out, &[self.x, self.y, self.z])
    }

    fn type_label(&self) -> &'static str {
        "Vector3"
    }

    impl_value_plumbing!();
}

impl DictValue for Quaternion {
    fn wire_encode(&self, writer: &mut WireWriter) {
        write_doubles(writer, &[self.w, self.x, self.y, self.z]);
    }

    fn wire_decode(&mut self, node: &WireNode) -> Result<()> {
        let v = expect_doubles(node, 4, "Quaternion")?;
        *self = Self::new(v[0], v[1], v[2], v[3]);
        Ok(())
    }

    fn render_json(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        render_doubles(out, &[self.w, self.x, self.y, self.z])
    }

    fn type_label(&self) -> &'static str {
        "Quaternion"
    }

    impl_value_plumbing!();
}

impl DictValue for Matrix3 {
    fn wire_encode(&self, writer: &mut WireWriter) {
        write_doubles(writer, &self.elements);
    }

    fn wire_decode(&mut self, node: &WireNode) -> Result<()> {
        let v = expect_doubles(node, 9, "Matrix3")?;
        let mut elements = [0.0; 9];
        elements.copy_from_slice(&v);
        self.elements = elements;
        Ok(())
    }

    fn render_json(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        render_doubles(out, &self.elements)
    }

    fn type_label(&self) -> &'static str {
        "Matrix3"
    }

    impl_value_plumbing!();
}

/// Dynamic-length vector of doubles.
impl DictValue for Vec<f64> {
    fn wire_encode(&self, writer: &mut WireWriter) {
        write_doubles(writer, self);
    }

    fn wire_decode(&mut self, node: &WireNode) -> Result<()> {
        *self = node.numeric_array().ok_or_else(|| {
            Error::type_mismatch(format!(
                "cannot decode wire {} into \"VecF64\"",
                node.kind_label()
            ))
        })?;
        Ok(())
    }

    fn render_json(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        render_doubles(out, self)
    }

    fn type_label(&self) -> &'static str {
        "VecF64"
    }

    impl_value_plumbing!();
}

/// List of dynamic-length vectors of doubles.
impl DictValue for Vec<Vec<f64>> {
    fn wire_encode(&self, writer: &mut WireWriter) {
        writer.start_array(self.len());
        for inner in self {
            write_doubles(writer, inner);
        }
    }

    fn wire_decode(&mut self, node: &WireNode) -> Result<()> {
        let items = node.as_array().ok_or_else(|| {
            Error::type_mismatch(format!(
                "cannot decode wire {} into \"VecVecF64\"",
                node.kind_label()
            ))
        })?;
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(item.numeric_array().ok_or_else(|| {
                Error::type_mismatch(format!(
                    "inner element of wire array is {}, expecting a numeric array",
                    item.kind_label()
                ))
            })?);
        }
        *self = out;
        Ok(())
    }

    fn render_json(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_char('[')?;
        for (i, inner) in self.iter().enumerate() {
            if i > 0 {
                out.write_str(", ")?;
            }
            render_doubles(out, inner)?;
        }
        out.write_char(']')
    }

    fn type_label(&self) -> &'static str {
        "VecVecF64"
    }

    impl_value_plumbing!();
}
