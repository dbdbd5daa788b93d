// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable parse tree produced by the reader.

/// One parsed MessagePack value.
///
/// Integers are normalized by sign: any non-negative integer parses as
/// `Uint`, so `Int` always holds a negative value. Nil and binary blobs
/// parse fine but are rejected later by type inference.
#[derive(Debug, Clone, PartialEq)]
pub enum WireNode {
    Nil,
    Bool(bool),
    /// Negative integer.
    Int(i64),
    /// Non-negative integer.
    Uint(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Bin(Vec<u8>),
    Array(Vec<WireNode>),
    Map(Vec<(String, WireNode)>),
}

impl WireNode {
    /// Wire-shape name used in error messages.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::F32(_) => "float",
            Self::F64(_) => "double",
            Self::Str(_) => "str",
            Self::Bin(_) => "bin",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Uint(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric coercion to `f64`, matching mpack's lenient float reads.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Uint(v) => Some(*v as f64),
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[WireNode]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, WireNode)]> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Collect an all-numeric array into `f64`s. `None` when this is not
    /// an array or any element is non-numeric.
    pub fn numeric_array(&self) -> Option<Vec<f64>> {
        let items = self.as_array()?;
        items.iter().map(WireNode::as_f64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_accessors() {
        assert_eq!(WireNode::Uint(42).as_i64(), Some(42));
        assert_eq!(WireNode::Int(-7).as_i64(), Some(-7));
        assert_eq!(WireNode::Int(-7).as_u64(), None);
        assert_eq!(WireNode::Uint(u64::MAX).as_i64(), None);
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(WireNode::Uint(3).as_f64(), Some(3.0));
        assert_eq!(WireNode::F32(0.5).as_f64(), Some(0.5));
        assert_eq!(WireNode::Str("3".into()).as_f64(), None);
    }

    #[test]
    fn test_numeric_array() {
        let node = WireNode::Array(vec![WireNode::Uint(1), WireNode::F64(2.5)]);
        assert_eq!(node.numeric_array(), Some(vec![1.0, 2.5]));

        let node = WireNode::Array(vec![WireNode::Uint(1), WireNode::Str("x".into())]);
        assert_eq!(node.numeric_array(), None);

        assert_eq!(WireNode::Array(vec![]).numeric_array(), Some(vec![]));
        assert_eq!(WireNode::Uint(1).numeric_array(), None);
    }
}
