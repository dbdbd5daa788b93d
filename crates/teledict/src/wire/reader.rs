// SPDX-License-Identifier: Apache-2.0 OR MIT

//! MessagePack reader: full-buffer parse into a [`WireNode`] tree.

use super::{WireError, WireNode, WireResult, MAX_PARSE_DEPTH};

/// Parse one message from the front of `data`.
///
/// Trailing bytes after the root message are ignored. Any structural
/// defect in the message itself (truncation, reserved markers, non-string
/// map keys, invalid UTF-8, excessive nesting) is a [`WireError`].
pub fn parse(data: &[u8]) -> WireResult<WireNode> {
    let mut cursor = ByteCursor::new(data);
    read_node(&mut cursor, 0)
}

/// Bounds-checked big-endian read cursor.
struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

macro_rules! impl_read_be {
    ($name:ident, $type:ty, $size:expr) => {
        fn $name(&mut self) -> WireResult<$type> {
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.read_exact($size)?);
            Ok(<$type>::from_be_bytes(bytes))
        }
    };
}

impl<'a> ByteCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    fn read_u8(&mut self) -> WireResult<u8> {
        let byte = *self
            .data
            .get(self.offset)
            .ok_or(WireError::Truncated {
                offset: self.offset,
            })?;
        self.offset += 1;
        Ok(byte)
    }

    fn read_exact(&mut self, len: usize) -> WireResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(WireError::Truncated {
                offset: self.offset,
            });
        }
        let slice = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    impl_read_be!(read_u16_be, u16, 2);
    impl_read_be!(read_u32_be, u32, 4);
    impl_read_be!(read_u64_be, u64, 8);
    impl_read_be!(read_i8_be, i8, 1);
    impl_read_be!(read_i16_be, i16, 2);
    impl_read_be!(read_i32_be, i32, 4);
    impl_read_be!(read_i64_be, i64, 8);
}

/// Normalize a signed wire integer: non-negative values become `Uint` so
/// inference treats them like any other unsigned number.
fn int_node(value: i64) -> WireNode {
    if value >= 0 {
        WireNode::Uint(value as u64)
    } else {
        WireNode::Int(value)
    }
}

fn read_str(cursor: &mut ByteCursor<'_>, len: usize) -> WireResult<String> {
    let offset = cursor.offset;
    let bytes = cursor.read_exact(len)?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| WireError::InvalidUtf8 { offset })
}

fn read_array(cursor: &mut ByteCursor<'_>, len: usize, depth: usize) -> WireResult<WireNode> {
    // Every element takes at least one byte; a longer declared length is
    // a truncated message, caught here before allocating.
    if len > cursor.remaining() {
        return Err(WireError::Truncated {
            offset: cursor.offset,
        });
    }
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(read_node(cursor, depth + 1)?);
    }
    Ok(WireNode::Array(items))
}

fn read_map(cursor: &mut ByteCursor<'_>, len: usize, depth: usize) -> WireResult<WireNode> {
    // Each entry takes at least two bytes (key marker + value marker).
    if len.saturating_mul(2) > cursor.remaining() {
        return Err(WireError::Truncated {
            offset: cursor.offset,
        });
    }
    let mut entries = Vec::with_capacity(len);
    for _ in 0..len {
        let key_offset = cursor.offset;
        let key = match read_node(cursor, depth + 1)? {
            WireNode::Str(key) => key,
            _ => return Err(WireError::InvalidKey { offset: key_offset }),
        };
        let value = read_node(cursor, depth + 1)?;
        entries.push((key, value));
    }
    Ok(WireNode::Map(entries))
}

fn read_node(cursor: &mut ByteCursor<'_>, depth: usize) -> WireResult<WireNode> {
    if depth > MAX_PARSE_DEPTH {
        return Err(WireError::DepthExceeded {
            limit: MAX_PARSE_DEPTH,
        });
    }
    let marker_offset = cursor.offset;
    let marker = cursor.read_u8()?;
    match marker {
        // positive fixint
        0x00..=0x7f => Ok(WireNode::Uint(u64::from(marker))),
        // fixmap / fixarray / fixstr
        0x80..=0x8f => read_map(cursor, usize::from(marker & 0x0f), depth),
        0x90..=0x9f => read_array(cursor, usize::from(marker & 0x0f), depth),
        0xa0..=0xbf => Ok(WireNode::Str(read_str(cursor, usize::from(marker & 0x1f))?)),
        0xc0 => Ok(WireNode::Nil),
        0xc2 => Ok(WireNode::Bool(false)),
        0xc3 => Ok(WireNode::Bool(true)),
        // bin 8/16/32
        0xc4 => {
            let len = usize::from(cursor.read_u8()?);
            Ok(WireNode::Bin(cursor.read_exact(len)?.to_vec()))
        }
        0xc5 => {
            let len = usize::from(cursor.read_u16_be()?);
            Ok(WireNode::Bin(cursor.read_exact(len)?.to_vec()))
        }
        0xc6 => {
            let len = cursor.read_u32_be()? as usize;
            Ok(WireNode::Bin(cursor.read_exact(len)?.to_vec()))
        }
        0xca => Ok(WireNode::F32(f32::from_bits(cursor.read_u32_be()?))),
        0xcb => Ok(WireNode::F64(f64::from_bits(cursor.read_u64_be()?))),
        // uint 8/16/32/64
        0xcc => Ok(WireNode::Uint(u64::from(cursor.read_u8()?))),
        0xcd => Ok(WireNode::Uint(u64::from(cursor.read_u16_be()?))),
        0xce => Ok(WireNode::Uint(u64::from(cursor.read_u32_be()?))),
        0xcf => Ok(WireNode::Uint(cursor.read_u64_be()?)),
        // int 8/16/32/64
        0xd0 => Ok(int_node(i64::from(cursor.read_i8_be()?))),
        0xd1 => Ok(int_node(i64::from(cursor.read_i16_be()?))),
        0xd2 => Ok(int_node(i64::from(cursor.read_i32_be()?))),
        0xd3 => Ok(int_node(cursor.read_i64_be()?)),
        // str 8/16/32
        0xd9 => {
            let len = usize::from(cursor.read_u8()?);
            Ok(WireNode::Str(read_str(cursor, len)?))
        }
        0xda => {
            let len = usize::from(cursor.read_u16_be()?);
            Ok(WireNode::Str(read_str(cursor, len)?))
        }
        0xdb => {
            let len = cursor.read_u32_be()? as usize;
            Ok(WireNode::Str(read_str(cursor, len)?))
        }
        // array 16/32
        0xdc => {
            let len = usize::from(cursor.read_u16_be()?);
            read_array(cursor, len, depth)
        }
        0xdd => {
            let len = cursor.read_u32_be()? as usize;
            read_array(cursor, len, depth)
        }
        // map 16/32
        0xde => {
            let len = usize::from(cursor.read_u16_be()?);
            read_map(cursor, len, depth)
        }
        0xdf => {
            let len = cursor.read_u32_be()? as usize;
            read_map(cursor, len, depth)
        }
        // negative fixint
        0xe0..=0xff => Ok(WireNode::Int(i64::from(marker as i8))),
        // 0xc1 reserved, 0xc7..0xc9 ext, 0xd4..0xd8 fixext
        _ => Err(WireError::UnsupportedMarker {
            marker,
            offset: marker_offset,
        }),
    }
}
