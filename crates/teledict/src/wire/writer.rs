// SPDX-License-Identifier: Apache-2.0 OR MIT

//! MessagePack writer over a growable buffer.
//!
//! Encodings are minimal: integers take the smallest marker family that
//! fits the value, strings and containers use fix forms when short. Map
//! entry counts must be known before the header is written; the tree
//! encoder counts children first, there is no streaming map form.

/// Growable MessagePack writer. Writes never fail.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Reset the buffer, keeping its allocation for reuse.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(if value { 0xc3 } else { 0xc2 });
    }

    /// Write an unsigned integer with the smallest marker that fits.
    pub fn write_u64(&mut self, value: u64) {
        if value <= 0x7f {
            self.buf.push(value as u8);
        } else if value <= u64::from(u8::MAX) {
            self.buf.push(0xcc);
            self.buf.push(value as u8);
        } else if value <= u64::from(u16::MAX) {
            self.buf.push(0xcd);
            self.buf.extend_from_slice(&(value as u16).to_be_bytes());
        } else if value <= u64::from(u32::MAX) {
            self.buf.push(0xce);
            self.buf.extend_from_slice(&(value as u32).to_be_bytes());
        } else {
            self.buf.push(0xcf);
            self.buf.extend_from_slice(&value.to_be_bytes());
        }
    }

    /// Write a signed integer with the smallest marker that fits.
    /// Non-negative values use the unsigned encodings, like mpack does.
    pub fn write_i64(&mut self, value: i64) {
        if value >= 0 {
            self.write_u64(value as u64);
        } else if value >= -32 {
            self.buf.push(value as i8 as u8);
        } else if value >= i64::from(i8::MIN) {
            self.buf.push(0xd0);
            self.buf.push(value as i8 as u8);
        } else if value >= i64::from(i16::MIN) {
            self.buf.push(0xd1);
            self.buf.extend_from_slice(&(value as i16).to_be_bytes());
        } else if value >= i64::from(i32::MIN) {
            self.buf.push(0xd2);
            self.buf.extend_from_slice(&(value as i32).to_be_bytes());
        } else {
            self.buf.push(0xd3);
            self.buf.extend_from_slice(&value.to_be_bytes());
        }
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.push(0xca);
        self.buf.extend_from_slice(&value.to_bits().to_be_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buf.push(0xcb);
        self.buf.extend_from_slice(&value.to_bits().to_be_bytes());
    }

    pub fn write_str(&mut self, value: &str) {
        let len = value.len();
        if len <= 31 {
            self.buf.push(0xa0 | len as u8);
        } else if len <= usize::from(u8::MAX) {
            self.buf.push(0xd9);
            self.buf.push(len as u8);
        } else if len <= usize::from(u16::MAX) {
            self.buf.push(0xda);
            self.buf.extend_from_slice(&(len as u16).to_be_bytes());
        } else {
            debug_assert!(len <= u32::MAX as usize);
            self.buf.push(0xdb);
            self.buf.extend_from_slice(&(len as u32).to_be_bytes());
        }
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Write an array header; the caller writes `len` elements after it.
    pub fn start_array(&mut self, len: usize) {
        if len <= 15 {
            self.buf.push(0x90 | len as u8);
        } else if len <= usize::from(u16::MAX) {
            self.buf.push(0xdc);
            self.buf.extend_from_slice(&(len as u16).to_be_bytes());
        } else {
            debug_assert!(len <= u32::MAX as usize);
            self.buf.push(0xdd);
            self.buf.extend_from_slice(&(len as u32).to_be_bytes());
        }
    }

    /// Write a map header; the caller writes `len` key/value pairs after it.
    pub fn start_map(&mut self, len: usize) {
        if len <= 15 {
            self.buf.push(0x80 | len as u8);
        } else if len <= usize::from(u16::MAX) {
            self.buf.push(0xde);
            self.buf.extend_from_slice(&(len as u16).to_be_bytes());
        } else {
            debug_assert!(len <= u32::MAX as usize);
            self.buf.push(0xdf);
            self.buf.extend_from_slice(&(len as u32).to_be_bytes());
        }
    }
}
