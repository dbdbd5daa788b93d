// SPDX-License-Identifier: Apache-2.0 OR MIT
//
// Wire-format golden vectors: byte-exact expectations for serialized
// trees, pinned inline. Single-key maps throughout so the expected
// bytes do not depend on key iteration order.

#![allow(clippy::float_cmp)]

use teledict::{Dict, Quaternion, Vector3};

fn single<T: teledict::DictValue>(key: &str, value: T) -> Vec<u8> {
    let mut dict = Dict::new();
    dict.insert(key, value).expect("insert");
    dict.serialize()
}

#[test]
fn test_empty_tree() {
    assert_eq!(Dict::new().serialize(), vec![0x80]);
}

#[test]
fn test_bool_value() {
    assert_eq!(single("b", true), vec![0x81, 0xa1, b'b', 0xc3]);
    assert_eq!(single("b", false), vec![0x81, 0xa1, b'b', 0xc2]);
}

#[test]
fn test_unsigned_minimal_encodings() {
    assert_eq!(single("n", 127u64), vec![0x81, 0xa1, b'n', 0x7f]);
    assert_eq!(single("n", 128u64), vec![0x81, 0xa1, b'n', 0xcc, 0x80]);
    assert_eq!(
        single("n", 256u64),
        vec![0x81, 0xa1, b'n', 0xcd, 0x01, 0x00]
    );
    assert_eq!(
        single("n", 65_536u64),
        vec![0x81, 0xa1, b'n', 0xce, 0x00, 0x01, 0x00, 0x00]
    );
    assert_eq!(
        single("n", 4_294_967_296u64),
        vec![0x81, 0xa1, b'n', 0xcf, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]
    );
}

#[test]
fn test_small_unsigned_types_share_the_fixint_encoding() {
    // stored width never leaks into the wire
    assert_eq!(single("n", 42u8), single("n", 42u64));
    assert_eq!(single("n", 42u16), single("n", 42u32));
}

#[test]
fn test_signed_minimal_encodings() {
    assert_eq!(single("n", -1i8), vec![0x81, 0xa1, b'n', 0xff]);
    assert_eq!(single("n", -32i8), vec![0x81, 0xa1, b'n', 0xe0]);
    assert_eq!(single("n", -33i8), vec![0x81, 0xa1, b'n', 0xd0, 0xdf]);
    assert_eq!(
        single("n", -129i16),
        vec![0x81, 0xa1, b'n', 0xd1, 0xff, 0x7f]
    );
}

#[test]
fn test_non_negative_signed_uses_unsigned_markers() {
    assert_eq!(single("n", 5i32), single("n", 5u8));
    assert_eq!(single("n", 300i64), single("n", 300u16));
}

#[test]
fn test_f64_value() {
    assert_eq!(
        single("x", 1.0f64),
        vec![0x81, 0xa1, b'x', 0xcb, 0x3f, 0xf0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
    );
}

#[test]
fn test_f32_value() {
    assert_eq!(
        single("x", 1.5f32),
        vec![0x81, 0xa1, b'x', 0xca, 0x3f, 0xc0, 0x00, 0x00]
    );
}

#[test]
fn test_string_value() {
    assert_eq!(
        single("s", String::from("ok")),
        vec![0x81, 0xa1, b's', 0xa2, b'o', b'k']
    );
}

#[test]
fn test_vector3_is_a_three_element_array() {
    let bytes = single("v", Vector3::new(0.0, 0.0, 0.0));
    let mut expected = vec![0x81, 0xa1, b'v', 0x93];
    for _ in 0..3 {
        expected.extend_from_slice(&[0xcb, 0, 0, 0, 0, 0, 0, 0, 0]);
    }
    assert_eq!(bytes, expected);
}

#[test]
fn test_quaternion_scalar_first_order() {
    // w, x, y, z on the wire
    let bytes = single("q", Quaternion::new(1.0, 2.0, 3.0, 4.0));
    let mut expected = vec![0x81, 0xa1, b'q', 0x94];
    for v in [1.0f64, 2.0, 3.0, 4.0] {
        expected.push(0xcb);
        expected.extend_from_slice(&v.to_be_bytes());
    }
    assert_eq!(bytes, expected);
}

#[test]
fn test_empty_child_encodes_as_empty_map() {
    let mut dict = Dict::new();
    dict.child_mut("sub").expect("child");
    assert_eq!(dict.serialize(), vec![0x81, 0xa3, b's', b'u', b'b', 0x80]);
}

#[test]
fn test_serialization_is_stable() {
    let mut dict = Dict::new();
    dict.insert("alpha", 1u8).expect("insert");
    dict.insert("beta", 2u8).expect("insert");
    let first = dict.serialize();
    assert_eq!(dict.serialize(), first);
    // a wire round trip preserves the exact bytes, too
    let copy = dict.deepcopy().expect("deepcopy");
    assert_eq!(copy.serialize(), first);
}
