//! Property-based tests for WireBuffer.
//!
//! These tests use proptest to check, for arbitrary inputs:
//! - every primitive survives push then pop bit-exactly
//! - string encodings round-trip within their character sets
//! - a failed pop never changes the buffer
//! - peeking is idempotent

use opwire_buffer::{Format, WireBuffer};
use proptest::prelude::*;

// Strings with no NUL, drawn from the whole Unicode range.
fn nul_free_string() -> impl Strategy<Value = String> {
    "[^\\x00]{0,32}"
}

// Strings made only of Latin-1 characters, NUL included.
fn latin1_string() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<u8>(), 0..32)
        .prop_map(|bytes| bytes.into_iter().map(char::from).collect())
}

#[test]
fn prop_integers_round_trip() {
    proptest!(|(a in any::<i8>(), b in any::<u8>(), c in any::<i16>(), d in any::<u16>(),
                e in any::<i32>(), f in any::<u32>(), g in any::<bool>())| {
        let mut buf = WireBuffer::new();
        buf.push_int8(a);
        buf.push_uint8(b);
        buf.push_int16(c);
        buf.push_uint16(d);
        buf.push_int32(e);
        buf.push_uint32(f);
        buf.push_bool(g);
        prop_assert_eq!(buf.len(), 1 + 1 + 2 + 2 + 4 + 4 + 1);

        prop_assert_eq!(buf.pop_int8().unwrap(), a);
        prop_assert_eq!(buf.pop_uint8().unwrap(), b);
        prop_assert_eq!(buf.pop_int16().unwrap(), c);
        prop_assert_eq!(buf.pop_uint16().unwrap(), d);
        prop_assert_eq!(buf.pop_int32().unwrap(), e);
        prop_assert_eq!(buf.pop_uint32().unwrap(), f);
        prop_assert_eq!(buf.pop_bool().unwrap(), g);
        prop_assert!(buf.is_empty());
    });
}

#[test]
fn prop_floats_round_trip_bit_exact() {
    proptest!(|(x in any::<u32>(), y in any::<u64>())| {
        let x = f32::from_bits(x);
        let y = f64::from_bits(y);

        let mut buf = WireBuffer::new();
        buf.push_float32(x);
        buf.push_float64(y);

        prop_assert_eq!(buf.pop_float32().unwrap().to_bits(), x.to_bits());
        prop_assert_eq!(buf.pop_float64().unwrap().to_bits(), y.to_bits());
    });
}

#[test]
fn prop_null_str16_round_trip() {
    proptest!(|(s in nul_free_string())| {
        let mut buf = WireBuffer::new();
        buf.push_null_str16(&s);
        prop_assert_eq!(buf.pop_null_str16().unwrap(), s);
        prop_assert!(buf.is_empty());
    });
}

#[test]
fn prop_len_str_round_trip() {
    proptest!(|(latin in latin1_string(), wide in nul_free_string())| {
        let mut buf = WireBuffer::new();
        buf.push_len_str8(&latin);
        buf.push_len_str16(&wide);
        buf.push_len_str16("");

        prop_assert_eq!(buf.pop_len_str8().unwrap(), latin);
        prop_assert_eq!(buf.pop_len_str16().unwrap(), wide);
        prop_assert_eq!(buf.pop_len_str16().unwrap(), "");
        prop_assert!(buf.is_empty());
    });
}

#[test]
fn prop_short_pops_leave_buffer_unchanged() {
    proptest!(|(bytes in prop::collection::vec(any::<u8>(), 0..8))| {
        let mut buf = WireBuffer::from(bytes.clone());

        let fixed = [
            Format::Bool,
            Format::Int8,
            Format::UInt8,
            Format::Int16,
            Format::UInt16,
            Format::Int32,
            Format::UInt32,
            Format::Float32,
            Format::Float64,
        ];
        for format in fixed {
            let width = format.fixed_width().unwrap();
            let result = match format {
                Format::Bool => buf.pop_bool().map(|_| ()),
                Format::Int8 => buf.pop_int8().map(|_| ()),
                Format::UInt8 => buf.pop_uint8().map(|_| ()),
                Format::Int16 => buf.pop_int16().map(|_| ()),
                Format::UInt16 => buf.pop_uint16().map(|_| ()),
                Format::Int32 => buf.pop_int32().map(|_| ()),
                Format::UInt32 => buf.pop_uint32().map(|_| ()),
                Format::Float32 => buf.pop_float32().map(|_| ()),
                _ => buf.pop_float64().map(|_| ()),
            };

            if bytes.len() < width {
                let err = result.unwrap_err();
                prop_assert_eq!(err.format, format);
                prop_assert_eq!(err.wanted, width);
                prop_assert_eq!(err.remaining, bytes.len());
                prop_assert_eq!(buf.as_bytes(), &bytes[..]);
            } else {
                prop_assert!(result.is_ok());
                // Put the consumed bytes back for the next format.
                buf = WireBuffer::from(bytes.clone());
            }
        }
    });
}

#[test]
fn prop_failed_string_pops_leave_buffer_unchanged() {
    proptest!(|(bytes in prop::collection::vec(1u8..=255, 0..16), count in 17u32..1000)| {
        // No zero byte anywhere: null_str has no terminator.
        let mut buf = WireBuffer::from(bytes.clone());
        prop_assert!(buf.pop_null_str8().is_err());
        prop_assert!(buf.pop_null_str16().is_err());
        prop_assert_eq!(buf.as_bytes(), &bytes[..]);

        // Count larger than the body that follows.
        let mut buf = WireBuffer::new();
        buf.push_uint32(count);
        buf.push_bytes(&bytes);
        let before = buf.clone();
        prop_assert!(buf.pop_len_str8().is_err());
        prop_assert!(buf.pop_len_str16().is_err());
        prop_assert_eq!(buf, before);
    });
}

#[test]
fn prop_peek_is_idempotent() {
    proptest!(|(value in any::<u32>(), tail in prop::collection::vec(any::<u8>(), 0..8))| {
        let mut buf = WireBuffer::new();
        buf.push_uint32(value);
        buf.push_bytes(&tail);
        let len = buf.len();

        let first = buf.peek_uint32().unwrap();
        prop_assert_eq!(buf.len(), len);
        let second = buf.peek_uint32().unwrap();
        prop_assert_eq!(buf.len(), len);
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, value);
    });
}
