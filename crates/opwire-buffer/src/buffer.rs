use std::fmt;
use std::ops::{Add, AddAssign};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, Underflow};
use crate::format::Format;
use crate::render::render;

/// Written in place of characters an 8-bit string cannot carry.
pub const LATIN1_REPLACEMENT: u8 = b'?';

/// Width of the uint32 count in front of `len_str` bodies.
const LEN_PREFIX: usize = 4;

/// A FIFO byte cursor: pushes append little-endian values at the tail, pops
/// consume them from the head.
///
/// Pushes never fail. A pop either succeeds and advances by exactly the
/// encoded width, or returns [`Underflow`] and leaves the buffer untouched.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct WireBuffer {
    buf: BytesMut,
}

impl WireBuffer {
    /// Create an empty buffer for encoding.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Create an empty buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Create a buffer that starts with a single uint8 opcode.
    pub fn with_opcode(opcode: u8) -> Self {
        let mut buffer = Self::new();
        buffer.push_uint8(opcode);
        buffer
    }

    /// Number of bytes not yet consumed.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The unconsumed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Freeze the unconsumed bytes for handing to a transport.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    /// Append the unconsumed bytes of `other` to the tail of this buffer.
    pub fn append(&mut self, other: &WireBuffer) -> &mut Self {
        self.buf.extend_from_slice(&other.buf);
        self
    }

    // ------------------------------------------------------------------
    // push
    // ------------------------------------------------------------------

    pub fn push_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    pub fn push_int8(&mut self, value: i8) {
        self.buf.put_i8(value);
    }

    pub fn push_uint8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn push_int16(&mut self, value: i16) {
        self.buf.put_i16_le(value);
    }

    pub fn push_uint16(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    pub fn push_int32(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    pub fn push_uint32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    pub fn push_float32(&mut self, value: f32) {
        self.buf.put_f32_le(value);
    }

    pub fn push_float64(&mut self, value: f64) {
        self.buf.put_f64_le(value);
    }

    /// Write `value` as UTF-16 code units with no terminator and no length.
    pub fn push_end_str16(&mut self, value: &str) {
        for unit in value.encode_utf16() {
            self.buf.put_u16_le(unit);
        }
    }

    /// Write `value` as Latin-1 code units with no terminator and no length.
    ///
    /// Characters above U+00FF are written as [`LATIN1_REPLACEMENT`].
    pub fn push_end_str8(&mut self, value: &str) {
        for unit in latin1_units(value) {
            self.buf.put_u8(unit);
        }
    }

    pub fn push_null_str16(&mut self, value: &str) {
        self.push_end_str16(value);
        self.buf.put_u16_le(0);
    }

    pub fn push_null_str8(&mut self, value: &str) {
        self.push_end_str8(value);
        self.buf.put_u8(0);
    }

    /// Write a uint32 count of UTF-16 code units, then the units.
    pub fn push_len_str16(&mut self, value: &str) {
        let units: Vec<u16> = value.encode_utf16().take(u32::MAX as usize).collect();
        self.buf.reserve(LEN_PREFIX + units.len() * 2);
        self.buf.put_u32_le(units.len() as u32);
        for unit in units {
            self.buf.put_u16_le(unit);
        }
    }

    /// Write a uint32 count of Latin-1 code units, then the units.
    pub fn push_len_str8(&mut self, value: &str) {
        let units: Vec<u8> = latin1_units(value).take(u32::MAX as usize).collect();
        self.buf.reserve(LEN_PREFIX + units.len());
        self.buf.put_u32_le(units.len() as u32);
        self.buf.put_slice(&units);
    }

    /// Append raw bytes unchanged.
    pub fn push_bytes(&mut self, value: &[u8]) {
        self.buf.put_slice(value);
    }

    // ------------------------------------------------------------------
    // pop
    // ------------------------------------------------------------------

    /// Pop one byte; any non-zero value is `true`.
    pub fn pop_bool(&mut self) -> Result<bool> {
        self.pop_scalar()
    }

    pub fn pop_int8(&mut self) -> Result<i8> {
        self.pop_scalar()
    }

    pub fn pop_uint8(&mut self) -> Result<u8> {
        self.pop_scalar()
    }

    pub fn pop_int16(&mut self) -> Result<i16> {
        self.pop_scalar()
    }

    pub fn pop_uint16(&mut self) -> Result<u16> {
        self.pop_scalar()
    }

    pub fn pop_int32(&mut self) -> Result<i32> {
        self.pop_scalar()
    }

    pub fn pop_uint32(&mut self) -> Result<u32> {
        self.pop_scalar()
    }

    pub fn pop_float32(&mut self) -> Result<f32> {
        self.pop_scalar()
    }

    pub fn pop_float64(&mut self) -> Result<f64> {
        self.pop_scalar()
    }

    /// Pop exactly `units` UTF-16 code units.
    pub fn pop_end_str16(&mut self, units: usize) -> Result<String> {
        self.ensure(Format::EndStr16, units.saturating_mul(2))?;
        let raw = self.buf.split_to(units * 2);
        Ok(decode_utf16le(&raw))
    }

    /// Pop exactly `units` Latin-1 code units.
    pub fn pop_end_str8(&mut self, units: usize) -> Result<String> {
        self.ensure(Format::EndStr8, units)?;
        let raw = self.buf.split_to(units);
        Ok(decode_latin1(&raw))
    }

    /// Pop UTF-16 code units up to and including a 0 unit.
    ///
    /// The terminator is not part of the result. Without a terminator in the
    /// buffer nothing is consumed.
    pub fn pop_null_str16(&mut self) -> Result<String> {
        let units = self.units_before_terminator(Format::NullStr16, 2)?;
        let raw = self.buf.split_to((units + 1) * 2);
        Ok(decode_utf16le(&raw[..units * 2]))
    }

    /// Pop Latin-1 code units up to and including a 0 unit.
    pub fn pop_null_str8(&mut self) -> Result<String> {
        let units = self.units_before_terminator(Format::NullStr8, 1)?;
        let raw = self.buf.split_to(units + 1);
        Ok(decode_latin1(&raw[..units]))
    }

    /// Pop a uint32 count N, then N UTF-16 code units.
    pub fn pop_len_str16(&mut self) -> Result<String> {
        let body = self.len_prefixed_body(Format::LenStr16, 2)?;
        self.buf.advance(LEN_PREFIX);
        let raw = self.buf.split_to(body);
        Ok(decode_utf16le(&raw))
    }

    /// Pop a uint32 count N, then N Latin-1 code units.
    pub fn pop_len_str8(&mut self) -> Result<String> {
        let body = self.len_prefixed_body(Format::LenStr8, 1)?;
        self.buf.advance(LEN_PREFIX);
        let raw = self.buf.split_to(body);
        Ok(decode_latin1(&raw))
    }

    /// Pop `len` raw bytes.
    pub fn pop_bytes(&mut self, len: usize) -> Result<Bytes> {
        self.ensure(Format::Bytes, len)?;
        Ok(self.buf.split_to(len).freeze())
    }

    /// Discard `len` bytes.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.ensure(Format::Bytes, len)?;
        self.buf.advance(len);
        Ok(())
    }

    // ------------------------------------------------------------------
    // peek
    // ------------------------------------------------------------------

    pub fn peek_bool(&self) -> Result<bool> {
        self.peek_scalar()
    }

    pub fn peek_int8(&self) -> Result<i8> {
        self.peek_scalar()
    }

    pub fn peek_uint8(&self) -> Result<u8> {
        self.peek_scalar()
    }

    pub fn peek_int16(&self) -> Result<i16> {
        self.peek_scalar()
    }

    pub fn peek_uint16(&self) -> Result<u16> {
        self.peek_scalar()
    }

    pub fn peek_int32(&self) -> Result<i32> {
        self.peek_scalar()
    }

    /// Read the next uint32 without consuming it.
    ///
    /// Decoders use `peek_uint32()? > 0` to decide whether another record
    /// follows. A record whose leading id is 0 is indistinguishable from the
    /// end of the section.
    pub fn peek_uint32(&self) -> Result<u32> {
        self.peek_scalar()
    }

    pub fn peek_float32(&self) -> Result<f32> {
        self.peek_scalar()
    }

    pub fn peek_float64(&self) -> Result<f64> {
        self.peek_scalar()
    }

    // ------------------------------------------------------------------
    // internals
    // ------------------------------------------------------------------

    fn ensure(&self, format: Format, wanted: usize) -> Result<()> {
        let remaining = self.buf.len();
        if remaining < wanted {
            tracing::trace!(%format, wanted, remaining, "wire buffer underflow");
            return Err(Underflow::new(format, wanted, remaining));
        }
        Ok(())
    }

    fn peek_scalar<T: Scalar>(&self) -> Result<T> {
        self.ensure(T::FORMAT, T::WIDTH)?;
        let mut src = &self.buf[..T::WIDTH];
        Ok(T::get(&mut src))
    }

    fn pop_scalar<T: Scalar>(&mut self) -> Result<T> {
        let value = self.peek_scalar::<T>()?;
        self.buf.advance(T::WIDTH);
        Ok(value)
    }

    fn units_before_terminator(&self, format: Format, unit: usize) -> Result<usize> {
        self.buf
            .chunks_exact(unit)
            .position(|chunk| chunk.iter().all(|&b| b == 0))
            .ok_or_else(|| {
                let remaining = self.buf.len();
                Underflow::new(format, (remaining / unit + 1) * unit, remaining)
            })
    }

    /// Byte length of a `len_str` body, checked against what is buffered.
    fn len_prefixed_body(&self, format: Format, unit: usize) -> Result<usize> {
        self.ensure(format, LEN_PREFIX)?;
        let mut src = &self.buf[..LEN_PREFIX];
        let count = src.get_u32_le() as usize;
        let body = count.saturating_mul(unit);
        self.ensure(format, body.saturating_add(LEN_PREFIX))?;
        Ok(body)
    }
}

/// Fixed-width little-endian values.
trait Scalar: Sized {
    const FORMAT: Format;
    const WIDTH: usize;

    fn get(src: &mut &[u8]) -> Self;
}

macro_rules! scalar {
    ($ty:ty, $format:ident, $width:expr, $get:ident) => {
        impl Scalar for $ty {
            const FORMAT: Format = Format::$format;
            const WIDTH: usize = $width;

            fn get(src: &mut &[u8]) -> Self {
                src.$get()
            }
        }
    };
}

scalar!(i8, Int8, 1, get_i8);
scalar!(u8, UInt8, 1, get_u8);
scalar!(i16, Int16, 2, get_i16_le);
scalar!(u16, UInt16, 2, get_u16_le);
scalar!(i32, Int32, 4, get_i32_le);
scalar!(u32, UInt32, 4, get_u32_le);
scalar!(f32, Float32, 4, get_f32_le);
scalar!(f64, Float64, 8, get_f64_le);

impl Scalar for bool {
    const FORMAT: Format = Format::Bool;
    const WIDTH: usize = 1;

    fn get(src: &mut &[u8]) -> Self {
        src.get_u8() > 0
    }
}

fn latin1_units(value: &str) -> impl Iterator<Item = u8> + '_ {
    value
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(LATIN1_REPLACEMENT))
}

fn decode_latin1(raw: &[u8]) -> String {
    raw.iter().map(|&b| char::from(b)).collect()
}

fn decode_utf16le(raw: &[u8]) -> String {
    let units = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

impl fmt::Display for WireBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.buf))
    }
}

impl fmt::Debug for WireBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireBuffer")
            .field("len", &self.buf.len())
            .field("bytes", &render(&self.buf))
            .finish()
    }
}

impl AsRef<[u8]> for WireBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl From<Vec<u8>> for WireBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            buf: BytesMut::from(&bytes[..]),
        }
    }
}

impl From<&[u8]> for WireBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self {
            buf: BytesMut::from(bytes),
        }
    }
}

impl<const N: usize> From<&[u8; N]> for WireBuffer {
    fn from(bytes: &[u8; N]) -> Self {
        Self::from(&bytes[..])
    }
}

impl From<Bytes> for WireBuffer {
    fn from(bytes: Bytes) -> Self {
        Self {
            buf: BytesMut::from(&bytes[..]),
        }
    }
}

impl From<BytesMut> for WireBuffer {
    fn from(buf: BytesMut) -> Self {
        Self { buf }
    }
}

impl From<WireBuffer> for Bytes {
    fn from(buffer: WireBuffer) -> Self {
        buffer.into_bytes()
    }
}

impl Add for WireBuffer {
    type Output = WireBuffer;

    fn add(mut self, rhs: WireBuffer) -> Self::Output {
        self.append(&rhs);
        self
    }
}

impl AddAssign<&WireBuffer> for WireBuffer {
    fn add_assign(&mut self, rhs: &WireBuffer) {
        self.append(rhs);
    }
}
