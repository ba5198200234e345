//! Names for every encoding a [`WireBuffer`](crate::WireBuffer) can read or write.

use std::fmt;
use std::str::FromStr;

/// A wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Float64,
    /// 8-bit code units, no terminator, no length.
    EndStr8,
    /// 16-bit code units, no terminator, no length.
    EndStr16,
    /// 8-bit code units followed by a 0 unit.
    NullStr8,
    /// 16-bit code units followed by a 0 unit.
    NullStr16,
    /// uint32 unit count, then 8-bit code units.
    LenStr8,
    /// uint32 unit count, then 16-bit code units.
    LenStr16,
    /// Uninterpreted raw bytes.
    Bytes,
}

impl Format {
    pub const ALL: [Format; 16] = [
        Format::Bool,
        Format::Int8,
        Format::UInt8,
        Format::Int16,
        Format::UInt16,
        Format::Int32,
        Format::UInt32,
        Format::Float32,
        Format::Float64,
        Format::EndStr8,
        Format::EndStr16,
        Format::NullStr8,
        Format::NullStr16,
        Format::LenStr8,
        Format::LenStr16,
        Format::Bytes,
    ];

    /// Encoded width of a fixed-size format, `None` for strings and raw bytes.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Format::Bool | Format::Int8 | Format::UInt8 => Some(1),
            Format::Int16 | Format::UInt16 => Some(2),
            Format::Int32 | Format::UInt32 | Format::Float32 => Some(4),
            Format::Float64 => Some(8),
            _ => None,
        }
    }

    /// Width of one code unit for string formats.
    pub fn unit_width(self) -> Option<usize> {
        match self {
            Format::EndStr8 | Format::NullStr8 | Format::LenStr8 => Some(1),
            Format::EndStr16 | Format::NullStr16 | Format::LenStr16 => Some(2),
            _ => None,
        }
    }

    /// True for the string formats.
    pub fn is_string(self) -> bool {
        self.unit_width().is_some()
    }

    /// True when a reader can decode this format without an out-of-band length.
    pub fn is_self_delimiting(self) -> bool {
        !matches!(self, Format::EndStr8 | Format::EndStr16 | Format::Bytes)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Bool => "bool",
            Format::Int8 => "int8",
            Format::UInt8 => "uint8",
            Format::Int16 => "int16",
            Format::UInt16 => "uint16",
            Format::Int32 => "int32",
            Format::UInt32 => "uint32",
            Format::Float32 => "float32",
            Format::Float64 => "float64",
            Format::EndStr8 => "end_str8",
            Format::EndStr16 => "end_str16",
            Format::NullStr8 => "null_str8",
            Format::NullStr16 => "null_str16",
            Format::LenStr8 => "len_str8",
            Format::LenStr16 => "len_str16",
            Format::Bytes => "bytes",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a format name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown wire format: {0}")]
pub struct UnknownFormat(pub String);

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Format::ALL
            .into_iter()
            .find(|format| format.as_str() == lower)
            .ok_or(UnknownFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for format in Format::ALL {
            assert_eq!(format.as_str().parse::<Format>().unwrap(), format);
        }
        assert_eq!(" UInt32 ".parse::<Format>().unwrap(), Format::UInt32);
        assert!("uint64".parse::<Format>().is_err());
    }

    #[test]
    fn widths() {
        assert_eq!(Format::Bool.fixed_width(), Some(1));
        assert_eq!(Format::Int16.fixed_width(), Some(2));
        assert_eq!(Format::Float32.fixed_width(), Some(4));
        assert_eq!(Format::Float64.fixed_width(), Some(8));
        assert_eq!(Format::LenStr16.fixed_width(), None);
        assert_eq!(Format::LenStr16.unit_width(), Some(2));
        assert_eq!(Format::NullStr8.unit_width(), Some(1));
        assert!(!Format::EndStr16.is_self_delimiting());
        assert!(Format::NullStr16.is_self_delimiting());
    }
}
