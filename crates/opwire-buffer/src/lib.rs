//! Sequential typed reads and writes over a raw byte message.
//!
//! A [`WireBuffer`] is a FIFO cursor over one application message:
//! - fixed-width integers and floats, all little-endian
//! - booleans as a single 0/1 byte
//! - four string encodings, each with 8- and 16-bit code units:
//!   `end_str` (bare units), `null_str` (0-terminated), `len_str` (uint32 count prefix)
//!
//! Pushes never fail. Pops check the remaining length first and, on a short
//! buffer, return [`Underflow`] without consuming anything.

pub mod buffer;
pub mod error;
pub mod format;
pub mod render;

pub use buffer::{WireBuffer, LATIN1_REPLACEMENT};
pub use error::{Result, Underflow};
pub use format::{Format, UnknownFormat};
pub use render::render;
