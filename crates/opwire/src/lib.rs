//! Typed wire-buffer decoding and opcode dispatch for binary message protocols.
//!
//! opwire decodes one framed message at a time: a leading uint8 opcode selects
//! a decode routine, and the routine pops little-endian fields from the rest
//! of the bytes without ever reading past their end.
//!
//! # Crate Structure
//!
//! - [`buffer`]: `WireBuffer` cursor, formats, underflow error
//! - [`dispatch`]: opcode table, handler routines, dispatcher, diagnostics
//! - [`layout`]: JSON-described message layouts for inspecting captures

/// Re-export buffer types.
pub mod buffer {
    pub use opwire_buffer::*;
}

/// Re-export dispatch types.
pub mod dispatch {
    pub use opwire_dispatch::*;
}

pub mod layout;
