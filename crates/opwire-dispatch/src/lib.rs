//! Opcode-keyed dispatch of wire messages.
//!
//! A [`Dispatcher`] pops the leading uint8 opcode from each message, looks it
//! up in an [`OpcodeTable`], and hands the rest of the [`WireBuffer`] to the
//! decode routine the handler registered for that message name.
//!
//! One bad message never stops the stream: unknown opcodes and messages too
//! short for their fields are reported as [`Diagnostic`]s and dispatch
//! carries on with the next message.
//!
//! [`WireBuffer`]: opwire_buffer::WireBuffer

pub mod config;
pub mod diagnostic;
pub mod dispatcher;
pub mod error;
pub mod routines;
pub mod table;

pub use config::DispatchConfig;
pub use diagnostic::{Diagnostic, DiagnosticSink, LogSink};
pub use dispatcher::{Dispatched, Dispatcher};
pub use error::{DispatchError, ParseError, Result};
pub use routines::{Handler, Routine, Routines};
pub use table::OpcodeTable;
