use std::fmt;

use opwire_buffer::Underflow;

/// A recoverable problem with one message. Dispatch continues after any of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The opcode is not in the table.
    UnknownOpcode { opcode: u8 },
    /// The message was too short for the fields its routine reads.
    Malformed {
        opcode: u8,
        name: String,
        error: Underflow,
    },
    /// The routine succeeded but left bytes behind.
    TrailingBytes {
        opcode: u8,
        name: String,
        remaining: usize,
    },
}

impl Diagnostic {
    /// Opcode of the message the diagnostic is about.
    pub fn opcode(&self) -> u8 {
        match self {
            Diagnostic::UnknownOpcode { opcode }
            | Diagnostic::Malformed { opcode, .. }
            | Diagnostic::TrailingBytes { opcode, .. } => *opcode,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownOpcode { opcode } => write!(f, "Unknown packet {opcode}"),
            Diagnostic::Malformed { name, error, .. } => {
                write!(f, "Parsing {name} packet failed: {error}")
            }
            Diagnostic::TrailingBytes {
                name, remaining, ..
            } => write!(f, "{name} packet left {remaining} trailing bytes"),
        }
    }
}

/// Receives diagnostics from a dispatcher.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Emits diagnostics through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::TrailingBytes { .. } => {
                tracing::debug!(opcode = diagnostic.opcode(), "{diagnostic}");
            }
            _ => tracing::warn!(opcode = diagnostic.opcode(), "{diagnostic}"),
        }
    }
}

/// Collects diagnostics in order.
impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}
