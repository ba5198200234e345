use std::collections::HashMap;
use std::fmt;

use opwire_buffer::{Underflow, WireBuffer};

use crate::config::DispatchConfig;
use crate::diagnostic::{Diagnostic, DiagnosticSink, LogSink};
use crate::error::{DispatchError, ParseError, Result};
use crate::routines::{Handler, Routine, Routines};
use crate::table::OpcodeTable;

/// What happened to one dispatched message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// The routine decoded the message.
    Handled {
        opcode: u8,
        name: String,
        /// Bytes the routine left unread.
        trailing: usize,
    },
    /// No table entry for the opcode; the message was dropped.
    UnknownOpcode(u8),
    /// The routine ran out of bytes; the message was dropped.
    Malformed {
        opcode: u8,
        name: String,
        error: Underflow,
    },
}

impl Dispatched {
    /// True when a routine decoded the message.
    pub fn is_handled(&self) -> bool {
        matches!(self, Dispatched::Handled { .. })
    }

    pub fn opcode(&self) -> u8 {
        match self {
            Dispatched::Handled { opcode, .. }
            | Dispatched::Malformed { opcode, .. }
            | Dispatched::UnknownOpcode(opcode) => *opcode,
        }
    }
}

struct Binding<H> {
    name: String,
    routine: Routine<H>,
}

/// Routes messages to decode routines by their leading opcode byte.
///
/// Every table entry is bound to a routine when the dispatcher is built, so a
/// table that names a message the handler cannot decode is rejected up front.
/// At dispatch time the only failures are an empty message and a routine
/// reporting [`ParseError::Invalid`]; unknown opcodes and short messages are
/// reported to the diagnostic sink and dispatch carries on.
pub struct Dispatcher<H, S = LogSink> {
    table: OpcodeTable,
    bindings: HashMap<u8, Binding<H>>,
    handler: H,
    sink: S,
    config: DispatchConfig,
}

impl<H: Handler> Dispatcher<H, LogSink> {
    /// Bind `table` to `handler` with default config, logging diagnostics.
    pub fn new(table: OpcodeTable, handler: H) -> Result<Self> {
        Self::with_config(table, handler, DispatchConfig::default(), LogSink)
    }
}

impl<H: Handler, S: DiagnosticSink> Dispatcher<H, S> {
    /// Bind `table` to `handler` with explicit config and diagnostic sink.
    pub fn with_config(
        table: OpcodeTable,
        handler: H,
        config: DispatchConfig,
        sink: S,
    ) -> Result<Self> {
        let routines = handler.routines();
        Self::from_routines(table, handler, routines, config, sink)
    }
}

impl<H, S: DiagnosticSink> Dispatcher<H, S> {
    /// Bind `table` to an explicit set of routines.
    pub fn from_routines(
        table: OpcodeTable,
        handler: H,
        routines: Routines<H>,
        config: DispatchConfig,
        sink: S,
    ) -> Result<Self> {
        let bindings = bind(&table, &routines)?;
        tracing::debug!(
            opcodes = bindings.len(),
            routines = routines.len(),
            "dispatcher bound"
        );
        Ok(Self {
            table,
            bindings,
            handler,
            sink,
            config,
        })
    }

    /// Pop the opcode from `buffer` and run the matching routine on the rest.
    pub fn dispatch(&mut self, mut buffer: WireBuffer) -> Result<Dispatched> {
        let opcode = buffer.pop_uint8()?;

        let Some(binding) = self.bindings.get(&opcode) else {
            tracing::trace!(opcode, len = buffer.len(), "unknown opcode");
            self.sink.report(Diagnostic::UnknownOpcode { opcode });
            return Ok(Dispatched::UnknownOpcode(opcode));
        };

        tracing::trace!(opcode, name = %binding.name, len = buffer.len(), "dispatching");
        match (binding.routine)(&mut self.handler, &mut buffer) {
            Ok(()) => {
                let trailing = buffer.len();
                if trailing > 0 && self.config.report_trailing_bytes {
                    self.sink.report(Diagnostic::TrailingBytes {
                        opcode,
                        name: binding.name.clone(),
                        remaining: trailing,
                    });
                }
                Ok(Dispatched::Handled {
                    opcode,
                    name: binding.name.clone(),
                    trailing,
                })
            }
            Err(ParseError::Underflow(error)) => {
                tracing::debug!(opcode, name = %binding.name, %error, "message too short");
                self.sink.report(Diagnostic::Malformed {
                    opcode,
                    name: binding.name.clone(),
                    error,
                });
                Ok(Dispatched::Malformed {
                    opcode,
                    name: binding.name.clone(),
                    error,
                })
            }
            Err(ParseError::Invalid(message)) => Err(DispatchError::Routine {
                opcode,
                name: binding.name.clone(),
                message,
            }),
        }
    }

    /// Dispatch a message given as raw bytes.
    pub fn dispatch_bytes(&mut self, message: impl Into<WireBuffer>) -> Result<Dispatched> {
        self.dispatch(message.into())
    }

    /// The opcode table this dispatcher was built from.
    pub fn table(&self) -> &OpcodeTable {
        &self.table
    }

    /// Borrow the handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Mutably borrow the handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Borrow the diagnostic sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutably borrow the diagnostic sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Consume the dispatcher and return the handler and sink.
    pub fn into_inner(self) -> (H, S) {
        (self.handler, self.sink)
    }
}

impl<H, S> fmt::Debug for Dispatcher<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("table", &self.table)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn bind<H>(table: &OpcodeTable, routines: &Routines<H>) -> Result<HashMap<u8, Binding<H>>> {
    let mut entries: Vec<(u8, &str)> = table.iter().collect();
    entries.sort_unstable_by_key(|(opcode, _)| *opcode);

    let mut bindings = HashMap::with_capacity(entries.len());
    for (opcode, name) in entries {
        let routine = routines
            .get(name)
            .ok_or_else(|| DispatchError::MissingRoutine {
                opcode,
                name: name.to_string(),
            })?;
        bindings.insert(
            opcode,
            Binding {
                name: name.to_string(),
                routine,
            },
        );
    }
    Ok(bindings)
}
