use opwire_buffer::Underflow;

/// Errors that can occur while building or running a dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The message did not contain an opcode byte.
    #[error("missing opcode: {0}")]
    Underflow(#[from] Underflow),

    /// The opcode table already maps this opcode.
    #[error("opcode {0} registered twice")]
    DuplicateOpcode(u8),

    /// The opcode table names a message the handler cannot decode.
    #[error("no decode routine for opcode {opcode} ({name})")]
    MissingRoutine { opcode: u8, name: String },

    /// A decode routine failed for a reason other than a short buffer.
    #[error("decoding {name} (opcode {opcode}) failed: {message}")]
    Routine {
        opcode: u8,
        name: String,
        message: String,
    },

    /// The opcode table could not be loaded.
    #[error("invalid opcode table: {0}")]
    InvalidTable(String),

    /// JSON deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by a decode routine.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The message was shorter than its fields require.
    #[error(transparent)]
    Underflow(#[from] Underflow),

    /// The fields were present but not acceptable to the routine.
    #[error("{0}")]
    Invalid(String),
}

impl ParseError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
