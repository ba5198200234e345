/// Controls dispatcher behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// When true, bytes left over after a successful decode are reported as a
    /// `Diagnostic::TrailingBytes`.
    pub report_trailing_bytes: bool,
    /// Maximum bytes read from an opcode table file.
    pub max_table_file_size: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            report_trailing_bytes: false,
            max_table_file_size: 64 * 1024,
        }
    }
}
