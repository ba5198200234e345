use crate::format::Format;

/// A read asked for more bytes than the buffer holds.
///
/// The buffer that produced this error is left exactly as it was before the
/// read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("buffer too short: wanted {wanted} bytes for {format}, got {remaining}")]
pub struct Underflow {
    /// The encoding that was being read.
    pub format: Format,
    /// Bytes the read needed (for strings, up to the point the shortfall was found).
    pub wanted: usize,
    /// Bytes the buffer actually held.
    pub remaining: usize,
}

impl Underflow {
    pub(crate) fn new(format: Format, wanted: usize, remaining: usize) -> Self {
        Self {
            format,
            wanted,
            remaining,
        }
    }
}

pub type Result<T> = std::result::Result<T, Underflow>;
