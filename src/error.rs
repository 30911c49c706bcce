use std::io;
use thiserror::Error;

/// Result type for wavstream operations
pub type WavResult<T> = Result<T, WavError>;

/// Error type for all reader and writer operations.
///
/// A clean end of stream on a frame read is *not* an error; the reader
/// reports it as `Ok(false)` instead.
#[derive(Debug, Error)]
pub enum WavError {
    /// The underlying byte capability failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The container structure is malformed (bad magic, truncated or
    /// misplaced mandatory chunk, inconsistent sizes)
    #[error("malformed container at byte {offset}: {description}")]
    Structural { description: String, offset: u64 },

    /// The container is well-formed but uses an encoding this codec
    /// does not handle
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl WavError {
    /// Create a Structural error at the given byte offset
    pub fn structural(description: impl Into<String>, offset: u64) -> Self {
        WavError::Structural {
            description: description.into(),
            offset,
        }
    }

    /// Create an UnsupportedFormat error with a custom message
    pub fn unsupported(description: impl Into<String>) -> Self {
        WavError::UnsupportedFormat(description.into())
    }

    /// Maps an end-of-stream hit while parsing a named header field to a
    /// Structural error; any other I/O failure passes through unchanged.
    pub(crate) fn from_header_io(err: io::Error, what: &str, offset: u64) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            WavError::structural(format!("stream ended inside {}", what), offset)
        } else {
            WavError::Io(err)
        }
    }
}
