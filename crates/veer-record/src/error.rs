//! Error types for dataset recording.

use std::fmt;
use std::io;

use veer_codec::CodecError;

/// Errors that can occur while recording a dataset.
#[derive(Debug)]
pub enum RecordError {
    /// The frame could not be encoded to an image file.
    Codec(CodecError),
    /// The steering log rejected a write.
    Csv(csv::Error),
    /// An I/O error outside the encoder and the CSV writer
    /// (creating the output directory, removing a partial image).
    Io(io::Error),
    /// The recorder has already been finished; no further captures or
    /// a second finish are accepted.
    Finished,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(e) => write!(f, "frame encode failed: {e}"),
            Self::Csv(e) => write!(f, "steering log write failed: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Finished => write!(f, "recorder already finished"),
        }
    }
}

impl std::error::Error for RecordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Codec(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Finished => None,
        }
    }
}

impl From<CodecError> for RecordError {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

impl From<csv::Error> for RecordError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

impl From<io::Error> for RecordError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
