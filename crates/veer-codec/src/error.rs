//! Error types for frame encoding.

use std::fmt;
use std::io;

/// Errors that can occur while encoding a capture buffer.
#[derive(Debug)]
pub enum CodecError {
    /// The buffer length does not match the declared dimensions.
    ShapeMismatch {
        /// Declared image width in pixels.
        width: u32,
        /// Declared image height in pixels.
        height: u32,
        /// The byte length the dimensions require.
        expected: usize,
        /// The byte length the buffer actually has.
        actual: usize,
    },
    /// The PNG encoder rejected the image data.
    Image(image::ImageError),
    /// An I/O error occurred while writing the output.
    Io(io::Error),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch {
                width,
                height,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "buffer of {actual} bytes cannot be a {width}x{height} BGRA image \
                     (expected {expected} bytes)"
                )
            }
            Self::Image(e) => write!(f, "image encode failed: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for CodecError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e)
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
