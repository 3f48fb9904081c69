//! Raw capture buffer to PNG encoding for the Veer driving-data toolkit.
//!
//! A capture arrives as a flat BGRA byte buffer plus declared
//! dimensions. This crate persists it as an 8-bit RGB PNG through one of
//! two strategies, selected per session:
//!
//! - [`DirectPngEncoder`] converts the whole buffer through the `image`
//!   crate's typed pixel buffer in one pass.
//! - [`StripAlphaPngEncoder`] reinterprets the flat buffer as a
//!   height × width × 4 grid, discards the alpha plane, and encodes the
//!   remaining three channels explicitly.
//!
//! The two produce byte-for-byte identical decoded pixels for the same
//! input, and both reject a buffer whose length does not match
//! `width * height * 4` with [`CodecError::ShapeMismatch`].
//!
//! Encoders write to any [`std::io::Write`] sink, so tests encode to
//! memory and production code writes through a `BufWriter<File>`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod encoder;
pub mod error;

pub use encoder::{strip_alpha, DirectPngEncoder, FrameEncoder, StripAlphaPngEncoder};
pub use error::CodecError;

use std::fmt;
use std::str::FromStr;

/// Which [`FrameEncoder`] a session uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    /// One-pass conversion via the `image` crate's typed buffer.
    Direct,
    /// Manual reshape, alpha strip, and explicit channel encode.
    #[default]
    StripAlpha,
}

impl Encoding {
    /// Construct the encoder this strategy names.
    pub fn encoder(self) -> Box<dyn FrameEncoder> {
        match self {
            Encoding::Direct => Box::new(DirectPngEncoder),
            Encoding::StripAlpha => Box::new(StripAlphaPngEncoder),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Direct => write!(f, "direct"),
            Encoding::StripAlpha => write!(f, "strip-alpha"),
        }
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(Encoding::Direct),
            "strip-alpha" => Ok(Encoding::StripAlpha),
            other => Err(format!(
                "unknown encoding '{other}' (expected 'direct' or 'strip-alpha')"
            )),
        }
    }
}
