//! The frame encoders and the alpha-strip primitive.
//!
//! Both encoders emit 8-bit RGB PNG. The raw buffer is BGRA, so the
//! blue and red channels swap positions on the way out; alpha is
//! discarded entirely.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, Rgb, RgbImage};

use veer_core::{CameraFrame, BYTES_PER_PIXEL};

use crate::error::CodecError;

/// Reject a frame whose buffer length contradicts its dimensions.
fn check_shape(frame: &CameraFrame) -> Result<(), CodecError> {
    if frame.is_rectangular() {
        Ok(())
    } else {
        Err(CodecError::ShapeMismatch {
            width: frame.width,
            height: frame.height,
            expected: frame.expected_byte_len(),
            actual: frame.data.len(),
        })
    }
}

/// Drop the alpha plane from a BGRA buffer.
///
/// Returns a height × width × 3 grid whose pixel values equal the first
/// three channels of the input at every coordinate (still in BGR
/// order). Fails with [`CodecError::ShapeMismatch`] if the buffer is
/// not rectangular.
pub fn strip_alpha(frame: &CameraFrame) -> Result<Vec<u8>, CodecError> {
    check_shape(frame)?;
    let mut out = Vec::with_capacity(frame.width as usize * frame.height as usize * 3);
    for px in frame.data.chunks_exact(BYTES_PER_PIXEL) {
        out.extend_from_slice(&px[..3]);
    }
    Ok(out)
}

/// Encodes one capture buffer to an output sink.
///
/// Implementations must be interchangeable: for any well-formed frame
/// the decoded pixels are identical whichever encoder produced them,
/// and malformed frames fail with the same error kind.
pub trait FrameEncoder: Send {
    /// Short strategy name for logs.
    fn name(&self) -> &'static str;

    /// Encode `frame` as PNG into `out`.
    fn encode(&self, frame: &CameraFrame, out: &mut dyn Write) -> Result<(), CodecError>;

    /// Encode `frame` to a file at `path`, creating or truncating it.
    fn encode_to_path(&self, frame: &CameraFrame, path: &Path) -> Result<(), CodecError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.encode(frame, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// One-pass conversion through the `image` crate's typed RGB buffer.
pub struct DirectPngEncoder;

impl FrameEncoder for DirectPngEncoder {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn encode(&self, frame: &CameraFrame, out: &mut dyn Write) -> Result<(), CodecError> {
        check_shape(frame)?;
        let data = &frame.data;
        let width = frame.width as usize;
        let rgb: RgbImage = RgbImage::from_fn(frame.width, frame.height, |x, y| {
            let i = (y as usize * width + x as usize) * BYTES_PER_PIXEL;
            Rgb([data[i + 2], data[i + 1], data[i]])
        });
        PngEncoder::new(out).write_image(rgb.as_raw(), frame.width, frame.height, ColorType::Rgb8)?;
        Ok(())
    }
}

/// Manual reshape of the flat buffer: strip alpha, reorder channels,
/// encode the three remaining planes explicitly.
pub struct StripAlphaPngEncoder;

impl FrameEncoder for StripAlphaPngEncoder {
    fn name(&self) -> &'static str {
        "strip-alpha"
    }

    fn encode(&self, frame: &CameraFrame, out: &mut dyn Write) -> Result<(), CodecError> {
        let mut grid = strip_alpha(frame)?;
        // The stripped grid is BGR; PNG stores RGB.
        for px in grid.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
        PngEncoder::new(out).write_image(&grid, frame.width, frame.height, ColorType::Rgb8)?;
        Ok(())
    }
}
