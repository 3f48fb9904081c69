//! Raw camera capture buffers.

/// Bytes per pixel in a raw capture buffer (BGRA, 8 bits per channel).
pub const BYTES_PER_PIXEL: usize = 4;

/// One raw camera capture as delivered to a sensor callback.
///
/// The pixel buffer is row-major BGRA: for pixel `(x, y)` the bytes at
/// `(y * width + x) * 4` are blue, green, red, alpha in that order.
/// A well-formed buffer has exactly `width * height * 4` bytes; encoders
/// reject anything else rather than guessing a shape.
///
/// `timestamp` is simulation time in seconds at the moment the frame was
/// rasterized. The steering label is sampled later, when the callback
/// runs, so the two are only approximately aligned; carrying the capture
/// timestamp lets downstream tooling measure that skew.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraFrame {
    /// Engine frame number at capture time.
    pub frame: u64,
    /// Simulation time of the capture, in seconds.
    pub timestamp: f64,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Row-major BGRA bytes.
    pub data: Vec<u8>,
}

impl CameraFrame {
    /// The byte length a well-formed buffer of these dimensions must have.
    pub fn expected_byte_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }

    /// Whether the buffer length matches the declared dimensions.
    pub fn is_rectangular(&self) -> bool {
        self.data.len() == self.expected_byte_len()
    }
}
