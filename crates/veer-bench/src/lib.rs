//! Benchmark inputs for the Veer toolkit.
//!
//! Deterministic [`CameraFrame`] builders shared by the criterion
//! benches and the bundled example:
//!
//! - [`patterned_frame`]: a cheap arithmetic BGRA pattern
//! - [`road_frame`]: the reference engine's actual raster for a posed
//!   vehicle, so encoder benches see realistic pixel statistics

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use veer_core::{CameraFrame, Location, Rotation, Transform, BYTES_PER_PIXEL};
use veer_sim::render::render_bgra;

/// Build a frame filled with a deterministic arithmetic pattern.
pub fn patterned_frame(width: u32, height: u32) -> CameraFrame {
    let len = width as usize * height as usize * BYTES_PER_PIXEL;
    let data = (0..len).map(|i| (i * 31 % 256) as u8).collect();
    CameraFrame {
        frame: 1,
        timestamp: 0.05,
        width,
        height,
        data,
    }
}

/// Build a frame holding the reference engine's rendered view of a
/// vehicle mid-turn.
pub fn road_frame(width: u32, height: u32) -> CameraFrame {
    let pose = Transform::new(
        Location::new(12.0, -3.0, 0.3),
        Rotation::new(0.0, 25.0, 0.0),
    );
    CameraFrame {
        frame: 1,
        timestamp: 0.05,
        width,
        height,
        data: render_bgra(width, height, &pose),
    }
}
