//! Synthetic camera rasters.
//!
//! Frames show a flat-shaded road scene: a sky gradient above the
//! horizon, tarmac below it, and a dashed centreline whose screen
//! position follows the camera's yaw and whose dash phase follows the
//! distance travelled. The raster is a pure function of the camera pose
//! and frame size, so seeded runs reproduce identical image bytes.

use veer_core::{Transform, BYTES_PER_PIXEL};

/// Dash length of the centreline, in rows.
const DASH_ROWS: i64 = 8;
/// Centreline half-width, in columns.
const LINE_HALF_WIDTH: i64 = 2;

/// Render one frame as tightly packed BGRA rows.
pub fn render_bgra(width: u32, height: u32, pose: &Transform) -> Vec<u8> {
    let w = width as i64;
    let h = height as i64;
    let mut data = vec![0u8; width as usize * height as usize * BYTES_PER_PIXEL];

    let horizon = h / 2;
    // Yaw pans the centreline across the image; travelled distance
    // scrolls its dashes toward the viewer.
    let centre = w / 2 - (pose.rotation.yaw as i64 * w / 180);
    let phase = (pose.location.x * 4.0) as i64 + (pose.location.y * 4.0) as i64;

    for y in 0..h {
        for x in 0..w {
            let i = ((y * w + x) as usize) * BYTES_PER_PIXEL;
            let (b, g, r) = if y < horizon {
                sky_pixel(y, horizon)
            } else {
                ground_pixel(x, y, centre, phase)
            };
            data[i] = b;
            data[i + 1] = g;
            data[i + 2] = r;
            data[i + 3] = 255;
        }
    }
    data
}

fn sky_pixel(y: i64, horizon: i64) -> (u8, u8, u8) {
    // Deepens from pale blue at the horizon to darker blue overhead.
    let depth = ((horizon - y) * 90 / horizon.max(1)).clamp(0, 90) as u8;
    (210 - depth / 3, 170 - depth / 2, 120u8.saturating_sub(depth))
}

fn ground_pixel(x: i64, y: i64, centre: i64, phase: i64) -> (u8, u8, u8) {
    let on_line = (x - centre).abs() <= LINE_HALF_WIDTH;
    let dash_lit = ((y + phase).div_euclid(DASH_ROWS)) % 2 == 0;
    if on_line && dash_lit {
        (235, 235, 235)
    } else {
        (55, 58, 60)
    }
}
