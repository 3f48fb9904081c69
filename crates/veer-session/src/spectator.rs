//! Overhead observer pose derivation.
//!
//! Every tick the session repositions the engine's spectator camera to
//! a fixed offset above and behind the vehicle, looking straight down,
//! so a human watching the engine sees the run from above.

use veer_core::{Location, Rotation, Transform};

/// Metres the observer trails the vehicle along x.
pub const TRAIL_DISTANCE: f32 = 5.0;

/// Metres the observer floats above the vehicle.
pub const OVERHEAD_HEIGHT: f32 = 50.0;

/// Observer pitch in degrees; straight down.
pub const OVERHEAD_PITCH: f32 = -90.0;

/// Derive the overhead observer pose from a vehicle transform.
///
/// The offset is applied in world axes, not along the vehicle's
/// heading, and the vehicle's rotation is not inherited: the view
/// stays north-up regardless of where the vehicle points.
pub fn overhead_pose(vehicle: &Transform) -> Transform {
    Transform {
        location: Location::new(
            vehicle.location.x - TRAIL_DISTANCE,
            vehicle.location.y,
            vehicle.location.z + OVERHEAD_HEIGHT,
        ),
        rotation: Rotation {
            pitch: OVERHEAD_PITCH,
            ..Rotation::default()
        },
    }
}
