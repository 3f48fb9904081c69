//! Transform math: locations, rotations, and actor transforms.
//!
//! Follows the driving-simulator convention: a left-handed, Z-up frame
//! with distances in metres and angles in degrees.

use std::ops::Add;

/// A point in world space, in metres.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Location {
    /// Forward axis.
    pub x: f32,
    /// Right axis.
    pub y: f32,
    /// Up axis.
    pub z: f32,
}

impl Location {
    /// Build a location from its three components.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Straight-line distance to another location, in metres.
    pub fn distance(&self, other: &Location) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl Add for Location {
    type Output = Location;

    fn add(self, rhs: Location) -> Location {
        Location {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

/// An orientation in degrees.
///
/// `pitch` rotates about the right axis (positive looks up), `yaw` about
/// the up axis (positive turns right), `roll` about the forward axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    /// Degrees about the right axis.
    pub pitch: f32,
    /// Degrees about the up axis.
    pub yaw: f32,
    /// Degrees about the forward axis.
    pub roll: f32,
}

impl Rotation {
    /// Build a rotation from pitch, yaw, and roll in degrees.
    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }
}

/// A pose: location plus orientation.
///
/// Used both for world-space actor poses (spawn points, the vehicle's
/// live transform) and for relative mounts (a sensor's offset from its
/// parent actor).
///
/// # Examples
///
/// ```
/// use veer_core::{Location, Rotation, Transform};
///
/// // A camera mount 0.8 m forward of and 1.7 m above the parent origin.
/// let mount = Transform {
///     location: Location::new(0.8, 0.0, 1.7),
///     rotation: Rotation::default(),
/// };
/// assert_eq!(mount.location.z, 1.7);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    /// World-space or parent-relative position.
    pub location: Location,
    /// Orientation in degrees.
    pub rotation: Rotation,
}

impl Transform {
    /// Build a transform from a location and rotation.
    pub fn new(location: Location, rotation: Rotation) -> Self {
        Self { location, rotation }
    }

    /// Build a transform at the given location with zero rotation.
    pub fn at(location: Location) -> Self {
        Self {
            location,
            rotation: Rotation::default(),
        }
    }

    /// Unit vector pointing along this transform's facing direction.
    ///
    /// Derived from yaw and pitch; roll does not affect the forward axis.
    pub fn forward_vector(&self) -> Location {
        let pitch = self.rotation.pitch.to_radians();
        let yaw = self.rotation.yaw.to_radians();
        Location {
            x: pitch.cos() * yaw.cos(),
            y: pitch.cos() * yaw.sin(),
            z: pitch.sin(),
        }
    }
}
