//! The vehicle control command state.

/// A vehicle's current control command, as applied by whatever is
/// driving it (the engine autopilot, in this workspace).
///
/// Recording reads this state; it never writes it. The fields mirror a
/// conventional driving-simulator control block.
///
/// # Examples
///
/// ```
/// use veer_core::VehicleControl;
///
/// let control = VehicleControl {
///     steer: 0.15,
///     throttle: 0.4,
///     ..VehicleControl::default()
/// };
/// assert_eq!(control.steer, 0.15);
/// assert!(!control.hand_brake);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VehicleControl {
    /// Accelerator position in `[0, 1]`.
    pub throttle: f32,
    /// Steering position in `[-1, 1]`; negative steers left.
    ///
    /// This is the scalar the dataset records as the per-frame label.
    pub steer: f32,
    /// Brake position in `[0, 1]`.
    pub brake: f32,
    /// Whether the hand brake is engaged.
    pub hand_brake: bool,
    /// Whether reverse gear is selected.
    pub reverse: bool,
}

impl VehicleControl {
    /// A control block with the steering clamped to `[-1, 1]` and the
    /// pedal positions clamped to `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self {
            throttle: self.throttle.clamp(0.0, 1.0),
            steer: self.steer.clamp(-1.0, 1.0),
            brake: self.brake.clamp(0.0, 1.0),
            hand_brake: self.hand_brake,
            reverse: self.reverse,
        }
    }
}
