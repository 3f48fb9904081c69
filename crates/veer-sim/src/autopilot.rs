//! The wander autopilot and vehicle kinematics.
//!
//! The drive model is a smoothed random walk: each tick draws a small
//! jitter, folds it into a decaying steering target, and relaxes the
//! applied steering toward that target. The result meanders like a
//! casual drive without ever saturating the steering range, and is a
//! pure function of the seed and the tick count.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use veer_core::{Transform, VehicleControl};

/// Steering target never leaves this band.
const MAX_STEER: f32 = 0.6;
/// Jitter magnitude folded into the target, per second.
const WANDER_RATE: f32 = 2.5;
/// How quickly the target decays back toward straight-ahead, per second.
const TARGET_DECAY: f32 = 0.8;
/// How quickly applied steering chases the target, per second.
const STEER_GAIN: f32 = 4.0;
/// Constant cruise throttle.
const CRUISE_THROTTLE: f32 = 0.65;

/// Ground speed at full throttle, metres per second.
const FULL_THROTTLE_SPEED: f32 = 12.0;
/// Yaw rate at full steering lock, degrees per second.
const FULL_LOCK_YAW_RATE: f32 = 45.0;

/// Seeded steering model for one vehicle.
pub struct WanderAutopilot {
    rng: ChaCha8Rng,
    target: f32,
    steer: f32,
}

impl WanderAutopilot {
    /// A model at straight-ahead rest, seeded for reproducibility.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            target: 0.0,
            steer: 0.0,
        }
    }

    /// Advance the model by `dt` seconds and return the control block
    /// to apply for the step.
    pub fn step(&mut self, dt: f32) -> VehicleControl {
        let jitter: f32 = self.rng.random_range(-1.0..1.0) * WANDER_RATE * dt;
        self.target =
            (self.target * (1.0 - TARGET_DECAY * dt).max(0.0) + jitter).clamp(-MAX_STEER, MAX_STEER);
        self.steer += (self.target - self.steer) * (STEER_GAIN * dt).min(1.0);
        VehicleControl {
            throttle: CRUISE_THROTTLE,
            steer: self.steer,
            ..VehicleControl::default()
        }
    }
}

/// Integrate one kinematic step: yaw follows steering, position follows
/// the facing direction at throttle-scaled speed.
pub fn integrate(transform: &mut Transform, control: &VehicleControl, dt: f32) {
    let control = control.clamped();
    let speed = if control.reverse {
        -control.throttle * FULL_THROTTLE_SPEED
    } else {
        control.throttle * FULL_THROTTLE_SPEED
    };
    let braked = speed * (1.0 - control.brake);

    transform.rotation.yaw += control.steer * FULL_LOCK_YAW_RATE * dt;
    if transform.rotation.yaw > 180.0 {
        transform.rotation.yaw -= 360.0;
    } else if transform.rotation.yaw < -180.0 {
        transform.rotation.yaw += 360.0;
    }

    let forward = transform.forward_vector();
    transform.location.x += forward.x * braked * dt;
    transform.location.y += forward.y * braked * dt;
    transform.location.z += forward.z * braked * dt;
}
