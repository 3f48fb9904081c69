//! Reference-engine configuration and validation.

use std::error::Error;
use std::fmt;

use veer_engine::Endpoint;

/// Configuration for a [`LocalEngine`](crate::LocalEngine).
#[derive(Clone, Debug)]
pub struct LocalConfig {
    /// The endpoint the engine answers on. Connect attempts to any
    /// other endpoint fail as unreachable.
    pub endpoint: Endpoint,
    /// Seed for the autopilot wander model. Identical seeds produce
    /// identical drives.
    pub seed: u64,
    /// Target simulation tick rate. Each tick advances the world by
    /// `1 / tick_rate_hz` seconds, so simulated time tracks wall time.
    pub tick_rate_hz: f64,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            seed: 0,
            tick_rate_hz: 20.0,
        }
    }
}

impl LocalConfig {
    /// Validate structural invariants.
    pub fn validate(&self) -> Result<(), LocalConfigError> {
        // tick_rate_hz must be finite and positive, and its reciprocal
        // must also be finite (rejects subnormals where 1.0/hz = inf,
        // which would panic in Duration::from_secs_f64).
        if !self.tick_rate_hz.is_finite()
            || self.tick_rate_hz <= 0.0
            || !(1.0 / self.tick_rate_hz).is_finite()
        {
            return Err(LocalConfigError::InvalidTickRate {
                value: self.tick_rate_hz,
            });
        }
        Ok(())
    }
}

/// Errors detected during [`LocalConfig::validate()`].
#[derive(Debug, PartialEq)]
pub enum LocalConfigError {
    /// tick_rate_hz is NaN, infinite, zero, or negative.
    InvalidTickRate {
        /// The invalid value.
        value: f64,
    },
}

impl fmt::Display for LocalConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTickRate { value } => {
                write!(f, "tick_rate_hz must be finite and positive, got {value}")
            }
        }
    }
}

impl Error for LocalConfigError {}
