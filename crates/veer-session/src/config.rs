//! Session configuration and validation.
//!
//! [`SessionConfig`] collects everything one recording run needs:
//! where the engine is, which map and vehicle to use, how the camera is
//! configured and mounted, how long to record, and where the dataset
//! lands. [`validate()`](SessionConfig::validate) checks structural
//! invariants before the session touches the engine.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use veer_codec::Encoding;
use veer_core::{Location, Transform};
use veer_engine::Endpoint;
use veer_record::DEFAULT_DATA_DIR;

/// Default bound on the initial connect (seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default map loaded at session start.
pub const DEFAULT_MAP: &str = "Town03";

/// Default substring used to resolve the vehicle blueprint.
pub const DEFAULT_VEHICLE_FILTER: &str = "model3";

/// Default recording duration (two minutes).
pub const DEFAULT_DURATION: Duration = Duration::from_secs(120);

/// Default bound on each tick wait.
pub const DEFAULT_TICK_TIMEOUT: Duration = Duration::from_secs(10);

/// Camera attributes applied at spawn.
///
/// Unset fields are not sent to the engine at all, leaving the
/// blueprint's declared defaults in place.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraSettings {
    /// Horizontal resolution (`image_size_x`).
    pub width: Option<u32>,
    /// Vertical resolution (`image_size_y`).
    pub height: Option<u32>,
    /// Horizontal field of view in degrees (`fov`).
    pub fov: Option<f32>,
    /// Seconds between captures (`sensor_tick`); `0.0` captures on
    /// every engine tick.
    pub capture_interval: Option<f64>,
}

/// Complete configuration for one recording session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Engine endpoint to connect to.
    pub endpoint: Endpoint,
    /// Bound on the initial connect.
    pub connect_timeout: Duration,
    /// Map to load.
    pub map: String,
    /// Substring matched (case-insensitively) against vehicle blueprint
    /// ids; the first match is spawned.
    pub vehicle_filter: String,
    /// Camera attributes applied at spawn.
    pub camera: CameraSettings,
    /// Camera mount pose relative to the vehicle.
    pub mount: Transform,
    /// Wall-clock recording duration, measured from loop entry.
    pub duration: Duration,
    /// Bound on each individual tick wait; a stalled engine fails the
    /// session instead of hanging it.
    pub tick_timeout: Duration,
    /// Dataset directory, created if absent.
    pub output_dir: PathBuf,
    /// PNG encoding strategy.
    pub encoding: Encoding,
}

impl Default for SessionConfig {
    /// The bonnet-camera profile: mount 0.8 m forward and 1.7 m up,
    /// engine-default camera attributes, two-minute run into
    /// `carla_data/`.
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            map: DEFAULT_MAP.to_string(),
            vehicle_filter: DEFAULT_VEHICLE_FILTER.to_string(),
            camera: CameraSettings::default(),
            mount: Transform::at(Location::new(0.8, 0.0, 1.7)),
            duration: DEFAULT_DURATION,
            tick_timeout: DEFAULT_TICK_TIMEOUT,
            output_dir: PathBuf::from(DEFAULT_DATA_DIR),
            encoding: Encoding::default(),
        }
    }
}

impl SessionConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. The endpoint needs a host.
        if self.endpoint.host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        // 2. A map must be named.
        if self.map.is_empty() {
            return Err(ConfigError::EmptyMap);
        }
        // 3. An empty filter would match every blueprint; require one.
        if self.vehicle_filter.is_empty() {
            return Err(ConfigError::EmptyVehicleFilter);
        }
        // 4. All three durations must be non-zero.
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroConnectTimeout);
        }
        if self.duration.is_zero() {
            return Err(ConfigError::ZeroDuration);
        }
        if self.tick_timeout.is_zero() {
            return Err(ConfigError::ZeroTickTimeout);
        }
        // 5. Camera dimensions, if set, must be non-zero.
        if self.camera.width == Some(0) {
            return Err(ConfigError::ZeroCameraDimension { axis: "width" });
        }
        if self.camera.height == Some(0) {
            return Err(ConfigError::ZeroCameraDimension { axis: "height" });
        }
        // 6. Field of view, if set, must be finite and within (0, 180].
        if let Some(fov) = self.camera.fov {
            if !fov.is_finite() || fov <= 0.0 || fov > 180.0 {
                return Err(ConfigError::InvalidFov { value: fov });
            }
        }
        // 7. Capture interval, if set, must be finite and non-negative
        //    (zero means every tick).
        if let Some(interval) = self.camera.capture_interval {
            if !interval.is_finite() || interval < 0.0 {
                return Err(ConfigError::InvalidCaptureInterval { value: interval });
            }
        }
        Ok(())
    }
}

/// Errors detected during [`SessionConfig::validate()`].
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The endpoint host is empty.
    EmptyHost,
    /// No map name configured.
    EmptyMap,
    /// The vehicle filter is empty.
    EmptyVehicleFilter,
    /// The connect timeout is zero.
    ZeroConnectTimeout,
    /// The recording duration is zero.
    ZeroDuration,
    /// The tick-wait timeout is zero.
    ZeroTickTimeout,
    /// A configured camera dimension is zero.
    ZeroCameraDimension {
        /// Which dimension, `width` or `height`.
        axis: &'static str,
    },
    /// The field of view is NaN, infinite, or outside (0, 180].
    InvalidFov {
        /// The invalid value.
        value: f32,
    },
    /// The capture interval is NaN, infinite, or negative.
    InvalidCaptureInterval {
        /// The invalid value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHost => write!(f, "endpoint host is empty"),
            Self::EmptyMap => write!(f, "no map configured"),
            Self::EmptyVehicleFilter => write!(f, "vehicle filter is empty"),
            Self::ZeroConnectTimeout => write!(f, "connect timeout must be non-zero"),
            Self::ZeroDuration => write!(f, "session duration must be non-zero"),
            Self::ZeroTickTimeout => write!(f, "tick timeout must be non-zero"),
            Self::ZeroCameraDimension { axis } => {
                write!(f, "camera {axis} must be non-zero when set")
            }
            Self::InvalidFov { value } => {
                write!(f, "camera fov must be finite and within (0, 180], got {value}")
            }
            Self::InvalidCaptureInterval { value } => {
                write!(
                    f,
                    "capture interval must be finite and non-negative, got {value}"
                )
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_host_is_rejected() {
        let cfg = SessionConfig {
            endpoint: Endpoint::new("", 2000),
            ..SessionConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::EmptyHost) => {}
            other => panic!("expected EmptyHost, got {other:?}"),
        }
    }

    #[test]
    fn empty_map_is_rejected() {
        let cfg = SessionConfig {
            map: String::new(),
            ..SessionConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::EmptyMap) => {}
            other => panic!("expected EmptyMap, got {other:?}"),
        }
    }

    #[test]
    fn empty_vehicle_filter_is_rejected() {
        let cfg = SessionConfig {
            vehicle_filter: String::new(),
            ..SessionConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::EmptyVehicleFilter) => {}
            other => panic!("expected EmptyVehicleFilter, got {other:?}"),
        }
    }

    #[test]
    fn zero_durations_are_rejected() {
        let base = SessionConfig::default();

        let cfg = SessionConfig {
            connect_timeout: Duration::ZERO,
            ..base.clone()
        };
        match cfg.validate() {
            Err(ConfigError::ZeroConnectTimeout) => {}
            other => panic!("expected ZeroConnectTimeout, got {other:?}"),
        }

        let cfg = SessionConfig {
            duration: Duration::ZERO,
            ..base.clone()
        };
        match cfg.validate() {
            Err(ConfigError::ZeroDuration) => {}
            other => panic!("expected ZeroDuration, got {other:?}"),
        }

        let cfg = SessionConfig {
            tick_timeout: Duration::ZERO,
            ..base
        };
        match cfg.validate() {
            Err(ConfigError::ZeroTickTimeout) => {}
            other => panic!("expected ZeroTickTimeout, got {other:?}"),
        }
    }

    #[test]
    fn zero_camera_dimension_is_rejected() {
        let cfg = SessionConfig {
            camera: CameraSettings {
                width: Some(0),
                ..CameraSettings::default()
            },
            ..SessionConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::ZeroCameraDimension { axis: "width" }) => {}
            other => panic!("expected ZeroCameraDimension, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_fov_is_rejected() {
        for bad in [0.0, -10.0, 181.0, f32::NAN, f32::INFINITY] {
            let cfg = SessionConfig {
                camera: CameraSettings {
                    fov: Some(bad),
                    ..CameraSettings::default()
                },
                ..SessionConfig::default()
            };
            match cfg.validate() {
                Err(ConfigError::InvalidFov { .. }) => {}
                other => panic!("expected InvalidFov for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn negative_capture_interval_is_rejected() {
        let cfg = SessionConfig {
            camera: CameraSettings {
                capture_interval: Some(-1.0),
                ..CameraSettings::default()
            },
            ..SessionConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::InvalidCaptureInterval { .. }) => {}
            other => panic!("expected InvalidCaptureInterval, got {other:?}"),
        }
    }

    #[test]
    fn zero_capture_interval_is_every_tick_and_valid() {
        let cfg = SessionConfig {
            camera: CameraSettings {
                capture_interval: Some(0.0),
                ..CameraSettings::default()
            },
            ..SessionConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }
}
