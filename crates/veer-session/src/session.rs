//! The recording session: bootstrap, capture, teardown.
//!
//! One [`RecordingSession::run`] call walks the whole lifecycle against
//! any engine backend:
//!
//! ```text
//!   connect ─ load map ─ resolve blueprints ─ create recorder
//!      │
//!   spawn vehicle ─ autopilot on ─ spawn camera ─ listen
//!      │
//!   tick loop (wall-clock bound):
//!      wait_for_tick ─ read vehicle pose ─ reposition spectator
//!      (captures arrive on the engine's dispatch context and are
//!       recorded by the callback under the recorder lock)
//!      │
//!   teardown: stop camera ─ finish recorder ─ destroy vehicle
//! ```
//!
//! Teardown runs exactly once on every exit path. After the vehicle
//! exists, session state lives in a guard whose `Drop` performs the
//! same teardown, so an error between spawn and loop entry cannot leak
//! actors or leave the steering log unflushed.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use veer_core::CameraFrame;
use veer_engine::{
    Camera, Client, Connector, FrameCallback, Vehicle, World, CAMERA_BLUEPRINT_ID,
};
use veer_record::{shared, RecordError, RecordSummary, Recorder, SharedRecorder};

use crate::config::{ConfigError, SessionConfig};
use crate::error::SessionError;
use crate::spectator;

/// What a completed session produced.
#[derive(Clone, Debug)]
pub struct SessionReport {
    /// The map the session ran on.
    pub map: String,
    /// Blueprint id of the recorded vehicle.
    pub vehicle: String,
    /// Engine ticks observed by the loop.
    pub ticks: u64,
    /// Frames persisted to the dataset.
    pub frames: u64,
    /// Wall-clock time from loop entry to teardown.
    pub elapsed: Duration,
    /// The dataset directory.
    pub directory: PathBuf,
    /// Path of the steering log inside it.
    pub log_path: PathBuf,
}

/// Everything teardown must release, behind a drop guard.
struct SessionActors {
    vehicle: Arc<dyn Vehicle>,
    camera: Option<Box<dyn Camera>>,
    recorder: SharedRecorder,
    torn_down: bool,
}

struct TeardownOutcome {
    summary: Option<RecordSummary>,
    failure: Option<SessionError>,
}

impl SessionActors {
    fn new(vehicle: Arc<dyn Vehicle>, recorder: SharedRecorder) -> Self {
        Self {
            vehicle,
            camera: None,
            recorder,
            torn_down: false,
        }
    }

    /// Stop the camera, finish the recorder, destroy the vehicle.
    ///
    /// Every step runs even when an earlier one fails; the first
    /// failure is reported, the rest are logged. Idempotent: a second
    /// call does nothing.
    fn teardown(&mut self) -> TeardownOutcome {
        if self.torn_down {
            return TeardownOutcome {
                summary: None,
                failure: None,
            };
        }
        self.torn_down = true;

        let mut failure: Option<SessionError> = None;

        // Stopping first guarantees no capture is in flight when the
        // recorder is finished.
        if let Some(camera) = &self.camera {
            if let Err(e) = camera.stop() {
                error!(error = %e, "camera stop failed");
                failure.get_or_insert(e.into());
            }
        }

        let summary = match self.recorder.lock() {
            Ok(mut recorder) => match recorder.finish() {
                Ok(summary) => Some(summary),
                Err(e) => {
                    error!(error = %e, "recorder finish failed");
                    failure.get_or_insert(e.into());
                    None
                }
            },
            Err(_) => {
                error!("recorder lock poisoned at teardown");
                failure.get_or_insert(SessionError::RecorderPoisoned);
                None
            }
        };

        if let Err(e) = self.vehicle.destroy() {
            error!(error = %e, "vehicle destroy failed");
            failure.get_or_insert(e.into());
        }

        TeardownOutcome { summary, failure }
    }
}

impl Drop for SessionActors {
    fn drop(&mut self) {
        let _ = self.teardown();
    }
}

/// A configured, validated recording session.
///
/// Construction validates the configuration; [`run`](Self::run) may be
/// called any number of times, each run producing an independent
/// dataset (later runs truncate the steering log at the same path).
#[derive(Debug)]
pub struct RecordingSession {
    config: SessionConfig,
}

impl RecordingSession {
    /// Validate `config` and build a session around it.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration this session runs with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run the full session against `connector`.
    ///
    /// Blocks for the configured duration (or until an error), then
    /// tears down and returns the report. Capture failures inside the
    /// callback are logged and dropped without ending the session;
    /// every other failure ends it, after teardown.
    pub fn run(&self, connector: &dyn Connector) -> Result<SessionReport, SessionError> {
        let config = &self.config;

        info!(
            backend = connector.backend(),
            endpoint = %config.endpoint,
            "connecting to engine"
        );
        let mut client = connector.connect(&config.endpoint, config.connect_timeout)?;
        let world = client.load_world(&config.map)?;
        info!(map = %world.map_name(), "world ready");

        let library = world.blueprint_library();
        let vehicle_bp = library
            .filter(&config.vehicle_filter)
            .into_iter()
            .next()
            .cloned()
            .ok_or_else(|| SessionError::NoMatchingVehicle {
                filter: config.vehicle_filter.clone(),
            })?;
        let spawn_point = world.spawn_points().first().copied().ok_or_else(|| {
            SessionError::NoSpawnPoints {
                map: config.map.clone(),
            }
        })?;
        let mut camera_bp = library
            .find(CAMERA_BLUEPRINT_ID)
            .cloned()
            .ok_or(SessionError::NoCameraBlueprint)?;
        for (key, value) in self.camera_attributes() {
            camera_bp.set_attribute(key, value)?;
        }

        // Created before any actor exists: the dataset directory and
        // the header row land even if the session dies at spawn.
        let shared_recorder = shared(Recorder::create(
            &config.output_dir,
            config.encoding.encoder(),
        )?);

        let vehicle = world.spawn_vehicle(&vehicle_bp, &spawn_point)?;
        let mut actors = SessionActors::new(Arc::clone(&vehicle), Arc::clone(&shared_recorder));
        vehicle.set_autopilot(true)?;
        info!(
            id = %vehicle.id(),
            blueprint = vehicle_bp.id(),
            "vehicle under autopilot"
        );

        let camera = world.spawn_camera(&camera_bp, &config.mount, vehicle.id())?;
        let callback =
            Self::capture_callback(Arc::clone(&vehicle), Arc::clone(&shared_recorder));
        if let Err(e) = camera.listen(callback) {
            if let Err(stop_error) = camera.stop() {
                error!(error = %stop_error, "camera stop failed after listen error");
            }
            return Err(e.into());
        }
        info!(id = %camera.id(), "camera streaming");
        actors.camera = Some(camera);

        let started = Instant::now();
        let deadline = started + config.duration;
        let mut ticks: u64 = 0;
        let mut loop_error: Option<SessionError> = None;

        while Instant::now() < deadline {
            match world.wait_for_tick(config.tick_timeout) {
                Ok(_) => ticks += 1,
                Err(e) => {
                    loop_error = Some(e.into());
                    break;
                }
            }
            match vehicle.transform() {
                Ok(pose) => {
                    let overhead = spectator::overhead_pose(&pose);
                    if let Err(e) = world.set_spectator_transform(&overhead) {
                        warn!(error = %e, "spectator update failed");
                    }
                }
                Err(e) => {
                    loop_error = Some(e.into());
                    break;
                }
            }
        }
        let elapsed = started.elapsed();

        let outcome = actors.teardown();
        if let Some(error) = loop_error.or(outcome.failure) {
            return Err(error);
        }
        let summary = match outcome.summary {
            Some(summary) => summary,
            None => return Err(SessionError::RecorderPoisoned),
        };

        let report = SessionReport {
            map: world.map_name(),
            vehicle: vehicle.type_id(),
            ticks,
            frames: summary.frames,
            elapsed,
            directory: summary.directory,
            log_path: summary.log_path,
        };
        info!(
            frames = report.frames,
            ticks = report.ticks,
            elapsed_secs = report.elapsed.as_secs_f64(),
            directory = %report.directory.display(),
            "data collection completed"
        );
        Ok(report)
    }

    /// The attribute overrides this configuration asks for, as the
    /// string pairs the engine parses at spawn. Unset fields produce
    /// no pair.
    fn camera_attributes(&self) -> Vec<(&'static str, String)> {
        let camera = &self.config.camera;
        let mut attributes = Vec::new();
        if let Some(width) = camera.width {
            attributes.push(("image_size_x", width.to_string()));
        }
        if let Some(height) = camera.height {
            attributes.push(("image_size_y", height.to_string()));
        }
        if let Some(fov) = camera.fov {
            attributes.push(("fov", fov.to_string()));
        }
        if let Some(interval) = camera.capture_interval {
            attributes.push(("sensor_tick", interval.to_string()));
        }
        attributes
    }

    /// Build the capture callback.
    ///
    /// Runs on the engine's dispatch context. The whole body executes
    /// under the recorder lock, so the steering read, the image write,
    /// and the log row form one critical section per capture. Failures
    /// drop the frame and keep the session alive.
    fn capture_callback(vehicle: Arc<dyn Vehicle>, recorder: SharedRecorder) -> FrameCallback {
        Box::new(move |frame: CameraFrame| {
            let mut recorder = match recorder.lock() {
                Ok(guard) => guard,
                Err(_) => {
                    error!(frame = frame.frame, "recorder lock poisoned, dropping frame");
                    return;
                }
            };
            let steer = match vehicle.control() {
                Ok(control) => control.steer,
                Err(e) => {
                    error!(
                        frame = frame.frame,
                        error = %e,
                        "steering read failed, dropping frame"
                    );
                    return;
                }
            };
            if let Err(e) = recorder.record(&frame, steer) {
                match e {
                    RecordError::Finished => {
                        debug!(frame = frame.frame, "capture after finish discarded");
                    }
                    other => {
                        error!(frame = frame.frame, error = %other, "frame not recorded");
                    }
                }
            }
        })
    }
}
