//! Veer: steering-labelled camera datasets from driving simulators.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Veer sub-crates. For most users, adding `veer` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! Record a short dataset against the bundled in-process reference
//! engine:
//!
//! ```rust
//! use std::time::Duration;
//! use veer::prelude::*;
//!
//! # let dir = veer_test_utils::TempDir::new("veer-quickstart")?;
//! let engine = LocalEngine::new(LocalConfig {
//!     seed: 42,
//!     tick_rate_hz: 200.0,
//!     ..LocalConfig::default()
//! })?;
//!
//! let config = SessionConfig {
//!     duration: Duration::from_millis(50),
//!     camera: CameraSettings {
//!         width: Some(16),
//!         height: Some(16),
//!         ..CameraSettings::default()
//!     },
//! #   output_dir: dir.path().to_path_buf(),
//!     ..SessionConfig::default()
//! };
//!
//! let report = RecordingSession::new(config)?.run(&engine)?;
//! assert!(report.ticks > 0);
//! // One PNG per capture, one CSV row per PNG, in report.directory.
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `veer-core` | IDs, transforms, vehicle control, raw frames |
//! | [`engine`] | `veer-engine` | The engine seam: connector/world/actor traits, blueprints |
//! | [`codec`] | `veer-codec` | BGRA-to-PNG encoding strategies |
//! | [`record`] | `veer-record` | Dataset layout, frame naming, the steering log |
//! | [`sim`] | `veer-sim` | The in-process reference engine |
//! | [`session`] | `veer-session` | Session configuration and orchestration |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core vocabulary types (`veer-core`).
///
/// Actor and tick identifiers, [`types::Transform`] geometry,
/// [`types::VehicleControl`], and the raw [`types::CameraFrame`].
pub use veer_core as types;

/// The engine seam (`veer-engine`).
///
/// Every backend implements [`engine::Connector`], [`engine::Client`],
/// [`engine::World`], [`engine::Vehicle`], and [`engine::Camera`];
/// sessions are written against these traits only.
pub use veer_engine as engine;

/// PNG encoding strategies (`veer-codec`).
///
/// [`codec::Encoding`] selects between the one-pass
/// [`codec::DirectPngEncoder`] and the reshape-and-strip
/// [`codec::StripAlphaPngEncoder`].
pub use veer_codec as codec;

/// Dataset recording (`veer-record`).
///
/// [`record::Recorder`] owns the output directory, the frame counter,
/// and the steering log; one capture becomes one PNG plus one CSV row.
pub use veer_record as record;

/// The in-process reference engine (`veer-sim`).
///
/// [`sim::LocalEngine`] implements the seam with a threaded tick loop,
/// a seeded wander autopilot, and synthetic camera rasters.
pub use veer_sim as sim;

/// Session orchestration (`veer-session`).
///
/// [`session::RecordingSession`] drives connect, spawn, record, and
/// guaranteed teardown from a validated [`session::SessionConfig`].
pub use veer_session as session;

/// Common imports for typical Veer usage.
///
/// ```rust
/// use veer::prelude::*;
/// ```
pub mod prelude {
    // Core vocabulary
    pub use veer_core::{
        ActorId, CameraFrame, Location, Rotation, TickId, Transform, VehicleControl,
    };

    // Engine seam
    pub use veer_engine::{
        Blueprint, BlueprintLibrary, Camera, Client, Connector, Endpoint, EngineError, Vehicle,
        World,
    };

    // Encoding and recording
    pub use veer_codec::{Encoding, FrameEncoder};
    pub use veer_record::{RecordSummary, Recorder};

    // Reference engine
    pub use veer_sim::{LocalConfig, LocalEngine};

    // Session
    pub use veer_session::{
        CameraSettings, RecordingSession, SessionConfig, SessionError, SessionReport,
    };
}
