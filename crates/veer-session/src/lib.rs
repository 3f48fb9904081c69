//! Recording-session orchestration.
//!
//! This crate owns the lifecycle of one data-collection run: connect
//! to an engine through the [`veer_engine`] seam, spawn a vehicle under
//! autopilot, attach a forward RGB camera, record steering-labelled
//! frames through [`veer_record`], and tear everything down exactly
//! once. The same code drives the bundled reference engine, a real
//! backend, or the scripted fixtures used in tests.
//!
//! # Quickstart
//!
//! ```
//! use std::time::Duration;
//! use veer_session::{RecordingSession, SessionConfig};
//! use veer_test_utils::{ScriptedEngine, TempDir};
//!
//! let dir = TempDir::new("quickstart")?;
//! let mut engine = ScriptedEngine::new();
//! engine.set_tick_delay(Duration::from_millis(1));
//! engine.capture_at(1);
//!
//! let config = SessionConfig {
//!     duration: Duration::from_millis(20),
//!     output_dir: dir.path().to_path_buf(),
//!     ..SessionConfig::default()
//! };
//! let report = RecordingSession::new(config)?.run(&engine)?;
//! assert_eq!(report.frames, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod session;
pub mod spectator;

pub use config::{CameraSettings, ConfigError, SessionConfig};
pub use error::SessionError;
pub use session::{RecordingSession, SessionReport};
