//! Engine interface traits for the Veer driving-data toolkit.
//!
//! Everything a recording session needs from a driving simulator is
//! expressed here as object-safe traits, so session logic never names a
//! concrete backend:
//!
//! - [`Connector`] — reach a running engine within a bounded timeout
//! - [`Client`] — load a named map, producing a [`World`]
//! - [`World`] — spawn points, blueprints, actor spawning, tick waits,
//!   and the spectator pose
//! - [`Vehicle`] — autopilot switch plus read-only kinematic state
//! - [`Camera`] — capture callback registration and shutdown
//!
//! # Architecture
//!
//! ```text
//! Connector::connect ──► Client::load_world ──► World
//!                                                ├── spawn_vehicle ──► Arc<dyn Vehicle>
//!                                                ├── spawn_camera ───► Box<dyn Camera>
//!                                                └── wait_for_tick / set_spectator_transform
//! ```
//!
//! Handles are shared views onto engine state: every method takes
//! `&self`, and [`Vehicle`] is `Send + Sync` so a capture callback can
//! read control state from the engine's dispatch thread while the
//! session thread drives the tick loop.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod blueprint;
pub mod endpoint;
pub mod error;
pub mod traits;

pub use blueprint::{Blueprint, BlueprintLibrary};
pub use endpoint::Endpoint;
pub use error::EngineError;
pub use traits::{Camera, Client, Connector, FrameCallback, Vehicle, World};

/// Blueprint identifier of the forward RGB camera sensor.
pub const CAMERA_BLUEPRINT_ID: &str = "sensor.camera.rgb";
