//! In-process reference engine for the Veer driving-data toolkit.
//!
//! [`LocalEngine`] implements the `veer-engine` seam end to end without
//! a network or an external simulator: worlds tick on a background
//! thread, spawned vehicles drive themselves with a seeded wander
//! autopilot, and cameras deliver synthetic road rasters through a
//! dedicated dispatch thread, exactly the shape a networked backend
//! presents. Identical seeds reproduce identical drives and identical
//! image bytes.
//!
//! Five ring-road maps are built in, `Town01` through `Town05`; see
//! [`available_maps`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod autopilot;
pub mod config;
mod dispatch;
mod engine;
pub mod render;
mod world;

pub use config::{LocalConfig, LocalConfigError};
pub use engine::LocalEngine;
pub use world::available_maps;
