//! Core types for the Veer driving-data toolkit.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace:
//! strongly-typed identifiers, transform math, the vehicle control
//! state, and the raw camera capture buffer.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod control;
pub mod frame;
pub mod geom;
pub mod id;

pub use control::VehicleControl;
pub use frame::{CameraFrame, BYTES_PER_PIXEL};
pub use geom::{Location, Rotation, Transform};
pub use id::{ActorId, TickId};
