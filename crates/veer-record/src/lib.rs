//! Dataset recording for the Veer driving-data toolkit.
//!
//! A recording session emits one PNG per capture event plus one row in
//! `steering_angles.csv`. This crate owns everything about that output:
//!
//! - [`frame_filename`] — the `image_{index:06}.png` naming scheme
//! - [`SteeringLog`] — the CSV log, header written on creation
//! - [`Recorder`] — counter + encoder + log behind one object, shared
//!   with the capture callback as an [`Arc<Mutex<_>>`](SharedRecorder)
//!
//! # Invariants
//!
//! - Filenames are strictly increasing with no gaps: the nth data row
//!   names `image_{n-1:06}.png`.
//! - Row count equals image-file count. A failed capture advances
//!   nothing: the counter stays, any partial image file is removed, and
//!   the error is returned to the caller.
//! - A recorder finishes at most once; captures racing teardown fail
//!   with [`RecordError::Finished`] instead of writing into a closed
//!   log.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod log;
pub mod recorder;

pub use error::RecordError;
pub use log::SteeringLog;
pub use recorder::{shared, RecordSummary, RecordedFrame, Recorder, SharedRecorder};

/// Default output directory for recorded datasets.
pub const DEFAULT_DATA_DIR: &str = "carla_data";

/// File name of the steering log inside the output directory.
pub const STEERING_LOG_NAME: &str = "steering_angles.csv";

/// The image file name for a zero-based frame index.
///
/// Zero-padded to six digits; indexes past `999_999` simply widen.
///
/// # Examples
///
/// ```
/// use veer_record::frame_filename;
///
/// assert_eq!(frame_filename(0), "image_000000.png");
/// assert_eq!(frame_filename(42), "image_000042.png");
/// assert_eq!(frame_filename(1_234_567), "image_1234567.png");
/// ```
pub fn frame_filename(index: u64) -> String {
    format!("image_{index:06}.png")
}
