//! Error types for recording sessions.

use std::error::Error;
use std::fmt;

use veer_engine::EngineError;
use veer_record::RecordError;

/// Errors that can end a recording session.
///
/// Setup failures surface before anything was spawned or after the
/// drop guard cleaned up; loop and teardown failures surface after
/// teardown completed. A loop failure always takes precedence over
/// any teardown failure in the returned result.
#[derive(Debug)]
pub enum SessionError {
    /// The engine rejected an operation.
    Engine(EngineError),
    /// The recorder rejected an operation.
    Record(RecordError),
    /// No vehicle blueprint matched the configured filter.
    NoMatchingVehicle {
        /// The filter that matched nothing.
        filter: String,
    },
    /// The loaded map has no spawn points.
    NoSpawnPoints {
        /// The map that was loaded.
        map: String,
    },
    /// The blueprint library has no RGB camera blueprint.
    NoCameraBlueprint,
    /// The recorder lock was poisoned by a panicking capture callback.
    RecorderPoisoned,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Engine(e) => write!(f, "engine: {e}"),
            Self::Record(e) => write!(f, "record: {e}"),
            Self::NoMatchingVehicle { filter } => {
                write!(f, "no vehicle blueprint matches filter '{filter}'")
            }
            Self::NoSpawnPoints { map } => {
                write!(f, "map '{map}' has no spawn points")
            }
            Self::NoCameraBlueprint => {
                write!(f, "blueprint library has no RGB camera blueprint")
            }
            Self::RecorderPoisoned => {
                write!(f, "recorder lock poisoned by a panicked capture callback")
            }
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Engine(e) => Some(e),
            Self::Record(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EngineError> for SessionError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

impl From<RecordError> for SessionError {
    fn from(e: RecordError) -> Self {
        Self::Record(e)
    }
}
