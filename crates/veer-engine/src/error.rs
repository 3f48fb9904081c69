//! The engine error taxonomy.
//!
//! One enum for every failure an engine backend can report through the
//! seam traits. Session-level errors (missing vehicle blueprint, empty
//! spawn-point list, recording failures) live in `veer-session`; this
//! enum covers only what the engine itself can refuse to do.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use veer_core::ActorId;

/// Errors reported by an engine backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// No engine answered at the endpoint within the connect timeout.
    Unreachable {
        /// The endpoint that was tried, as `host:port`.
        endpoint: String,
        /// The configured connect timeout.
        timeout: Duration,
    },
    /// The engine does not know the requested map.
    MapNotFound {
        /// The requested map identifier.
        map: String,
    },
    /// An attribute key the blueprint does not declare.
    UnknownAttribute {
        /// The blueprint id.
        blueprint: String,
        /// The rejected attribute key.
        key: String,
    },
    /// An attribute value the engine could not parse at spawn time.
    InvalidAttribute {
        /// The blueprint id.
        blueprint: String,
        /// The attribute key.
        key: String,
        /// The unparsable value.
        value: String,
    },
    /// The engine refused to instantiate the blueprint.
    SpawnFailed {
        /// The blueprint id.
        blueprint: String,
        /// Engine-reported reason.
        reason: String,
    },
    /// An operation on an actor the engine no longer tracks
    /// (already destroyed, or never spawned by this session).
    ActorNotFound {
        /// The stale actor id.
        id: ActorId,
    },
    /// No tick was signalled within the caller's wait timeout.
    TickTimeout {
        /// How long the caller waited.
        waited: Duration,
    },
    /// The engine is shutting down and no longer serves requests.
    Shutdown,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable { endpoint, timeout } => {
                write!(f, "no engine reachable at {endpoint} within {timeout:?}")
            }
            Self::MapNotFound { map } => write!(f, "map '{map}' not found"),
            Self::UnknownAttribute { blueprint, key } => {
                write!(f, "blueprint '{blueprint}' has no attribute '{key}'")
            }
            Self::InvalidAttribute {
                blueprint,
                key,
                value,
            } => {
                write!(
                    f,
                    "blueprint '{blueprint}': attribute '{key}' value '{value}' is invalid"
                )
            }
            Self::SpawnFailed { blueprint, reason } => {
                write!(f, "failed to spawn '{blueprint}': {reason}")
            }
            Self::ActorNotFound { id } => write!(f, "actor {id} not found"),
            Self::TickTimeout { waited } => {
                write!(f, "no simulation tick within {waited:?}")
            }
            Self::Shutdown => write!(f, "engine is shutting down"),
        }
    }
}

impl Error for EngineError {}
