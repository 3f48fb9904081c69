//! The object-safe traits every engine backend implements.

use std::sync::Arc;
use std::time::Duration;

use veer_core::{ActorId, CameraFrame, TickId, Transform, VehicleControl};

use crate::blueprint::{Blueprint, BlueprintLibrary};
use crate::endpoint::Endpoint;
use crate::error::EngineError;

/// A registered capture callback.
///
/// Invoked by the engine once per capture event, serially per camera:
/// the engine never runs two invocations for the same camera
/// concurrently, and [`Camera::stop`] does not return while an
/// invocation is in flight.
pub type FrameCallback = Box<dyn FnMut(CameraFrame) + Send + 'static>;

/// Entry point to an engine backend.
///
/// Connecting is the only operation that takes a deadline parameter:
/// it must either produce a [`Client`] or fail with
/// [`EngineError::Unreachable`] within `timeout`.
pub trait Connector {
    /// Short human-readable backend name for logs, e.g. `local`.
    fn backend(&self) -> &str;

    /// Connect to the engine at `endpoint`, bounded by `timeout`.
    fn connect(&self, endpoint: &Endpoint, timeout: Duration)
        -> Result<Box<dyn Client>, EngineError>;
}

/// A live connection to an engine.
pub trait Client: Send {
    /// Load the named map, replacing any currently loaded world.
    ///
    /// Existing worlds and their actors become invalid; engines report
    /// subsequent operations on them as [`EngineError::ActorNotFound`]
    /// or [`EngineError::Shutdown`].
    fn load_world(&mut self, map: &str) -> Result<Box<dyn World>, EngineError>;
}

/// A loaded map with its actors, blueprints, and tick signal.
pub trait World: Send {
    /// The identifier of the loaded map.
    fn map_name(&self) -> String;

    /// The map's recommended spawn points, in map order.
    ///
    /// May be empty; callers decide whether that is fatal.
    fn spawn_points(&self) -> Vec<Transform>;

    /// Snapshot of the blueprints this world can instantiate.
    fn blueprint_library(&self) -> BlueprintLibrary;

    /// Spawn a vehicle at a world-space transform.
    ///
    /// The returned handle is shared: clones of the `Arc` may read
    /// control state from other threads while the session drives the
    /// tick loop.
    fn spawn_vehicle(
        &self,
        blueprint: &Blueprint,
        at: &Transform,
    ) -> Result<Arc<dyn Vehicle>, EngineError>;

    /// Spawn a camera rigidly attached to `parent` at a relative mount
    /// transform. Attribute values are parsed here; an unparsable value
    /// fails the spawn with [`EngineError::InvalidAttribute`].
    fn spawn_camera(
        &self,
        blueprint: &Blueprint,
        mount: &Transform,
        parent: ActorId,
    ) -> Result<Box<dyn Camera>, EngineError>;

    /// Block until the engine signals the next completed tick.
    ///
    /// Fails with [`EngineError::TickTimeout`] if no tick arrives within
    /// `timeout`, and with [`EngineError::Shutdown`] if the engine stops
    /// while waiting.
    fn wait_for_tick(&self, timeout: Duration) -> Result<TickId, EngineError>;

    /// Reposition the free-floating spectator view.
    fn set_spectator_transform(&self, transform: &Transform) -> Result<(), EngineError>;

    /// The spectator's current pose.
    fn spectator_transform(&self) -> Result<Transform, EngineError>;
}

/// A spawned vehicle actor.
///
/// All methods take `&self`: the handle is a view onto engine-owned
/// state, safe to share between the session thread and capture
/// callbacks.
pub trait Vehicle: Send + Sync {
    /// The engine-assigned actor id.
    fn id(&self) -> ActorId;

    /// The blueprint id this actor was spawned from.
    fn type_id(&self) -> String;

    /// Enable or disable the engine's built-in autopilot.
    fn set_autopilot(&self, enabled: bool) -> Result<(), EngineError>;

    /// The control command currently applied to the vehicle.
    fn control(&self) -> Result<VehicleControl, EngineError>;

    /// The vehicle's current world-space transform.
    fn transform(&self) -> Result<Transform, EngineError>;

    /// Remove the actor from the world.
    ///
    /// After a successful destroy every other method, and a second
    /// destroy, fails with [`EngineError::ActorNotFound`].
    fn destroy(&self) -> Result<(), EngineError>;
}

/// A spawned camera sensor.
pub trait Camera: Send {
    /// The engine-assigned actor id.
    fn id(&self) -> ActorId;

    /// Register the capture callback, replacing any previous one.
    ///
    /// Capture events begin arriving after this returns, at the rate
    /// the camera's `sensor_tick` attribute configured at spawn.
    fn listen(&self, callback: FrameCallback) -> Result<(), EngineError>;

    /// Stop capturing and release the registered callback.
    ///
    /// When this returns, no invocation is in flight and none will
    /// follow; the callback (and everything it captured) has been
    /// dropped. Idempotent.
    fn stop(&self) -> Result<(), EngineError>;
}

// Session state owning these handles moves between threads.
const _: () = {
    const fn assert_send<T: Send + ?Sized>() {}
    assert_send::<Box<dyn Client>>();
    assert_send::<Box<dyn World>>();
    assert_send::<Box<dyn Camera>>();
    assert_send::<Arc<dyn Vehicle>>();
};
