//! A scripted engine backend for exercising session logic.
//!
//! [`ScriptedEngine`] implements the full seam — connector, client,
//! world, vehicle, camera — against a script configured up front:
//!
//! - captures fire synchronously inside `wait_for_tick`, at the ticks
//!   named by [`capture_at`](ScriptedEngine::capture_at);
//! - the vehicle replays a fixed steering sequence through `control`;
//! - failure hooks make individual operations fail on demand.
//!
//! Counters and histories accumulate in shared state, so a test keeps
//! its `ScriptedEngine` and inspects them after the code under test
//! returns.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use veer_core::{
    ActorId, CameraFrame, Location, TickId, Transform, VehicleControl, BYTES_PER_PIXEL,
};
use veer_engine::{
    Blueprint, BlueprintLibrary, Camera, Client, Connector, Endpoint, EngineError, FrameCallback,
    Vehicle, World, CAMERA_BLUEPRINT_ID,
};

const VEHICLE_ACTOR: ActorId = ActorId(1);
const CAMERA_ACTOR: ActorId = ActorId(2);

/// One recorded `spawn_vehicle` call.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleSpawn {
    pub blueprint: String,
    pub at: Transform,
}

/// One recorded `spawn_camera` call, with the attribute values the
/// blueprint carried at spawn time.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraSpawn {
    pub blueprint: String,
    pub attributes: Vec<(String, String)>,
    pub mount: Transform,
    pub parent: ActorId,
}

/// The pre-run script: what the engine will do, and when it will fail.
#[derive(Clone)]
struct Script {
    map: String,
    steer: Vec<f32>,
    captures: Vec<u64>,
    tick_limit: Option<u64>,
    tick_delay: Duration,
    fail_vehicle_spawn: bool,
    fail_camera_spawn: bool,
    fail_destroy: bool,
    fail_control_after: Option<usize>,
}

/// Counters and histories accumulated during a run.
#[derive(Default)]
struct Recorded {
    ticks: AtomicU64,
    control_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    destroy_calls: AtomicUsize,
    autopilot: Mutex<Vec<bool>>,
    spectator: Mutex<Vec<Transform>>,
    vehicle_spawns: Mutex<Vec<VehicleSpawn>>,
    camera_spawns: Mutex<Vec<CameraSpawn>>,
    callback: Mutex<Option<FrameCallback>>,
    frame_size: Mutex<(u32, u32)>,
}

/// An engine whose behaviour is scripted before the run.
///
/// Defaults: one map (`Town03`), steering fixed at `0.0`, no captures,
/// unbounded ticks with no delay, and no failures.
pub struct ScriptedEngine {
    script: Script,
    fail_connect: bool,
    recorded: Arc<Recorded>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            script: Script {
                map: "Town03".to_string(),
                steer: vec![0.0],
                captures: Vec::new(),
                tick_limit: None,
                tick_delay: Duration::ZERO,
                fail_vehicle_spawn: false,
                fail_camera_spawn: false,
                fail_destroy: false,
                fail_control_after: None,
            },
            fail_connect: false,
            recorded: Arc::new(Recorded::default()),
        }
    }

    /// The one map `load_world` accepts.
    pub fn set_map(&mut self, map: impl Into<String>) {
        self.script.map = map.into();
    }

    /// Steering values returned by successive `control` calls; the last
    /// value repeats once the sequence runs out.
    pub fn set_steer_sequence(&mut self, steer: Vec<f32>) {
        assert!(!steer.is_empty(), "steer sequence must not be empty");
        self.script.steer = steer;
    }

    /// Schedule a capture event during the given `wait_for_tick` call
    /// (ticks count from 1).
    pub fn capture_at(&mut self, tick: u64) {
        self.script.captures.push(tick);
    }

    /// Make `wait_for_tick` fail with a tick timeout after `ticks`
    /// successful waits.
    pub fn set_tick_limit(&mut self, ticks: u64) {
        self.script.tick_limit = Some(ticks);
    }

    /// Make each `wait_for_tick` call block for `delay` first.
    pub fn set_tick_delay(&mut self, delay: Duration) {
        self.script.tick_delay = delay;
    }

    pub fn fail_connect(&mut self) {
        self.fail_connect = true;
    }

    pub fn fail_vehicle_spawn(&mut self) {
        self.script.fail_vehicle_spawn = true;
    }

    pub fn fail_camera_spawn(&mut self) {
        self.script.fail_camera_spawn = true;
    }

    pub fn fail_destroy(&mut self) {
        self.script.fail_destroy = true;
    }

    /// Make `control` fail once it has been called `calls` times.
    pub fn fail_control_after(&mut self, calls: usize) {
        self.script.fail_control_after = Some(calls);
    }

    // ── Post-run inspection ──

    /// Number of completed `wait_for_tick` calls.
    pub fn ticks_waited(&self) -> u64 {
        self.recorded.ticks.load(Ordering::SeqCst)
    }

    pub fn control_calls(&self) -> usize {
        self.recorded.control_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.recorded.stop_calls.load(Ordering::SeqCst)
    }

    pub fn destroy_calls(&self) -> usize {
        self.recorded.destroy_calls.load(Ordering::SeqCst)
    }

    /// Every value passed to `set_autopilot`, in call order.
    pub fn autopilot_history(&self) -> Vec<bool> {
        self.recorded.autopilot.lock().unwrap().clone()
    }

    /// Every pose passed to `set_spectator_transform`, in call order.
    pub fn spectator_history(&self) -> Vec<Transform> {
        self.recorded.spectator.lock().unwrap().clone()
    }

    pub fn vehicle_spawns(&self) -> Vec<VehicleSpawn> {
        self.recorded.vehicle_spawns.lock().unwrap().clone()
    }

    pub fn camera_spawns(&self) -> Vec<CameraSpawn> {
        self.recorded.camera_spawns.lock().unwrap().clone()
    }

    /// Whether a capture callback is still registered.
    pub fn callback_registered(&self) -> bool {
        self.recorded.callback.lock().unwrap().is_some()
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for ScriptedEngine {
    fn backend(&self) -> &str {
        "scripted"
    }

    fn connect(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> Result<Box<dyn Client>, EngineError> {
        if self.fail_connect {
            return Err(EngineError::Unreachable {
                endpoint: endpoint.to_string(),
                timeout,
            });
        }
        Ok(Box::new(ScriptedClient {
            script: self.script.clone(),
            recorded: Arc::clone(&self.recorded),
        }))
    }
}

struct ScriptedClient {
    script: Script,
    recorded: Arc<Recorded>,
}

impl Client for ScriptedClient {
    fn load_world(&mut self, map: &str) -> Result<Box<dyn World>, EngineError> {
        if map != self.script.map {
            return Err(EngineError::MapNotFound {
                map: map.to_string(),
            });
        }
        Ok(Box::new(ScriptedWorld {
            script: self.script.clone(),
            recorded: Arc::clone(&self.recorded),
        }))
    }
}

struct ScriptedWorld {
    script: Script,
    recorded: Arc<Recorded>,
}

fn parse_attribute<T: FromStr>(blueprint: &Blueprint, key: &str) -> Result<Option<T>, EngineError> {
    match blueprint.attribute(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| EngineError::InvalidAttribute {
                blueprint: blueprint.id().to_string(),
                key: key.to_string(),
                value: raw.to_string(),
            }),
    }
}

fn synthetic_frame(tick: u64, width: u32, height: u32) -> CameraFrame {
    let len = width as usize * height as usize * BYTES_PER_PIXEL;
    let data = (0..len)
        .map(|i| ((i as u64).wrapping_mul(31).wrapping_add(tick * 7) % 256) as u8)
        .collect();
    CameraFrame {
        frame: tick,
        timestamp: tick as f64 * 0.05,
        width,
        height,
        data,
    }
}

impl World for ScriptedWorld {
    fn map_name(&self) -> String {
        self.script.map.clone()
    }

    fn spawn_points(&self) -> Vec<Transform> {
        vec![
            Transform::at(Location::new(10.0, 2.0, 0.5)),
            Transform::at(Location::new(40.0, 2.0, 0.5)),
            Transform::at(Location::new(70.0, -3.0, 0.5)),
        ]
    }

    fn blueprint_library(&self) -> BlueprintLibrary {
        let mut library = BlueprintLibrary::new();
        library.insert(Blueprint::new("vehicle.audi.tt", [("color", "grey")]));
        library.insert(Blueprint::new("vehicle.tesla.model3", [("color", "grey")]));
        library.insert(Blueprint::new(
            CAMERA_BLUEPRINT_ID,
            [
                ("image_size_x", "800"),
                ("image_size_y", "600"),
                ("fov", "90"),
                ("sensor_tick", "0.0"),
            ],
        ));
        library
    }

    fn spawn_vehicle(
        &self,
        blueprint: &Blueprint,
        at: &Transform,
    ) -> Result<Arc<dyn Vehicle>, EngineError> {
        if self.script.fail_vehicle_spawn {
            return Err(EngineError::SpawnFailed {
                blueprint: blueprint.id().to_string(),
                reason: "scripted spawn failure".to_string(),
            });
        }
        self.recorded
            .vehicle_spawns
            .lock()
            .unwrap()
            .push(VehicleSpawn {
                blueprint: blueprint.id().to_string(),
                at: *at,
            });
        Ok(Arc::new(ScriptedVehicle {
            type_id: blueprint.id().to_string(),
            steer: self.script.steer.clone(),
            fail_destroy: self.script.fail_destroy,
            fail_control_after: self.script.fail_control_after,
            recorded: Arc::clone(&self.recorded),
        }))
    }

    fn spawn_camera(
        &self,
        blueprint: &Blueprint,
        mount: &Transform,
        parent: ActorId,
    ) -> Result<Box<dyn Camera>, EngineError> {
        if self.script.fail_camera_spawn {
            return Err(EngineError::SpawnFailed {
                blueprint: blueprint.id().to_string(),
                reason: "scripted spawn failure".to_string(),
            });
        }
        let width = parse_attribute::<u32>(blueprint, "image_size_x")?.unwrap_or(800);
        let height = parse_attribute::<u32>(blueprint, "image_size_y")?.unwrap_or(600);
        parse_attribute::<f32>(blueprint, "fov")?;
        parse_attribute::<f64>(blueprint, "sensor_tick")?;

        *self.recorded.frame_size.lock().unwrap() = (width, height);
        self.recorded
            .camera_spawns
            .lock()
            .unwrap()
            .push(CameraSpawn {
                blueprint: blueprint.id().to_string(),
                attributes: blueprint
                    .attributes()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                mount: *mount,
                parent,
            });
        Ok(Box::new(ScriptedCamera {
            recorded: Arc::clone(&self.recorded),
        }))
    }

    fn wait_for_tick(&self, timeout: Duration) -> Result<TickId, EngineError> {
        let tick = self.recorded.ticks.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(limit) = self.script.tick_limit {
            if tick > limit {
                return Err(EngineError::TickTimeout { waited: timeout });
            }
        }
        if !self.script.tick_delay.is_zero() {
            thread::sleep(self.script.tick_delay);
        }
        if self.script.captures.contains(&tick) {
            let (width, height) = *self.recorded.frame_size.lock().unwrap();
            let mut slot = self.recorded.callback.lock().unwrap();
            if let Some(callback) = slot.as_mut() {
                callback(synthetic_frame(tick, width, height));
            }
        }
        Ok(TickId::from(tick))
    }

    fn set_spectator_transform(&self, transform: &Transform) -> Result<(), EngineError> {
        self.recorded.spectator.lock().unwrap().push(*transform);
        Ok(())
    }

    fn spectator_transform(&self) -> Result<Transform, EngineError> {
        let history = self.recorded.spectator.lock().unwrap();
        Ok(history.last().copied().unwrap_or_default())
    }
}

struct ScriptedVehicle {
    type_id: String,
    steer: Vec<f32>,
    fail_destroy: bool,
    fail_control_after: Option<usize>,
    recorded: Arc<Recorded>,
}

impl Vehicle for ScriptedVehicle {
    fn id(&self) -> ActorId {
        VEHICLE_ACTOR
    }

    fn type_id(&self) -> String {
        self.type_id.clone()
    }

    fn set_autopilot(&self, enabled: bool) -> Result<(), EngineError> {
        self.recorded.autopilot.lock().unwrap().push(enabled);
        Ok(())
    }

    fn control(&self) -> Result<VehicleControl, EngineError> {
        let calls = self.recorded.control_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.fail_control_after {
            if calls >= limit {
                return Err(EngineError::ActorNotFound { id: VEHICLE_ACTOR });
            }
        }
        let index = calls.min(self.steer.len() - 1);
        Ok(VehicleControl {
            throttle: 0.6,
            steer: self.steer[index],
            ..VehicleControl::default()
        })
    }

    fn transform(&self) -> Result<Transform, EngineError> {
        // Drives forward one and a half metres per tick, so spectator
        // poses derived from this transform change every wait.
        let tick = self.recorded.ticks.load(Ordering::SeqCst);
        Ok(Transform::at(Location::new(tick as f32 * 1.5, 2.0, 0.3)))
    }

    fn destroy(&self) -> Result<(), EngineError> {
        self.recorded.destroy_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_destroy {
            return Err(EngineError::ActorNotFound { id: VEHICLE_ACTOR });
        }
        Ok(())
    }
}

struct ScriptedCamera {
    recorded: Arc<Recorded>,
}

impl Camera for ScriptedCamera {
    fn id(&self) -> ActorId {
        CAMERA_ACTOR
    }

    fn listen(&self, callback: FrameCallback) -> Result<(), EngineError> {
        *self.recorded.callback.lock().unwrap() = Some(callback);
        Ok(())
    }

    fn stop(&self) -> Result<(), EngineError> {
        self.recorded.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.recorded.callback.lock().unwrap().take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bootstrap(engine: &ScriptedEngine) -> Box<dyn World> {
        let mut client = engine
            .connect(&Endpoint::default(), Duration::from_secs(1))
            .unwrap();
        client.load_world("Town03").unwrap()
    }

    #[test]
    fn unknown_map_is_rejected() {
        let engine = ScriptedEngine::new();
        let mut client = engine
            .connect(&Endpoint::default(), Duration::from_secs(1))
            .unwrap();
        let err = client.load_world("Town99").err().unwrap();
        assert!(matches!(err, EngineError::MapNotFound { .. }));
    }

    #[test]
    fn captures_fire_at_scripted_ticks_only() {
        let mut engine = ScriptedEngine::new();
        engine.capture_at(2);
        engine.capture_at(4);
        let world = bootstrap(&engine);

        let library = world.blueprint_library();
        let camera_bp = library.find(CAMERA_BLUEPRINT_ID).cloned().unwrap();
        let camera = world
            .spawn_camera(&camera_bp, &Transform::default(), VEHICLE_ACTOR)
            .unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        camera
            .listen(Box::new(move |frame: CameraFrame| {
                sink.lock().unwrap().push(frame.frame);
            }))
            .unwrap();

        for _ in 0..5 {
            world.wait_for_tick(Duration::from_secs(1)).unwrap();
        }
        assert_eq!(*seen.lock().unwrap(), vec![2, 4]);

        camera.stop().unwrap();
        assert!(!engine.callback_registered());
        assert_eq!(engine.stop_calls(), 1);
    }

    #[test]
    fn steer_sequence_repeats_its_last_value() {
        let mut engine = ScriptedEngine::new();
        engine.set_steer_sequence(vec![0.1, -0.2]);
        let world = bootstrap(&engine);
        let library = world.blueprint_library();
        let vehicle_bp = library.filter("model3")[0].clone();
        let vehicle = world
            .spawn_vehicle(&vehicle_bp, &world.spawn_points()[0])
            .unwrap();

        let steers: Vec<f32> = (0..4).map(|_| vehicle.control().unwrap().steer).collect();
        assert_eq!(steers, vec![0.1, -0.2, -0.2, -0.2]);
        assert_eq!(engine.control_calls(), 4);
    }

    #[test]
    fn tick_limit_turns_into_a_timeout() {
        let mut engine = ScriptedEngine::new();
        engine.set_tick_limit(2);
        let world = bootstrap(&engine);
        assert!(world.wait_for_tick(Duration::from_millis(5)).is_ok());
        assert!(world.wait_for_tick(Duration::from_millis(5)).is_ok());
        let err = world.wait_for_tick(Duration::from_millis(5)).unwrap_err();
        assert!(matches!(err, EngineError::TickTimeout { .. }));
    }

    #[test]
    fn unparsable_camera_attribute_fails_the_spawn() {
        let engine = ScriptedEngine::new();
        let world = bootstrap(&engine);
        let library = world.blueprint_library();
        let mut camera_bp = library.find(CAMERA_BLUEPRINT_ID).cloned().unwrap();
        camera_bp.set_attribute("image_size_x", "wide").unwrap();

        let err = world
            .spawn_camera(&camera_bp, &Transform::default(), VEHICLE_ACTOR)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            EngineError::InvalidAttribute { ref key, .. } if key == "image_size_x"
        ));
    }
}
