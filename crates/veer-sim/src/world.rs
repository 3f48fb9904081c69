//! The local world: actor registry, tick thread, and seam impls.
//!
//! # Architecture
//!
//! ```text
//! Session Thread            Tick Thread                Dispatch Thread
//!     |                         |                           |
//!     |--spawn_vehicle()        | step autopilots           |
//!     |--spawn_camera()         | integrate kinematics      |
//!     |--wait_for_tick()---+    | render due cameras        |
//!     |  blocks on condvar |    | try_send(Deliver)-------->| callback(frame)
//!     |<-------------------+    | publish tick, notify_all  |
//!     |                         | park_timeout(budget)      |
//!     |--camera.stop()------------------------------------->| drop callback
//!     |  blocks on ack      [bounded(8), full = frame drop] | ack
//! ```
//!
//! The tick thread never runs callbacks and never blocks on the
//! dispatch queue; a full queue drops the frame instead.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Sender, TrySendError};
use tracing::{debug, warn};

use veer_core::{ActorId, CameraFrame, Location, Rotation, TickId, Transform, VehicleControl};
use veer_engine::{
    Blueprint, BlueprintLibrary, Camera, EngineError, FrameCallback, Vehicle, World,
    CAMERA_BLUEPRINT_ID,
};

use crate::autopilot::{integrate, WanderAutopilot};
use crate::config::LocalConfig;
use crate::dispatch::{dispatch_loop, DispatchEvent, CAPTURE_QUEUE_DEPTH};
use crate::render::render_bgra;

/// Minimum clearance between an occupied spot and a new vehicle spawn,
/// in metres.
const SPAWN_CLEARANCE: f32 = 2.0;

/// A built-in map: a ring road with evenly spaced spawn points.
pub(crate) struct MapSpec {
    pub(crate) name: &'static str,
    spawn_count: u32,
    ring_radius: f32,
}

pub(crate) static MAPS: &[MapSpec] = &[
    MapSpec {
        name: "Town01",
        spawn_count: 12,
        ring_radius: 80.0,
    },
    MapSpec {
        name: "Town02",
        spawn_count: 16,
        ring_radius: 100.0,
    },
    MapSpec {
        name: "Town03",
        spawn_count: 24,
        ring_radius: 140.0,
    },
    MapSpec {
        name: "Town04",
        spawn_count: 20,
        ring_radius: 180.0,
    },
    MapSpec {
        name: "Town05",
        spawn_count: 28,
        ring_radius: 160.0,
    },
];

/// Names of the maps the reference engine ships, in load order.
pub fn available_maps() -> impl Iterator<Item = &'static str> {
    MAPS.iter().map(|m| m.name)
}

struct Clock {
    tick: u64,
    sim_time: f64,
}

struct VehicleState {
    transform: Transform,
    control: VehicleControl,
    autopilot_on: bool,
    autopilot: WanderAutopilot,
    alive: bool,
}

struct CameraState {
    parent: ActorId,
    mount: Transform,
    width: u32,
    height: u32,
    interval: f64,
    next_due: f64,
    listening: bool,
}

struct Actors {
    next_id: u32,
    vehicles: HashMap<ActorId, VehicleState>,
    cameras: HashMap<ActorId, CameraState>,
}

/// World state shared by the session-facing handles and the tick
/// thread.
pub(crate) struct WorldState {
    map: &'static MapSpec,
    dt: f64,
    seed: u64,
    shutdown: AtomicBool,
    clock: Mutex<Clock>,
    tick_signal: Condvar,
    actors: Mutex<Actors>,
    spectator: Mutex<Transform>,
}

impl WorldState {
    /// Flag the world as shut down and wake every tick waiter.
    ///
    /// Loading a new world through the same client calls this on the
    /// old one; its handles then fail with [`EngineError::Shutdown`].
    pub(crate) fn begin_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.tick_signal.notify_all();
    }

    fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

fn vehicle_seed(world_seed: u64, actor: u32) -> u64 {
    world_seed ^ u64::from(actor).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn normalize_yaw(yaw: f32) -> f32 {
    let mut yaw = yaw % 360.0;
    if yaw > 180.0 {
        yaw -= 360.0;
    } else if yaw < -180.0 {
        yaw += 360.0;
    }
    yaw
}

/// World-space pose of a mount riding on a parent actor.
fn compose(parent: Transform, mount: Transform) -> Transform {
    let yaw = parent.rotation.yaw.to_radians();
    let (sin, cos) = yaw.sin_cos();
    Transform {
        location: Location {
            x: parent.location.x + mount.location.x * cos - mount.location.y * sin,
            y: parent.location.y + mount.location.x * sin + mount.location.y * cos,
            z: parent.location.z + mount.location.z,
        },
        rotation: Rotation {
            pitch: parent.rotation.pitch + mount.rotation.pitch,
            yaw: normalize_yaw(parent.rotation.yaw + mount.rotation.yaw),
            roll: parent.rotation.roll + mount.rotation.roll,
        },
    }
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

fn invalid_attribute(blueprint: &Blueprint, key: &str, value: impl ToString) -> EngineError {
    EngineError::InvalidAttribute {
        blueprint: blueprint.id().to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn standard_library() -> BlueprintLibrary {
    let mut library = BlueprintLibrary::new();
    for (id, color) in [
        ("vehicle.audi.tt", "197,181,67"),
        ("vehicle.bmw.grandtourer", "149,165,166"),
        ("vehicle.ford.mustang", "208,64,52"),
        ("vehicle.tesla.model3", "118,137,158"),
    ] {
        library.insert(Blueprint::new(id, [("color", color)]));
    }
    library.insert(Blueprint::new(
        "walker.pedestrian.0001",
        [("is_invincible", "false")],
    ));
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

// ── Tick loop ────────────────────────────────────────────────────

fn tick_loop(state: Arc<WorldState>, events: Sender<DispatchEvent>, budget: Duration) {
    let dt = state.dt;
    loop {
        if state.is_shut_down() {
            break;
        }
        let started = Instant::now();

        let (next_tick, next_time) = {
            let clock = state.clock.lock().unwrap();
            (clock.tick + 1, clock.sim_time + dt)
        };

        // Advance vehicles, then collect the cameras due this tick.
        // Rendering happens after the lock is released.
        let mut due: Vec<(ActorId, Transform, u32, u32)> = Vec::new();
        {
            let mut actors = state.actors.lock().unwrap();
            let Actors {
                vehicles, cameras, ..
            } = &mut *actors;
            for vehicle in vehicles.values_mut().filter(|v| v.alive) {
                if vehicle.autopilot_on {
                    vehicle.control = vehicle.autopilot.step(dt as f32);
                }
                integrate(&mut vehicle.transform, &vehicle.control, dt as f32);
            }
            for (&id, camera) in cameras.iter_mut() {
                if !camera.listening {
                    continue;
                }
                let Some(parent) = vehicles.get(&camera.parent).filter(|v| v.alive) else {
                    continue;
                };
                if next_time + 1e-9 < camera.next_due {
                    continue;
                }
                camera.next_due = (camera.next_due + camera.interval).max(next_time);
                due.push((
                    id,
                    compose(parent.transform, camera.mount),
                    camera.width,
                    camera.height,
                ));
            }
        }

        for (camera, pose, width, height) in due {
            let frame = CameraFrame {
                frame: next_tick,
                timestamp: next_time,
                width,
                height,
                data: render_bgra(width, height, &pose),
            };
            match events.try_send(DispatchEvent::Deliver(camera, frame)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(camera = %camera, tick = next_tick, "capture queue full, dropping frame");
                }
                Err(TrySendError::Disconnected(_)) => {
                    state.begin_shutdown();
                    return;
                }
            }
        }

        {
            let mut clock = state.clock.lock().unwrap();
            clock.tick = next_tick;
            clock.sim_time = next_time;
        }
        state.tick_signal.notify_all();

        let elapsed = started.elapsed();
        if elapsed < budget {
            thread::park_timeout(budget - elapsed);
        }
    }
    state.tick_signal.notify_all();
}

// ── LocalWorld ───────────────────────────────────────────────────

/// A running local world. Dropping it stops both background threads.
pub(crate) struct LocalWorld {
    state: Arc<WorldState>,
    events: Sender<DispatchEvent>,
    tick_thread: Option<JoinHandle<()>>,
    dispatch_thread: Option<JoinHandle<()>>,
}

impl LocalWorld {
    pub(crate) fn start(map: &'static MapSpec, config: &LocalConfig) -> Self {
        let state = Arc::new(WorldState {
            map,
            dt: 1.0 / config.tick_rate_hz,
            seed: config.seed,
            shutdown: AtomicBool::new(false),
            clock: Mutex::new(Clock {
                tick: 0,
                sim_time: 0.0,
            }),
            tick_signal: Condvar::new(),
            actors: Mutex::new(Actors {
                next_id: 1,
                vehicles: HashMap::new(),
                cameras: HashMap::new(),
            }),
            spectator: Mutex::new(Transform::at(Location::new(0.0, 0.0, 30.0))),
        });

        let (events, receiver) = crossbeam_channel::bounded(CAPTURE_QUEUE_DEPTH);
        let dispatch_thread = thread::Builder::new()
            .name("veer-sim-dispatch".into())
            .spawn(move || dispatch_loop(receiver))
            .expect("failed to spawn dispatch thread");

        let tick_state = Arc::clone(&state);
        let tick_events = events.clone();
        let budget = Duration::from_secs_f64(1.0 / config.tick_rate_hz);
        let tick_thread = thread::Builder::new()
            .name("veer-sim-tick".into())
            .spawn(move || tick_loop(tick_state, tick_events, budget))
            .expect("failed to spawn tick thread");

        debug!(
            map = map.name,
            tick_rate_hz = config.tick_rate_hz,
            "local world started"
        );
        Self {
            state,
            events,
            tick_thread: Some(tick_thread),
            dispatch_thread: Some(dispatch_thread),
        }
    }

    pub(crate) fn state(&self) -> &Arc<WorldState> {
        &self.state
    }

    fn shutdown(&mut self) {
        if self.tick_thread.is_none() && self.dispatch_thread.is_none() {
            return;
        }
        self.state.begin_shutdown();
        if let Some(handle) = self.tick_thread.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
        let _ = self.events.send(DispatchEvent::Shutdown);
        if let Some(handle) = self.dispatch_thread.take() {
            let _ = handle.join();
        }
        debug!(map = self.state.map.name, "local world stopped");
    }
}

impl Drop for LocalWorld {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl World for LocalWorld {
    fn map_name(&self) -> String {
        self.state.map.name.to_string()
    }

    fn spawn_points(&self) -> Vec<Transform> {
        let spec = self.state.map;
        (0..spec.spawn_count)
            .map(|i| {
                let angle = 360.0 * i as f32 / spec.spawn_count as f32;
                let rad = angle.to_radians();
                Transform {
                    location: Location::new(
                        spec.ring_radius * rad.cos(),
                        spec.ring_radius * rad.sin(),
                        0.3,
                    ),
                    rotation: Rotation::new(0.0, normalize_yaw(angle + 90.0), 0.0),
                }
            })
            .collect()
    }

    fn blueprint_library(&self) -> BlueprintLibrary {
        standard_library()
    }

    fn spawn_vehicle(
        &self,
        blueprint: &Blueprint,
        at: &Transform,
    ) -> Result<Arc<dyn Vehicle>, EngineError> {
        if self.state.is_shut_down() {
            return Err(EngineError::Shutdown);
        }
        if !blueprint.id().starts_with("vehicle.") {
            return Err(EngineError::SpawnFailed {
                blueprint: blueprint.id().to_string(),
                reason: "not a vehicle blueprint".to_string(),
            });
        }

        let mut actors = self.state.actors.lock().unwrap();
        let occupied = actors.vehicles.values().any(|v| {
            v.alive && v.transform.location.distance(&at.location) < SPAWN_CLEARANCE
        });
        if occupied {
            return Err(EngineError::SpawnFailed {
                blueprint: blueprint.id().to_string(),
                reason: "spawn point occupied".to_string(),
            });
        }

        let id = ActorId(actors.next_id);
        actors.next_id += 1;
        actors.vehicles.insert(
            id,
            VehicleState {
                transform: *at,
                control: VehicleControl::default(),
                autopilot_on: false,
                autopilot: WanderAutopilot::new(vehicle_seed(self.state.seed, id.0)),
                alive: true,
            },
        );
        debug!(%id, blueprint = blueprint.id(), "vehicle spawned");
        Ok(Arc::new(LocalVehicle {
            id,
            type_id: blueprint.id().to_string(),
            state: Arc::clone(&self.state),
        }))
    }

    fn spawn_camera(
        &self,
        blueprint: &Blueprint,
        mount: &Transform,
        parent: ActorId,
    ) -> Result<Box<dyn Camera>, EngineError> {
        if self.state.is_shut_down() {
            return Err(EngineError::Shutdown);
        }
        if blueprint.id() != CAMERA_BLUEPRINT_ID {
            return Err(EngineError::SpawnFailed {
                blueprint: blueprint.id().to_string(),
                reason: "unsupported sensor blueprint".to_string(),
            });
        }

        let width = parse_attribute::<u32>(blueprint, "image_size_x")?.unwrap_or(800);
        let height = parse_attribute::<u32>(blueprint, "image_size_y")?.unwrap_or(600);
        if width == 0 {
            return Err(invalid_attribute(blueprint, "image_size_x", width));
        }
        if height == 0 {
            return Err(invalid_attribute(blueprint, "image_size_y", height));
        }
        let fov = parse_attribute::<f32>(blueprint, "fov")?.unwrap_or(90.0);
        if !fov.is_finite() || fov <= 0.0 || fov > 180.0 {
            return Err(invalid_attribute(blueprint, "fov", fov));
        }
        let interval = parse_attribute::<f64>(blueprint, "sensor_tick")?.unwrap_or(0.0);
        if !interval.is_finite() || interval < 0.0 {
            return Err(invalid_attribute(blueprint, "sensor_tick", interval));
        }

        let sim_time = self.state.clock.lock().unwrap().sim_time;
        let mut actors = self.state.actors.lock().unwrap();
        if !actors.vehicles.get(&parent).is_some_and(|v| v.alive) {
            return Err(EngineError::ActorNotFound { id: parent });
        }
        let id = ActorId(actors.next_id);
        actors.next_id += 1;
        actors.cameras.insert(
            id,
            CameraState {
                parent,
                mount: *mount,
                width,
                height,
                interval,
                next_due: sim_time,
                listening: false,
            },
        );
        debug!(%id, %parent, width, height, interval, "camera spawned");
        Ok(Box::new(LocalCamera {
            id,
            state: Arc::clone(&self.state),
            events: self.events.clone(),
        }))
    }

    fn wait_for_tick(&self, timeout: Duration) -> Result<TickId, EngineError> {
        let deadline = Instant::now() + timeout;
        let mut clock = self.state.clock.lock().unwrap();
        let entry_tick = clock.tick;
        loop {
            if self.state.is_shut_down() {
                return Err(EngineError::Shutdown);
            }
            if clock.tick > entry_tick {
                return Ok(TickId::from(clock.tick));
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(EngineError::TickTimeout { waited: timeout });
            }
            let (guard, _) = self
                .state
                .tick_signal
                .wait_timeout(clock, deadline - now)
                .unwrap();
            clock = guard;
        }
    }

    fn set_spectator_transform(&self, transform: &Transform) -> Result<(), EngineError> {
        if self.state.is_shut_down() {
            return Err(EngineError::Shutdown);
        }
        *self.state.spectator.lock().unwrap() = *transform;
        Ok(())
    }

    fn spectator_transform(&self) -> Result<Transform, EngineError> {
        if self.state.is_shut_down() {
            return Err(EngineError::Shutdown);
        }
        Ok(*self.state.spectator.lock().unwrap())
    }
}

// ── Actor handles ────────────────────────────────────────────────

struct LocalVehicle {
    id: ActorId,
    type_id: String,
    state: Arc<WorldState>,
}

impl LocalVehicle {
    fn with_state<T>(&self, f: impl FnOnce(&mut VehicleState) -> T) -> Result<T, EngineError> {
        if self.state.is_shut_down() {
            return Err(EngineError::Shutdown);
        }
        let mut actors = self.state.actors.lock().unwrap();
        match actors.vehicles.get_mut(&self.id) {
            Some(vehicle) if vehicle.alive => Ok(f(vehicle)),
            _ => Err(EngineError::ActorNotFound { id: self.id }),
        }
    }
}

impl Vehicle for LocalVehicle {
    fn id(&self) -> ActorId {
        self.id
    }

    fn type_id(&self) -> String {
        self.type_id.clone()
    }

    fn set_autopilot(&self, enabled: bool) -> Result<(), EngineError> {
        self.with_state(|vehicle| {
            vehicle.autopilot_on = enabled;
        })?;
        debug!(id = %self.id, enabled, "autopilot switched");
        Ok(())
    }

    fn control(&self) -> Result<VehicleControl, EngineError> {
        self.with_state(|vehicle| vehicle.control)
    }

    fn transform(&self) -> Result<Transform, EngineError> {
        self.with_state(|vehicle| vehicle.transform)
    }

    fn destroy(&self) -> Result<(), EngineError> {
        self.with_state(|vehicle| {
            vehicle.alive = false;
        })?;
        debug!(id = %self.id, "vehicle destroyed");
        Ok(())
    }
}

struct LocalCamera {
    id: ActorId,
    state: Arc<WorldState>,
    events: Sender<DispatchEvent>,
}

impl Camera for LocalCamera {
    fn id(&self) -> ActorId {
        self.id
    }

    fn listen(&self, callback: FrameCallback) -> Result<(), EngineError> {
        if self.state.is_shut_down() {
            return Err(EngineError::Shutdown);
        }
        {
            let mut actors = self.state.actors.lock().unwrap();
            match actors.cameras.get_mut(&self.id) {
                Some(camera) => camera.listening = true,
                None => return Err(EngineError::ActorNotFound { id: self.id }),
            }
        }
        self.events
            .send(DispatchEvent::Register(self.id, callback))
            .map_err(|_| EngineError::Shutdown)
    }

    fn stop(&self) -> Result<(), EngineError> {
        {
            let mut actors = self.state.actors.lock().unwrap();
            if let Some(camera) = actors.cameras.get_mut(&self.id) {
                camera.listening = false;
            }
        }
        // Queued frames are delivered before the ack, so no invocation
        // is in flight once this returns. A closed channel means the
        // world is gone and the callback already dropped.
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        if self
            .events
            .send(DispatchEvent::Stop(self.id, done_tx))
            .is_ok()
        {
            let _ = done_rx.recv();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_world() -> LocalWorld {
        let config = LocalConfig {
            tick_rate_hz: 200.0,
            seed: 42,
            ..LocalConfig::default()
        };
        LocalWorld::start(&MAPS[2], &config)
    }

    fn spawn_test_vehicle(world: &LocalWorld) -> Arc<dyn Vehicle> {
        let library = world.blueprint_library();
        let blueprint = library.filter("model3")[0].clone();
        world
            .spawn_vehicle(&blueprint, &world.spawn_points()[0])
            .unwrap()
    }

    #[test]
    fn ticks_advance_monotonically() {
        let world = quick_world();
        let a = world.wait_for_tick(Duration::from_secs(2)).unwrap();
        let b = world.wait_for_tick(Duration::from_secs(2)).unwrap();
        assert!(b > a);
    }

    #[test]
    fn autopilot_moves_the_vehicle() {
        let world = quick_world();
        let vehicle = spawn_test_vehicle(&world);
        let start = vehicle.transform().unwrap();
        vehicle.set_autopilot(true).unwrap();
        for _ in 0..10 {
            world.wait_for_tick(Duration::from_secs(2)).unwrap();
        }
        let end = vehicle.transform().unwrap();
        assert!(start.location.distance(&end.location) > 0.1);
        assert!(vehicle.control().unwrap().throttle > 0.0);
    }

    #[test]
    fn destroy_invalidates_the_handle() {
        let world = quick_world();
        let vehicle = spawn_test_vehicle(&world);
        vehicle.destroy().unwrap();
        assert!(matches!(
            vehicle.control(),
            Err(EngineError::ActorNotFound { .. })
        ));
        assert!(matches!(
            vehicle.destroy(),
            Err(EngineError::ActorNotFound { .. })
        ));
    }

    #[test]
    fn occupied_spawn_point_is_rejected() {
        let world = quick_world();
        let library = world.blueprint_library();
        let blueprint = library.filter("model3")[0].clone();
        let point = world.spawn_points()[0];
        world.spawn_vehicle(&blueprint, &point).unwrap();
        let err = world.spawn_vehicle(&blueprint, &point).err().unwrap();
        assert!(matches!(err, EngineError::SpawnFailed { .. }));
    }

    #[test]
    fn walker_blueprints_are_not_vehicles() {
        let world = quick_world();
        let library = world.blueprint_library();
        let walker = library.find("walker.pedestrian.0001").cloned().unwrap();
        let err = world
            .spawn_vehicle(&walker, &world.spawn_points()[1])
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::SpawnFailed { .. }));
    }

    #[test]
    fn camera_streams_frames_at_the_configured_size() {
        let world = quick_world();
        let vehicle = spawn_test_vehicle(&world);
        vehicle.set_autopilot(true).unwrap();

        let library = world.blueprint_library();
        let mut blueprint = library.find(CAMERA_BLUEPRINT_ID).cloned().unwrap();
        blueprint.set_attribute("image_size_x", "32").unwrap();
        blueprint.set_attribute("image_size_y", "24").unwrap();
        let mount = Transform::at(Location::new(0.8, 0.0, 1.7));
        let camera = world
            .spawn_camera(&blueprint, &mount, vehicle.id())
            .unwrap();

        let frames = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&frames);
        let sentinel = Arc::new(());
        let probe = Arc::clone(&sentinel);
        camera
            .listen(Box::new(move |frame: CameraFrame| {
                let _hold = &probe;
                sink.lock().unwrap().push(frame);
            }))
            .unwrap();

        for _ in 0..50 {
            world.wait_for_tick(Duration::from_secs(2)).unwrap();
            if frames.lock().unwrap().len() >= 2 {
                break;
            }
        }
        camera.stop().unwrap();

        let frames = frames.lock().unwrap();
        assert!(frames.len() >= 2, "captured {} frames", frames.len());
        for pair in frames.windows(2) {
            assert!(pair[1].frame > pair[0].frame);
        }
        for frame in frames.iter() {
            assert_eq!((frame.width, frame.height), (32, 24));
            assert_eq!(frame.data.len(), frame.expected_byte_len());
        }
        // stop() released the callback, and the sentinel with it.
        assert_eq!(Arc::strong_count(&sentinel), 1);
    }

    #[test]
    fn sensor_tick_spaces_captures_apart() {
        let world = quick_world();
        let vehicle = spawn_test_vehicle(&world);
        vehicle.set_autopilot(true).unwrap();

        let library = world.blueprint_library();
        let mut blueprint = library.find(CAMERA_BLUEPRINT_ID).cloned().unwrap();
        blueprint.set_attribute("image_size_x", "8").unwrap();
        blueprint.set_attribute("image_size_y", "8").unwrap();
        blueprint.set_attribute("sensor_tick", "0.05").unwrap();
        let camera = world
            .spawn_camera(&blueprint, &Transform::default(), vehicle.id())
            .unwrap();

        let stamps = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stamps);
        camera
            .listen(Box::new(move |frame: CameraFrame| {
                sink.lock().unwrap().push(frame.timestamp);
            }))
            .unwrap();

        for _ in 0..60 {
            world.wait_for_tick(Duration::from_secs(2)).unwrap();
            if stamps.lock().unwrap().len() >= 3 {
                break;
            }
        }
        camera.stop().unwrap();

        let stamps = stamps.lock().unwrap();
        assert!(stamps.len() >= 3, "captured {} frames", stamps.len());
        for pair in stamps.windows(2) {
            assert!(pair[1] - pair[0] >= 0.04, "gap {}", pair[1] - pair[0]);
        }
    }

    #[test]
    fn camera_spawn_requires_a_live_parent() {
        let world = quick_world();
        let vehicle = spawn_test_vehicle(&world);
        vehicle.destroy().unwrap();

        let library = world.blueprint_library();
        let blueprint = library.find(CAMERA_BLUEPRINT_ID).cloned().unwrap();
        let err = world
            .spawn_camera(&blueprint, &Transform::default(), vehicle.id())
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::ActorNotFound { .. }));
    }

    #[test]
    fn slow_ticks_time_out() {
        let config = LocalConfig {
            tick_rate_hz: 2.0,
            ..LocalConfig::default()
        };
        let world = LocalWorld::start(&MAPS[0], &config);
        world.wait_for_tick(Duration::from_secs(2)).unwrap();
        let err = world.wait_for_tick(Duration::from_millis(50)).unwrap_err();
        assert!(matches!(err, EngineError::TickTimeout { .. }));
    }

    #[test]
    fn shutdown_wakes_blocked_waiters() {
        let config = LocalConfig {
            tick_rate_hz: 2.0,
            ..LocalConfig::default()
        };
        let world = LocalWorld::start(&MAPS[0], &config);
        world.wait_for_tick(Duration::from_secs(2)).unwrap();

        let state = Arc::clone(world.state());
        thread::scope(|scope| {
            let waiter = scope.spawn(|| world.wait_for_tick(Duration::from_secs(10)));
            thread::sleep(Duration::from_millis(30));
            state.begin_shutdown();
            let result = waiter.join().unwrap();
            assert!(matches!(result, Err(EngineError::Shutdown)));
        });
    }

    #[test]
    fn spectator_pose_round_trips() {
        let world = quick_world();
        let pose = Transform {
            location: Location::new(-5.0, 2.0, 50.3),
            rotation: Rotation::new(-90.0, 0.0, 0.0),
        };
        world.set_spectator_transform(&pose).unwrap();
        assert_eq!(world.spectator_transform().unwrap(), pose);
    }

    #[test]
    fn mount_composition_follows_parent_yaw() {
        let parent = Transform {
            location: Location::new(10.0, 20.0, 0.5),
            rotation: Rotation::new(0.0, 90.0, 0.0),
        };
        let mount = Transform::at(Location::new(2.0, 0.0, 1.2));
        let pose = compose(parent, mount);
        // Facing +Y, a forward mount lands further along Y.
        assert!((pose.location.x - 10.0).abs() < 1e-4);
        assert!((pose.location.y - 22.0).abs() < 1e-4);
        assert!((pose.location.z - 1.7).abs() < 1e-4);
        assert!((pose.rotation.yaw - 90.0).abs() < 1e-4);
    }

    #[test]
    fn spawn_points_are_mutually_clear() {
        let config = LocalConfig::default();
        let world = LocalWorld::start(&MAPS[4], &config);
        let points = world.spawn_points();
        assert_eq!(points.len(), 28);
        for (i, a) in points.iter().enumerate() {
            for b in points.iter().skip(i + 1) {
                assert!(a.location.distance(&b.location) >= SPAWN_CLEARANCE);
            }
        }
    }
}
