//! End-to-end recording example against the reference engine.
//!
//! Demonstrates: configure engine → configure session → run → inspect
//! the report. Writes a small dataset to `carla_data/` in the working
//! directory.

use std::time::Duration;

use veer_session::{CameraSettings, RecordingSession, SessionConfig};
use veer_sim::{LocalConfig, LocalEngine};

fn main() {
    println!("=== Veer recording example ===\n");

    let engine = LocalEngine::new(LocalConfig {
        seed: 42,
        tick_rate_hz: 40.0,
        ..LocalConfig::default()
    })
    .unwrap();

    let config = SessionConfig {
        duration: Duration::from_secs(3),
        camera: CameraSettings {
            width: Some(320),
            height: Some(240),
            fov: Some(110.0),
            capture_interval: Some(0.25),
        },
        ..SessionConfig::default()
    };

    println!(
        "Recording {}s of {} at {}x{} into {} ...",
        config.duration.as_secs(),
        config.map,
        config.camera.width.unwrap(),
        config.camera.height.unwrap(),
        config.output_dir.display(),
    );

    let session = RecordingSession::new(config).unwrap();
    let report = session.run(&engine).unwrap();

    println!("\nSession report:");
    println!("  map:      {}", report.map);
    println!("  vehicle:  {}", report.vehicle);
    println!("  ticks:    {}", report.ticks);
    println!("  frames:   {}", report.frames);
    println!("  elapsed:  {:.1}s", report.elapsed.as_secs_f64());
    println!("  dataset:  {}", report.directory.display());
    println!("  log:      {}", report.log_path.display());
}
