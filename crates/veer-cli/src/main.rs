//! `veer` binary: record steering datasets from the command line.
//!
//! Configuration merges three layers, strongest first: command-line flags,
//! a TOML file named by `--config`, and built-in defaults. `print-config`
//! emits the merged result as TOML, so a flag set can be captured into a
//! file and edited.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::debug;
use veer_codec::Encoding;
use veer_session::{RecordingSession, SessionConfig};
use veer_sim::{LocalConfig, LocalEngine};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a recording session against the bundled reference engine
    Record(SessionArgs),
    /// Print the effective configuration as TOML and exit
    PrintConfig(SessionArgs),
}

/// Flags shared by `record` and `print-config`. Every flag is optional;
/// an unset flag falls through to the `--config` file, then to defaults.
#[derive(Debug, Args)]
struct SessionArgs {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Engine host
    #[arg(long)]
    host: Option<String>,

    /// Engine port
    #[arg(long)]
    port: Option<u16>,

    /// Connect timeout in seconds
    #[arg(long)]
    connect_timeout_secs: Option<f64>,

    /// Map to load
    #[arg(long)]
    map: Option<String>,

    /// Substring matched against vehicle blueprint ids
    #[arg(long)]
    vehicle_filter: Option<String>,

    /// Recording duration in seconds
    #[arg(long)]
    duration_secs: Option<f64>,

    /// Bound on each tick wait, in seconds
    #[arg(long)]
    tick_timeout_secs: Option<f64>,

    /// Dataset directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// PNG encoding strategy: direct or strip-alpha
    #[arg(long)]
    encoding: Option<Encoding>,

    /// Camera image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Camera image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Camera field of view in degrees
    #[arg(long)]
    fov: Option<f32>,

    /// Seconds between captures; 0 captures on every tick
    #[arg(long)]
    capture_interval: Option<f64>,

    /// Camera mount offset along the forward axis, metres
    #[arg(long, allow_negative_numbers = true)]
    mount_x: Option<f32>,

    /// Camera mount offset along the right axis, metres
    #[arg(long, allow_negative_numbers = true)]
    mount_y: Option<f32>,

    /// Camera mount offset along the up axis, metres
    #[arg(long, allow_negative_numbers = true)]
    mount_z: Option<f32>,

    /// Camera mount pitch in degrees
    #[arg(long, allow_negative_numbers = true)]
    mount_pitch: Option<f32>,

    /// Camera mount yaw in degrees
    #[arg(long, allow_negative_numbers = true)]
    mount_yaw: Option<f32>,

    /// Camera mount roll in degrees
    #[arg(long, allow_negative_numbers = true)]
    mount_roll: Option<f32>,

    /// Reference-engine RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Reference-engine tick rate in Hz
    #[arg(long)]
    tick_rate: Option<f64>,
}

/// On-disk shape of `--config`. Every key is optional so a file can pin
/// only the values it cares about; `print-config` writes all of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    connect_timeout_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    map: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vehicle_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick_timeout_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    camera: Option<CameraFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mount: Option<MountFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    engine: Option<EngineFile>,
}

/// `[camera]` table. Keys left unset keep the blueprint defaults.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CameraFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fov: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    capture_interval: Option<f64>,
}

/// `[mount]` table: camera pose relative to the vehicle, per axis.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MountFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    z: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pitch: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    yaw: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    roll: Option<f32>,
}

/// `[engine]` table: knobs for the bundled reference engine.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick_rate_hz: Option<f64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Record(args) => record(&args),
        Commands::PrintConfig(args) => print_config(&args),
    }
}

fn record(args: &SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (session_config, engine_config) = resolve(args)?;
    debug!(?session_config, ?engine_config, "configuration resolved");

    let engine = LocalEngine::new(engine_config)?;
    let session = RecordingSession::new(session_config)?;
    let report = session.run(&engine)?;

    println!(
        "recorded {} frames over {} ticks in {:.2} s",
        report.frames,
        report.ticks,
        report.elapsed.as_secs_f64(),
    );
    println!("map {}, vehicle {}", report.map, report.vehicle);
    println!(
        "dataset {} (log {})",
        report.directory.display(),
        report.log_path.display(),
    );
    Ok(())
}

fn print_config(args: &SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (session_config, engine_config) = resolve(args)?;
    print!(
        "{}",
        toml::to_string_pretty(&effective_file(&session_config, &engine_config))?
    );
    Ok(())
}

/// Merge defaults, then the `--config` file, then flags, and point the
/// reference engine at whatever endpoint the session will dial.
fn resolve(args: &SessionArgs) -> Result<(SessionConfig, LocalConfig), Box<dyn std::error::Error>> {
    let file = match &args.config {
        Some(path) => load_file(path)?,
        None => FileConfig::default(),
    };

    let mut session = SessionConfig::default();
    let mut engine = LocalConfig::default();
    apply_file(&file, &mut session, &mut engine)?;
    apply_flags(args, &mut session, &mut engine)?;
    engine.endpoint = session.endpoint.clone();
    Ok((session, engine))
}

fn load_file(path: &Path) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("read {}: {e}", path.display()))?;
    let file = toml::from_str(&text).map_err(|e| format!("parse {}: {e}", path.display()))?;
    Ok(file)
}

fn apply_file(
    file: &FileConfig,
    session: &mut SessionConfig,
    engine: &mut LocalConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(host) = &file.host {
        session.endpoint.host = host.clone();
    }
    if let Some(port) = file.port {
        session.endpoint.port = port;
    }
    if let Some(secs) = file.connect_timeout_secs {
        session.connect_timeout = seconds("connect_timeout_secs", secs)?;
    }
    if let Some(map) = &file.map {
        session.map = map.clone();
    }
    if let Some(filter) = &file.vehicle_filter {
        session.vehicle_filter = filter.clone();
    }
    if let Some(secs) = file.duration_secs {
        session.duration = seconds("duration_secs", secs)?;
    }
    if let Some(secs) = file.tick_timeout_secs {
        session.tick_timeout = seconds("tick_timeout_secs", secs)?;
    }
    if let Some(dir) = &file.output_dir {
        session.output_dir = dir.clone();
    }
    if let Some(encoding) = &file.encoding {
        session.encoding = encoding.parse()?;
    }
    if let Some(camera) = &file.camera {
        if let Some(width) = camera.width {
            session.camera.width = Some(width);
        }
        if let Some(height) = camera.height {
            session.camera.height = Some(height);
        }
        if let Some(fov) = camera.fov {
            session.camera.fov = Some(fov);
        }
        if let Some(interval) = camera.capture_interval {
            session.camera.capture_interval = Some(interval);
        }
    }
    if let Some(mount) = &file.mount {
        if let Some(x) = mount.x {
            session.mount.location.x = x;
        }
        if let Some(y) = mount.y {
            session.mount.location.y = y;
        }
        if let Some(z) = mount.z {
            session.mount.location.z = z;
        }
        if let Some(pitch) = mount.pitch {
            session.mount.rotation.pitch = pitch;
        }
        if let Some(yaw) = mount.yaw {
            session.mount.rotation.yaw = yaw;
        }
        if let Some(roll) = mount.roll {
            session.mount.rotation.roll = roll;
        }
    }
    if let Some(table) = &file.engine {
        if let Some(seed) = table.seed {
            engine.seed = seed;
        }
        if let Some(hz) = table.tick_rate_hz {
            engine.tick_rate_hz = hz;
        }
    }
    Ok(())
}

fn apply_flags(
    args: &SessionArgs,
    session: &mut SessionConfig,
    engine: &mut LocalConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(host) = &args.host {
        session.endpoint.host = host.clone();
    }
    if let Some(port) = args.port {
        session.endpoint.port = port;
    }
    if let Some(secs) = args.connect_timeout_secs {
        session.connect_timeout = seconds("--connect-timeout-secs", secs)?;
    }
    if let Some(map) = &args.map {
        session.map = map.clone();
    }
    if let Some(filter) = &args.vehicle_filter {
        session.vehicle_filter = filter.clone();
    }
    if let Some(secs) = args.duration_secs {
        session.duration = seconds("--duration-secs", secs)?;
    }
    if let Some(secs) = args.tick_timeout_secs {
        session.tick_timeout = seconds("--tick-timeout-secs", secs)?;
    }
    if let Some(dir) = &args.output_dir {
        session.output_dir = dir.clone();
    }
    if let Some(encoding) = args.encoding {
        session.encoding = encoding;
    }
    if let Some(width) = args.width {
        session.camera.width = Some(width);
    }
    if let Some(height) = args.height {
        session.camera.height = Some(height);
    }
    if let Some(fov) = args.fov {
        session.camera.fov = Some(fov);
    }
    if let Some(interval) = args.capture_interval {
        session.camera.capture_interval = Some(interval);
    }
    if let Some(x) = args.mount_x {
        session.mount.location.x = x;
    }
    if let Some(y) = args.mount_y {
        session.mount.location.y = y;
    }
    if let Some(z) = args.mount_z {
        session.mount.location.z = z;
    }
    if let Some(pitch) = args.mount_pitch {
        session.mount.rotation.pitch = pitch;
    }
    if let Some(yaw) = args.mount_yaw {
        session.mount.rotation.yaw = yaw;
    }
    if let Some(roll) = args.mount_roll {
        session.mount.rotation.roll = roll;
    }
    if let Some(seed) = args.seed {
        engine.seed = seed;
    }
    if let Some(hz) = args.tick_rate {
        engine.tick_rate_hz = hz;
    }
    Ok(())
}

/// Convert a seconds value into a [`Duration`], rejecting negative and
/// non-finite input with the offending key named in the error.
fn seconds(key: &str, secs: f64) -> Result<Duration, Box<dyn std::error::Error>> {
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{key}: {e}").into())
}

/// Snapshot the merged configuration in the `--config` file shape, with
/// every resolved key written out.
fn effective_file(session: &SessionConfig, engine: &LocalConfig) -> FileConfig {
    FileConfig {
        host: Some(session.endpoint.host.clone()),
        port: Some(session.endpoint.port),
        connect_timeout_secs: Some(session.connect_timeout.as_secs_f64()),
        map: Some(session.map.clone()),
        vehicle_filter: Some(session.vehicle_filter.clone()),
        duration_secs: Some(session.duration.as_secs_f64()),
        tick_timeout_secs: Some(session.tick_timeout.as_secs_f64()),
        output_dir: Some(session.output_dir.clone()),
        encoding: Some(session.encoding.to_string()),
        camera: Some(CameraFile {
            width: session.camera.width,
            height: session.camera.height,
            fov: session.camera.fov,
            capture_interval: session.camera.capture_interval,
        }),
        mount: Some(MountFile {
            x: Some(session.mount.location.x),
            y: Some(session.mount.location.y),
            z: Some(session.mount.location.z),
            pitch: Some(session.mount.rotation.pitch),
            yaw: Some(session.mount.rotation.yaw),
            roll: Some(session.mount.rotation.roll),
        }),
        engine: Some(EngineFile {
            seed: Some(engine.seed),
            tick_rate_hz: Some(engine.tick_rate_hz),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use veer_test_utils::TempDir;

    fn parse(extra: &[&str]) -> SessionArgs {
        let mut argv = vec!["veer", "record"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Record(args) | Commands::PrintConfig(args) => args,
        }
    }

    #[test]
    fn bare_invocation_resolves_to_library_defaults() {
        let (session, engine) = resolve(&parse(&[])).unwrap();

        assert_eq!(session, SessionConfig::default());
        assert_eq!(engine.seed, 0);
        assert_eq!(engine.tick_rate_hz, 20.0);
        assert_eq!(engine.endpoint, session.endpoint);
    }

    #[test]
    fn flags_override_file_overrides_defaults() {
        let dir = TempDir::new("cli-merge").unwrap();
        let path = dir.join("veer.toml");
        std::fs::write(
            &path,
            r#"
host = "sim.lab"
map = "Town05"
duration_secs = 30.0

[camera]
width = 1280
fov = 100.0

[engine]
seed = 11
"#,
        )
        .unwrap();

        let args = parse(&[
            "--config",
            path.to_str().unwrap(),
            "--map",
            "Town02",
            "--width",
            "640",
        ]);
        let (session, engine) = resolve(&args).unwrap();

        // Flags win over the file.
        assert_eq!(session.map, "Town02");
        assert_eq!(session.camera.width, Some(640));
        // The file wins over defaults.
        assert_eq!(session.endpoint.host, "sim.lab");
        assert_eq!(session.duration, Duration::from_secs(30));
        assert_eq!(session.camera.fov, Some(100.0));
        assert_eq!(engine.seed, 11);
        // Untouched keys keep their defaults.
        assert_eq!(session.vehicle_filter, "model3");
        assert_eq!(session.endpoint.port, 2000);
        assert_eq!(engine.endpoint.host, "sim.lab");
    }

    #[test]
    fn partial_mount_flags_keep_the_other_axes() {
        let (session, _) = resolve(&parse(&["--mount-x", "0.3", "--mount-z", "1.3"])).unwrap();

        assert_eq!(session.mount.location.x, 0.3);
        assert_eq!(session.mount.location.y, 0.0);
        assert_eq!(session.mount.location.z, 1.3);
        assert_eq!(session.mount.rotation.pitch, 0.0);
    }

    #[test]
    fn encoding_comes_from_file_or_flag() {
        let dir = TempDir::new("cli-encoding").unwrap();
        let path = dir.join("veer.toml");
        std::fs::write(&path, "encoding = \"direct\"\n").unwrap();

        let (from_file, _) = resolve(&parse(&["--config", path.to_str().unwrap()])).unwrap();
        assert_eq!(from_file.encoding, Encoding::Direct);

        let (from_flag, _) = resolve(&parse(&[
            "--config",
            path.to_str().unwrap(),
            "--encoding",
            "strip-alpha",
        ]))
        .unwrap();
        assert_eq!(from_flag.encoding, Encoding::StripAlpha);
    }

    #[test]
    fn unknown_encoding_in_the_file_is_rejected() {
        let dir = TempDir::new("cli-bad-encoding").unwrap();
        let path = dir.join("veer.toml");
        std::fs::write(&path, "encoding = \"jpeg\"\n").unwrap();

        let err = resolve(&parse(&["--config", path.to_str().unwrap()])).unwrap_err();
        assert!(err.to_string().contains("unknown encoding"));
    }

    #[test]
    fn negative_duration_in_the_file_is_rejected() {
        let dir = TempDir::new("cli-bad-duration").unwrap();
        let path = dir.join("veer.toml");
        std::fs::write(&path, "duration_secs = -1.0\n").unwrap();

        let err = resolve(&parse(&["--config", path.to_str().unwrap()])).unwrap_err();
        assert!(err.to_string().contains("duration_secs"));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let dir = TempDir::new("cli-unknown-key").unwrap();
        let path = dir.join("veer.toml");
        std::fs::write(&path, "speed = 3\n").unwrap();

        let err = resolve(&parse(&["--config", path.to_str().unwrap()])).unwrap_err();
        assert!(err.to_string().contains("speed"));
    }

    #[test]
    fn effective_config_reparses_to_the_same_configuration() {
        let (session, engine) = resolve(&parse(&["--seed", "9", "--fov", "110"])).unwrap();

        let text = toml::to_string_pretty(&effective_file(&session, &engine)).unwrap();
        let reread: FileConfig = toml::from_str(&text).unwrap();

        let mut session2 = SessionConfig::default();
        let mut engine2 = LocalConfig::default();
        apply_file(&reread, &mut session2, &mut engine2).unwrap();
        engine2.endpoint = session2.endpoint.clone();

        assert_eq!(session2, session);
        assert_eq!(engine2.seed, engine.seed);
        assert_eq!(engine2.tick_rate_hz, engine.tick_rate_hz);
        assert_eq!(engine2.endpoint, engine.endpoint);
    }

    #[test]
    fn record_drives_a_session_end_to_end() {
        let dir = TempDir::new("cli-record").unwrap();
        let out = dir.join("dataset");
        let args = parse(&[
            "--duration-secs",
            "0.15",
            "--tick-timeout-secs",
            "2",
            "--tick-rate",
            "200",
            "--width",
            "32",
            "--height",
            "24",
            "--output-dir",
            out.to_str().unwrap(),
        ]);

        record(&args).unwrap();

        let log = std::fs::read_to_string(out.join("steering_angles.csv")).unwrap();
        assert!(log.starts_with("image_filename,steering_angle"));
    }
}
