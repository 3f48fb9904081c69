//! Test utilities and scripted engine fixtures for Veer development.
//!
//! Provides a [`TempDir`] fixture for tests that touch the filesystem
//! and a [`ScriptedEngine`] backend whose connection, spawns, captures,
//! and failures follow a script set up before the run, with call
//! counters for asserting lifecycle behaviour afterwards.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::{env, fs, process};

pub mod scripted;

pub use scripted::{CameraSpawn, ScriptedEngine, VehicleSpawn};

/// A uniquely named directory under the system temp root, removed on
/// drop.
///
/// The name combines the caller's prefix with the process id and a
/// process-wide counter, so parallel tests never collide.
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> io::Result<Self> {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        let path = env::temp_dir().join(format!("veer-{prefix}-{}-{n}", process::id()));
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A path for `name` inside the directory.
    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}
