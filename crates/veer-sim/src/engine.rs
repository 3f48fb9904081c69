//! The connector and client entry points.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tracing::debug;

use veer_engine::{Client, Connector, Endpoint, EngineError, World};

use crate::config::{LocalConfig, LocalConfigError};
use crate::world::{LocalWorld, WorldState, MAPS};

/// The in-process reference engine.
///
/// Implements [`Connector`]: sessions written against the seam traits
/// run unchanged on top of it. The engine is "bound" to the endpoint in
/// its config; connecting anywhere else fails as unreachable, the same
/// way a wrong port would against a networked engine.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use veer_engine::{Connector, Endpoint};
/// use veer_sim::{LocalConfig, LocalEngine};
///
/// let engine = LocalEngine::new(LocalConfig::default())?;
/// let mut client = engine.connect(&Endpoint::default(), Duration::from_secs(1))?;
/// let world = client.load_world("Town03")?;
/// assert_eq!(world.map_name(), "Town03");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct LocalEngine {
    config: LocalConfig,
}

impl LocalEngine {
    /// Build an engine from a validated configuration.
    pub fn new(config: LocalConfig) -> Result<Self, LocalConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The engine's configuration.
    pub fn config(&self) -> &LocalConfig {
        &self.config
    }
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self {
            config: LocalConfig::default(),
        }
    }
}

impl Connector for LocalEngine {
    fn backend(&self) -> &str {
        "local"
    }

    fn connect(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> Result<Box<dyn Client>, EngineError> {
        if *endpoint != self.config.endpoint {
            return Err(EngineError::Unreachable {
                endpoint: endpoint.to_string(),
                timeout,
            });
        }
        debug!(endpoint = %endpoint, "client connected");
        Ok(Box::new(LocalClient {
            config: self.config.clone(),
            previous: Weak::new(),
        }))
    }
}

struct LocalClient {
    config: LocalConfig,
    /// The world loaded by the previous `load_world` call, invalidated
    /// when the next one succeeds.
    previous: Weak<WorldState>,
}

impl Client for LocalClient {
    fn load_world(&mut self, map: &str) -> Result<Box<dyn World>, EngineError> {
        let spec = MAPS
            .iter()
            .find(|m| m.name == map)
            .ok_or_else(|| EngineError::MapNotFound {
                map: map.to_string(),
            })?;
        if let Some(old) = self.previous.upgrade() {
            old.begin_shutdown();
        }
        let world = LocalWorld::start(spec, &self.config);
        self.previous = Arc::downgrade(world.state());
        Ok(Box::new(world))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::available_maps;

    fn quick_engine() -> LocalEngine {
        LocalEngine::new(LocalConfig {
            tick_rate_hz: 200.0,
            ..LocalConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn connect_requires_the_bound_endpoint() {
        let engine = quick_engine();
        let err = engine
            .connect(&Endpoint::new("localhost", 2001), Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::Unreachable { .. }));
        assert!(engine
            .connect(&Endpoint::default(), Duration::from_secs(1))
            .is_ok());
    }

    #[test]
    fn unknown_maps_are_rejected() {
        let engine = quick_engine();
        let mut client = engine
            .connect(&Endpoint::default(), Duration::from_secs(1))
            .unwrap();
        let err = client.load_world("Town99").err().unwrap();
        assert!(matches!(err, EngineError::MapNotFound { .. }));
    }

    #[test]
    fn every_shipped_map_loads() {
        let engine = quick_engine();
        for name in available_maps() {
            let mut client = engine
                .connect(&Endpoint::default(), Duration::from_secs(1))
                .unwrap();
            let world = client.load_world(name).unwrap();
            assert_eq!(world.map_name(), name);
        }
    }

    #[test]
    fn reloading_invalidates_the_previous_world() {
        let engine = quick_engine();
        let mut client = engine
            .connect(&Endpoint::default(), Duration::from_secs(1))
            .unwrap();
        let first = client.load_world("Town01").unwrap();
        let second = client.load_world("Town02").unwrap();

        let err = first.wait_for_tick(Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, EngineError::Shutdown));
        assert!(second.wait_for_tick(Duration::from_secs(2)).is_ok());
    }
}
