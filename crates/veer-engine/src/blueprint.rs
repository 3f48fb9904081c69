//! Actor blueprints and the per-world blueprint library.
//!
//! A blueprint is a named template an engine instantiates actors from.
//! Attributes are string-valued; the engine parses them at spawn time,
//! so an unparsable value surfaces as a spawn error, not a set error.
//! Setting an attribute the blueprint does not declare is rejected
//! immediately.

use indexmap::IndexMap;

use crate::error::EngineError;

/// A named actor template with string-valued attributes.
///
/// Cloned out of a [`BlueprintLibrary`], customized via
/// [`set_attribute`](Blueprint::set_attribute), and handed to the
/// world's spawn calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blueprint {
    id: String,
    attributes: IndexMap<String, String>,
}

impl Blueprint {
    /// Build a blueprint with its declared attributes and their defaults.
    pub fn new<I, K, V>(id: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            id: id.into(),
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The blueprint identifier, e.g. `vehicle.tesla.model3`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current value of an attribute, if the blueprint declares it.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Override a declared attribute.
    ///
    /// Fails with [`EngineError::UnknownAttribute`] if the blueprint does
    /// not declare `key`; blueprints never grow attributes at runtime.
    pub fn set_attribute(
        &mut self,
        key: &str,
        value: impl Into<String>,
    ) -> Result<(), EngineError> {
        match self.attributes.get_mut(key) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(EngineError::UnknownAttribute {
                blueprint: self.id.clone(),
                key: key.to_string(),
            }),
        }
    }

    /// Iterate over `(key, value)` attribute pairs in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The set of blueprints a world can instantiate.
///
/// Iteration and [`filter`](BlueprintLibrary::filter) results follow
/// insertion order, so "first match" is deterministic for a given
/// engine build.
#[derive(Clone, Debug, Default)]
pub struct BlueprintLibrary {
    entries: IndexMap<String, Blueprint>,
}

impl BlueprintLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a blueprint, replacing any previous entry with the same id.
    pub fn insert(&mut self, blueprint: Blueprint) {
        self.entries.insert(blueprint.id().to_string(), blueprint);
    }

    /// Look up a blueprint by its exact id.
    pub fn find(&self, id: &str) -> Option<&Blueprint> {
        self.entries.get(id)
    }

    /// All blueprints whose id contains `pattern`, case-insensitively,
    /// in library order.
    ///
    /// # Examples
    ///
    /// ```
    /// use veer_engine::{Blueprint, BlueprintLibrary};
    ///
    /// let mut lib = BlueprintLibrary::new();
    /// lib.insert(Blueprint::new("vehicle.tesla.model3", [("color", "grey")]));
    /// lib.insert(Blueprint::new("vehicle.audi.tt", [("color", "grey")]));
    ///
    /// let matches = lib.filter("model3");
    /// assert_eq!(matches.len(), 1);
    /// assert_eq!(matches[0].id(), "vehicle.tesla.model3");
    /// ```
    pub fn filter(&self, pattern: &str) -> Vec<&Blueprint> {
        let needle = pattern.to_ascii_lowercase();
        self.entries
            .values()
            .filter(|bp| bp.id().to_ascii_lowercase().contains(&needle))
            .collect()
    }

    /// Number of blueprints in the library.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the library is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all blueprints in library order.
    pub fn iter(&self) -> impl Iterator<Item = &Blueprint> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_library() -> BlueprintLibrary {
        let mut lib = BlueprintLibrary::new();
        lib.insert(Blueprint::new("vehicle.audi.tt", [("color", "grey")]));
        lib.insert(Blueprint::new("vehicle.tesla.model3", [("color", "grey")]));
        lib.insert(Blueprint::new(
            "sensor.camera.rgb",
            [("image_size_x", "800"), ("fov", "90")],
        ));
        lib
    }

    #[test]
    fn filter_matches_substring_case_insensitively() {
        let lib = sample_library();
        let hits = lib.filter("MODEL3");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id(), "vehicle.tesla.model3");
    }

    #[test]
    fn filter_preserves_library_order() {
        let lib = sample_library();
        let hits = lib.filter("vehicle");
        let ids: Vec<_> = hits.iter().map(|bp| bp.id()).collect();
        assert_eq!(ids, ["vehicle.audi.tt", "vehicle.tesla.model3"]);
    }

    #[test]
    fn find_requires_exact_id() {
        let lib = sample_library();
        assert!(lib.find("sensor.camera.rgb").is_some());
        assert!(lib.find("sensor.camera").is_none());
    }

    #[test]
    fn set_attribute_rejects_undeclared_keys() {
        let lib = sample_library();
        let mut camera = lib.find("sensor.camera.rgb").cloned().unwrap();
        camera.set_attribute("fov", "110").unwrap();
        assert_eq!(camera.attribute("fov"), Some("110"));

        let err = camera.set_attribute("gamma", "2.2").unwrap_err();
        assert!(matches!(err, EngineError::UnknownAttribute { .. }));
    }
}
