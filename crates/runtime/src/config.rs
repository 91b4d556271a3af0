//! Playground configuration.
//!
//! Every field has a default, so a JSON file only needs to name what it
//! changes. The defaults reproduce the classic demo: gravity of -9.82,
//! bouncy low-friction contacts, 60 Hz physics and a sphere and a box
//! dropped from three meters.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spawn::SpawnParams;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Half-open interval `[min, max)` sampled uniformly.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomRange {
    pub min: f32,
    pub max: f32,
}

impl RandomRange {
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut fastrand::Rng) -> f32 {
        self.min + rng.f32() * (self.max - self.min)
    }

    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value < self.max
    }
}

/// Ranges used by the debug spawn actions.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnRanges {
    /// Sphere radius and each box dimension
    pub size: RandomRange,
    pub x: RandomRange,
    pub y: RandomRange,
    pub z: RandomRange,
}

impl Default for SpawnRanges {
    fn default() -> Self {
        Self {
            size: RandomRange::new(0.1, 0.6),
            x: RandomRange::new(-2.5, 2.5),
            y: RandomRange::new(1.0, 4.0),
            z: RandomRange::new(-2.5, 2.5),
        }
    }
}

/// Asset locations, relative to the asset directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub hit_sound: PathBuf,
    /// Directory holding `px.png` ... `nz.png`
    pub environment_map: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            hit_sound: PathBuf::from("sounds/hit.mp3"),
            environment_map: PathBuf::from("textures/environmentMaps/0"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    pub gravity: [f32; 3],
    pub allow_sleep: bool,
    pub friction: f32,
    pub restitution: f32,
    pub fixed_timestep: f32,
    pub max_substeps: u32,
    /// Contacts faster than this along the normal play the hit sound
    pub impact_threshold: f32,
    pub spawn: SpawnRanges,
    pub initial_objects: Vec<SpawnParams>,
    pub assets: AssetPaths,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.82, 0.0],
            allow_sleep: true,
            friction: 0.1,
            restitution: 0.7,
            fixed_timestep: 1.0 / 60.0,
            max_substeps: 3,
            impact_threshold: 1.5,
            spawn: SpawnRanges::default(),
            initial_objects: vec![
                SpawnParams::sphere(0.5, [0.0, 3.0, 0.0]),
                SpawnParams::cuboid(1.0, 1.0, 1.0, [-2.0, 3.0, 0.0]),
            ],
            assets: AssetPaths::default(),
        }
    }
}

impl PlaygroundConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or wrongly typed fields.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is not a valid config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), "loaded playground config");
        Ok(config)
    }

    /// Pretty JSON, handy as a starting point for a config file.
    ///
    /// # Errors
    ///
    /// Only fails if serialization itself fails, which the config's plain
    /// data types never trigger.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_a_json_round_trip() {
        let config = PlaygroundConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(PlaygroundConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config = PlaygroundConfig::from_json(
            r#"{ "restitution": 0.2, "spawn": { "y": { "min": 5.0, "max": 6.0 } } }"#,
        )
        .unwrap();

        assert_eq!(config.restitution, 0.2);
        assert_eq!(config.friction, 0.1);
        assert_eq!(config.spawn.y, RandomRange::new(5.0, 6.0));
        assert_eq!(config.spawn.size, RandomRange::new(0.1, 0.6));
        assert_eq!(config.initial_objects.len(), 2);
    }

    #[test]
    fn wrong_types_are_rejected() {
        let err = PlaygroundConfig::from_json(r#"{ "max_substeps": "three" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = PlaygroundConfig::load(Path::new("no/such/config.json")).unwrap_err();
        assert!(err.to_string().contains("no/such/config.json"));
    }

    #[test]
    fn samples_stay_in_range() {
        let mut rng = fastrand::Rng::with_seed(7);
        let range = RandomRange::new(-2.5, 2.5);
        for _ in 0..1000 {
            assert!(range.contains(range.sample(&mut rng)));
        }
    }
}
