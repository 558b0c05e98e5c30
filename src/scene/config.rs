//! World configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::audio::AudioConfig;
use crate::core::camera_rig::CameraRigConfig;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::effects::EffectsConfig;
use crate::streaming::StreamerConfig;
use crate::terrain::{BiomeConfig, TerrainParams};

use super::decoration::DecorationConfig;

/// Everything needed to build a world.
///
/// All sections default, so a JSON file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Initial seed. `None` draws a fallback seed at construction.
    pub seed: Option<u32>,
    pub terrain: TerrainParams,
    pub biomes: BiomeConfig,
    pub streamer: StreamerConfig,
    pub decorations: DecorationConfig,
    pub effects: EffectsConfig,
    pub camera: CameraRigConfig,
    pub audio: AudioConfig,
    /// Vertices per side of the refreshed height grid
    pub grid_resolution: usize,
    /// Side length of the height grid in world units
    pub grid_size: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: Some(crate::terrain::noise::DEFAULT_SEED),
            terrain: TerrainParams::default(),
            biomes: BiomeConfig::default(),
            streamer: StreamerConfig::default(),
            decorations: DecorationConfig::default(),
            effects: EffectsConfig::default(),
            camera: CameraRigConfig::default(),
            audio: AudioConfig::default(),
            grid_resolution: 65,
            grid_size: 640.0,
        }
    }
}

impl WorldConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded world config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save to file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.streamer.validate()?;
        self.biomes.validate()?;
        self.effects.validate()?;
        self.camera.validate()?;
        self.decorations.validate()?;
        if self.grid_resolution < 2 {
            return Err(Error::invalid(format!(
                "grid resolution must be at least 2, got {}",
                self.grid_resolution
            )));
        }
        if !(self.grid_size > 0.0) {
            return Err(Error::invalid(format!("grid size must be positive, got {}", self.grid_size)));
        }
        if self.grid_size > self.streamer.window {
            return Err(Error::invalid(format!(
                "grid size {} exceeds the wrap window {}",
                self.grid_size, self.streamer.window
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_is_valid() {
        assert!(WorldConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = WorldConfig::from_json_str(r#"{ "seed": 7, "streamer": { "base_speed": 30.0 } }"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.streamer.base_speed, 30.0);
        assert_eq!(config.streamer.window, StreamerConfig::default().window);
        assert_eq!(config.effects, EffectsConfig::default());
    }

    #[test]
    fn test_rejects_small_window() {
        let err = WorldConfig::from_json_str(r#"{ "streamer": { "window": 100.0, "visible_radius": 80.0 } }"#);
        assert!(matches!(err, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_empty_biomes() {
        let err = WorldConfig::from_json_str(r#"{ "biomes": { "biomes": [] } }"#);
        assert!(matches!(err, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_terrain_seed_not_configurable() {
        let err = WorldConfig::from_json_str(r#"{ "terrain": { "seed": 5 } }"#);
        assert!(matches!(err, Err(Error::Json(_))));

        let json = WorldConfig::default().to_json_string().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["terrain"].get("seed").is_none());
        assert!(value["terrain"].get("height_scale").is_some());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(WorldConfig::from_json_str("{ nope"), Err(Error::Json(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("worlds").join("dusk.json");

        let mut config = WorldConfig::default();
        config.seed = Some(99);
        config.audio.spawn_gain = 5.0;
        config.save(&path).unwrap();

        let loaded = WorldConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = WorldConfig::load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
