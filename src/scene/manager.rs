//! Per-frame driver that owns every subsystem of the landscape.

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::audio::AudioResponse;
use crate::core::camera::CameraPose;
use crate::core::camera_rig::CameraRig;
use crate::core::time::FrameInput;
use crate::core::types::Result;
use crate::effects::{EffectContext, EffectSystem};
use crate::streaming::WorldStreamer;
use crate::terrain::noise::{coerce_seed, fallback_seed};
use crate::terrain::{BiomeSample, HeightGrid, TerrainHeightField};

use super::config::WorldConfig;
use super::decoration::DecorationSet;
use super::view::EntityView;

/// Separates the effect stream from the placement stream for one seed.
const EFFECTS_STREAM_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Snapshot of the world for logging and summaries.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneStats {
    pub seed: u32,
    pub distance: f64,
    pub biome: String,
    pub biome_blend: f32,
    pub visible_decorations: usize,
    pub active_effects: usize,
    pub camera_height: f32,
    pub ground_min: f32,
    pub ground_max: f32,
}

/// Owns terrain, streaming, decorations, effects and the camera.
///
/// Frame order: audio response, reference advance, height grid, decorations,
/// effects, camera.
pub struct SceneManager {
    config: WorldConfig,
    seed: u32,
    terrain: TerrainHeightField,
    streamer: WorldStreamer,
    grid: HeightGrid,
    decorations: DecorationSet,
    effects: EffectSystem,
    rig: CameraRig,
    audio: AudioResponse,
    decoration_rng: ChaCha8Rng,
    effects_rng: ChaCha8Rng,
    elapsed: f32,
}

impl SceneManager {
    /// Build a world from a validated configuration.
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(fallback_seed);

        let terrain = TerrainHeightField::new(config.terrain.clone(), config.biomes.clone());
        let streamer = WorldStreamer::new(config.streamer.clone())?;

        let mut manager = Self {
            seed,
            terrain,
            streamer,
            grid: HeightGrid::new(config.grid_resolution, config.grid_size),
            decorations: DecorationSet::new(config.decorations.clone()),
            effects: EffectSystem::new(&config.effects),
            rig: CameraRig::new(config.camera.clone()),
            audio: AudioResponse::new(config.audio.clone()),
            decoration_rng: ChaCha8Rng::seed_from_u64(seed as u64),
            effects_rng: ChaCha8Rng::seed_from_u64(seed as u64 ^ EFFECTS_STREAM_SALT),
            elapsed: 0.0,
            config,
        };
        manager.regenerate(seed);
        Ok(manager)
    }

    /// Reinitialise the world from a raw seed. Out-of-range seeds fall back
    /// to a generated one instead of failing.
    pub fn reset_with_seed(&mut self, raw: i64) {
        let seed = coerce_seed(raw);
        self.regenerate(seed);
    }

    /// Reseed noise, return to the origin, clear every effect slot and
    /// redraw all decorations.
    pub fn regenerate(&mut self, seed: u32) {
        self.seed = seed;
        self.terrain.reseed(seed);
        self.streamer.reset();
        self.effects.clear();
        self.audio.reset();
        self.rig.reset();

        self.decoration_rng = ChaCha8Rng::seed_from_u64(seed as u64);
        self.effects_rng = ChaCha8Rng::seed_from_u64(seed as u64 ^ EFFECTS_STREAM_SALT);
        self.decorations.populate(
            &mut self.decoration_rng,
            self.streamer.window(),
            self.terrain.biomes().biome_count(),
        );

        self.settle();

        log::info!(
            "World generated: seed={}, decorations={}, effect slots={}",
            seed,
            self.decorations.objects().len(),
            self.effects.capacity()
        );
    }

    /// Refresh derived state without advancing time.
    fn settle(&mut self) {
        let reference = self.streamer.reference();
        self.grid.refresh(&self.terrain, reference);
        self.decorations.update(&self.streamer, &self.terrain);
        let obstacles = self.decorations.obstacles();
        self.rig.update(0.0, &self.terrain, reference, &obstacles);
    }

    /// Run one frame. `input.dt` must already be clamped by the caller.
    pub fn update(&mut self, input: &FrameInput) {
        let dt = input.dt.max(0.0);
        self.elapsed = input.elapsed;

        self.audio.update(input.audio, dt);

        let speed = self.config.streamer.base_speed * self.audio.speed_multiplier();
        self.streamer.advance(speed, dt);
        let reference = self.streamer.reference();

        self.grid.refresh(&self.terrain, reference);
        self.decorations.update(&self.streamer, &self.terrain);

        let ctx = EffectContext {
            streamer: &self.streamer,
            terrain: &self.terrain,
            elapsed: self.elapsed,
        };
        self.effects.update(&mut self.effects_rng, dt, &self.audio, &ctx);

        let obstacles = self.decorations.obstacles();
        self.rig.update(dt, &self.terrain, reference, &obstacles);
    }

    /// Terrain elevation at a world position.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.terrain.height_at(x, z)
    }

    /// Biome index and blend weight at a world position.
    pub fn biome_at(&self, x: f32, z: f32) -> BiomeSample {
        self.terrain.biomes().biome_at(x, z)
    }

    /// Every visible decoration and active effect, ready to draw.
    pub fn entity_views(&self) -> Vec<EntityView> {
        let mut views = Vec::new();
        self.decorations
            .collect_views(self.streamer.config().visible_radius, &mut views);
        let ctx = EffectContext {
            streamer: &self.streamer,
            terrain: &self.terrain,
            elapsed: self.elapsed,
        };
        self.effects.collect_views(&ctx, &mut views);
        views
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.rig.pose()
    }

    pub fn height_grid(&self) -> &HeightGrid {
        &self.grid
    }

    pub fn reference(&self) -> Vec3 {
        self.streamer.reference()
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn terrain(&self) -> &TerrainHeightField {
        &self.terrain
    }

    pub fn streamer(&self) -> &WorldStreamer {
        &self.streamer
    }

    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    pub fn effects(&self) -> &EffectSystem {
        &self.effects
    }

    pub fn audio(&self) -> &AudioResponse {
        &self.audio
    }

    pub fn stats(&self) -> SceneStats {
        let reference = self.streamer.reference();
        let sample = self.biome_at(reference.x, reference.z);
        let (ground_min, ground_max) = self.grid.bounds();
        SceneStats {
            seed: self.seed,
            distance: self.streamer.distance_travelled(),
            biome: self.terrain.biomes().biome(sample.index).name.clone(),
            biome_blend: sample.blend,
            visible_decorations: self.decorations.visible_count(),
            active_effects: self.effects.active_count(),
            camera_height: self.rig.pose().position.y,
            ground_min,
            ground_max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audio::AudioEnvelope;
    use rand::Rng;

    fn test_config() -> WorldConfig {
        WorldConfig {
            seed: Some(42),
            grid_resolution: 9,
            ..Default::default()
        }
    }

    fn run(manager: &mut SceneManager, frames: usize, dt: f32) {
        for i in 0..frames {
            manager.update(&FrameInput::new(dt, (i + 1) as f32 * dt));
        }
    }

    #[test]
    fn test_new_world_at_origin() {
        let manager = SceneManager::new(test_config()).unwrap();
        assert_eq!(manager.seed(), 42);
        assert_eq!(manager.reference(), Vec3::ZERO);
        assert_eq!(manager.effects().active_count(), 0);
        assert_eq!(manager.decorations().objects().len(), manager.config().decorations.count);

        let ground = manager.height_at(0.0, -manager.config().camera.forward_offset);
        let pose = manager.camera_pose();
        assert!(pose.position.y >= ground + manager.config().camera.clearance - 1e-3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = test_config();
        config.streamer.window = -1.0;
        assert!(SceneManager::new(config).is_err());
    }

    #[test]
    fn test_update_advances_reference() {
        let mut manager = SceneManager::new(test_config()).unwrap();
        run(&mut manager, 60, 1.0 / 60.0);
        let expected = manager.config().streamer.base_speed;
        assert!((manager.streamer().distance_travelled() - expected as f64).abs() < 1e-2);
    }

    #[test]
    fn test_reset_with_seed_restores_initial_state() {
        let mut config = test_config();
        config.effects.shooting_stars.rate = 40.0;
        config.effects.light_pillars.rate = 40.0;
        let mut manager = SceneManager::new(config.clone()).unwrap();
        run(&mut manager, 120, 1.0 / 30.0);
        assert!(manager.reference() != Vec3::ZERO);
        assert!(manager.effects().active_count() > 0);

        manager.reset_with_seed(7);
        assert_eq!(manager.seed(), 7);
        assert_eq!(manager.reference(), Vec3::ZERO);
        assert_eq!(manager.effects().active_count(), 0);

        let fresh = SceneManager::new(WorldConfig { seed: Some(7), ..config }).unwrap();
        assert_eq!(manager.decorations().objects(), fresh.decorations().objects());
        assert_eq!(manager.height_at(10.0, -20.0), fresh.height_at(10.0, -20.0));
    }

    #[test]
    fn test_reset_with_bad_seed_still_regenerates() {
        let mut manager = SceneManager::new(test_config()).unwrap();
        run(&mut manager, 30, 1.0 / 30.0);
        manager.reset_with_seed(-5);
        assert_eq!(manager.reference(), Vec3::ZERO);
        assert_eq!(manager.effects().active_count(), 0);
        manager.reset_with_seed(i64::from(u32::MAX) + 1);
        assert_eq!(manager.reference(), Vec3::ZERO);
    }

    #[test]
    fn test_same_seed_same_world() {
        let mut a = SceneManager::new(test_config()).unwrap();
        let mut b = SceneManager::new(test_config()).unwrap();
        run(&mut a, 90, 1.0 / 30.0);
        run(&mut b, 90, 1.0 / 30.0);
        assert_eq!(a.entity_views(), b.entity_views());
        assert_eq!(a.camera_pose(), b.camera_pose());
        assert_eq!(a.height_grid().heights(), b.height_grid().heights());
    }

    #[test]
    fn test_audio_boost_decays() {
        let mut manager = SceneManager::new(test_config()).unwrap();
        let loud = AudioEnvelope::new(1.0, 1.0, 1.0);
        for i in 0..30 {
            manager.update(&FrameInput::new(0.05, i as f32 * 0.05).with_audio(loud));
        }
        let boosted = manager.audio().speed_multiplier();
        assert!(boosted > 1.5);

        manager.update(&FrameInput::new(0.05, 1.55));
        let after = manager.audio().speed_multiplier();
        assert!(after < boosted && after > 1.0);
    }

    #[test]
    fn test_nan_audio_frame_does_not_poison_travel() {
        let mut manager = SceneManager::new(test_config()).unwrap();
        let raw = AudioEnvelope { low: f32::NAN, mid: 0.5, high: 0.5 };
        manager.update(&FrameInput::new(1.0 / 60.0, 1.0 / 60.0).with_audio(raw));
        run(&mut manager, 600, 1.0 / 60.0);

        assert!(manager.audio().speed_multiplier().is_finite());
        let travelled = manager.streamer().distance_travelled();
        assert!(travelled.is_finite() && travelled > 0.0);
        assert!(manager.camera_pose().position.is_finite());
    }

    #[test]
    fn test_audio_speeds_travel() {
        let mut quiet = SceneManager::new(test_config()).unwrap();
        let mut loud = SceneManager::new(test_config()).unwrap();
        let envelope = AudioEnvelope::new(1.0, 0.0, 0.0);
        for i in 0..60 {
            let input = FrameInput::new(1.0 / 30.0, i as f32 / 30.0);
            quiet.update(&input);
            loud.update(&input.with_audio(envelope));
        }
        assert!(loud.streamer().distance_travelled() > quiet.streamer().distance_travelled());
    }

    #[test]
    fn test_views_stay_bounded() {
        let mut manager = SceneManager::new(test_config()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for i in 0..200 {
            let dt = rng.random_range(0.005f32..0.05);
            manager.update(&FrameInput::new(dt, i as f32 * 0.03));
        }
        let half = manager.streamer().window() * 0.5;
        for view in manager.entity_views() {
            assert!((0.0..=1.0).contains(&view.visibility));
            assert!(view.intensity >= 0.0);
            if let crate::scene::view::EntityKind::Decoration(_) = view.kind {
                assert!(view.position.x >= -half && view.position.x < half);
                assert!(view.position.z >= -half && view.position.z < half);
            }
        }
        assert!(manager.effects().active_count() <= manager.effects().capacity());
    }

    #[test]
    fn test_stats_reports_biome() {
        let manager = SceneManager::new(test_config()).unwrap();
        let stats = manager.stats();
        assert_eq!(stats.seed, 42);
        assert!(manager.config().biomes.biomes.iter().any(|b| b.name == stats.biome));
        assert!(stats.ground_min <= stats.ground_max);
    }
}
