//! World-anchored decorative objects.
//!
//! Decorations are scattered once per seed at canonical positions inside the
//! wrap window. Every frame each one is folded around the reference, dropped
//! onto the terrain and shown only while the biome under it is the one it
//! was placed for.

use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::camera_rig::Obstacle;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::math::interp::smoothstep;
use crate::streaming::WorldStreamer;
use crate::terrain::TerrainHeightField;

use super::view::{DecorationKind, EntityKind, EntityView};

/// Size range and relative frequency of one decoration kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KindSpec {
    pub weight: f32,
    pub min_height: f32,
    pub max_height: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationConfig {
    pub count: usize,
    pub rock: KindSpec,
    pub tree: KindSpec,
    pub monolith: KindSpec,
    /// Fraction of the visible radius over which objects fade out at the edge
    pub edge_fade: f32,
}

impl Default for DecorationConfig {
    fn default() -> Self {
        Self {
            count: 180,
            rock: KindSpec { weight: 0.55, min_height: 1.0, max_height: 4.0 },
            tree: KindSpec { weight: 0.35, min_height: 4.0, max_height: 10.0 },
            monolith: KindSpec { weight: 0.10, min_height: 12.0, max_height: 30.0 },
            edge_fade: 0.15,
        }
    }
}

impl DecorationConfig {
    fn specs(&self) -> [(DecorationKind, KindSpec); 3] {
        [
            (DecorationKind::Rock, self.rock),
            (DecorationKind::Tree, self.tree),
            (DecorationKind::Monolith, self.monolith),
        ]
    }

    pub fn validate(&self) -> Result<()> {
        let mut total = 0.0;
        for (kind, spec) in self.specs() {
            if spec.weight < 0.0 || !spec.weight.is_finite() {
                return Err(Error::invalid(format!("{:?} weight must be >= 0", kind)));
            }
            if !(spec.min_height > 0.0) || spec.max_height < spec.min_height {
                return Err(Error::invalid(format!(
                    "{:?} height range {}..{} is invalid",
                    kind, spec.min_height, spec.max_height
                )));
            }
            total += spec.weight;
        }
        if self.count > 0 && !(total > 0.0) {
            return Err(Error::invalid("decoration weights sum to zero"));
        }
        if !(0.0..=1.0).contains(&self.edge_fade) {
            return Err(Error::invalid(format!("edge fade must be in [0, 1], got {}", self.edge_fade)));
        }
        Ok(())
    }

    fn pick_kind<R: Rng>(&self, rng: &mut R) -> (DecorationKind, KindSpec) {
        let specs = self.specs();
        let total: f32 = specs.iter().map(|(_, s)| s.weight).sum();
        let mut roll = rng.random::<f32>() * total;
        for (kind, spec) in specs {
            if roll < spec.weight {
                return (kind, spec);
            }
            roll -= spec.weight;
        }
        specs[0]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

/// A decoration with a fixed canonical position and a derived display state.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldAnchoredObject {
    /// Canonical XZ inside the window at creation; Y unused.
    pub canonical: Vec3,
    /// Biome this object belongs to.
    pub target_biome: usize,
    pub kind: DecorationKind,
    pub height: f32,
    pub scale: f32,
    pub yaw: f32,
    /// Folded position with Y on the terrain, recomputed every frame.
    pub display_position: Vec3,
    pub visibility: Visibility,
}

impl WorldAnchoredObject {
    /// Top of the object above its base.
    pub fn extent(&self) -> f32 {
        self.height * self.scale
    }
}

pub struct DecorationSet {
    config: DecorationConfig,
    objects: Vec<WorldAnchoredObject>,
}

impl DecorationSet {
    pub fn new(config: DecorationConfig) -> Self {
        Self {
            config,
            objects: Vec::new(),
        }
    }

    /// Redraw every placement. Any previous objects are discarded.
    pub fn populate<R: Rng>(&mut self, rng: &mut R, window: f32, biome_count: usize) {
        let half = window * 0.5;
        let biome_count = biome_count.max(1);
        self.objects.clear();
        self.objects.reserve(self.config.count);

        for _ in 0..self.config.count {
            let (kind, spec) = self.config.pick_kind(rng);
            let canonical = Vec3::new(rng.random_range(-half..half), 0.0, rng.random_range(-half..half));
            self.objects.push(WorldAnchoredObject {
                canonical,
                target_biome: rng.random_range(0..biome_count),
                kind,
                height: rng.random_range(spec.min_height..=spec.max_height),
                scale: rng.random_range(0.8f32..=1.25),
                yaw: rng.random_range(0.0f32..std::f32::consts::TAU),
                display_position: canonical,
                visibility: Visibility::Hidden,
            });
        }

        log::debug!("Placed {} decorations across {} biomes", self.objects.len(), biome_count);
    }

    /// Refold, ground and reclassify every object for the current reference.
    pub fn update(&mut self, streamer: &WorldStreamer, terrain: &TerrainHeightField) {
        let classifier = terrain.biomes();
        for object in &mut self.objects {
            let mut display = streamer.display_position(object.canonical);
            let world = streamer.effective_world(display);
            display.y = terrain.height_at(world.x, world.z);
            object.display_position = display;

            let shown = streamer.in_view(display)
                && classifier.is_visible_for(object.target_biome, world.x, world.z);
            object.visibility = if shown { Visibility::Visible } else { Visibility::Hidden };
        }
    }

    pub fn objects(&self) -> &[WorldAnchoredObject] {
        &self.objects
    }

    pub fn visible(&self) -> impl Iterator<Item = &WorldAnchoredObject> {
        self.objects.iter().filter(|o| o.visibility == Visibility::Visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }

    /// Append views for every visible object.
    pub fn collect_views(&self, visible_radius: f32, out: &mut Vec<EntityView>) {
        let fade_start = visible_radius * (1.0 - self.config.edge_fade);
        for object in self.visible() {
            let p = object.display_position;
            let distance = (p.x * p.x + p.z * p.z).sqrt();
            let visibility = 1.0 - smoothstep(fade_start, visible_radius, distance);
            let intensity = match object.kind {
                DecorationKind::Monolith => 0.6,
                DecorationKind::Rock | DecorationKind::Tree => 0.0,
            };
            out.push(EntityView {
                kind: EntityKind::Decoration(object.kind),
                position: p,
                orientation: Quat::from_rotation_y(object.yaw),
                visibility,
                intensity,
            });
        }
    }

    /// Visible objects as camera obstacles.
    pub fn obstacles(&self) -> Vec<Obstacle> {
        self.visible()
            .map(|o| Obstacle { position: o.display_position, height: o.extent() })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::StreamerConfig;
    use crate::terrain::{BiomeConfig, TerrainParams};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn world() -> (WorldStreamer, TerrainHeightField) {
        let streamer = WorldStreamer::new(StreamerConfig::default()).unwrap();
        let terrain = TerrainHeightField::new(TerrainParams::default(), BiomeConfig::default());
        (streamer, terrain)
    }

    #[test]
    fn test_populate_stays_in_window() {
        let mut set = DecorationSet::new(DecorationConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        set.populate(&mut rng, 800.0, 5);
        assert_eq!(set.objects().len(), 180);
        for o in set.objects() {
            assert!(o.canonical.x >= -400.0 && o.canonical.x < 400.0);
            assert!(o.canonical.z >= -400.0 && o.canonical.z < 400.0);
            assert!(o.target_biome < 5);
            assert!(o.extent() > 0.0);
        }
    }

    #[test]
    fn test_populate_is_deterministic_and_replaces() {
        let mut a = DecorationSet::new(DecorationConfig::default());
        let mut b = DecorationSet::new(DecorationConfig::default());
        a.populate(&mut ChaCha8Rng::seed_from_u64(8), 800.0, 5);
        a.populate(&mut ChaCha8Rng::seed_from_u64(8), 800.0, 5);
        b.populate(&mut ChaCha8Rng::seed_from_u64(8), 800.0, 5);
        assert_eq!(a.objects(), b.objects());
    }

    #[test]
    fn test_update_grounds_and_classifies() {
        let (mut streamer, terrain) = world();
        let mut set = DecorationSet::new(DecorationConfig::default());
        set.populate(&mut ChaCha8Rng::seed_from_u64(15), streamer.window(), terrain.biomes().biome_count());
        streamer.advance(14.0, 37.0);
        set.update(&streamer, &terrain);

        let half = streamer.window() * 0.5;
        for o in set.objects() {
            let p = o.display_position;
            assert!(p.x >= -half && p.x < half);
            assert!(p.z >= -half && p.z < half);
            let world = streamer.effective_world(p);
            assert_eq!(p.y, terrain.height_at(world.x, world.z));

            let expected = streamer.in_view(p)
                && terrain.biomes().is_visible_for(o.target_biome, world.x, world.z);
            assert_eq!(o.visibility == Visibility::Visible, expected);
        }
    }

    #[test]
    fn test_views_and_obstacles_cover_visible_only() {
        let (streamer, terrain) = world();
        let config = DecorationConfig { count: 400, ..Default::default() };
        let mut set = DecorationSet::new(config);
        set.populate(&mut ChaCha8Rng::seed_from_u64(16), streamer.window(), terrain.biomes().biome_count());
        set.update(&streamer, &terrain);

        let visible = set.visible_count();
        assert!(visible > 0);
        assert!(visible < set.objects().len());

        let mut views = Vec::new();
        set.collect_views(streamer.config().visible_radius, &mut views);
        assert_eq!(views.len(), visible);
        assert!(views.iter().all(|v| (0.0..=1.0).contains(&v.visibility)));
        assert_eq!(set.obstacles().len(), visible);
    }

    #[test]
    fn test_config_validation() {
        assert!(DecorationConfig::default().validate().is_ok());
        let mut bad = DecorationConfig::default();
        bad.tree.max_height = 1.0;
        assert!(bad.validate().is_err());
        let mut zero = DecorationConfig::default();
        zero.rock.weight = 0.0;
        zero.tree.weight = 0.0;
        zero.monolith.weight = 0.0;
        assert!(zero.validate().is_err());
    }
}
