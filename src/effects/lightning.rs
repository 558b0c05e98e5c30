//! Electrical discharges striking the ground ahead of the observer.

use glam::{Quat, Vec3};
use rand::Rng;

use super::pool::EffectSlot;
use super::{EffectContext, EffectParams};
use crate::scene::view::{EntityKind, EntityView};

/// Midpoint-displacement passes; 5 gives 33 points.
const SUBDIVISIONS: u32 = 5;

/// A jagged bolt anchored at its ground strike point.
#[derive(Clone, Debug, PartialEq)]
pub struct Lightning {
    /// Canonical world position of the strike (Y is ground elevation).
    pub anchor: Vec3,
    /// Polyline from the cloud (first) to the strike point (last),
    /// relative to `anchor`.
    pub path: Vec<Vec3>,
}

impl Lightning {
    /// Build a bolt between two anchor-relative points.
    pub fn with_path<R: Rng>(rng: &mut R, anchor: Vec3, top: Vec3, subdivisions: u32) -> Self {
        let mut path = vec![top, Vec3::ZERO];
        let mut spread = top.length() * 0.15;

        for _ in 0..subdivisions {
            let mut next = Vec::with_capacity(path.len() * 2 - 1);
            for pair in path.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let offset = Vec3::new(
                    rng.random_range(-1.0f32..=1.0),
                    rng.random_range(-0.25f32..=0.25),
                    rng.random_range(-1.0f32..=1.0),
                ) * spread;
                next.push(a);
                next.push((a + b) * 0.5 + offset);
            }
            if let Some(&last) = path.last() {
                next.push(last);
            }
            path = next;
            spread *= 0.5;
        }

        Self { anchor, path }
    }

    /// Cloud end of the bolt, relative to the anchor.
    pub fn top(&self) -> Vec3 {
        self.path.first().copied().unwrap_or(Vec3::ZERO)
    }
}

impl EffectParams for Lightning {
    const KIND: EntityKind = EntityKind::Lightning;

    fn generate<R: Rng>(rng: &mut R, ctx: &EffectContext) -> Self {
        let r = ctx.streamer.config().visible_radius;
        let local = Vec3::new(
            rng.random_range(-0.6f32..=0.6) * r,
            0.0,
            rng.random_range(-0.9f32..=-0.3) * r,
        );
        let world = ctx.streamer.effective_world(local);
        let ground = ctx.terrain.height_at(world.x, world.z);
        let anchor = Vec3::new(world.x, ground, world.z);

        let top = Vec3::new(
            rng.random_range(-30.0f32..=30.0),
            rng.random_range(120.0f32..=180.0),
            rng.random_range(-30.0f32..=30.0),
        );

        Self::with_path(rng, anchor, top, SUBDIVISIONS)
    }

    fn view(&self, slot: &EffectSlot<Self>, opacity: f32, ctx: &EffectContext) -> Option<EntityView> {
        if opacity <= 0.0 {
            return None;
        }
        let position = ctx.streamer.display_position(self.anchor);
        if !ctx.streamer.in_view(position) {
            return None;
        }
        let up = self.top().try_normalize().unwrap_or(Vec3::Y);
        Some(EntityView {
            kind: Self::KIND,
            position,
            orientation: Quat::from_rotation_arc(Vec3::Y, up),
            visibility: opacity,
            // Bright first flash that settles
            intensity: opacity * (2.0 - slot.progress()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::{StreamerConfig, WorldStreamer};
    use crate::terrain::HeightSampler;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Plateau(f32);
    impl HeightSampler for Plateau {
        fn height_at(&self, _x: f32, _z: f32) -> f32 {
            self.0
        }
    }

    #[test]
    fn test_path_endpoints_fixed() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let top = Vec3::new(10.0, 150.0, -5.0);
        let bolt = Lightning::with_path(&mut rng, Vec3::ZERO, top, 4);
        assert_eq!(bolt.path.len(), 17);
        assert_eq!(bolt.path[0], top);
        assert_eq!(*bolt.path.last().unwrap(), Vec3::ZERO);
    }

    #[test]
    fn test_generate_strikes_ground() {
        let mut streamer = WorldStreamer::new(StreamerConfig::default()).unwrap();
        streamer.advance(10.0, 3.0);
        let terrain = Plateau(7.5);
        let ctx = EffectContext { streamer: &streamer, terrain: &terrain, elapsed: 0.0 };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let bolt = Lightning::generate(&mut rng, &ctx);
        assert_eq!(bolt.anchor.y, 7.5);
        assert!(bolt.anchor.z < streamer.reference().z);
        assert_eq!(bolt.path.len(), 33);
    }

    #[test]
    fn test_view_uses_wrapped_anchor() {
        let streamer = WorldStreamer::new(StreamerConfig::default()).unwrap();
        let terrain = Plateau(0.0);
        let ctx = EffectContext { streamer: &streamer, terrain: &terrain, elapsed: 0.0 };
        let window = streamer.window();
        let bolt = Lightning {
            anchor: Vec3::new(20.0 + window, 3.0, -40.0 - 2.0 * window),
            path: vec![Vec3::new(0.0, 100.0, 0.0), Vec3::ZERO],
        };
        let slot = EffectSlot { active: true, age: 0.1, lifetime: 1.0, params: None };
        let view = bolt.view(&slot, 0.5, &ctx).unwrap();
        assert!((view.position - Vec3::new(20.0, 3.0, -40.0)).length() < 1e-3);
        assert_eq!(view.kind, EntityKind::Lightning);
        assert!(bolt.view(&slot, 0.0, &ctx).is_none());
    }
}
