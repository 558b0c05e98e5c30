//! Streaking objects crossing the sky ahead of the observer.

use glam::{Quat, Vec3};
use rand::Rng;

use super::pool::EffectSlot;
use super::{EffectContext, EffectParams};
use crate::scene::view::{EntityKind, EntityView};

/// Straight-line streak in observer-relative sky space.
#[derive(Clone, Debug, PartialEq)]
pub struct ShootingStar {
    pub start: Vec3,
    /// Unit direction of travel.
    pub direction: Vec3,
    pub speed: f32,
    pub trail_length: f32,
}

impl ShootingStar {
    /// Head position after `age` seconds.
    pub fn head(&self, age: f32) -> Vec3 {
        self.start + self.direction * self.speed * age
    }
}

impl EffectParams for ShootingStar {
    const KIND: EntityKind = EntityKind::ShootingStar;

    fn generate<R: Rng>(rng: &mut R, ctx: &EffectContext) -> Self {
        let r = ctx.streamer.config().visible_radius;
        let start = Vec3::new(
            rng.random_range(-0.8f32..=0.8) * r,
            rng.random_range(90.0f32..=160.0),
            rng.random_range(-1.0f32..=-0.2) * r,
        );
        let heading = rng.random_range(0.0f32..std::f32::consts::TAU);
        let direction = Vec3::new(
            heading.cos(),
            -rng.random_range(0.15f32..=0.4),
            heading.sin(),
        )
        .normalize();

        Self {
            start,
            direction,
            speed: rng.random_range(60.0f32..=140.0),
            trail_length: rng.random_range(8.0f32..=24.0),
        }
    }

    fn view(&self, slot: &EffectSlot<Self>, opacity: f32, _ctx: &EffectContext) -> Option<EntityView> {
        if opacity <= 0.0 {
            return None;
        }
        Some(EntityView {
            kind: Self::KIND,
            position: self.head(slot.age),
            orientation: Quat::from_rotation_arc(Vec3::NEG_Z, self.direction),
            visibility: opacity,
            intensity: opacity * (1.0 - 0.5 * slot.progress()),
        })
    }
}
