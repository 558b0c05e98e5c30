//! Columns of light rising from the ground.

use glam::{Quat, Vec3};
use rand::Rng;

use super::pool::EffectSlot;
use super::{EffectContext, EffectParams};
use crate::scene::view::{EntityKind, EntityView};

/// Ground-anchored light column. Its Y follows the terrain at the
/// folded position every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct LightPillar {
    /// Canonical world XZ; Y is unused.
    pub anchor: Vec3,
    pub radius: f32,
    pub height: f32,
    /// Pulse frequency in Hz.
    pub pulse_hz: f32,
}

impl EffectParams for LightPillar {
    const KIND: EntityKind = EntityKind::LightPillar;

    fn generate<R: Rng>(rng: &mut R, ctx: &EffectContext) -> Self {
        let r = ctx.streamer.config().visible_radius;
        // Somewhere in the forward half-disc
        let angle = rng.random_range(std::f32::consts::PI..std::f32::consts::TAU);
        let distance = rng.random_range(0.25f32..=0.9) * r;
        let local = Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance);

        Self {
            anchor: ctx.streamer.effective_world(local),
            radius: rng.random_range(2.0f32..=6.0),
            height: rng.random_range(60.0f32..=140.0),
            pulse_hz: rng.random_range(0.3f32..=1.2),
        }
    }

    fn view(&self, _slot: &EffectSlot<Self>, opacity: f32, ctx: &EffectContext) -> Option<EntityView> {
        if opacity <= 0.0 {
            return None;
        }
        let mut position = ctx.streamer.display_position(self.anchor);
        if !ctx.streamer.in_view(position) {
            return None;
        }
        let world = ctx.streamer.effective_world(position);
        position.y = ctx.terrain.height_at(world.x, world.z);

        let pulse = 0.8 + 0.2 * (ctx.elapsed * self.pulse_hz * std::f32::consts::TAU).sin();
        Some(EntityView {
            kind: Self::KIND,
            position,
            orientation: Quat::IDENTITY,
            visibility: opacity,
            intensity: opacity * pulse,
        })
    }
}
