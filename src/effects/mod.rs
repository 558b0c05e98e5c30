//! Ephemeral visual effects backed by fixed-capacity pools.
//!
//! Each effect category is an [`EffectChannel`]: a pool of slots, a
//! random spawn trial and a lifecycle curve. Nothing here allocates after
//! construction except the per-bolt lightning path.

pub mod lifecycle;
pub mod pool;
pub mod spawner;
pub mod shooting_star;
pub mod lightning;
pub mod light_pillar;

pub use lifecycle::LifecycleCurve;
pub use pool::{EffectSlot, EntityPool};
pub use spawner::SpawnTrial;
pub use shooting_star::ShootingStar;
pub use lightning::Lightning;
pub use light_pillar::LightPillar;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::audio::{AudioBand, AudioResponse};
use crate::core::error::Error;
use crate::core::types::Result;
use crate::scene::view::{EntityKind, EntityView};
use crate::streaming::WorldStreamer;
use crate::terrain::HeightSampler;

/// World state an effect may read while spawning or rendering.
pub struct EffectContext<'a> {
    pub streamer: &'a WorldStreamer,
    pub terrain: &'a dyn HeightSampler,
    /// Seconds since the world was created.
    pub elapsed: f32,
}

/// Per-instance parameters of one effect category.
pub trait EffectParams: Sized {
    const KIND: EntityKind;

    /// Draw a fresh instance.
    fn generate<R: Rng>(rng: &mut R, ctx: &EffectContext) -> Self;

    /// Render snapshot, or `None` when nothing should be drawn.
    fn view(&self, slot: &EffectSlot<Self>, opacity: f32, ctx: &EffectContext) -> Option<EntityView>;
}

/// Tuning for one effect category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectChannelConfig {
    pub capacity: usize,
    /// Expected spawns per second before audio boost.
    pub rate: f32,
    pub min_lifetime: f32,
    pub max_lifetime: f32,
    pub curve: LifecycleCurve,
    /// Audio band that boosts the spawn rate.
    pub band: AudioBand,
}

impl Default for EffectChannelConfig {
    fn default() -> Self {
        Self {
            capacity: 8,
            rate: 0.5,
            min_lifetime: 1.0,
            max_lifetime: 2.0,
            curve: LifecycleCurve::default(),
            band: AudioBand::High,
        }
    }
}

impl EffectChannelConfig {
    pub fn validate(&self, name: &str) -> Result<()> {
        if !self.rate.is_finite() || self.rate < 0.0 {
            return Err(Error::invalid(format!("{}: spawn rate must be >= 0, got {}", name, self.rate)));
        }
        if !(self.min_lifetime > 0.0) || self.max_lifetime < self.min_lifetime {
            return Err(Error::invalid(format!(
                "{}: lifetime range {}..{} is invalid",
                name, self.min_lifetime, self.max_lifetime
            )));
        }
        Ok(())
    }
}

/// Effect tuning for every category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub shooting_stars: EffectChannelConfig,
    pub lightning: EffectChannelConfig,
    pub light_pillars: EffectChannelConfig,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            shooting_stars: EffectChannelConfig {
                capacity: 12,
                rate: 0.6,
                min_lifetime: 1.2,
                max_lifetime: 2.5,
                curve: LifecycleCurve { intro_end: 0.08, fade_start: 0.6, ..Default::default() },
                band: AudioBand::High,
            },
            lightning: EffectChannelConfig {
                capacity: 4,
                rate: 0.15,
                min_lifetime: 0.35,
                max_lifetime: 0.8,
                curve: LifecycleCurve {
                    intro_end: 0.3,
                    fade_start: 0.55,
                    flicker_hz: 18.0,
                    flicker_depth: 0.9,
                },
                band: AudioBand::Low,
            },
            light_pillars: EffectChannelConfig {
                capacity: 6,
                rate: 0.08,
                min_lifetime: 6.0,
                max_lifetime: 12.0,
                curve: LifecycleCurve {
                    intro_end: 0.2,
                    fade_start: 0.7,
                    flicker_hz: 4.0,
                    flicker_depth: 0.3,
                },
                band: AudioBand::Mid,
            },
        }
    }
}

impl EffectsConfig {
    pub fn validate(&self) -> Result<()> {
        self.shooting_stars.validate("shooting_stars")?;
        self.lightning.validate("lightning")?;
        self.light_pillars.validate("light_pillars")
    }
}

/// One effect category: pool + spawn trial + parameter generator.
pub struct EffectChannel<P: EffectParams> {
    config: EffectChannelConfig,
    pool: EntityPool<P>,
    trial: SpawnTrial,
}

impl<P: EffectParams> EffectChannel<P> {
    pub fn new(config: EffectChannelConfig) -> Self {
        let pool = EntityPool::new(config.capacity, config.curve);
        let trial = SpawnTrial::new(config.rate);
        Self { config, pool, trial }
    }

    /// Age and retire active effects, then roll for a new one.
    pub fn update<R: Rng>(&mut self, rng: &mut R, dt: f32, audio: &AudioResponse, ctx: &EffectContext) {
        self.pool.update(dt);

        let multiplier = audio.spawn_multiplier(self.config.band);
        if self.trial.roll(rng, dt, multiplier) {
            self.spawn(rng, ctx);
        }
    }

    /// Spawn one instance immediately. `None` when the pool is full.
    pub fn spawn<R: Rng>(&mut self, rng: &mut R, ctx: &EffectContext) -> Option<usize> {
        if self.pool.is_full() {
            log::trace!("{:?} pool full, spawn skipped", P::KIND);
            return None;
        }
        let min = self.config.min_lifetime;
        let lifetime = rng.random_range(min..=self.config.max_lifetime.max(min));
        let params = P::generate(rng, ctx);
        self.pool.spawn(lifetime, params)
    }

    /// Append views of every visible active effect.
    pub fn collect_views(&self, ctx: &EffectContext, out: &mut Vec<EntityView>) {
        for (index, slot) in self.pool.iter_active() {
            let Some(params) = slot.params.as_ref() else {
                continue;
            };
            let opacity = self.pool.opacity(index);
            if let Some(view) = params.view(slot, opacity, ctx) {
                out.push(view);
            }
        }
    }

    pub fn clear(&mut self) {
        self.pool.clear();
    }

    pub fn pool(&self) -> &EntityPool<P> {
        &self.pool
    }

    pub fn config(&self) -> &EffectChannelConfig {
        &self.config
    }
}

/// All effect categories updated together each frame.
pub struct EffectSystem {
    pub shooting_stars: EffectChannel<ShootingStar>,
    pub lightning: EffectChannel<Lightning>,
    pub light_pillars: EffectChannel<LightPillar>,
}

impl EffectSystem {
    pub fn new(config: &EffectsConfig) -> Self {
        Self {
            shooting_stars: EffectChannel::new(config.shooting_stars.clone()),
            lightning: EffectChannel::new(config.lightning.clone()),
            light_pillars: EffectChannel::new(config.light_pillars.clone()),
        }
    }

    pub fn update<R: Rng>(&mut self, rng: &mut R, dt: f32, audio: &AudioResponse, ctx: &EffectContext) {
        self.shooting_stars.update(rng, dt, audio, ctx);
        self.lightning.update(rng, dt, audio, ctx);
        self.light_pillars.update(rng, dt, audio, ctx);
    }

    pub fn collect_views(&self, ctx: &EffectContext, out: &mut Vec<EntityView>) {
        self.shooting_stars.collect_views(ctx, out);
        self.lightning.collect_views(ctx, out);
        self.light_pillars.collect_views(ctx, out);
    }

    /// Force every slot in every category inactive.
    pub fn clear(&mut self) {
        self.shooting_stars.clear();
        self.lightning.clear();
        self.light_pillars.clear();
    }

    pub fn active_count(&self) -> usize {
        self.shooting_stars.pool().active_count()
            + self.lightning.pool().active_count()
            + self.light_pillars.pool().active_count()
    }

    pub fn capacity(&self) -> usize {
        self.shooting_stars.pool().capacity()
            + self.lightning.pool().capacity()
            + self.light_pillars.pool().capacity()
    }
}
