//! Biome cycle along the travel axis with noise-perturbed boundaries.
//!
//! A linear ramp in world Z walks through the biome list once every
//! `cycle_length` units; two higher-frequency noise terms bend the
//! boundaries so they never read as straight lines. The fractional part of
//! the scaled signal is the blend weight toward the next biome.

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::math::interp::{circular_distance, positive_mod, smoothstep, Lerp};
use crate::terrain::noise::NoiseField;

/// Shape adjustment applied to base elevation inside a biome.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerrainModifier {
    /// Leave elevation unchanged.
    None,
    /// Pull elevation toward zero by `strength` (0 = none, 1 = flat).
    Flatten { strength: f32 },
    /// Multiply elevation.
    Exaggerate { factor: f32 },
    /// Quantize elevation into soft-edged steps of height `step`.
    Terrace { step: f32 },
    /// Cut a meandering channel where low-frequency noise crosses zero.
    Canyon { frequency: f32, width: f32, depth: f32 },
}

impl TerrainModifier {
    /// Apply the modifier to a base elevation at world `(x, z)`.
    pub fn apply(&self, height: f32, x: f32, z: f32, noise: &NoiseField) -> f32 {
        match *self {
            TerrainModifier::None => height,
            TerrainModifier::Flatten { strength } => height * (1.0 - strength.clamp(0.0, 1.0)),
            TerrainModifier::Exaggerate { factor } => height * factor,
            TerrainModifier::Terrace { step } => {
                if step <= 0.0 {
                    return height;
                }
                let k = height / step;
                let base = k.floor();
                (base + smoothstep(0.35, 0.65, k - base)) * step
            }
            TerrainModifier::Canyon { frequency, width, depth } => {
                if width <= 0.0 {
                    return height;
                }
                let d = noise.fbm(x * frequency + 71.3, z * frequency - 29.7, 2).abs();
                if d >= width {
                    return height;
                }
                let t = 1.0 - d / width;
                height - depth * t * t
            }
        }
    }
}

/// Immutable biome descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Biome {
    pub name: String,
    /// Linear RGB at the lowest elevations.
    pub low_color: [f32; 3],
    /// Linear RGB at mid elevations.
    pub mid_color: [f32; 3],
    /// Linear RGB at the highest elevations.
    pub high_color: [f32; 3],
    pub modifier: TerrainModifier,
}

impl Biome {
    pub fn new(
        name: &str,
        low_color: [f32; 3],
        mid_color: [f32; 3],
        high_color: [f32; 3],
        modifier: TerrainModifier,
    ) -> Self {
        Self {
            name: name.to_string(),
            low_color,
            mid_color,
            high_color,
            modifier,
        }
    }

    /// Colour ramp sample for a normalised elevation in `[0, 1]`.
    pub fn color_at(&self, elevation_t: f32) -> [f32; 3] {
        let t = elevation_t.clamp(0.0, 1.0);
        if t < 0.5 {
            self.low_color.lerp(&self.mid_color, t * 2.0)
        } else {
            self.mid_color.lerp(&self.high_color, (t - 0.5) * 2.0)
        }
    }
}

/// The ordered biome cycle plus classifier tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeConfig {
    pub biomes: Vec<Biome>,
    /// World-Z distance covering one full pass through every biome.
    pub cycle_length: f32,
    /// Frequency and amplitude (in cycle units) of the broad boundary wobble.
    pub perturb_frequency: f32,
    pub perturb_amplitude: f32,
    /// Frequency and amplitude of the fine boundary wobble.
    pub detail_frequency: f32,
    pub detail_amplitude: f32,
    /// How far past its biome edge (in biome units) a decoration stays visible.
    pub visibility_tolerance: f32,
}

impl Default for BiomeConfig {
    fn default() -> Self {
        Self {
            biomes: default_biomes(),
            cycle_length: 6000.0,
            perturb_frequency: 0.0015,
            perturb_amplitude: 0.04,
            detail_frequency: 0.006,
            detail_amplitude: 0.015,
            visibility_tolerance: 0.15,
        }
    }
}

impl BiomeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.biomes.is_empty() {
            return Err(Error::invalid("biome list is empty"));
        }
        if !(self.cycle_length > 0.0) || !self.cycle_length.is_finite() {
            return Err(Error::invalid(format!(
                "biome cycle length must be positive, got {}",
                self.cycle_length
            )));
        }
        if self.visibility_tolerance < 0.0 {
            return Err(Error::invalid("biome visibility tolerance must be >= 0"));
        }
        Ok(())
    }
}

fn default_biomes() -> Vec<Biome> {
    vec![
        Biome::new(
            "meadow",
            [0.10, 0.22, 0.08],
            [0.25, 0.45, 0.15],
            [0.60, 0.65, 0.55],
            TerrainModifier::None,
        ),
        Biome::new(
            "dunes",
            [0.55, 0.42, 0.25],
            [0.80, 0.65, 0.40],
            [0.95, 0.85, 0.65],
            TerrainModifier::Flatten { strength: 0.45 },
        ),
        Biome::new(
            "mesa",
            [0.45, 0.20, 0.10],
            [0.70, 0.35, 0.18],
            [0.85, 0.60, 0.40],
            TerrainModifier::Terrace { step: 6.0 },
        ),
        Biome::new(
            "badlands",
            [0.25, 0.20, 0.22],
            [0.45, 0.38, 0.40],
            [0.70, 0.65, 0.68],
            TerrainModifier::Canyon { frequency: 0.004, width: 0.08, depth: 18.0 },
        ),
        Biome::new(
            "highlands",
            [0.18, 0.20, 0.28],
            [0.40, 0.45, 0.55],
            [0.92, 0.94, 0.98],
            TerrainModifier::Exaggerate { factor: 1.6 },
        ),
    ]
}

/// Result of classifying one position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomeSample {
    /// Current biome, always in `[0, count)`.
    pub index: usize,
    /// Next biome in the cycle.
    pub next: usize,
    /// Blend toward `next`, in `[0, 1)`.
    pub blend: f32,
    /// Number of biomes in the cycle.
    pub count: usize,
}

impl BiomeSample {
    /// `(biome, weight)` pairs. Weights sum to 1.
    pub fn weights(&self) -> [(usize, f32); 2] {
        [(self.index, 1.0 - self.blend), (self.next, self.blend)]
    }

    /// Continuous position on the cycle, in `[0, count)`.
    pub fn position(&self) -> f32 {
        self.index as f32 + self.blend
    }

    /// Whether this sample lies within `tolerance` biome units of `target`,
    /// measured around the cycle.
    pub fn matches(&self, target: usize, tolerance: f32) -> bool {
        if self.count == 0 {
            return false;
        }
        let centre = (target % self.count) as f32 + 0.5;
        circular_distance(self.position(), centre, self.count as f32) <= 0.5 + tolerance
    }
}

/// Maps world positions to biomes.
#[derive(Clone, Debug)]
pub struct BiomeClassifier {
    noise: NoiseField,
    config: BiomeConfig,
}

/// Offset that decorrelates the biome noise from the terrain noise.
const BIOME_SEED_OFFSET: u32 = 1000;

impl BiomeClassifier {
    /// Create a classifier for the given world seed.
    pub fn new(seed: u32, config: BiomeConfig) -> Self {
        Self {
            noise: NoiseField::new(seed.wrapping_add(BIOME_SEED_OFFSET)),
            config,
        }
    }

    pub fn reseed(&mut self, seed: u32) {
        self.noise.reseed(seed.wrapping_add(BIOME_SEED_OFFSET));
    }

    pub fn config(&self) -> &BiomeConfig {
        &self.config
    }

    pub fn biome_count(&self) -> usize {
        self.config.biomes.len()
    }

    /// Biome descriptor by index (taken modulo the biome count).
    ///
    /// Panics if the biome list is empty; [`BiomeConfig::validate`] rejects that.
    pub fn biome(&self, index: usize) -> &Biome {
        &self.config.biomes[index % self.config.biomes.len()]
    }

    /// Raw classification signal, one unit per full cycle.
    pub fn signal(&self, x: f32, z: f32) -> f32 {
        let c = &self.config;
        let broad = self.noise.noise_2d(x * c.perturb_frequency, z * c.perturb_frequency);
        let fine = self.noise.noise_2d(
            x * c.detail_frequency + 17.3,
            z * c.detail_frequency - 9.1,
        );
        z / c.cycle_length + broad * c.perturb_amplitude + fine * c.detail_amplitude
    }

    /// Classify world position `(x, z)`.
    pub fn biome_at(&self, x: f32, z: f32) -> BiomeSample {
        let count = self.biome_count().max(1);
        let scaled = positive_mod(self.signal(x, z), 1.0) * count as f32;
        let floor = scaled.floor();
        let index = (floor as usize) % count;
        let blend = (scaled - floor).clamp(0.0, 1.0);
        let blend = if blend >= 1.0 { 0.0 } else { blend };

        BiomeSample {
            index,
            next: (index + 1) % count,
            blend,
            count,
        }
    }

    /// Whether a decoration bound to `target` should show at world `(x, z)`.
    pub fn is_visible_for(&self, target: usize, x: f32, z: f32) -> bool {
        self.biome_at(x, z).matches(target, self.config.visibility_tolerance)
    }

    /// Surface colour at a position, interpolated by elevation and then
    /// blended toward the next biome.
    pub fn surface_color(&self, x: f32, z: f32, elevation: f32, height_scale: f32) -> [f32; 3] {
        if self.config.biomes.is_empty() {
            return [0.5; 3];
        }
        let sample = self.biome_at(x, z);
        let t = if height_scale > 0.0 {
            (elevation / height_scale) * 0.5 + 0.5
        } else {
            0.5
        };
        let a = self.biome(sample.index).color_at(t);
        let b = self.biome(sample.next).color_at(t);
        a.lerp(&b, sample.blend)
    }

    /// Blend the two neighbouring biome modifiers by the sample weights.
    pub fn apply_modifiers(&self, height: f32, x: f32, z: f32, terrain_noise: &NoiseField) -> f32 {
        if self.config.biomes.is_empty() {
            return height;
        }
        let sample = self.biome_at(x, z);
        let a = self.biome(sample.index).modifier.apply(height, x, z, terrain_noise);
        if sample.blend == 0.0 {
            return a;
        }
        let b = self.biome(sample.next).modifier.apply(height, x, z, terrain_noise);
        a.lerp(&b, sample.blend)
    }
}
