//! Pointwise terrain elevation built from layered noise.
//!
//! The height function is pure: mesh vertices, decoration placement and
//! camera slope probes all call [`TerrainHeightField::height_at`] at
//! arbitrary unaligned coordinates and must agree on the result.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::biome::{BiomeClassifier, BiomeConfig};
use super::noise::{NoiseField, DEFAULT_SEED};
use crate::math::interp::smoothstep;

/// Anything that can answer "how high is the ground here".
pub trait HeightSampler {
    fn height_at(&self, x: f32, z: f32) -> f32;
}

/// Parameters controlling terrain generation
///
/// Amplitudes are fractions of `height_scale`; frequencies are in cycles
/// per world unit.
///
/// The seed is not part of the serialized form; worlds are seeded from the
/// top-level config seed through [`TerrainHeightField::reseed`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerrainParams {
    #[serde(skip)]
    pub seed: u32,
    pub height_scale: f32,  // Vertical scale of the combined layers

    // Domain warp
    pub warp_frequency: f32,
    pub warp_strength: f32, // World units of displacement
    pub warp_octaves: u32,

    // Base layers
    pub hills_frequency: f32,
    pub hills_amplitude: f32,
    pub hills_octaves: u32,
    pub detail_frequency: f32,
    pub detail_amplitude: f32,
    pub detail_octaves: u32,
    pub ridge_frequency: f32,
    pub ridge_amplitude: f32,
    pub ridge_octaves: u32,
    pub ridge_mask_frequency: f32,

    // Large-scale swell
    pub undulation_frequency: f32,
    pub undulation_amplitude: f32,

    // Depressions
    pub lake_frequency: f32,
    pub lake_threshold: f32, // Raw noise below this starts carving
    pub lake_falloff: f32,   // Noise distance to reach full depth
    pub lake_depth: f32,

    // Craters
    pub crater_cell_size: f32,
    pub crater_threshold: f32, // Cell hash above this holds a crater
    pub crater_min_radius: f32,
    pub crater_max_radius: f32,
    pub crater_depth: f32,
    pub crater_rim_height: f32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            height_scale: 24.0,

            warp_frequency: 0.003,
            warp_strength: 40.0,
            warp_octaves: 2,

            hills_frequency: 0.004,
            hills_amplitude: 1.0,
            hills_octaves: 5,
            detail_frequency: 0.03,
            detail_amplitude: 0.12,
            detail_octaves: 3,
            ridge_frequency: 0.007,
            ridge_amplitude: 0.7,
            ridge_octaves: 4,
            ridge_mask_frequency: 0.0012,

            undulation_frequency: 0.0006,
            undulation_amplitude: 0.8,

            lake_frequency: 0.0025,
            lake_threshold: -0.35,
            lake_falloff: 0.25,
            lake_depth: 0.6,

            crater_cell_size: 240.0,
            crater_threshold: 0.92,
            crater_min_radius: 12.0,
            crater_max_radius: 36.0,
            crater_depth: 0.5,
            crater_rim_height: 0.12,
        }
    }
}

/// A single circular crater resolved from the crater lattice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crater {
    pub center: Vec2,
    pub radius: f32,
}

// Hash salts for the crater lattice
const SALT_PRESENCE: u32 = 1;
const SALT_JITTER_X: u32 = 2;
const SALT_JITTER_Z: u32 = 3;
const SALT_RADIUS: u32 = 4;

/// Procedural terrain elevation with biome-specific shaping.
#[derive(Clone, Debug)]
pub struct TerrainHeightField {
    params: TerrainParams,
    noise: NoiseField,
    biomes: BiomeClassifier,
}

impl TerrainHeightField {
    /// Create a new height field from terrain and biome parameters
    pub fn new(params: TerrainParams, biome_config: BiomeConfig) -> Self {
        let noise = NoiseField::new(params.seed);
        let biomes = BiomeClassifier::new(params.seed, biome_config);
        Self { params, noise, biomes }
    }

    /// Rebuild every noise source for a new seed.
    pub fn reseed(&mut self, seed: u32) {
        self.params.seed = seed;
        self.noise.reseed(seed);
        self.biomes.reseed(seed);
    }

    /// Get terrain parameters
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    pub fn seed(&self) -> u32 {
        self.params.seed
    }

    /// Biome classifier sharing this field's seed.
    pub fn biomes(&self) -> &BiomeClassifier {
        &self.biomes
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Get terrain height at world position (x, z)
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let p = &self.params;
        let (wx, wz) = self.warp(x, z);

        let mut h = self.base_layers(wx, wz);

        h += self.noise.fbm(x * p.undulation_frequency - 311.0, z * p.undulation_frequency + 127.0, 1)
            * p.undulation_amplitude;

        h -= self.lake_carve(wx, wz);

        let mut height = h * p.height_scale;
        height += self.crater_offset(x, z);

        self.biomes.apply_modifiers(height, x, z, &self.noise)
    }

    /// Displace the sampling point with two independent low-octave fbm calls.
    fn warp(&self, x: f32, z: f32) -> (f32, f32) {
        let p = &self.params;
        let f = p.warp_frequency;
        let dx = self.noise.fbm(x * f + 31.7, z * f - 11.3, p.warp_octaves);
        let dz = self.noise.fbm(x * f - 47.2, z * f + 23.9, p.warp_octaves);
        (x + dx * p.warp_strength, z + dz * p.warp_strength)
    }

    /// Rolling hills, fine detail and masked ridges at warped coordinates.
    fn base_layers(&self, wx: f32, wz: f32) -> f32 {
        let p = &self.params;

        let hills = self.noise.fbm(wx * p.hills_frequency, wz * p.hills_frequency, p.hills_octaves)
            * p.hills_amplitude;

        let detail = self.noise.fbm(
            wx * p.detail_frequency + 5.3,
            wz * p.detail_frequency - 8.1,
            p.detail_octaves,
        ) * p.detail_amplitude;

        // Ridges only rise where the slow mask noise is high
        let mask = smoothstep(
            0.05,
            0.45,
            self.noise.fbm(wx * p.ridge_mask_frequency + 91.0, wz * p.ridge_mask_frequency, 2),
        );
        let ridges = self.noise.ridged_fbm(
            wx * p.ridge_frequency - 13.7,
            wz * p.ridge_frequency + 42.2,
            p.ridge_octaves,
        ) * p.ridge_amplitude
            * mask;

        hills + detail + ridges
    }

    /// Depth removed where the lake noise dips below its threshold.
    fn lake_carve(&self, wx: f32, wz: f32) -> f32 {
        let p = &self.params;
        if p.lake_depth <= 0.0 {
            return 0.0;
        }
        let n = self.noise.noise_2d(wx * p.lake_frequency + 203.5, wz * p.lake_frequency - 77.7);
        if n >= p.lake_threshold {
            return 0.0;
        }
        let t = ((p.lake_threshold - n) / p.lake_falloff.max(f32::EPSILON)).min(1.0);
        p.lake_depth * t * t
    }

    /// Crater owned by lattice cell `(ix, iz)`, if any.
    pub fn crater_in_cell(&self, ix: i32, iz: i32) -> Option<Crater> {
        let p = &self.params;
        if self.noise.hash_2d(ix, iz, SALT_PRESENCE) < p.crater_threshold {
            return None;
        }

        let cell = p.crater_cell_size;
        let radius = p.crater_min_radius
            + (p.crater_max_radius - p.crater_min_radius) * self.noise.hash_2d(ix, iz, SALT_RADIUS);
        // Keep the rim inside the cell so only neighbouring cells can overlap
        let margin = (radius * 1.3).min(cell * 0.5);
        let span = cell - 2.0 * margin;
        let cx = ix as f32 * cell + margin + span * self.noise.hash_2d(ix, iz, SALT_JITTER_X);
        let cz = iz as f32 * cell + margin + span * self.noise.hash_2d(ix, iz, SALT_JITTER_Z);

        Some(Crater {
            center: Vec2::new(cx, cz),
            radius,
        })
    }

    /// Bowl and rim contribution of nearby craters, in world units.
    fn crater_offset(&self, x: f32, z: f32) -> f32 {
        let p = &self.params;
        if p.crater_cell_size <= 0.0 || p.crater_threshold >= 1.0 {
            return 0.0;
        }

        let ix = (x / p.crater_cell_size).floor() as i32;
        let iz = (z / p.crater_cell_size).floor() as i32;
        let point = Vec2::new(x, z);
        let mut offset = 0.0;

        for dz in -1..=1 {
            for dx in -1..=1 {
                let Some(crater) = self.crater_in_cell(ix.wrapping_add(dx), iz.wrapping_add(dz)) else {
                    continue;
                };
                let d = point.distance(crater.center) / crater.radius;
                if d < 1.0 {
                    let bowl = 1.0 - d * d;
                    offset -= p.crater_depth * p.height_scale * bowl * bowl;
                }
                if (0.7..1.3).contains(&d) {
                    let r = (d - 1.0) / 0.3;
                    let rim = 1.0 - r * r;
                    offset += p.crater_rim_height * p.height_scale * rim * rim;
                }
            }
        }

        offset
    }
}

impl HeightSampler for TerrainHeightField {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        TerrainHeightField::height_at(self, x, z)
    }
}
