//! Seeded scalar noise primitives: point noise, fractal sum and ridged sum.
//!
//! Every function here is a pure function of `(seed, inputs)`. Terrain mesh
//! vertices, decoration placement and camera probes all sample through these,
//! so identical arguments must give bit-identical results.

use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use noise::{NoiseFn, Perlin};

/// Perlin permutation table size; the gradient lattice repeats with this period.
const LATTICE_PERIOD: f64 = 256.0;

/// Seeded 2D noise source.
#[derive(Clone, Debug)]
pub struct NoiseField {
    seed: u32,
    perlin: Perlin,
}

impl NoiseField {
    /// Create a noise field for the given seed.
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            perlin: Perlin::new(seed),
        }
    }

    /// Seed this field was built from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Rebuild the permutation table for a new seed.
    pub fn reseed(&mut self, seed: u32) {
        *self = Self::new(seed);
    }

    /// Point noise in `[-1, 1]`.
    ///
    /// Defined for every input: coordinates are folded into the 256-cell
    /// lattice period before sampling, and non-finite input yields 0.
    #[inline]
    pub fn noise_2d(&self, x: f32, y: f32) -> f32 {
        if !x.is_finite() || !y.is_finite() {
            return 0.0;
        }
        let px = (x as f64).rem_euclid(LATTICE_PERIOD);
        let py = (y as f64).rem_euclid(LATTICE_PERIOD);
        let v = self.perlin.get([px, py]) as f32;
        v.clamp(-1.0, 1.0)
    }

    /// Fractal sum of `octaves` layers, amplitude halving and frequency
    /// doubling per layer, normalised by the total amplitude.
    ///
    /// Output stays in `[-1, 1]` for any octave count. Zero octaves yields 0.
    pub fn fbm(&self, x: f32, y: f32, octaves: u32) -> f32 {
        self.fractal_sum(x, y, octaves, |n| n)
    }

    /// Like [`fbm`](Self::fbm) but each layer is shaped by `(1 - |n|)^2`,
    /// turning zero crossings into sharp crests. Output is in `[0, 1]`.
    pub fn ridged_fbm(&self, x: f32, y: f32, octaves: u32) -> f32 {
        self.fractal_sum(x, y, octaves, |n| {
            let r = 1.0 - n.abs();
            r * r
        })
    }

    fn fractal_sum(&self, x: f32, y: f32, octaves: u32, shape: impl Fn(f32) -> f32) -> f32 {
        if octaves == 0 {
            return 0.0;
        }

        let mut sum = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut total_amplitude = 0.0;

        for _ in 0..octaves {
            sum += shape(self.noise_2d(x * frequency, y * frequency)) * amplitude;
            total_amplitude += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        sum / total_amplitude
    }

    /// Integer lattice hash producing a value in `[0, 1)`.
    ///
    /// `salt` separates independent uses of the same lattice (crater
    /// presence, jitter, radius).
    pub fn hash_2d(&self, ix: i32, iz: i32, salt: u32) -> f32 {
        let mut h = (ix as u32).wrapping_mul(374761393)
            .wrapping_add((iz as u32).wrapping_mul(668265263))
            .wrapping_add(self.seed.wrapping_mul(1274126177))
            .wrapping_add(salt.wrapping_mul(2246822519));
        h = (h ^ (h >> 13)).wrapping_mul(1103515245);
        h ^= h >> 16;
        (h >> 8) as f32 / (1u32 << 24) as f32
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Seed used when no configuration supplies one.
pub const DEFAULT_SEED: u32 = 12345;

/// Accept a user-supplied seed, replacing anything outside the `u32` range
/// with a clock-derived fallback.
pub fn coerce_seed(raw: i64) -> u32 {
    match u32::try_from(raw) {
        Ok(seed) => seed,
        Err(_) => {
            let seed = fallback_seed();
            log::warn!("Seed {} out of range, using generated seed {}", raw, seed);
            seed
        }
    }
}

/// Parse a seed from text, falling back to a generated seed on bad input.
pub fn parse_seed(text: &str) -> u32 {
    match text.trim().parse::<i64>() {
        Ok(raw) => coerce_seed(raw),
        Err(_) => {
            let seed = fallback_seed();
            log::warn!("Seed {:?} is not an integer, using generated seed {}", text, seed);
            seed
        }
    }
}

/// Generate a seed from the wall clock and the process-monotonic clock.
pub fn fallback_seed() -> u32 {
    static START: OnceLock<Instant> = OnceLock::new();
    let start = START.get_or_init(Instant::now);

    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let mono = start.elapsed().as_nanos() as u64;

    // splitmix64 finaliser
    let mut z = wall ^ mono.rotate_left(32) ^ 0x9E37_79B9_7F4A_7C15;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 32) as u32
}
