//! Per-frame random spawn trials.

use rand::Rng;

/// Poisson-style trigger: on average `rate` spawns per second, independent
/// of frame rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnTrial {
    pub rate: f32,
}

impl SpawnTrial {
    pub fn new(rate: f32) -> Self {
        Self { rate: rate.max(0.0) }
    }

    /// Probability that at least one spawn falls inside a `dt` step with the
    /// rate scaled by `multiplier`.
    pub fn probability(&self, dt: f32, multiplier: f32) -> f32 {
        let lambda = (self.rate * multiplier * dt).max(0.0);
        1.0 - (-lambda).exp()
    }

    /// Roll once for this frame.
    pub fn roll<R: Rng>(&self, rng: &mut R, dt: f32, multiplier: f32) -> bool {
        let p = self.probability(dt, multiplier);
        p > 0.0 && rng.random::<f32>() < p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_probability_bounds() {
        let trial = SpawnTrial::new(2.0);
        assert_eq!(trial.probability(0.0, 1.0), 0.0);
        let p = trial.probability(1.0 / 60.0, 1.0);
        assert!(p > 0.03 && p < 0.034);
        assert!(trial.probability(100.0, 1.0) <= 1.0);
        assert_eq!(SpawnTrial::new(-3.0).rate, 0.0);
    }

    #[test]
    fn test_zero_rate_never_fires() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let trial = SpawnTrial::new(0.0);
        assert!((0..10_000).all(|_| !trial.roll(&mut rng, 0.016, 5.0)));
    }

    #[test]
    fn test_expected_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let trial = SpawnTrial::new(3.0);
        let dt = 1.0 / 60.0;
        let frames = 60 * 200;
        let hits = (0..frames).filter(|_| trial.roll(&mut rng, dt, 1.0)).count();
        // ~600 expected over 200 simulated seconds
        assert!(hits > 500 && hits < 700, "got {} spawns", hits);
    }

    #[test]
    fn test_deterministic_with_same_seed() {
        let trial = SpawnTrial::new(1.5);
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..500).map(|_| trial.roll(&mut rng, 0.02, 1.0)).collect::<Vec<_>>()
        };
        assert_eq!(run(7), run(7));
    }
}
