//! Opacity over an effect's life: flickering intro, steady body, fade-out.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

/// Phase thresholds are fractions of the lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleCurve {
    /// End of the intro ramp.
    pub intro_end: f32,
    /// Start of the fade-out.
    pub fade_start: f32,
    /// Flicker frequency during the intro, in Hz.
    pub flicker_hz: f32,
    /// Flicker depth in `[0, 1]`; 0 disables flicker.
    pub flicker_depth: f32,
}

impl Default for LifecycleCurve {
    fn default() -> Self {
        Self {
            intro_end: 0.1,
            fade_start: 0.7,
            flicker_hz: 0.0,
            flicker_depth: 0.0,
        }
    }
}

impl LifecycleCurve {
    /// Opacity in `[0, 1]` at `age` for an effect living `lifetime` seconds.
    ///
    /// Zero at birth and from `lifetime` on; never increases once the
    /// fade-out has begun.
    pub fn opacity(&self, age: f32, lifetime: f32) -> f32 {
        if lifetime <= 0.0 || age <= 0.0 || age >= lifetime {
            return 0.0;
        }

        let progress = age / lifetime;
        let intro_end = self.intro_end.clamp(0.0, 1.0);
        let fade_start = self.fade_start.clamp(intro_end, 1.0);

        if progress < intro_end {
            let ramp = progress / intro_end;
            let depth = self.flicker_depth.clamp(0.0, 1.0);
            let flicker = 1.0 - depth * (0.5 + 0.5 * (age * self.flicker_hz * TAU).sin());
            (ramp * flicker).clamp(0.0, 1.0)
        } else if progress < fade_start {
            1.0
        } else {
            ((1.0 - progress) / (1.0 - fade_start).max(f32::EPSILON)).clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flickery() -> LifecycleCurve {
        LifecycleCurve {
            intro_end: 0.2,
            fade_start: 0.6,
            flicker_hz: 23.0,
            flicker_depth: 0.8,
        }
    }

    #[test]
    fn test_zero_at_birth_and_death() {
        let curve = flickery();
        assert_eq!(curve.opacity(0.0, 2.0), 0.0);
        assert!(curve.opacity(1e-6, 2.0) < 1e-4);
        assert_eq!(curve.opacity(2.0, 2.0), 0.0);
        assert_eq!(curve.opacity(3.5, 2.0), 0.0);
    }

    #[test]
    fn test_bounded_everywhere() {
        for curve in [LifecycleCurve::default(), flickery()] {
            for i in 0..=1000 {
                let age = i as f32 * 0.003;
                let o = curve.opacity(age, 2.5);
                assert!((0.0..=1.0).contains(&o), "opacity {} at age {}", o, age);
            }
        }
    }

    #[test]
    fn test_steady_phase_is_full() {
        let curve = flickery();
        assert_eq!(curve.opacity(0.8, 2.0), 1.0);
        assert_eq!(curve.opacity(1.1, 2.0), 1.0);
    }

    #[test]
    fn test_fade_is_non_increasing() {
        let curve = flickery();
        let lifetime = 3.0;
        let mut prev = f32::INFINITY;
        let mut age = lifetime * curve.fade_start;
        while age < lifetime + 0.1 {
            let o = curve.opacity(age, lifetime);
            assert!(o <= prev, "opacity rose from {} to {} at {}", prev, o, age);
            prev = o;
            age += 0.01;
        }
    }

    #[test]
    fn test_degenerate_curves() {
        let instant = LifecycleCurve { intro_end: 0.0, fade_start: 0.0, ..Default::default() };
        let o = instant.opacity(0.5, 1.0);
        assert!((o - 0.5).abs() < 1e-6);
        assert_eq!(LifecycleCurve::default().opacity(1.0, 0.0), 0.0);
    }
}
