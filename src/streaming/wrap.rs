//! Endless-travel coordinate folding.
//!
//! The observer never moves through unbounded coordinates. Instead a
//! reference position advances and every world-anchored object is folded
//! into a window centred on it with [`wrap`]. Decorations and ground-hugging
//! effects share that fold and window, and ground heights for them and for
//! the terrain grid are sampled at `reference + display offset`.
//!
//! The reference is held in `f64` so per-frame steps keep registering after
//! arbitrarily long travel.

use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;

/// Fold `canonical` into `[-window/2, window/2)` relative to `reference`.
///
/// Computes `((c - r) mod w + 1.5 w) mod w - w/2` with a modulus that never
/// returns a negative remainder. The difference is taken in `f64`.
///
/// Preconditions: `window > 0`, and `window` is more than twice the largest
/// distance anything moves relative to the reference between two frames.
/// Otherwise an object can jump across the fold in a single step.
#[inline]
pub fn wrap(canonical: f32, reference: f32, window: f32) -> f32 {
    fold(canonical as f64 - reference as f64, window)
}

/// Fold a canonical-minus-reference offset into `[-window/2, window/2)`.
#[inline]
fn fold(offset: f64, window: f32) -> f32 {
    let w = window as f64;
    let shifted = (offset + 0.5 * w).rem_euclid(w);
    let half = window * 0.5;
    let d = (shifted - 0.5 * w) as f32;
    // Rounding to f32 can land exactly on the open upper edge
    if d >= half { -half } else { d }
}

/// Streaming window configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamerConfig {
    /// Side length of the square fold window, in world units.
    pub window: f32,
    /// Furthest distance at which anything is drawn or interacts.
    pub visible_radius: f32,
    /// Base travel speed in world units per second.
    pub base_speed: f32,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            window: 800.0,
            visible_radius: 320.0,
            base_speed: 14.0,
        }
    }
}

impl StreamerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.window.is_finite() || self.window <= 0.0 {
            return Err(Error::invalid(format!("wrap window must be positive, got {}", self.window)));
        }
        if self.visible_radius < 0.0 || self.window <= 2.0 * self.visible_radius {
            return Err(Error::invalid(format!(
                "wrap window {} must exceed twice the visible radius {}",
                self.window, self.visible_radius
            )));
        }
        if !self.base_speed.is_finite() || self.base_speed < 0.0 {
            return Err(Error::invalid(format!("base speed must be >= 0, got {}", self.base_speed)));
        }
        Ok(())
    }
}

/// Owns the moving reference position.
#[derive(Clone, Debug)]
pub struct WorldStreamer {
    config: StreamerConfig,
    reference: DVec3,
}

impl WorldStreamer {
    pub fn new(config: StreamerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            reference: DVec3::ZERO,
        })
    }

    pub fn config(&self) -> &StreamerConfig {
        &self.config
    }

    pub fn window(&self) -> f32 {
        self.config.window
    }

    /// Current reference position, rounded to `f32` for sampling. Y is always zero.
    pub fn reference(&self) -> Vec3 {
        self.reference.as_vec3()
    }

    /// Full-precision reference position.
    pub fn reference_f64(&self) -> DVec3 {
        self.reference
    }

    /// Move the reference `speed * dt` units along the travel direction (-Z).
    pub fn advance(&mut self, speed: f32, dt: f32) {
        self.reference.z -= speed as f64 * dt as f64;
    }

    /// Return the reference to the origin (world regeneration).
    pub fn reset(&mut self) {
        self.reference = DVec3::ZERO;
    }

    /// Distance travelled since the last reset.
    pub fn distance_travelled(&self) -> f64 {
        -self.reference.z
    }

    /// Fold a canonical XZ position into the window. Y passes through.
    pub fn display_position(&self, canonical: Vec3) -> Vec3 {
        let w = self.config.window;
        Vec3::new(
            fold(canonical.x as f64 - self.reference.x, w),
            canonical.y,
            fold(canonical.z as f64 - self.reference.z, w),
        )
    }

    /// World location currently shown at a display (observer-relative) position.
    pub fn effective_world(&self, display: Vec3) -> Vec3 {
        Vec3::new(
            (self.reference.x + display.x as f64) as f32,
            display.y,
            (self.reference.z + display.z as f64) as f32,
        )
    }

    /// Whether a display position lies within the visible radius.
    pub fn in_view(&self, display: Vec3) -> bool {
        display.x * display.x + display.z * display.z
            <= self.config.visible_radius * self.config.visible_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_example() {
        assert_eq!(wrap(250.0, 0.0, 200.0), 50.0);
    }

    #[test]
    fn test_wrap_range() {
        let windows = [1.0, 7.5, 200.0, 800.0, 12345.0];
        let values = [
            -1e6, -12345.678, -200.0, -100.0, -1e-7, 0.0, 1e-7, 99.999, 100.0, 250.0, 5e5, 3.3e6,
        ];
        for w in windows {
            for &c in &values {
                for &r in &values {
                    let d = wrap(c, r, w);
                    assert!(
                        d >= -w / 2.0 && d < w / 2.0,
                        "wrap({}, {}, {}) = {} outside window",
                        c, r, w, d
                    );
                }
            }
        }
    }

    #[test]
    fn test_wrap_is_periodic_and_follows_reference() {
        let w = 200.0;
        assert_eq!(wrap(10.0, 0.0, w), 10.0);
        assert_eq!(wrap(10.0 + w, 0.0, w), 10.0);
        assert_eq!(wrap(10.0, 30.0, w), -20.0);
        // Half-window boundary maps to the lower edge
        assert_eq!(wrap(100.0, 0.0, w), -100.0);
        assert_eq!(wrap(-100.0, 0.0, w), -100.0);
    }

    #[test]
    fn test_wrap_moves_continuously() {
        // Small reference steps shift the display position by the same step
        let w = 400.0;
        let mut r = 0.0f32;
        let mut prev = wrap(37.0, r, w);
        for _ in 0..1000 {
            r -= 1.0;
            let d = wrap(37.0, r, w);
            let delta = d - prev;
            assert!((delta - 1.0).abs() < 1e-3 || (delta + w - 1.0).abs() < 1e-3);
            prev = d;
        }
    }

    #[test]
    fn test_advance_and_reset() {
        let mut streamer = WorldStreamer::new(StreamerConfig::default()).unwrap();
        streamer.advance(10.0, 0.5);
        streamer.advance(10.0, 0.5);
        assert_eq!(streamer.reference(), Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(streamer.distance_travelled(), 10.0);
        streamer.reset();
        assert_eq!(streamer.reference(), Vec3::ZERO);
    }

    #[test]
    fn test_display_position_and_effective_world() {
        let mut streamer = WorldStreamer::new(StreamerConfig {
            window: 200.0,
            visible_radius: 90.0,
            base_speed: 1.0,
        })
        .unwrap();
        streamer.advance(1.0, 130.0);

        let canonical = Vec3::new(250.0, 3.0, 0.0);
        let display = streamer.display_position(canonical);
        assert_eq!(display, Vec3::new(50.0, 3.0, -70.0));

        let world = streamer.effective_world(display);
        assert_eq!(world, Vec3::new(50.0, 3.0, -200.0));
        // The world location differs from the canonical one by whole windows
        assert_eq!((world.x - canonical.x).rem_euclid(200.0), 0.0);
        assert_eq!((world.z - canonical.z).rem_euclid(200.0), 0.0);
    }

    #[test]
    fn test_advance_keeps_moving_far_from_origin() {
        let mut streamer = WorldStreamer::new(StreamerConfig::default()).unwrap();
        streamer.advance(1.0, 2.2e6);
        let start = streamer.distance_travelled();
        for _ in 0..1440 {
            streamer.advance(14.0, 1.0 / 144.0);
        }
        let moved = streamer.distance_travelled() - start;
        assert!((moved - 140.0).abs() < 1e-3, "moved {}", moved);
    }

    #[test]
    fn test_display_position_tracks_small_steps_far_from_origin() {
        let mut streamer = WorldStreamer::new(StreamerConfig::default()).unwrap();
        streamer.advance(1.0, 5.0e7);
        let before = streamer.display_position(Vec3::new(0.0, 0.0, 10.0));
        streamer.advance(14.0, 1.0 / 60.0);
        let after = streamer.display_position(Vec3::new(0.0, 0.0, 10.0));
        let step = after.z - before.z;
        assert!((step - 14.0 / 60.0).abs() < 1e-3, "step {}", step);
    }

    #[test]
    fn test_in_view() {
        let streamer = WorldStreamer::new(StreamerConfig::default()).unwrap();
        assert!(streamer.in_view(Vec3::new(100.0, 50.0, 100.0)));
        assert!(!streamer.in_view(Vec3::new(300.0, 0.0, 300.0)));
    }

    #[test]
    fn test_config_validation() {
        assert!(StreamerConfig::default().validate().is_ok());
        let bad_window = StreamerConfig { window: 0.0, ..Default::default() };
        assert!(WorldStreamer::new(bad_window).is_err());
        let too_small = StreamerConfig { window: 500.0, visible_radius: 260.0, ..Default::default() };
        assert!(matches!(too_small.validate(), Err(Error::InvalidConfig(_))));
        let nan = StreamerConfig { window: f32::NAN, ..Default::default() };
        assert!(nan.validate().is_err());
    }
}
