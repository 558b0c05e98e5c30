//! Interpolation and smoothing helpers shared by terrain, effects and camera.

// ---------------------------------------------------------------------------
// Lerp trait
// ---------------------------------------------------------------------------

/// Trait for types that can be linearly interpolated.
pub trait Lerp: Clone {
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for [f32; 3] {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        [
            self[0] + (other[0] - self[0]) * t,
            self[1] + (other[1] - self[1]) * t,
            self[2] + (other[2] - self[2]) * t,
        ]
    }
}

// ---------------------------------------------------------------------------
// Scalar helpers
// ---------------------------------------------------------------------------

/// Hermite smoothstep between `edge0` and `edge1`, returning `[0, 1]`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 == edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Move `current` toward `target` by the fraction `min(1, rate * dt)`.
///
/// Converges at the same speed regardless of how a time span is split into
/// frames, as long as `rate * dt` stays well below 1.
#[inline]
pub fn approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let k = (rate * dt).clamp(0.0, 1.0);
    current + (target - current) * k
}

/// Remainder of `value / modulus` that always lies in `[0, modulus)`.
///
/// `f32::rem_euclid` can round up to exactly `modulus` for tiny negative
/// inputs; that case folds back to zero.
#[inline]
pub fn positive_mod(value: f32, modulus: f32) -> f32 {
    let r = value.rem_euclid(modulus);
    if r >= modulus { 0.0 } else { r }
}

/// Shortest distance between two positions on a cycle of length `period`.
#[inline]
pub fn circular_distance(a: f32, b: f32, period: f32) -> f32 {
    let d = positive_mod(a - b, period);
    d.min(period - d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_scalar_and_color() {
        assert_eq!(2.0f32.lerp(&4.0, 0.5), 3.0);
        let c = [0.0, 0.5, 1.0].lerp(&[1.0, 0.5, 0.0], 0.25);
        assert!((c[0] - 0.25).abs() < 1e-6);
        assert!((c[1] - 0.5).abs() < 1e-6);
        assert!((c[2] - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
        assert_eq!(smoothstep(1.0, 1.0, 0.5), 0.0);
    }

    #[test]
    fn test_approach_never_overshoots() {
        assert_eq!(approach(0.0, 10.0, 100.0, 1.0), 10.0);
        let v = approach(0.0, 10.0, 2.0, 0.1);
        assert!((v - 2.0).abs() < 1e-6);
        assert_eq!(approach(5.0, 10.0, 1.0, 0.0), 5.0);
    }

    #[test]
    fn test_positive_mod_range() {
        assert_eq!(positive_mod(-1.0, 4.0), 3.0);
        assert_eq!(positive_mod(9.0, 4.0), 1.0);
        let tiny = positive_mod(-1e-9, 1.0);
        assert!((0.0..1.0).contains(&tiny));
    }

    #[test]
    fn test_circular_distance_wraps() {
        assert!((circular_distance(0.2, 4.8, 5.0) - 0.4).abs() < 1e-5);
        assert!((circular_distance(1.0, 3.0, 5.0) - 2.0).abs() < 1e-5);
        assert_eq!(circular_distance(2.0, 2.0, 5.0), 0.0);
    }
}
