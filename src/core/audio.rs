//! Audio-reactive modifiers.
//!
//! The host supplies a normalised three-band envelope. The core only ever
//! uses it to scale motion and spawn parameters, and it smooths the bands
//! so a source that stops reporting decays instead of snapping to zero.

use serde::{Deserialize, Serialize};

use crate::math::interp::approach;

/// Normalised band levels in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioEnvelope {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

impl AudioEnvelope {
    /// Build an envelope, clamping each band into `[0, 1]`. NaN becomes 0.
    pub fn new(low: f32, mid: f32, high: f32) -> Self {
        Self {
            low: sanitize(low),
            mid: sanitize(mid),
            high: sanitize(high),
        }
    }

    pub fn band(&self, band: AudioBand) -> f32 {
        match band {
            AudioBand::Low => self.low,
            AudioBand::Mid => self.mid,
            AudioBand::High => self.high,
        }
    }
}

fn sanitize(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// One of the three envelope bands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioBand {
    Low,
    Mid,
    High,
}

/// Gains and smoothing for the audio response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Smoothing rate while a band is rising (1/s).
    pub attack_rate: f32,
    /// Smoothing rate while a band is falling or absent (1/s).
    pub release_rate: f32,
    /// Extra travel speed fraction at full low band.
    pub speed_gain: f32,
    /// Extra spawn rate fraction at full band.
    pub spawn_gain: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            attack_rate: 12.0,
            release_rate: 1.5,
            speed_gain: 0.8,
            spawn_gain: 3.0,
        }
    }
}

/// Smoothed band levels driving the multipliers.
#[derive(Clone, Debug, Default)]
pub struct AudioResponse {
    config: AudioConfig,
    level: AudioEnvelope,
}

impl AudioResponse {
    pub fn new(config: AudioConfig) -> Self {
        Self {
            config,
            level: AudioEnvelope::default(),
        }
    }

    /// Move each band toward the input, or toward zero when no input arrives.
    ///
    /// The input is re-clamped here since envelopes can be built or
    /// deserialized without going through [`AudioEnvelope::new`].
    pub fn update(&mut self, input: Option<AudioEnvelope>, dt: f32) {
        let target = input
            .map(|e| AudioEnvelope::new(e.low, e.mid, e.high))
            .unwrap_or_default();
        self.level = AudioEnvelope {
            low: self.smooth(self.level.low, target.low, dt),
            mid: self.smooth(self.level.mid, target.mid, dt),
            high: self.smooth(self.level.high, target.high, dt),
        };
    }

    fn smooth(&self, current: f32, target: f32, dt: f32) -> f32 {
        let rate = if target > current { self.config.attack_rate } else { self.config.release_rate };
        approach(current, target, rate, dt)
    }

    /// Current smoothed levels.
    pub fn level(&self) -> AudioEnvelope {
        self.level
    }

    /// Multiplier on travel speed, `>= 1`.
    pub fn speed_multiplier(&self) -> f32 {
        1.0 + self.level.low * self.config.speed_gain
    }

    /// Multiplier on an effect category's spawn rate, `>= 1`.
    pub fn spawn_multiplier(&self, band: AudioBand) -> f32 {
        1.0 + self.level.band(band) * self.config.spawn_gain
    }

    /// Drop all accumulated boost.
    pub fn reset(&mut self) {
        self.level = AudioEnvelope::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_clamps() {
        let env = AudioEnvelope::new(-1.0, 2.0, f32::NAN);
        assert_eq!(env, AudioEnvelope { low: 0.0, mid: 1.0, high: 0.0 });
    }

    #[test]
    fn test_no_audio_means_no_boost() {
        let mut response = AudioResponse::new(AudioConfig::default());
        response.update(None, 0.016);
        assert_eq!(response.speed_multiplier(), 1.0);
        assert_eq!(response.spawn_multiplier(AudioBand::High), 1.0);
    }

    #[test]
    fn test_boost_rises_then_decays_smoothly() {
        let mut response = AudioResponse::new(AudioConfig::default());
        for _ in 0..60 {
            response.update(Some(AudioEnvelope::new(1.0, 1.0, 1.0)), 1.0 / 60.0);
        }
        let peak = response.level().low;
        assert!(peak > 0.9);

        // Source disappears: the level falls a little per frame, never snapping.
        response.update(None, 1.0 / 60.0);
        let after_one = response.level().low;
        assert!(after_one < peak);
        assert!(after_one > 0.9 * peak);

        let mut prev = after_one;
        for _ in 0..600 {
            response.update(None, 1.0 / 60.0);
            let now = response.level().low;
            assert!(now <= prev);
            prev = now;
        }
        assert!(prev < 0.01);
    }

    #[test]
    fn test_unclamped_input_is_sanitized() {
        let mut response = AudioResponse::new(AudioConfig::default());
        let raw = AudioEnvelope { low: f32::NAN, mid: 7.0, high: f32::INFINITY };
        response.update(Some(raw), 1.0 / 60.0);
        let level = response.level();
        assert!(level.low.is_finite() && level.mid.is_finite() && level.high.is_finite());
        assert!(level.mid <= 1.0 && level.high <= 1.0);

        for _ in 0..600 {
            response.update(None, 1.0 / 60.0);
        }
        assert!(response.speed_multiplier().is_finite());
        assert!(response.level().mid < 0.01);
    }

    #[test]
    fn test_multipliers_scale_with_band() {
        let mut response = AudioResponse::new(AudioConfig {
            attack_rate: 1000.0,
            ..Default::default()
        });
        response.update(Some(AudioEnvelope::new(0.5, 0.0, 1.0)), 1.0);
        assert!((response.speed_multiplier() - 1.4).abs() < 1e-6);
        assert_eq!(response.spawn_multiplier(AudioBand::Mid), 1.0);
        assert!((response.spawn_multiplier(AudioBand::High) - 4.0).abs() < 1e-6);

        response.reset();
        assert_eq!(response.level(), AudioEnvelope::default());
    }
}
