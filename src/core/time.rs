//! Frame timing and per-frame inputs

use std::time::{Duration, Instant};

use super::audio::AudioEnvelope;

/// Everything the core consumes from the host each frame.
///
/// `dt` must already be clamped by the caller: slope probes, smoothing
/// rates and spawn probabilities all assume short, roughly continuous
/// steps. [`FrameClock`] produces inputs that satisfy this.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Seconds since the clock started.
    pub elapsed: f32,
    /// Normalised audio bands, if a capture source is active.
    pub audio: Option<AudioEnvelope>,
}

impl FrameInput {
    pub fn new(dt: f32, elapsed: f32) -> Self {
        Self { dt, elapsed, audio: None }
    }

    pub fn with_audio(mut self, audio: AudioEnvelope) -> Self {
        self.audio = Some(audio);
        self
    }
}

/// Tracks wall-clock frame timing and emits clamped [`FrameInput`]s.
pub struct FrameClock {
    last_frame: Instant,
    elapsed: Duration,
    max_dt: f32,
    frame_count: u64,
}

impl FrameClock {
    /// Create a clock that never reports a step longer than `max_dt` seconds.
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_frame: Instant::now(),
            elapsed: Duration::ZERO,
            max_dt,
            frame_count: 0,
        }
    }

    /// Call once per frame to measure the step since the previous call.
    pub fn tick(&mut self) -> FrameInput {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.advance(delta)
    }

    /// Advance by an explicit duration (fixed-step or replayed runs).
    pub fn advance(&mut self, delta: Duration) -> FrameInput {
        let dt = delta.as_secs_f32().min(self.max_dt);
        self.elapsed += Duration::from_secs_f32(dt);
        self.frame_count += 1;
        if delta.as_secs_f32() > self.max_dt {
            log::debug!("Clamped frame step {:.3}s to {:.3}s", delta.as_secs_f32(), self.max_dt);
        }
        FrameInput::new(dt, self.elapsed.as_secs_f32())
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(0.1)
    }
}
