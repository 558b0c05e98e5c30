//! Terrain-following camera rig
//!
//! The rig rides at the streaming reference. Each frame it probes the
//! height field around a point a little ahead of itself, derives target
//! height, pitch and roll from the local slope, and lifts over nearby
//! decorations in its path. Every output is eased toward its target with a
//! rate-per-second factor so the motion does not depend on frame rate.
//!
//! `dt` must already be clamped by the caller (see [`FrameClock`]).
//!
//! [`FrameClock`]: crate::core::time::FrameClock

use serde::{Deserialize, Serialize};

use crate::core::camera::CameraPose;
use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::math::interp::{approach, smoothstep};
use crate::terrain::HeightSampler;

/// Camera rig tuning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraRigConfig {
    /// Height above the sampled ground
    pub clearance: f32,
    /// Finite-difference step for slope estimation
    pub probe_distance: f32,
    /// How far ahead of the rig the terrain is probed
    pub forward_offset: f32,
    /// Fraction of the terrain pitch applied to the camera
    pub pitch_damping: f32,
    /// Fraction of the terrain bank applied to the camera
    pub roll_damping: f32,
    /// Convergence rate for height (1/s)
    pub height_rate: f32,
    /// Convergence rate for pitch and roll (1/s)
    pub orientation_rate: f32,
    /// Obstacles further than this are ignored
    pub detection_radius: f32,
    /// Extra clearance kept over an obstacle's top
    pub lift_margin: f32,
    pub lift_rise_rate: f32,
    pub lift_fall_rate: f32,
    /// Obstacles up to this far behind the rig still count as ahead
    pub ahead_slack: f32,
}

impl Default for CameraRigConfig {
    fn default() -> Self {
        Self {
            clearance: 3.5,
            probe_distance: 4.0,
            forward_offset: 6.0,
            pitch_damping: 0.5,
            roll_damping: 0.35,
            height_rate: 3.0,
            orientation_rate: 2.0,
            detection_radius: 30.0,
            lift_margin: 2.0,
            lift_rise_rate: 2.5,
            lift_fall_rate: 0.6,
            ahead_slack: 4.0,
        }
    }
}

impl CameraRigConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.detection_radius > 0.0) {
            return Err(Error::invalid(format!(
                "camera detection radius must be positive, got {}",
                self.detection_radius
            )));
        }
        if !(self.probe_distance > 0.0) {
            return Err(Error::invalid(format!(
                "camera probe distance must be positive, got {}",
                self.probe_distance
            )));
        }
        let rates = [
            self.height_rate,
            self.orientation_rate,
            self.lift_rise_rate,
            self.lift_fall_rate,
        ];
        if rates.iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(Error::invalid("camera smoothing rates must be >= 0"));
        }
        Ok(())
    }
}

/// Something the rig should fly over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    /// Display-space base position (Y is ground elevation)
    pub position: Vec3,
    pub height: f32,
}

/// Targets derived from terrain alone.
#[derive(Clone, Copy, Debug, PartialEq)]
struct TerrainTarget {
    height: f32,
    pitch: f32,
    roll: f32,
}

pub struct CameraRig {
    config: CameraRigConfig,
    height: f32,
    pitch: f32,
    roll: f32,
    lift: f32,
    /// First update snaps to its targets instead of easing from zero
    settled: bool,
}

impl CameraRig {
    pub fn new(config: CameraRigConfig) -> Self {
        Self {
            config,
            height: 0.0,
            pitch: 0.0,
            roll: 0.0,
            lift: 0.0,
            settled: false,
        }
    }

    pub fn config(&self) -> &CameraRigConfig {
        &self.config
    }

    /// Advance the rig one frame.
    pub fn update(&mut self, dt: f32, terrain: &impl HeightSampler, reference: Vec3, obstacles: &[Obstacle]) {
        let target = self.terrain_target(terrain, reference);
        let lift_target = self.required_lift(target.height, obstacles);

        if !self.settled {
            self.height = target.height;
            self.pitch = target.pitch;
            self.roll = target.roll;
            self.lift = lift_target;
            self.settled = true;
            return;
        }

        let c = &self.config;
        self.height = approach(self.height, target.height, c.height_rate, dt);
        self.pitch = approach(self.pitch, target.pitch, c.orientation_rate, dt);
        self.roll = approach(self.roll, target.roll, c.orientation_rate, dt);

        let lift_rate = if lift_target > self.lift { c.lift_rise_rate } else { c.lift_fall_rate };
        self.lift = approach(self.lift, lift_target, lift_rate, dt);
    }

    fn terrain_target(&self, terrain: &impl HeightSampler, reference: Vec3) -> TerrainTarget {
        let c = &self.config;
        let x = reference.x;
        let z = reference.z - c.forward_offset;
        let step = c.probe_distance;

        let center = terrain.height_at(x, z);
        let ahead = terrain.height_at(x, z - step);
        let behind = terrain.height_at(x, z + step);
        let right = terrain.height_at(x + step, z);
        let left = terrain.height_at(x - step, z);

        // Rise per unit along the travel direction and to the right
        let forward_slope = (ahead - behind) / (2.0 * step);
        let side_slope = (right - left) / (2.0 * step);

        TerrainTarget {
            height: center + c.clearance,
            pitch: forward_slope.atan() * c.pitch_damping,
            roll: side_slope.atan() * c.roll_damping,
        }
    }

    /// Largest lift any obstacle ahead demands over `base_height`.
    fn required_lift(&self, base_height: f32, obstacles: &[Obstacle]) -> f32 {
        let c = &self.config;
        obstacles
            .iter()
            .filter(|o| o.position.z <= c.ahead_slack)
            .filter_map(|o| {
                let distance = (o.position.x * o.position.x + o.position.z * o.position.z).sqrt();
                if distance > c.detection_radius {
                    return None;
                }
                let falloff = 1.0 - smoothstep(0.0, c.detection_radius, distance);
                let top = o.position.y + o.height + c.lift_margin;
                Some((top - base_height).max(0.0) * falloff)
            })
            .fold(0.0, f32::max)
    }

    /// Current pose in display space.
    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: Vec3::new(0.0, self.height + self.lift, 0.0),
            pitch: self.pitch,
            roll: self.roll,
            yaw: 0.0,
        }
    }

    /// Lift currently applied over terrain clearance.
    pub fn lift(&self) -> f32 {
        self.lift
    }

    /// Forget all smoothing state; the next update snaps.
    pub fn reset(&mut self) {
        self.height = 0.0;
        self.pitch = 0.0;
        self.roll = 0.0;
        self.lift = 0.0;
        self.settled = false;
    }
}
