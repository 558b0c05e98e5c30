//! Square height grid centred on the observer, refreshed every frame.

use glam::Vec3;

use super::generator::HeightSampler;

/// Heights for a `resolution x resolution` vertex grid spanning `size`
/// world units, sampled around a moving reference position.
#[derive(Clone, Debug)]
pub struct HeightGrid {
    resolution: usize,
    size: f32,
    heights: Vec<f32>,
    min_height: f32,
    max_height: f32,
}

impl HeightGrid {
    /// Create a grid. `resolution` is clamped to at least 2 vertices per side.
    pub fn new(resolution: usize, size: f32) -> Self {
        let resolution = resolution.max(2);
        Self {
            resolution,
            size,
            heights: vec![0.0; resolution * resolution],
            min_height: 0.0,
            max_height: 0.0,
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Spacing between neighbouring vertices.
    pub fn spacing(&self) -> f32 {
        self.size / (self.resolution - 1) as f32
    }

    /// Local (observer-relative) XZ of vertex `(ix, iz)`.
    pub fn local_xz(&self, ix: usize, iz: usize) -> (f32, f32) {
        let half = self.size * 0.5;
        let s = self.spacing();
        (ix as f32 * s - half, iz as f32 * s - half)
    }

    /// Resample every vertex at `reference + local`.
    pub fn refresh(&mut self, sampler: &impl HeightSampler, reference: Vec3) {
        let mut min_h = f32::INFINITY;
        let mut max_h = f32::NEG_INFINITY;

        for iz in 0..self.resolution {
            for ix in 0..self.resolution {
                let (lx, lz) = self.local_xz(ix, iz);
                let h = sampler.height_at(reference.x + lx, reference.z + lz);
                self.heights[iz * self.resolution + ix] = h;
                min_h = min_h.min(h);
                max_h = max_h.max(h);
            }
        }

        self.min_height = min_h;
        self.max_height = max_h;
    }

    /// Height at vertex `(ix, iz)`.
    pub fn height(&self, ix: usize, iz: usize) -> f32 {
        self.heights[iz * self.resolution + ix]
    }

    /// Row-major heights, Z outer.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Local-space vertex position with its sampled height.
    pub fn vertex_position(&self, ix: usize, iz: usize) -> Vec3 {
        let (x, z) = self.local_xz(ix, iz);
        Vec3::new(x, self.height(ix, iz), z)
    }

    /// Min/max heights from the last refresh.
    pub fn bounds(&self) -> (f32, f32) {
        (self.min_height, self.max_height)
    }
}
