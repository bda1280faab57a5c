//! Ground heightfield.
//!
//! A 1D heightfield sampled along x. Motion snaps ground-bound machines to
//! `height_at(x)` after integrating movement. When the resource is absent
//! machines are airborne and keep their integrated height.

use bevy_ecs::prelude::*;

/// Uniformly sampled ground heights along the x axis.
#[derive(Resource, Debug, Clone)]
pub struct GroundGrid {
    origin_x: f32,
    sample_spacing: f32,
    heights: Vec<f32>,
}

impl GroundGrid {
    /// `heights[i]` is the ground height at `origin_x + i * sample_spacing`.
    pub fn new(origin_x: f32, sample_spacing: f32, heights: Vec<f32>) -> Self {
        debug_assert!(sample_spacing > 0.0);
        debug_assert!(!heights.is_empty());
        Self {
            origin_x,
            sample_spacing,
            heights,
        }
    }

    /// Flat ground at a constant height.
    pub fn flat(height: f32) -> Self {
        Self::new(0.0, 1.0, vec![height, height])
    }

    /// Linearly interpolated height at x. Clamps outside the sampled range.
    pub fn height_at(&self, x: f32) -> f32 {
        let last = self.heights.len() - 1;
        let t = (x - self.origin_x) / self.sample_spacing;
        if t <= 0.0 {
            return self.heights[0];
        }
        if t >= last as f32 {
            return self.heights[last];
        }
        let i = t.floor() as usize;
        let frac = t - i as f32;
        self.heights[i] * (1.0 - frac) + self.heights[i + 1] * frac
    }
}
