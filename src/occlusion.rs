//! Line-of-sight occlusion.
//!
//! The sensor asks whether the segment from its probe point to the target is
//! blocked. Occluders are circles in the gameplay plane; the client registers
//! them once per area.

use bevy_ecs::prelude::*;
use glam::Vec3;

/// A solid circle that blocks line of sight.
#[derive(Debug, Clone, Copy)]
pub struct Occluder {
    pub center: Vec3,
    pub radius: f32,
}

/// World-level set of sight blockers.
#[derive(Resource, Debug, Default)]
pub struct Occluders {
    occluders: Vec<Occluder>,
}

impl Occluders {
    pub fn add(&mut self, center: Vec3, radius: f32) {
        self.occluders.push(Occluder { center, radius });
    }

    pub fn clear(&mut self) {
        self.occluders.clear();
    }

    pub fn len(&self) -> usize {
        self.occluders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occluders.is_empty()
    }

    /// True if any occluder intersects the planar segment `from -> to`.
    /// Endpoints sitting inside an occluder count as blocked.
    pub fn blocked(&self, from: Vec3, to: Vec3) -> bool {
        self.occluders
            .iter()
            .any(|o| segment_hits_circle(from, to, o.center, o.radius))
    }
}

fn segment_hits_circle(from: Vec3, to: Vec3, center: Vec3, radius: f32) -> bool {
    let ax = from.x - center.x;
    let ay = from.y - center.y;
    let dx = to.x - from.x;
    let dy = to.y - from.y;

    let len_sq = dx * dx + dy * dy;
    let r_sq = radius * radius;

    if len_sq < 1e-12 {
        return ax * ax + ay * ay <= r_sq;
    }

    // Closest point on the segment to the circle center, clamped to [0, 1].
    let t = (-(ax * dx + ay * dy) / len_sq).clamp(0.0, 1.0);
    let cx = ax + t * dx;
    let cy = ay + t * dy;
    cx * cx + cy * cy <= r_sq
}
