//! Sensor system - perception probes publishing Warning/Danger.
//!
//! The sensor only works while the machine holds `Alert`. Each completed
//! probe re-arms a randomized delay timer; between probes the last published
//! signals stand. Whenever a probe is skipped (alert off, sensor disabled,
//! no target) both signals are cleared, so perception never reports a
//! threat it is not actually watching.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::Rng;

use super::dispatch::SimRng;
use super::motion::DeltaTime;
use super::registry::TargetRegistry;
use crate::components::{Enemy, Facing, Position, Sensor, Signal, Signals};
use crate::occlusion::Occluders;

/// ## Data Access
/// - Reads: Position, Facing, Enemy, TargetRegistry, Occluders (optional)
/// - Writes: Sensor, Signals, SimRng
pub fn sensor_system(
    dt: Res<DeltaTime>,
    registry: Res<TargetRegistry>,
    occluders: Option<Res<Occluders>>,
    mut rng: ResMut<SimRng>,
    mut query: Query<(&Position, &Facing, &Enemy, &mut Sensor, &mut Signals)>,
) {
    let delta = dt.0;

    for (pos, facing, enemy, mut sensor, mut signals) in query.iter_mut() {
        if signals.is_destroyed() {
            continue;
        }

        if sensor.disabled > 0.0 {
            sensor.disabled -= delta;
            signals.set(Signal::Warning, false);
            signals.set(Signal::Danger, false);
            continue;
        }

        if !signals.get(Signal::Alert) {
            signals.set(Signal::Warning, false);
            signals.set(Signal::Danger, false);
            sensor.timer = 0.0;
            continue;
        }

        let target = enemy.0.and_then(|e| registry.resolve(e));
        let Some(target) = target else {
            signals.set(Signal::Warning, false);
            signals.set(Signal::Danger, false);
            sensor.timer = 0.0;
            continue;
        };

        sensor.timer -= delta;
        if sensor.timer > 0.0 {
            continue; // last probe results stand
        }

        let params = sensor.params;
        let mut offset = params.offset;
        if facing.0.x < 0.0 {
            offset.x = -offset.x;
        }
        let probe = pos.0 + offset;

        let dist_sq = Vec3::new(target.position.x - probe.x, target.position.y - probe.y, 0.0)
            .length_squared();
        let far = params.max_radius + target.radius;
        let near = params.min_radius + target.radius;

        let mut warning = dist_sq <= far * far;
        let mut danger = dist_sq <= near * near && in_angular_window(probe, facing.0, &params, target.position);

        if warning || danger {
            if let Some(occluders) = occluders.as_ref() {
                if occluders.blocked(probe, target.position) {
                    warning = false;
                    danger = false;
                }
            }
        }

        signals.set(Signal::Warning, warning);
        signals.set(Signal::Danger, danger);

        sensor.timer = rng.0.gen_range(params.delay_min..=params.delay_max);
    }
}

/// Angular field-of-view test in the gameplay plane. A full-circle sensor
/// (angle >= 360) skips the check entirely.
fn in_angular_window(
    probe: Vec3,
    facing: Vec3,
    params: &crate::components::SensorParams,
    target: Vec3,
) -> bool {
    if params.angle >= 360.0 {
        return true;
    }

    let to_target = Vec3::new(target.x - probe.x, target.y - probe.y, 0.0);
    if to_target.length_squared() < 1e-12 {
        return true;
    }

    let facing_deg = facing.y.atan2(facing.x).to_degrees();
    let target_deg = to_target.y.atan2(to_target.x).to_degrees();
    let rel = wrap_to_180(target_deg - facing_deg - params.angle_offset);
    rel.abs() <= params.angle * 0.5
}

fn wrap_to_180(mut deg: f32) -> f32 {
    while deg > 180.0 {
        deg -= 360.0;
    }
    while deg < -180.0 {
        deg += 360.0;
    }
    deg
}
