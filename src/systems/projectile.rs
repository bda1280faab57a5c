//! Projectile flight system.
//!
//! Launch requests queued by ranged attackers become short-lived projectile
//! entities. A projectile that reaches its target or times out returns its
//! pooled instance, closing the checkout/return loop.

use bevy_ecs::prelude::*;
use glam::Vec3;

use super::motion::DeltaTime;
use super::registry::TargetRegistry;
use crate::components::Position;
use crate::events::{CombatLog, CombatRecord};
use crate::pool::{PooledInstance, ProjectilePool};

/// Minimum hit radius so point targets are still hittable.
const MIN_HIT_RADIUS: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct ProjectileLaunch {
    pub shooter: Entity,
    pub instance: PooledInstance,
    pub origin: Vec3,
    pub velocity: Vec3,
    pub ttl: f32,
    pub damage: f32,
    pub target: Option<Entity>,
}

/// Launch requests queued during brain dispatch, drained here.
#[derive(Resource, Debug, Default)]
pub struct LaunchQueue(pub Vec<ProjectileLaunch>);

/// A projectile in flight. `instance` is `Some` until returned.
#[derive(Component, Debug)]
pub struct Projectile {
    pub shooter: Entity,
    pub instance: Option<PooledInstance>,
    pub velocity: Vec3,
    pub ttl: f32,
    pub damage: f32,
    pub target: Option<Entity>,
}

/// ## Data Access
/// - Reads: TargetRegistry
/// - Writes: Position, Projectile, ProjectilePool, CombatLog, LaunchQueue
pub fn projectile_system(
    dt: Res<DeltaTime>,
    registry: Res<TargetRegistry>,
    mut commands: Commands,
    mut queue: ResMut<LaunchQueue>,
    mut pool: ResMut<ProjectilePool>,
    mut combat_log: ResMut<CombatLog>,
    mut query: Query<(Entity, &mut Position, &mut Projectile)>,
) {
    let delta = dt.0;

    for launch in queue.0.drain(..) {
        commands.spawn((
            Position(launch.origin),
            Projectile {
                shooter: launch.shooter,
                instance: Some(launch.instance),
                velocity: launch.velocity,
                ttl: launch.ttl,
                damage: launch.damage,
                target: launch.target,
            },
        ));
    }

    for (entity, mut pos, mut proj) in query.iter_mut() {
        pos.0 += proj.velocity * delta;
        proj.ttl -= delta;

        let hit = proj.target.and_then(|t| registry.resolve(t)).filter(|t| {
            let radius = t.radius.max(MIN_HIT_RADIUS);
            pos.planar_dist_sq(t.position) <= radius * radius
        });

        if let Some(target) = hit {
            combat_log.push(CombatRecord::ProjectileHit {
                shooter: proj.shooter,
                target: target.entity,
                damage: proj.damage,
            });
            if let Some(instance) = proj.instance.take() {
                pool.return_instance(instance);
            }
            commands.entity(entity).despawn();
        } else if proj.ttl <= 0.0 {
            if let Some(instance) = proj.instance.take() {
                pool.return_instance(instance);
            }
            commands.entity(entity).despawn();
        }
    }
}
