//! Brain dispatch system - runs each machine's active state once per tick.
//!
//! Builds a fresh `BehaviorCtx` per machine: resolves the gated enemy and
//! the flock leader through the target registry, hands over the animation
//! events posted since the previous tick, and applies any sensor shutdown
//! the behaviors requested.

use bevy_ecs::prelude::*;
use rand_chacha::ChaCha8Rng;

use super::flock::Groups;
use super::motion::DeltaTime;
use super::projectile::LaunchQueue;
use super::registry::TargetRegistry;
use crate::behaviors::BehaviorCtx;
use crate::brain::Brain;
use crate::components::{
    Enemy, Facing, Flock, MachineStats, Pilot, Position, Sensor, Signal, Signals, SpawnOrigin,
};
use crate::events::{AnimationEvents, Broadcast, BroadcastBus, CombatLog};
use crate::pool::ProjectilePool;
use crate::view::View;

/// Deterministic simulation RNG, seeded from the facade configuration.
#[derive(Resource, Debug)]
pub struct SimRng(pub ChaCha8Rng);

/// ## Data Access
/// - Reads: Position, Facing, MachineStats, SpawnOrigin, Enemy, Flock,
///   TargetRegistry, Groups, BroadcastBus
/// - Writes: Brain, Signals, Pilot, View, AnimationEvents, Sensor,
///   SimRng, ProjectilePool, CombatLog, LaunchQueue
#[allow(clippy::too_many_arguments)]
pub fn brain_dispatch_system(
    dt: Res<DeltaTime>,
    registry: Res<TargetRegistry>,
    groups: Res<Groups>,
    bus: Res<BroadcastBus>,
    mut rng: ResMut<SimRng>,
    mut pool: ResMut<ProjectilePool>,
    mut combat_log: ResMut<CombatLog>,
    mut launches: ResMut<LaunchQueue>,
    mut query: Query<(
        Entity,
        &Position,
        &Facing,
        &MachineStats,
        &SpawnOrigin,
        &Enemy,
        Option<&Flock>,
        &mut Brain,
        &mut Signals,
        &mut Pilot,
        &mut View,
        &mut AnimationEvents,
        Option<&mut Sensor>,
    )>,
) {
    let area_entered = bus.contains(Broadcast::GameAreaEntered);

    for (
        entity,
        pos,
        facing,
        stats,
        spawn_origin,
        enemy,
        flock,
        mut brain,
        mut signals,
        mut pilot,
        mut view,
        mut anim_events,
        mut sensor,
    ) in query.iter_mut()
    {
        if signals.is_destroyed() {
            continue;
        }

        let events = anim_events.drain();

        if signals.get(Signal::Panic) {
            pilot.stop();
            continue;
        }

        // The enemy is only visible to behaviors while perception holds it.
        let perceived = signals.get(Signal::Warning) || signals.get(Signal::Danger);
        let enemy_info = if perceived {
            enemy.0.and_then(|e| registry.resolve(e))
        } else {
            None
        };

        let leader_info = flock
            .and_then(|f| groups.leader(f.group))
            .filter(|&leader| leader != entity)
            .and_then(|leader| registry.resolve(leader));

        let mut ctx = BehaviorCtx {
            dt: dt.0,
            entity,
            position: pos.0,
            facing: facing.0,
            spawn_origin: spawn_origin.0,
            enemy: enemy_info,
            leader: leader_info,
            events: &events,
            area_entered,
            signals: &mut signals,
            pilot: &mut pilot,
            stats,
            view: &mut view,
            rng: &mut rng.0,
            pool: &mut pool,
            combat_log: &mut combat_log,
            launches: &mut launches.0,
            sensor_disable: None,
        };

        brain.tick(&mut ctx);

        let disable = ctx.sensor_disable;
        if let (Some(seconds), Some(sensor)) = (disable, sensor.as_mut()) {
            sensor.disable(seconds);
        }
    }
}
