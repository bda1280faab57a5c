//! Eater system - hungry machines consume nearby edible machines.
//!
//! Two-pass: gather bites from read-only state and the spatial grid, then
//! apply them. The eater and edible queries are disjoint so both can hold
//! mutable `Signals` access.

use bevy_ecs::prelude::*;

use crate::components::{Eater, Edible, Position, Signal, Signals};
use crate::events::{CombatLog, CombatRecord};
use crate::spatial::SpatialGrid;

/// ## Data Access
/// - Reads: Position, Eater, Edible, SpatialGrid
/// - Writes: Signals (eaters and edibles), CombatLog
pub fn eater_system(
    grid: Res<SpatialGrid>,
    mut combat_log: ResMut<CombatLog>,
    mut eaters: Query<(Entity, &Position, &Eater, &mut Signals), Without<Edible>>,
    mut edibles: Query<(&Edible, &mut Signals), (With<Edible>, Without<Eater>)>,
) {
    let mut bites: Vec<(Entity, Entity, f32)> = Vec::new();
    let mut claimed: Vec<Entity> = Vec::new();

    for (entity, pos, eater, signals) in eaters.iter() {
        if signals.is_destroyed() || !signals.get(Signal::Hungry) {
            continue;
        }

        // Grid results are distance sorted; take the first edible one.
        for entry in grid.query_radius(pos.0.x, pos.0.y, eater.eat_radius) {
            if entry.entity == entity || claimed.contains(&entry.entity) {
                continue;
            }
            if let Ok((edible, target_signals)) = edibles.get(entry.entity) {
                if target_signals.is_destroyed() {
                    continue;
                }
                bites.push((entity, entry.entity, edible.reward));
                claimed.push(entry.entity);
                break;
            }
        }
    }

    for (eater_entity, eaten_entity, reward) in bites {
        if let Ok((_, mut signals)) = edibles.get_mut(eaten_entity) {
            signals.set(Signal::Destroyed, true);
        }
        if let Ok((_, _, _, mut signals)) = eaters.get_mut(eater_entity) {
            signals.set(Signal::Hungry, false);
        }
        combat_log.push(CombatRecord::Eaten {
            eater: eater_entity,
            eaten: eaten_entity,
            reward,
        });
    }
}
