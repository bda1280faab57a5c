//! Target registry - per-tick snapshot of every living machine.
//!
//! Entity references held in components (`Enemy`, group leaders) are weak:
//! consumers resolve them through this registry and a missing entry simply
//! reads as "no target". Rebuilding the registry in its own system keeps
//! later systems free to mutate `Signals` without query conflicts.

use bevy_ecs::prelude::*;
use std::collections::HashMap;

use crate::behaviors::TargetInfo;
use crate::components::{Facing, MachineStats, Position, Signals};

#[derive(Resource, Debug, Default)]
pub struct TargetRegistry {
    entries: HashMap<Entity, TargetInfo>,
}

impl TargetRegistry {
    pub fn resolve(&self, entity: Entity) -> Option<TargetInfo> {
        self.entries.get(&entity).copied()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entries.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn rebuild(&mut self, entries: impl Iterator<Item = (Entity, TargetInfo)>) {
        self.entries.clear();
        self.entries.extend(entries);
    }
}

/// ## Data Access
/// - Reads: Position, Facing, MachineStats, Signals
/// - Writes: TargetRegistry
pub fn target_registry_system(
    mut registry: ResMut<TargetRegistry>,
    query: Query<(Entity, &Position, &Facing, &MachineStats, &Signals)>,
) {
    registry.rebuild(query.iter().filter_map(|(entity, pos, facing, stats, signals)| {
        if signals.is_destroyed() {
            return None;
        }
        Some((
            entity,
            TargetInfo {
                entity,
                position: pos.0,
                facing: facing.0,
                radius: stats.radius,
            },
        ))
    }));
}
