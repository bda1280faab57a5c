//! Serializable snapshot of the simulation state.
//!
//! The `Snapshot` struct is the client-facing view of all machines,
//! extracted after a step and typically shipped as JSON.

use crate::brain::Brain;
use crate::components::*;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a single machine's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub id: u32,
    pub category: Category,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub facing_x: f32,
    pub facing_y: f32,
    /// Active FSM state name; `None` for externally driven machines.
    pub state: Option<String>,
    /// Signals currently raised.
    pub signals: Vec<Signal>,
    pub speed: SpeedLevel,
}

/// Complete simulation state snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current simulation tick.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub time: f32,
    /// All machine states.
    pub machines: Vec<MachineSnapshot>,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World, tick: u64, time: f32) -> Self {
        let mut machines = Vec::new();

        let mut query = world.query::<(
            &MachineId,
            &Category,
            &Position,
            &Facing,
            &Signals,
            &Pilot,
            Option<&Brain>,
        )>();

        for (id, category, pos, facing, signals, pilot, brain) in query.iter(world) {
            machines.push(MachineSnapshot {
                id: id.0,
                category: *category,
                x: pos.0.x,
                y: pos.0.y,
                z: pos.0.z,
                facing_x: facing.0.x,
                facing_y: facing.0.y,
                state: brain.map(|b| b.current_state().to_string()),
                signals: Signal::ALL
                    .iter()
                    .copied()
                    .filter(|s| signals.get(*s))
                    .collect(),
                speed: pilot.speed,
            });
        }

        machines.sort_by_key(|m| m.id);

        Snapshot {
            tick,
            time,
            machines,
        }
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_snapshot_roundtrip() {
        let mut world = World::new();

        let mut signals = Signals::default();
        signals.set(Signal::Hungry, true);
        world.spawn((
            MachineId(7),
            Category::Prey,
            Position(Vec3::new(1.0, 2.0, 3.0)),
            Facing::default(),
            signals,
            Pilot::default(),
        ));

        let snapshot = Snapshot::from_world(&mut world, 42, 1.4);
        assert_eq!(snapshot.tick, 42);
        assert_eq!(snapshot.machines.len(), 1);

        let m = &snapshot.machines[0];
        assert_eq!(m.id, 7);
        assert_eq!(m.signals, vec![Signal::Hungry]);
        assert!(m.state.is_none());

        let json = snapshot.to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap();
        assert_eq!(restored.machines[0].id, 7);
        assert_eq!(restored.machines[0].x, 1.0);
    }

    #[test]
    fn test_snapshot_sorted_by_id() {
        let mut world = World::new();
        for id in [3u32, 1, 2] {
            world.spawn((
                MachineId(id),
                Category::Prey,
                Position::default(),
                Facing::default(),
                Signals::default(),
                Pilot::default(),
            ));
        }

        let snapshot = Snapshot::from_world(&mut world, 0, 0.0);
        let ids: Vec<u32> = snapshot.machines.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
