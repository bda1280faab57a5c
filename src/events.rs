//! Client-posted events.
//!
//! Animation events are the synchronization channel between the client's
//! animation playback and attack resolution: the simulation never guesses at
//! animation timing, it waits for these. Broadcasts are coarse world-level
//! notifications delivered to every machine.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Keyframe notifications posted by the client against one machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationEvent {
    /// The attack animation reached the point where a projectile appears
    /// in the machine's hand/muzzle.
    AttachProjectile,
    /// The attack animation reached its damage/launch keyframe.
    DealDamage,
    /// The attack animation finished playing.
    AttackEnd,
    /// The animation was cut short (hit reaction, death).
    Interrupt,
}

/// Per-machine queue of pending animation events. Drained by the brain
/// dispatch each tick; events posted between ticks accumulate in order.
#[derive(Component, Debug, Clone, Default)]
pub struct AnimationEvents {
    queue: Vec<AnimationEvent>,
}

impl AnimationEvents {
    pub fn post(&mut self, event: AnimationEvent) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> Vec<AnimationEvent> {
        std::mem::take(&mut self.queue)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// World-level notifications visible to every machine for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Broadcast {
    /// The play area was (re)entered; pooled resources must be rebuilt.
    GameAreaEntered,
    /// The play area was left; pooled resources may be dropped.
    GameAreaExited,
}

/// Broadcast bus. Posted events stay visible for exactly one tick; the
/// facade clears the bus after running the schedule.
#[derive(Resource, Debug, Default)]
pub struct BroadcastBus {
    events: Vec<Broadcast>,
}

impl BroadcastBus {
    pub fn post(&mut self, event: Broadcast) {
        self.events.push(event);
    }

    pub fn contains(&self, event: Broadcast) -> bool {
        self.events.contains(&event)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Outward-facing combat effects, accumulated per tick and drained by the
/// client through the facade.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatRecord {
    MeleeHit {
        attacker: Entity,
        target: Entity,
        damage: f32,
    },
    ProjectileLaunched {
        shooter: Entity,
        pool: String,
    },
    ProjectileHit {
        shooter: Entity,
        target: Entity,
        damage: f32,
    },
    Eaten {
        eater: Entity,
        eaten: Entity,
        reward: f32,
    },
}

#[derive(Resource, Debug, Default)]
pub struct CombatLog {
    records: Vec<CombatRecord>,
}

impl CombatLog {
    pub fn push(&mut self, record: CombatRecord) {
        self.records.push(record);
    }

    pub fn drain(&mut self) -> Vec<CombatRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
