//! Behavior components.
//!
//! Behaviors are a closed set of tagged variants dispatched through
//! `Behavior::on_update`; no trait objects, no reflection. Each variant owns
//! its per-machine mutable state and reads its shared tuning at
//! instantiation time.

pub mod attack;
pub mod attack_tactics;
pub mod evade;
pub mod follow_leader;
pub mod idle;
pub mod pursuit;
pub mod ranged_attack;
pub mod wander;

pub use attack::{MeleeAttackBehavior, MeleeTuning};
pub use attack_tactics::{TacticsBehavior, TacticsTuning};
pub use evade::{EvadeBehavior, EvadeTuning};
pub use follow_leader::{FollowLeaderBehavior, FollowLeaderTuning};
pub use idle::{IdleBehavior, IdleTuning};
pub use pursuit::{PursuitBehavior, PursuitTuning};
pub use ranged_attack::{RangedAttackBehavior, RangedTuning};
pub use wander::{WanderBehavior, WanderTuning};

use bevy_ecs::prelude::Entity;
use glam::Vec3;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::brain::{BrainConfigError, Trigger};
use crate::components::{MachineStats, Pilot, Signals};
use crate::events::{AnimationEvent, CombatLog};
use crate::pool::ProjectilePool;
use crate::systems::projectile::ProjectileLaunch;
use crate::view::View;

/// Closed set of behavior component kinds a state may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorKind {
    Idle,
    Wander,
    Pursuit,
    Evade,
    Tactics,
    FollowLeader,
    MeleeAttack,
    RangedAttack,
}

impl BehaviorKind {
    /// Triggers this kind can raise. Used by configuration validation:
    /// every possible trigger must have a transition table entry.
    pub fn possible_triggers(&self) -> &'static [Trigger] {
        match self {
            BehaviorKind::Idle => &[Trigger::Move],
            BehaviorKind::Wander => &[Trigger::Rest],
            BehaviorKind::Pursuit => &[],
            BehaviorKind::Evade => &[Trigger::Calm],
            BehaviorKind::Tactics => &[
                Trigger::EnemyInSight,
                Trigger::EnemyInRange,
                Trigger::OutOfRange,
            ],
            BehaviorKind::FollowLeader => &[],
            BehaviorKind::MeleeAttack | BehaviorKind::RangedAttack => {
                &[Trigger::OutOfRange, Trigger::MaxAttacks]
            }
        }
    }

    /// Attack kinds get special treatment when left: the next state's
    /// arbiter starts with a cool-down before re-arming perception.
    pub fn is_attack(&self) -> bool {
        matches!(self, BehaviorKind::MeleeAttack | BehaviorKind::RangedAttack)
    }
}

/// Snapshot of another machine, resolved through the target registry.
#[derive(Debug, Clone, Copy)]
pub struct TargetInfo {
    pub entity: Entity,
    pub position: Vec3,
    pub facing: Vec3,
    pub radius: f32,
}

/// Everything a behavior may touch during one tick. Built fresh per machine
/// by the brain dispatch system.
pub struct BehaviorCtx<'a> {
    pub dt: f32,
    pub entity: Entity,
    pub position: Vec3,
    pub facing: Vec3,
    pub spawn_origin: Vec3,
    /// Current enemy, only present while `Warning` or `Danger` holds.
    pub enemy: Option<TargetInfo>,
    /// Flock leader, absent for leaderless machines and for the leader itself.
    pub leader: Option<TargetInfo>,
    /// Animation events posted since the previous tick, in post order.
    pub events: &'a [AnimationEvent],
    /// The play area was (re)entered this tick.
    pub area_entered: bool,
    pub signals: &'a mut Signals,
    pub pilot: &'a mut Pilot,
    pub stats: &'a MachineStats,
    pub view: &'a mut View,
    pub rng: &'a mut ChaCha8Rng,
    pub pool: &'a mut ProjectilePool,
    pub combat_log: &'a mut CombatLog,
    pub launches: &'a mut Vec<ProjectileLaunch>,
    /// Sensor shutdown request, applied by the dispatch system after the tick.
    pub sensor_disable: Option<f32>,
}

impl BehaviorCtx<'_> {
    /// Request a perception shutdown; the longest requested window wins.
    pub fn request_sensor_disable(&mut self, seconds: f32) {
        self.sensor_disable = Some(match self.sensor_disable {
            Some(prev) => prev.max(seconds),
            None => seconds,
        });
    }
}

/// Per-kind tuning data, resolved once per brain configuration. A kind used
/// by any state must have its tuning present (validated at build time).
#[derive(Debug, Clone, Default)]
pub struct TuningSet {
    pub idle: Option<IdleTuning>,
    pub wander: Option<WanderTuning>,
    pub pursuit: Option<PursuitTuning>,
    pub evade: Option<EvadeTuning>,
    pub tactics: Option<TacticsTuning>,
    pub follow_leader: Option<FollowLeaderTuning>,
    pub melee: Option<MeleeTuning>,
    pub ranged: Option<RangedTuning>,
}

impl TuningSet {
    pub(crate) fn check(&self, kind: BehaviorKind) -> Result<(), BrainConfigError> {
        let present = match kind {
            BehaviorKind::Idle => self.idle.is_some(),
            BehaviorKind::Wander => self.wander.is_some(),
            BehaviorKind::Pursuit => self.pursuit.is_some(),
            BehaviorKind::Evade => self.evade.is_some(),
            BehaviorKind::Tactics => self.tactics.is_some(),
            BehaviorKind::FollowLeader => self.follow_leader.is_some(),
            BehaviorKind::MeleeAttack => self.melee.is_some(),
            BehaviorKind::RangedAttack => self.ranged.is_some(),
        };
        if present {
            Ok(())
        } else {
            Err(BrainConfigError::MissingTuning { kind })
        }
    }
}

/// One instantiated behavior component.
#[derive(Debug)]
pub enum Behavior {
    Idle(IdleBehavior),
    Wander(WanderBehavior),
    Pursuit(PursuitBehavior),
    Evade(EvadeBehavior),
    Tactics(TacticsBehavior),
    FollowLeader(FollowLeaderBehavior),
    MeleeAttack(MeleeAttackBehavior),
    RangedAttack(RangedAttackBehavior),
}

impl Behavior {
    /// Instantiate a component from validated tuning. Missing tuning falls
    /// back to defaults; `BrainConfig::build` guarantees it is present for
    /// any config that reaches this point.
    pub fn instantiate(kind: BehaviorKind, tuning: &TuningSet) -> Self {
        match kind {
            BehaviorKind::Idle => {
                Behavior::Idle(IdleBehavior::new(tuning.idle.clone().unwrap_or_default()))
            }
            BehaviorKind::Wander => Behavior::Wander(WanderBehavior::new(
                tuning.wander.clone().unwrap_or_default(),
            )),
            BehaviorKind::Pursuit => Behavior::Pursuit(PursuitBehavior::new(
                tuning.pursuit.clone().unwrap_or_default(),
            )),
            BehaviorKind::Evade => {
                Behavior::Evade(EvadeBehavior::new(tuning.evade.clone().unwrap_or_default()))
            }
            BehaviorKind::Tactics => Behavior::Tactics(TacticsBehavior::new(
                tuning.tactics.clone().unwrap_or_default(),
            )),
            BehaviorKind::FollowLeader => Behavior::FollowLeader(FollowLeaderBehavior::new(
                tuning.follow_leader.clone().unwrap_or_default(),
            )),
            BehaviorKind::MeleeAttack => Behavior::MeleeAttack(MeleeAttackBehavior::new(
                tuning.melee.clone().unwrap_or_default(),
            )),
            BehaviorKind::RangedAttack => Behavior::RangedAttack(RangedAttackBehavior::new(
                tuning.ranged.clone().unwrap_or_default(),
            )),
        }
    }

    pub fn on_init(&mut self, ctx: &mut BehaviorCtx) {
        match self {
            Behavior::Idle(b) => b.on_init(ctx),
            Behavior::Wander(b) => b.on_init(ctx),
            Behavior::Pursuit(b) => b.on_init(ctx),
            Behavior::Evade(b) => b.on_init(ctx),
            Behavior::Tactics(b) => b.on_init(ctx),
            Behavior::FollowLeader(b) => b.on_init(ctx),
            Behavior::MeleeAttack(b) => b.on_init(ctx),
            Behavior::RangedAttack(b) => b.on_init(ctx),
        }
    }

    pub fn on_enter(&mut self, ctx: &mut BehaviorCtx, prior_had_attack: bool) {
        match self {
            Behavior::Idle(b) => b.on_enter(ctx, prior_had_attack),
            Behavior::Wander(b) => b.on_enter(ctx, prior_had_attack),
            Behavior::Pursuit(b) => b.on_enter(ctx, prior_had_attack),
            Behavior::Evade(b) => b.on_enter(ctx, prior_had_attack),
            Behavior::Tactics(b) => b.on_enter(ctx, prior_had_attack),
            Behavior::FollowLeader(b) => b.on_enter(ctx, prior_had_attack),
            Behavior::MeleeAttack(b) => b.on_enter(ctx, prior_had_attack),
            Behavior::RangedAttack(b) => b.on_enter(ctx, prior_had_attack),
        }
    }

    pub fn on_update(&mut self, ctx: &mut BehaviorCtx) -> Option<Trigger> {
        match self {
            Behavior::Idle(b) => b.on_update(ctx),
            Behavior::Wander(b) => b.on_update(ctx),
            Behavior::Pursuit(b) => b.on_update(ctx),
            Behavior::Evade(b) => b.on_update(ctx),
            Behavior::Tactics(b) => b.on_update(ctx),
            Behavior::FollowLeader(b) => b.on_update(ctx),
            Behavior::MeleeAttack(b) => b.on_update(ctx),
            Behavior::RangedAttack(b) => b.on_update(ctx),
        }
    }

    pub fn on_exit(&mut self, ctx: &mut BehaviorCtx) {
        match self {
            Behavior::Idle(b) => b.on_exit(ctx),
            Behavior::Wander(b) => b.on_exit(ctx),
            Behavior::Pursuit(b) => b.on_exit(ctx),
            Behavior::Evade(b) => b.on_exit(ctx),
            Behavior::Tactics(b) => b.on_exit(ctx),
            Behavior::FollowLeader(b) => b.on_exit(ctx),
            Behavior::MeleeAttack(b) => b.on_exit(ctx),
            Behavior::RangedAttack(b) => b.on_exit(ctx),
        }
    }
}
