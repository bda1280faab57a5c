//! Canonical brain configurations.
//!
//! These play the role per-archetype content data plays in a full game:
//! ready-made state graphs for the common machine kinds. Clients with
//! bespoke needs build their own `BrainConfig` directly.

use std::sync::Arc;

use crate::behaviors::{
    BehaviorKind, EvadeTuning, FollowLeaderTuning, IdleTuning, MeleeTuning, PursuitTuning,
    RangedTuning, TacticsTuning, TuningSet, WanderTuning,
};
use crate::brain::{BrainConfig, BrainConfigError, StateSpec, Trigger};

/// Melee predator: rests, wanders, chases what it sees, bites what it
/// catches.
pub fn stalker_brain() -> Result<Arc<BrainConfig>, BrainConfigError> {
    let tuning = TuningSet {
        idle: Some(IdleTuning::default()),
        wander: Some(WanderTuning::default()),
        pursuit: Some(PursuitTuning::default()),
        tactics: Some(TacticsTuning::default()),
        melee: Some(MeleeTuning::default()),
        ..Default::default()
    };

    BrainConfig::build(
        vec![
            StateSpec::new("rest", vec![BehaviorKind::Idle, BehaviorKind::Tactics])
                .on(Trigger::Move, "wander")
                .on(Trigger::EnemyInSight, "chase")
                .on(Trigger::EnemyInRange, "attack")
                .on(Trigger::OutOfRange, "rest"),
            StateSpec::new("wander", vec![BehaviorKind::Wander, BehaviorKind::Tactics])
                .on(Trigger::Rest, "rest")
                .on(Trigger::EnemyInSight, "chase")
                .on(Trigger::EnemyInRange, "attack")
                .on(Trigger::OutOfRange, "wander"),
            StateSpec::new("chase", vec![BehaviorKind::Pursuit, BehaviorKind::Tactics])
                .on(Trigger::EnemyInSight, "chase")
                .on(Trigger::EnemyInRange, "attack")
                .on(Trigger::OutOfRange, "rest"),
            StateSpec::new("attack", vec![BehaviorKind::MeleeAttack])
                .on(Trigger::OutOfRange, "chase")
                .on(Trigger::MaxAttacks, "rest"),
        ],
        "rest",
        tuning,
    )
}

/// Grazing prey: rests, grazes, and runs scared from anything it senses.
pub fn grazer_brain() -> Result<Arc<BrainConfig>, BrainConfigError> {
    let tuning = TuningSet {
        idle: Some(IdleTuning::default()),
        wander: Some(WanderTuning::default()),
        tactics: Some(TacticsTuning::default()),
        evade: Some(EvadeTuning::default()),
        ..Default::default()
    };

    BrainConfig::build(
        vec![
            StateSpec::new("rest", vec![BehaviorKind::Idle, BehaviorKind::Tactics])
                .on(Trigger::Move, "graze")
                .on(Trigger::EnemyInSight, "flee")
                .on(Trigger::EnemyInRange, "flee")
                .on(Trigger::OutOfRange, "rest"),
            StateSpec::new("graze", vec![BehaviorKind::Wander, BehaviorKind::Tactics])
                .on(Trigger::Rest, "rest")
                .on(Trigger::EnemyInSight, "flee")
                .on(Trigger::EnemyInRange, "flee")
                .on(Trigger::OutOfRange, "graze"),
            StateSpec::new("flee", vec![BehaviorKind::Evade]).on(Trigger::Calm, "rest"),
        ],
        "rest",
        tuning,
    )
}

/// Stationary turret platform: holds position and fires pooled
/// projectiles at anything in range.
pub fn warboat_brain() -> Result<Arc<BrainConfig>, BrainConfigError> {
    let tuning = TuningSet {
        idle: Some(IdleTuning::default()),
        tactics: Some(TacticsTuning::default()),
        ranged: Some(RangedTuning::default()),
        ..Default::default()
    };

    BrainConfig::build(
        vec![
            StateSpec::new("patrol", vec![BehaviorKind::Idle, BehaviorKind::Tactics])
                .on(Trigger::Move, "patrol")
                .on(Trigger::EnemyInSight, "patrol")
                .on(Trigger::EnemyInRange, "attack")
                .on(Trigger::OutOfRange, "patrol"),
            StateSpec::new("attack", vec![BehaviorKind::RangedAttack])
                .on(Trigger::OutOfRange, "patrol")
                .on(Trigger::MaxAttacks, "patrol"),
        ],
        "patrol",
        tuning,
    )
}

/// Escort: shadows its flock leader, breaking formation to strike.
pub fn escort_brain() -> Result<Arc<BrainConfig>, BrainConfigError> {
    let tuning = TuningSet {
        follow_leader: Some(FollowLeaderTuning::default()),
        tactics: Some(TacticsTuning::default()),
        melee: Some(MeleeTuning::default()),
        ..Default::default()
    };

    BrainConfig::build(
        vec![
            StateSpec::new(
                "follow",
                vec![BehaviorKind::FollowLeader, BehaviorKind::Tactics],
            )
            .on(Trigger::EnemyInSight, "follow")
            .on(Trigger::EnemyInRange, "attack")
            .on(Trigger::OutOfRange, "follow"),
            StateSpec::new("attack", vec![BehaviorKind::MeleeAttack])
                .on(Trigger::OutOfRange, "follow")
                .on(Trigger::MaxAttacks, "follow"),
        ],
        "follow",
        tuning,
    )
}
