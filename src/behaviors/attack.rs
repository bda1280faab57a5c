//! Melee attack: hold position, face the enemy, and run attack cycles in
//! lockstep with the client's animation events.
//!
//! Each cycle walks an explicit phase machine, so repeated or out-of-order
//! animation events cannot double-apply damage.

use serde::{Deserialize, Serialize};

use super::BehaviorCtx;
use crate::brain::Trigger;
use crate::components::{PilotAction, Signal};
use crate::events::{AnimationEvent, CombatRecord};

/// Where the running attack cycle is between animation keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackPhase {
    /// No cycle running; may start one.
    Ready,
    /// Waiting for the projectile-attach keyframe (ranged only).
    WaitingForAttach,
    /// Waiting for the damage/launch keyframe.
    WaitingForDamage,
    /// Waiting for the animation to finish.
    WaitingForEnd,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeleeTuning {
    /// Consecutive attack cycles before backing off.
    pub max_attacks: u32,
    pub damage: f32,
    /// Sensor-dark window requested when the budget runs out, seconds.
    pub retreat_time: f32,
}

impl Default for MeleeTuning {
    fn default() -> Self {
        Self {
            max_attacks: 3,
            damage: 10.0,
            retreat_time: 2.0,
        }
    }
}

#[derive(Debug)]
pub struct MeleeAttackBehavior {
    tuning: MeleeTuning,
    phase: AttackPhase,
    attacks_left: u32,
}

impl MeleeAttackBehavior {
    pub fn new(tuning: MeleeTuning) -> Self {
        Self {
            tuning,
            phase: AttackPhase::Ready,
            attacks_left: 0,
        }
    }

    pub fn on_init(&mut self, _ctx: &mut BehaviorCtx) {}

    pub fn on_enter(&mut self, ctx: &mut BehaviorCtx, _prior_had_attack: bool) {
        self.phase = AttackPhase::Ready;
        self.attacks_left = self.tuning.max_attacks;
        ctx.pilot.stop();
    }

    pub fn on_update(&mut self, ctx: &mut BehaviorCtx) -> Option<Trigger> {
        // Losing the target mid-state would leave the cycle waiting on
        // keyframes that never come; bail out from any phase.
        let Some(enemy) = ctx.enemy else {
            return Some(Trigger::OutOfRange);
        };

        ctx.pilot.stop();
        ctx.pilot.set_direction(enemy.position - ctx.position);

        for event in ctx.events {
            match event {
                AnimationEvent::DealDamage => {
                    if self.phase == AttackPhase::WaitingForDamage {
                        ctx.combat_log.push(CombatRecord::MeleeHit {
                            attacker: ctx.entity,
                            target: enemy.entity,
                            damage: self.tuning.damage,
                        });
                        self.phase = AttackPhase::WaitingForEnd;
                    }
                }
                AnimationEvent::AttackEnd => {
                    if self.phase == AttackPhase::WaitingForEnd {
                        self.phase = AttackPhase::Ready;
                        ctx.pilot.release_action(PilotAction::Attack);
                        if self.attacks_left == 0 {
                            ctx.request_sensor_disable(self.tuning.retreat_time);
                            return Some(Trigger::MaxAttacks);
                        }
                        if !ctx.signals.get(Signal::Danger) {
                            return Some(Trigger::OutOfRange);
                        }
                    }
                }
                AnimationEvent::Interrupt => {
                    self.phase = AttackPhase::Ready;
                    ctx.pilot.release_action(PilotAction::Attack);
                    ctx.view.stop_attack();
                }
                AnimationEvent::AttachProjectile => {}
            }
        }

        if self.phase == AttackPhase::Ready && self.attacks_left > 0 && ctx.view.can_attack {
            self.attacks_left -= 1;
            self.phase = AttackPhase::WaitingForDamage;
            ctx.pilot.press_action(PilotAction::Attack);
            ctx.view.attack();
        }

        None
    }

    pub fn on_exit(&mut self, ctx: &mut BehaviorCtx) {
        self.phase = AttackPhase::Ready;
        ctx.pilot.release_action(PilotAction::Attack);
        ctx.view.stop_attack();
    }
}
