//! Ranged/turret attack: aim a turret at the enemy, then fire pooled
//! projectiles in lockstep with the client's animation events.
//!
//! Projectile ownership is strict: an instance checked out on the attach
//! keyframe is either launched on the damage keyframe (the flight system
//! returns it) or handed back on interrupt/exit.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::attack::AttackPhase;
use super::BehaviorCtx;
use crate::brain::Trigger;
use crate::components::{PilotAction, Signal};
use crate::events::{AnimationEvent, CombatRecord};
use crate::pool::PooledInstance;
use crate::systems::projectile::ProjectileLaunch;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangedTuning {
    /// Name of the projectile pool this attacker fires from.
    pub pool: String,
    pub pool_size: usize,
    /// Consecutive shots before backing off.
    pub max_attacks: u32,
    /// Aim hold before each shot, seconds.
    pub aim_time: f32,
    /// Turret turn rate, degrees per second.
    pub turret_speed: f32,
    pub projectile_speed: f32,
    pub projectile_ttl: f32,
    pub damage: f32,
    /// Sensor-dark window requested when the budget runs out, seconds.
    pub retreat_time: f32,
}

impl Default for RangedTuning {
    fn default() -> Self {
        Self {
            pool: "projectile".to_string(),
            pool_size: 4,
            max_attacks: 3,
            aim_time: 1.0,
            turret_speed: 120.0,
            projectile_speed: 12.0,
            projectile_ttl: 4.0,
            damage: 15.0,
            retreat_time: 3.0,
        }
    }
}

#[derive(Debug)]
pub struct RangedAttackBehavior {
    tuning: RangedTuning,
    phase: AttackPhase,
    shots_left: u32,
    aim_timer: f32,
    turret_dir: Vec3,
    instance: Option<PooledInstance>,
}

impl RangedAttackBehavior {
    pub fn new(tuning: RangedTuning) -> Self {
        Self {
            tuning,
            phase: AttackPhase::Ready,
            shots_left: 0,
            aim_timer: 0.0,
            turret_dir: Vec3::X,
            instance: None,
        }
    }

    fn abort_cycle(&mut self, ctx: &mut BehaviorCtx) {
        if let Some(instance) = self.instance.take() {
            ctx.pool.return_instance(instance);
        }
        self.phase = AttackPhase::Ready;
        ctx.pilot.release_action(PilotAction::Attack);
        ctx.view.stop_attack();
    }

    /// Rotate the turret toward the enemy at the capped turn rate and
    /// publish the aim blend: the signed sine of the angle from the body
    /// facing to the turret, for the client's directional animation.
    fn track_enemy(&mut self, ctx: &mut BehaviorCtx) {
        let Some(enemy) = ctx.enemy else { return };
        let desired = Vec3::new(
            enemy.position.x - ctx.position.x,
            enemy.position.y - ctx.position.y,
            0.0,
        )
        .normalize_or_zero();
        if desired == Vec3::ZERO {
            return;
        }

        let angle = self.turret_dir.angle_between(desired);
        let max_step = self.tuning.turret_speed.to_radians() * ctx.dt;
        if angle <= max_step || angle < 1e-4 {
            self.turret_dir = desired;
        } else {
            let rot = glam::Quat::from_rotation_arc(self.turret_dir, desired);
            let step = glam::Quat::IDENTITY.slerp(rot, max_step / angle);
            self.turret_dir = (step * self.turret_dir).normalize_or_zero();
        }

        let blend = ctx.facing.cross(self.turret_dir).z;
        ctx.view.aim(blend);
    }

    pub fn on_init(&mut self, ctx: &mut BehaviorCtx) {
        if !ctx.pool.has_pool(&self.tuning.pool) {
            ctx.pool.create_pool(&self.tuning.pool, self.tuning.pool_size);
        }
    }

    pub fn on_enter(&mut self, ctx: &mut BehaviorCtx, _prior_had_attack: bool) {
        self.phase = AttackPhase::Ready;
        self.shots_left = self.tuning.max_attacks;
        self.aim_timer = self.tuning.aim_time;
        self.turret_dir = ctx.facing;
        self.instance = None;
        ctx.pilot.stop();
        ctx.pilot.press_action(PilotAction::Aim);
    }

    pub fn on_update(&mut self, ctx: &mut BehaviorCtx) -> Option<Trigger> {
        if ctx.area_entered {
            // Pool contents were rebuilt; any held handle is stale.
            ctx.pool.create_pool(&self.tuning.pool, self.tuning.pool_size);
            self.instance = None;
        }

        // Losing the target mid-state would leave the cycle waiting on
        // keyframes that never come; bail out from any phase. The exit
        // path hands back any held instance.
        if ctx.enemy.is_none() {
            return Some(Trigger::OutOfRange);
        }

        ctx.pilot.stop();
        self.track_enemy(ctx);

        for event in ctx.events {
            match event {
                AnimationEvent::AttachProjectile => {
                    if self.phase == AttackPhase::WaitingForAttach {
                        match ctx.pool.get_instance(&self.tuning.pool) {
                            Some(instance) => {
                                self.instance = Some(instance);
                                self.phase = AttackPhase::WaitingForDamage;
                            }
                            None => self.abort_cycle(ctx),
                        }
                    }
                }
                AnimationEvent::DealDamage => {
                    if self.phase == AttackPhase::WaitingForDamage {
                        if let Some(instance) = self.instance.take() {
                            ctx.launches.push(ProjectileLaunch {
                                shooter: ctx.entity,
                                instance,
                                origin: ctx.position,
                                velocity: self.turret_dir * self.tuning.projectile_speed,
                                ttl: self.tuning.projectile_ttl,
                                damage: self.tuning.damage,
                                target: ctx.enemy.map(|e| e.entity),
                            });
                            ctx.combat_log.push(CombatRecord::ProjectileLaunched {
                                shooter: ctx.entity,
                                pool: self.tuning.pool.clone(),
                            });
                        }
                        self.phase = AttackPhase::WaitingForEnd;
                    }
                }
                AnimationEvent::AttackEnd => {
                    if self.phase == AttackPhase::WaitingForEnd {
                        self.phase = AttackPhase::Ready;
                        ctx.pilot.release_action(PilotAction::Attack);
                        if self.shots_left == 0 {
                            ctx.request_sensor_disable(self.tuning.retreat_time);
                            return Some(Trigger::MaxAttacks);
                        }
                        if !ctx.signals.get(Signal::Danger) {
                            return Some(Trigger::OutOfRange);
                        }
                    }
                }
                AnimationEvent::Interrupt => self.abort_cycle(ctx),
            }
        }

        if self.phase == AttackPhase::Ready {
            self.aim_timer -= ctx.dt;
            if self.aim_timer <= 0.0 && self.shots_left > 0 && ctx.view.can_attack {
                self.shots_left -= 1;
                self.aim_timer = self.tuning.aim_time;
                self.phase = AttackPhase::WaitingForAttach;
                ctx.pilot.press_action(PilotAction::Attack);
                ctx.view.attack();
            }
        }

        None
    }

    pub fn on_exit(&mut self, ctx: &mut BehaviorCtx) {
        if let Some(instance) = self.instance.take() {
            // Un-launched projectile goes back untouched.
            ctx.pool.return_instance(instance);
        }
        self.phase = AttackPhase::Ready;
        ctx.pilot.release_action(PilotAction::Attack);
        ctx.pilot.release_action(PilotAction::Aim);
        ctx.view.stop_attack();
    }
}
