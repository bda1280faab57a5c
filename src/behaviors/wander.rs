//! GroundWander: amble between random targets in a band around the spawn
//! origin, then ask to rest.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::BehaviorCtx;
use crate::brain::Trigger;
use crate::components::SpeedLevel;

/// A machine closer than this to its target picks a fresh one.
const ARRIVE_EPSILON: f32 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WanderTuning {
    /// Half-width of the wander band around the spawn origin.
    pub radius: f32,
    /// Leg duration range in seconds before resting.
    pub leg_min: f32,
    pub leg_max: f32,
    pub speed: SpeedLevel,
}

impl Default for WanderTuning {
    fn default() -> Self {
        Self {
            radius: 10.0,
            leg_min: 2.0,
            leg_max: 5.0,
            speed: SpeedLevel::Walk,
        }
    }
}

#[derive(Debug)]
pub struct WanderBehavior {
    tuning: WanderTuning,
    target: Option<Vec3>,
    leg_timer: f32,
}

impl WanderBehavior {
    pub fn new(tuning: WanderTuning) -> Self {
        Self {
            tuning,
            target: None,
            leg_timer: 0.0,
        }
    }

    fn roll_target(&mut self, ctx: &mut BehaviorCtx) -> Vec3 {
        let r = self.tuning.radius;
        let target = ctx.spawn_origin + Vec3::new(ctx.rng.gen_range(-r..=r), 0.0, 0.0);
        self.target = Some(target);
        target
    }

    pub fn on_init(&mut self, _ctx: &mut BehaviorCtx) {}

    pub fn on_enter(&mut self, ctx: &mut BehaviorCtx, _prior_had_attack: bool) {
        self.leg_timer = ctx.rng.gen_range(self.tuning.leg_min..=self.tuning.leg_max);
        self.roll_target(ctx);
    }

    pub fn on_update(&mut self, ctx: &mut BehaviorCtx) -> Option<Trigger> {
        self.leg_timer -= ctx.dt;
        if self.leg_timer <= 0.0 {
            return Some(Trigger::Rest);
        }

        let mut target = match self.target {
            Some(t) => t,
            None => self.roll_target(ctx),
        };

        if Vec3::new(target.x - ctx.position.x, target.y - ctx.position.y, 0.0).length_squared()
            < ARRIVE_EPSILON * ARRIVE_EPSILON
        {
            target = self.roll_target(ctx);
        }

        ctx.pilot
            .go_to(ctx.position, target, self.tuning.speed, ctx.stats);
        None
    }

    pub fn on_exit(&mut self, ctx: &mut BehaviorCtx) {
        ctx.pilot.stop();
        self.target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::testkit::CtxFixture;
    use crate::behaviors::{Behavior, BehaviorKind, TuningSet};

    fn wander(leg: f32) -> Behavior {
        let tuning = TuningSet {
            wander: Some(WanderTuning {
                radius: 10.0,
                leg_min: leg,
                leg_max: leg,
                speed: SpeedLevel::Walk,
            }),
            ..Default::default()
        };
        Behavior::instantiate(BehaviorKind::Wander, &tuning)
    }

    fn inner(behavior: &mut Behavior) -> &mut WanderBehavior {
        match behavior {
            Behavior::Wander(b) => b,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_wander_steers_toward_target() {
        let mut fx = CtxFixture::new();
        let mut behavior = wander(100.0);
        behavior.on_enter(&mut fx.ctx(), false);

        assert_eq!(fx.update(&mut behavior), None);
        let target = inner(&mut behavior).target.unwrap();
        let expected_sign = (target.x - fx.position.x).signum();
        assert_eq!(fx.pilot.direction.x.signum(), expected_sign);
        assert_eq!(fx.pilot.speed, SpeedLevel::Walk);
    }

    #[test]
    fn test_wander_rerolls_near_target() {
        let mut fx = CtxFixture::new();
        let mut behavior = wander(100.0);
        behavior.on_enter(&mut fx.ctx(), false);
        fx.update(&mut behavior);

        // Teleport next to the target; the following update must re-roll.
        let old_target = inner(&mut behavior).target.unwrap();
        fx.position = old_target + Vec3::new(0.05, 0.0, 0.0);
        fx.update(&mut behavior);
        let new_target = inner(&mut behavior).target.unwrap();
        assert_ne!(old_target, new_target);
    }

    #[test]
    fn test_wander_rests_after_leg() {
        let mut fx = CtxFixture::new();
        fx.dt = 0.6;
        let mut behavior = wander(0.5);
        behavior.on_enter(&mut fx.ctx(), false);
        assert_eq!(fx.update(&mut behavior), Some(Trigger::Rest));
    }
}
