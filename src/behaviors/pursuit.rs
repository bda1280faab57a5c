//! Pursuit: run toward the current enemy. With no visible enemy the
//! machine holds position and waits for the arbiter to move it on.

use serde::{Deserialize, Serialize};

use super::BehaviorCtx;
use crate::brain::Trigger;
use crate::components::SpeedLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PursuitTuning {
    pub speed: SpeedLevel,
}

impl Default for PursuitTuning {
    fn default() -> Self {
        Self {
            speed: SpeedLevel::Run,
        }
    }
}

#[derive(Debug)]
pub struct PursuitBehavior {
    tuning: PursuitTuning,
}

impl PursuitBehavior {
    pub fn new(tuning: PursuitTuning) -> Self {
        Self { tuning }
    }

    pub fn on_init(&mut self, _ctx: &mut BehaviorCtx) {}

    pub fn on_enter(&mut self, _ctx: &mut BehaviorCtx, _prior_had_attack: bool) {}

    pub fn on_update(&mut self, ctx: &mut BehaviorCtx) -> Option<Trigger> {
        match ctx.enemy {
            Some(enemy) => {
                ctx.pilot
                    .go_to(ctx.position, enemy.position, self.tuning.speed, ctx.stats);
            }
            None => {
                // Lost enemy: stand still rather than chase a stale point.
                ctx.pilot.stop();
            }
        }
        None
    }

    pub fn on_exit(&mut self, ctx: &mut BehaviorCtx) {
        ctx.pilot.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::testkit::CtxFixture;
    use crate::behaviors::{Behavior, BehaviorKind, TuningSet};
    use glam::Vec3;

    fn pursuit() -> Behavior {
        let tuning = TuningSet {
            pursuit: Some(PursuitTuning::default()),
            ..Default::default()
        };
        Behavior::instantiate(BehaviorKind::Pursuit, &tuning)
    }

    #[test]
    fn test_pursuit_runs_at_enemy() {
        let mut fx = CtxFixture::new().enemy_at(10.0, 0.0);
        let mut behavior = pursuit();
        behavior.on_enter(&mut fx.ctx(), false);
        fx.update(&mut behavior);
        assert!(fx.pilot.impulse.x > 0.0);
        assert_eq!(fx.pilot.speed, SpeedLevel::Run);
    }

    #[test]
    fn test_pursuit_without_enemy_holds_position() {
        let mut fx = CtxFixture::new();
        let mut behavior = pursuit();
        behavior.on_enter(&mut fx.ctx(), false);
        fx.update(&mut behavior);
        assert_eq!(fx.pilot.impulse, Vec3::ZERO);
        assert_eq!(fx.pilot.speed, SpeedLevel::Stop);
    }
}
