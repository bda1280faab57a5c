//! Evade: flee from the enemy while scared, settle once the threat has
//! been gone long enough.

use serde::{Deserialize, Serialize};

use super::BehaviorCtx;
use crate::brain::Trigger;
use crate::components::{PilotAction, Signal, SpeedLevel};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvadeTuning {
    /// Seconds without Warning/Danger before raising `Calm`.
    pub calm_time: f32,
    pub speed: SpeedLevel,
}

impl Default for EvadeTuning {
    fn default() -> Self {
        Self {
            calm_time: 2.0,
            speed: SpeedLevel::Run,
        }
    }
}

#[derive(Debug)]
pub struct EvadeBehavior {
    tuning: EvadeTuning,
    calm_timer: f32,
}

impl EvadeBehavior {
    pub fn new(tuning: EvadeTuning) -> Self {
        Self {
            tuning,
            calm_timer: 0.0,
        }
    }

    pub fn on_init(&mut self, _ctx: &mut BehaviorCtx) {}

    pub fn on_enter(&mut self, ctx: &mut BehaviorCtx, _prior_had_attack: bool) {
        self.calm_timer = self.tuning.calm_time;
        ctx.signals.set(Signal::Alert, true);
    }

    pub fn on_update(&mut self, ctx: &mut BehaviorCtx) -> Option<Trigger> {
        let threatened =
            ctx.signals.get(Signal::Warning) || ctx.signals.get(Signal::Danger);

        if threatened {
            self.calm_timer = self.tuning.calm_time;
            ctx.pilot.press_action(PilotAction::Scared);
            if let Some(enemy) = ctx.enemy {
                ctx.pilot
                    .avoid(ctx.position, enemy.position, self.tuning.speed, ctx.stats);
            }
        } else {
            ctx.pilot.release_action(PilotAction::Scared);
            ctx.pilot.stop();
            self.calm_timer -= ctx.dt;
            if self.calm_timer <= 0.0 {
                return Some(Trigger::Calm);
            }
        }
        None
    }

    pub fn on_exit(&mut self, ctx: &mut BehaviorCtx) {
        ctx.pilot.release_action(PilotAction::Scared);
        ctx.pilot.stop();
        ctx.signals.set(Signal::Alert, false);
    }
}
