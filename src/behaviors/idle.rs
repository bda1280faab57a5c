//! Idle: stand still for a randomized dwell, then ask to move.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::BehaviorCtx;
use crate::brain::Trigger;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdleTuning {
    /// Dwell range in seconds.
    pub dwell_min: f32,
    pub dwell_max: f32,
}

impl Default for IdleTuning {
    fn default() -> Self {
        Self {
            dwell_min: 1.0,
            dwell_max: 3.0,
        }
    }
}

#[derive(Debug)]
pub struct IdleBehavior {
    tuning: IdleTuning,
    timer: f32,
}

impl IdleBehavior {
    pub fn new(tuning: IdleTuning) -> Self {
        Self { tuning, timer: 0.0 }
    }

    pub fn on_init(&mut self, _ctx: &mut BehaviorCtx) {}

    pub fn on_enter(&mut self, ctx: &mut BehaviorCtx, _prior_had_attack: bool) {
        self.timer = ctx.rng.gen_range(self.tuning.dwell_min..=self.tuning.dwell_max);
        ctx.pilot.stop();
    }

    pub fn on_update(&mut self, ctx: &mut BehaviorCtx) -> Option<Trigger> {
        ctx.pilot.stop();
        self.timer -= ctx.dt;
        if self.timer <= 0.0 {
            return Some(Trigger::Move);
        }
        None
    }

    pub fn on_exit(&mut self, _ctx: &mut BehaviorCtx) {}
}
