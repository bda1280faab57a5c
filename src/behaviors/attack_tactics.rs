//! AttackTactics: the perception arbiter. Attached alongside the passive
//! behaviors, it keeps the sensor armed and translates the Warning/Danger
//! signals into state-change triggers. After an attack state it holds a
//! cool-down with the sensor dark before re-arming.

use serde::{Deserialize, Serialize};

use super::BehaviorCtx;
use crate::brain::Trigger;
use crate::components::Signal;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TacticsTuning {
    /// Sensor-dark window after leaving an attack state, seconds.
    pub retreat_time: f32,
}

impl Default for TacticsTuning {
    fn default() -> Self {
        Self { retreat_time: 1.5 }
    }
}

#[derive(Debug)]
pub struct TacticsBehavior {
    tuning: TacticsTuning,
    cooldown: f32,
}

impl TacticsBehavior {
    pub fn new(tuning: TacticsTuning) -> Self {
        Self {
            tuning,
            cooldown: 0.0,
        }
    }

    pub fn on_init(&mut self, _ctx: &mut BehaviorCtx) {}

    pub fn on_enter(&mut self, ctx: &mut BehaviorCtx, prior_had_attack: bool) {
        if prior_had_attack {
            self.cooldown = self.tuning.retreat_time;
            ctx.signals.set(Signal::Alert, false);
        } else {
            self.cooldown = 0.0;
            ctx.signals.set(Signal::Alert, true);
        }
    }

    pub fn on_update(&mut self, ctx: &mut BehaviorCtx) -> Option<Trigger> {
        if self.cooldown > 0.0 {
            self.cooldown -= ctx.dt;
            if self.cooldown <= 0.0 {
                ctx.signals.set(Signal::Alert, true);
            }
            return None;
        }

        if ctx.signals.get(Signal::Danger) {
            Some(Trigger::EnemyInRange)
        } else if ctx.signals.get(Signal::Warning) {
            Some(Trigger::EnemyInSight)
        } else {
            Some(Trigger::OutOfRange)
        }
    }

    pub fn on_exit(&mut self, _ctx: &mut BehaviorCtx) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::testkit::CtxFixture;
    use crate::behaviors::{Behavior, BehaviorKind, TuningSet};

    fn tactics(retreat_time: f32) -> Behavior {
        let tuning = TuningSet {
            tactics: Some(TacticsTuning { retreat_time }),
            ..Default::default()
        };
        Behavior::instantiate(BehaviorKind::Tactics, &tuning)
    }

    #[test]
    fn test_arms_sensor_on_enter() {
        let mut fx = CtxFixture::new();
        let mut behavior = tactics(1.0);
        behavior.on_enter(&mut fx.ctx(), false);
        assert!(fx.signals.get(Signal::Alert));
    }

    #[test]
    fn test_danger_beats_warning() {
        let mut fx = CtxFixture::new();
        let mut behavior = tactics(1.0);
        behavior.on_enter(&mut fx.ctx(), false);

        fx.signals.set(Signal::Warning, true);
        assert_eq!(fx.update(&mut behavior), Some(Trigger::EnemyInSight));

        fx.signals.set(Signal::Danger, true);
        assert_eq!(fx.update(&mut behavior), Some(Trigger::EnemyInRange));
    }

    #[test]
    fn test_quiet_signals_raise_out_of_range() {
        let mut fx = CtxFixture::new();
        let mut behavior = tactics(1.0);
        behavior.on_enter(&mut fx.ctx(), false);
        assert_eq!(fx.update(&mut behavior), Some(Trigger::OutOfRange));
    }

    #[test]
    fn test_cooldown_after_attack_state() {
        let mut fx = CtxFixture::new();
        fx.dt = 0.6;
        let mut behavior = tactics(1.0);
        behavior.on_enter(&mut fx.ctx(), true);
        assert!(!fx.signals.get(Signal::Alert));

        // Dark during the cool-down, rearmed afterwards.
        assert_eq!(fx.update(&mut behavior), None);
        assert_eq!(fx.update(&mut behavior), None);
        assert!(fx.signals.get(Signal::Alert));
        assert_eq!(fx.update(&mut behavior), Some(Trigger::OutOfRange));
    }
}
