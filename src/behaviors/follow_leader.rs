//! FollowLeader: escort formation. Holds a slot behind the flock leader;
//! leaderless machines (including the leader itself) stand still.

use serde::{Deserialize, Serialize};

use super::BehaviorCtx;
use crate::brain::Trigger;
use crate::components::SpeedLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowLeaderTuning {
    /// Slot distance behind the leader along its facing.
    pub slot_distance: f32,
    /// Distance past which the follower breaks into a run.
    pub catch_up_distance: f32,
    /// Close enough to the slot to stop.
    pub arrive_distance: f32,
}

impl Default for FollowLeaderTuning {
    fn default() -> Self {
        Self {
            slot_distance: 3.0,
            catch_up_distance: 8.0,
            arrive_distance: 0.5,
        }
    }
}

#[derive(Debug)]
pub struct FollowLeaderBehavior {
    tuning: FollowLeaderTuning,
}

impl FollowLeaderBehavior {
    pub fn new(tuning: FollowLeaderTuning) -> Self {
        Self { tuning }
    }

    pub fn on_init(&mut self, _ctx: &mut BehaviorCtx) {}

    pub fn on_enter(&mut self, _ctx: &mut BehaviorCtx, _prior_had_attack: bool) {}

    pub fn on_update(&mut self, ctx: &mut BehaviorCtx) -> Option<Trigger> {
        let Some(leader) = ctx.leader else {
            ctx.pilot.stop();
            return None;
        };

        let slot = leader.position - leader.facing * self.tuning.slot_distance;
        let dist_sq = ctx.position.distance_squared(slot);

        if dist_sq <= self.tuning.arrive_distance * self.tuning.arrive_distance {
            ctx.pilot.stop();
        } else {
            let speed = if dist_sq > self.tuning.catch_up_distance * self.tuning.catch_up_distance
            {
                SpeedLevel::Run
            } else {
                SpeedLevel::Walk
            };
            ctx.pilot.go_to(ctx.position, slot, speed, ctx.stats);
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
    use crate::behaviors::{Behavior, BehaviorKind, TargetInfo, TuningSet};
    use bevy_ecs::prelude::Entity;
    use glam::Vec3;

    fn follower() -> Behavior {
        let tuning = TuningSet {
            follow_leader: Some(FollowLeaderTuning::default()),
            ..Default::default()
        };
        Behavior::instantiate(BehaviorKind::FollowLeader, &tuning)
    }

    fn leader_at(x: f32) -> TargetInfo {
        TargetInfo {
            entity: Entity::from_raw(50),
            position: Vec3::new(x, 0.0, 0.0),
            facing: Vec3::X,
            radius: 0.5,
        }
    }

    #[test]
    fn test_follower_heads_for_slot_behind_leader() {
        let mut fx = CtxFixture::new();
        fx.leader = Some(leader_at(20.0));
        let mut behavior = follower();
        fx.update(&mut behavior);
        // Slot is at x = 17; follower at origin runs right.
        assert!(fx.pilot.impulse.x > 0.0);
        assert_eq!(fx.pilot.speed, SpeedLevel::Run);
    }

    #[test]
    fn test_follower_walks_when_close() {
        let mut fx = CtxFixture::new();
        fx.position = Vec3::new(12.0, 0.0, 0.0);
        fx.leader = Some(leader_at(20.0));
        let mut behavior = follower();
        fx.update(&mut behavior);
        assert_eq!(fx.pilot.speed, SpeedLevel::Walk);
    }

    #[test]
    fn test_follower_stops_in_slot() {
        let mut fx = CtxFixture::new();
        fx.position = Vec3::new(17.0, 0.0, 0.0);
        fx.leader = Some(leader_at(20.0));
        let mut behavior = follower();
        fx.update(&mut behavior);
        assert_eq!(fx.pilot.impulse, Vec3::ZERO);
    }

    #[test]
    fn test_leaderless_machine_stands_still() {
        let mut fx = CtxFixture::new();
        let mut behavior = follower();
        fx.update(&mut behavior);
        assert_eq!(fx.pilot.impulse, Vec3::ZERO);
    }
}
