//! Motion system - turns pilot intent into position and orientation.

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};

use crate::components::{Facing, MachineStats, Pilot, PilotAction, Position, Signals};
use crate::ground::GroundGrid;
use crate::view::View;

/// Resource holding the time delta for the current tick.
#[derive(Resource, Debug, Clone, Copy)]
pub struct DeltaTime(pub f32);

impl Default for DeltaTime {
    fn default() -> Self {
        DeltaTime(1.0 / 30.0) // 30 FPS default
    }
}

/// Below this speed the machine is considered stationary and snaps its
/// facing to pure horizontal.
const SPEED_EPSILON: f32 = 0.01;

/// Vertical component limits for facing: machines tilt down less than up.
const TILT_DOWN_LIMIT: f32 = -0.3;
const TILT_UP_LIMIT: f32 = 0.5;

/// ## Data Access
/// - Reads: Pilot, MachineStats, Signals, GroundGrid (optional)
/// - Writes: Position, Facing, View
pub fn motion_system(
    dt: Res<DeltaTime>,
    ground: Option<Res<GroundGrid>>,
    mut query: Query<(
        &mut Position,
        &mut Facing,
        &mut Pilot,
        &mut View,
        &MachineStats,
        &Signals,
    )>,
) {
    let delta = dt.0;

    for (mut pos, mut facing, mut pilot, mut view, stats, signals) in query.iter_mut() {
        if signals.is_destroyed() {
            view.set_move_speed(0.0);
            continue;
        }

        // Client finished the attack animation: release the held action.
        if view.attack_ended {
            view.attack_ended = false;
            pilot.release_action(PilotAction::Attack);
        }

        let speed = pilot.impulse.length();
        let mut desired = if speed <= SPEED_EPSILON {
            if pilot.is_action_pressed(PilotAction::Attack)
                || pilot.is_action_pressed(PilotAction::Aim)
            {
                // Keep facing the aim direction while attacking in place.
                if pilot.direction.length_squared() > 0.0 {
                    pilot.direction
                } else {
                    facing.0
                }
            } else {
                // Stationary: settle into a pure left/right stance.
                if facing.0.x < 0.0 {
                    Vec3::NEG_X
                } else {
                    Vec3::X
                }
            }
        } else {
            pos.0 += pilot.impulse * delta;
            pilot.direction
        };

        desired.z = 0.0;
        desired.y = desired.y.clamp(TILT_DOWN_LIMIT, TILT_UP_LIMIT);
        let desired = desired.normalize_or_zero();

        if desired != Vec3::ZERO {
            facing.0 = rotate_towards(
                facing.0,
                desired,
                stats.orientation_speed.to_radians() * delta,
            );
        }

        if let Some(ground) = ground.as_ref() {
            pos.0.y = ground.height_at(pos.0.x);
        }

        view.set_move_speed(speed);
        view.set_scared(pilot.is_action_pressed(PilotAction::Scared));
    }
}

/// Rotate `from` toward `to` by at most `max_angle` radians.
fn rotate_towards(from: Vec3, to: Vec3, max_angle: f32) -> Vec3 {
    let from = from.normalize_or_zero();
    if from == Vec3::ZERO {
        return to;
    }
    let angle = from.angle_between(to);
    if angle < 1e-4 || angle <= max_angle {
        return to;
    }
    let rot = Quat::from_rotation_arc(from, to);
    let step = Quat::IDENTITY.slerp(rot, max_angle / angle);
    (step * from).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::SpeedLevel;
    use crate::view::ViewCommand;

    fn spawn_machine(world: &mut World, pilot: Pilot) -> Entity {
        world
            .spawn((
                Position::new(0.0, 0.0, 0.0),
                Facing::default(),
                pilot,
                View::default(),
                MachineStats::default(),
                Signals::default(),
            ))
            .id()
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(motion_system);
        schedule.run(world);
    }

    #[test]
    fn test_impulse_integrates_position() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.5));

        let mut pilot = Pilot::default();
        let stats = MachineStats::default();
        pilot.go_to(
            Vec3::ZERO,
            Vec3::new(100.0, 0.0, 0.0),
            SpeedLevel::Walk,
            &stats,
        );
        let entity = spawn_machine(&mut world, pilot);

        run(&mut world);

        let pos = world.get::<Position>(entity).unwrap();
        assert!((pos.0.x - stats.walk_speed * 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_stationary_facing_snaps_horizontal() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(10.0)); // plenty of turn budget

        let entity = spawn_machine(&mut world, Pilot::default());
        world.get_mut::<Facing>(entity).unwrap().0 =
            Vec3::new(-0.7, 0.5, 0.0).normalize();

        run(&mut world);

        let facing = world.get::<Facing>(entity).unwrap();
        assert!((facing.0 - Vec3::NEG_X).length() < 1e-3);
    }

    #[test]
    fn test_turn_rate_is_capped() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0 / 30.0));

        let mut pilot = Pilot::default();
        let stats = MachineStats::default();
        pilot.go_to(
            Vec3::ZERO,
            Vec3::new(-100.0, 0.0, 0.0),
            SpeedLevel::Walk,
            &stats,
        );
        let entity = spawn_machine(&mut world, pilot);

        run(&mut world);

        // A 180 degree turn cannot complete in one tick at 180 deg/s.
        let facing = world.get::<Facing>(entity).unwrap();
        assert!(facing.0.x > -0.9);
    }

    #[test]
    fn test_ground_snap() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0 / 30.0));
        world.insert_resource(GroundGrid::flat(3.0));

        let entity = spawn_machine(&mut world, Pilot::default());
        run(&mut world);

        let pos = world.get::<Position>(entity).unwrap();
        assert_eq!(pos.0.y, 3.0);
    }

    #[test]
    fn test_attack_ended_releases_attack_action() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0 / 30.0));

        let mut pilot = Pilot::default();
        pilot.press_action(PilotAction::Attack);
        let entity = spawn_machine(&mut world, pilot);
        world.get_mut::<View>(entity).unwrap().attack_ended = true;

        run(&mut world);

        let pilot = world.get::<Pilot>(entity).unwrap();
        assert!(!pilot.is_action_pressed(PilotAction::Attack));
        assert!(!world.get::<View>(entity).unwrap().attack_ended);
    }

    #[test]
    fn test_move_speed_forwarded_to_view() {
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0 / 30.0));

        let mut pilot = Pilot::default();
        let stats = MachineStats::default();
        pilot.go_to(
            Vec3::ZERO,
            Vec3::new(100.0, 0.0, 0.0),
            SpeedLevel::Run,
            &stats,
        );
        let entity = spawn_machine(&mut world, pilot);

        run(&mut world);

        let commands = world.get_mut::<View>(entity).unwrap().drain_commands();
        assert!(commands
            .iter()
            .any(|c| matches!(c, ViewCommand::Move(s) if (*s - stats.run_speed).abs() < 1e-3)));
    }
}
