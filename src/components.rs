//! ECS Components for the machine AI runtime.
//!
//! Components are pure data containers attached to entities.
//! All behavior logic lives in the brain dispatch and the per-tick systems.

use bevy_ecs::prelude::*;
use glam::Vec3;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 3D world position. The gameplay plane is XY (x = horizontal, y = vertical);
/// z is scene depth and is ignored by perception and steering.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position(pub Vec3);

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    /// Squared distance in the gameplay plane (z ignored).
    pub fn planar_dist_sq(&self, other: Vec3) -> f32 {
        let dx = self.0.x - other.x;
        let dy = self.0.y - other.y;
        dx * dx + dy * dy
    }
}

/// Unit facing direction. Machines spawn facing +X.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Facing(pub Vec3);

impl Default for Facing {
    fn default() -> Self {
        Self(Vec3::X)
    }
}

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Client-assigned identifier, stable across snapshots.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MachineId(pub u32);

/// Coarse category used by the spatial index and eat resolution.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Externally-driven target (the player). Never brain-controlled.
    Player,
    #[default]
    Prey,
    Predator,
}

impl Category {
    pub fn as_u8(&self) -> u8 {
        match self {
            Category::Player => 0,
            Category::Prey => 1,
            Category::Predator => 2,
        }
    }
}

/// Per-archetype movement tuning.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MachineStats {
    /// Walk speed (units per second).
    pub walk_speed: f32,
    /// Run speed (units per second).
    pub run_speed: f32,
    /// Body radius, granted as a distance allowance to sensors probing
    /// for this machine.
    pub radius: f32,
    /// Maximum turn rate (degrees per second).
    pub orientation_speed: f32,
}

impl Default for MachineStats {
    fn default() -> Self {
        Self {
            walk_speed: 2.5,
            run_speed: 6.0,
            radius: 0.5,
            orientation_speed: 180.0,
        }
    }
}

// ============================================================================
// SIGNALS
// ============================================================================

/// Named boolean signals forming the per-machine blackboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// This machine leads its flock.
    Leader,
    /// Machine wants to eat; gates eat resolution.
    Hungry,
    /// Sensor probes only while alert.
    Alert,
    /// Target detected inside the far ring.
    Warning,
    /// Target detected inside the near ring and field of view.
    Danger,
    /// Machine cannot act.
    Panic,
    /// Attacks resolve as melee strikes.
    Melee,
    /// Attacks resolve as projectile shots.
    Ranged,
    /// Machine is dead; systems skip it.
    Destroyed,
}

impl Signal {
    pub const COUNT: usize = 9;

    pub const ALL: [Signal; Signal::COUNT] = [
        Signal::Leader,
        Signal::Hungry,
        Signal::Alert,
        Signal::Warning,
        Signal::Danger,
        Signal::Panic,
        Signal::Melee,
        Signal::Ranged,
        Signal::Destroyed,
    ];

    #[inline]
    fn index(&self) -> usize {
        match self {
            Signal::Leader => 0,
            Signal::Hungry => 1,
            Signal::Alert => 2,
            Signal::Warning => 3,
            Signal::Danger => 4,
            Signal::Panic => 5,
            Signal::Melee => 6,
            Signal::Ranged => 7,
            Signal::Destroyed => 8,
        }
    }
}

/// Per-machine boolean blackboard. Unset signals read as `false`.
#[derive(Component, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Signals {
    values: [bool; Signal::COUNT],
}

impl Signals {
    /// Overwrite semantics; the last write within a tick wins.
    pub fn set(&mut self, signal: Signal, value: bool) {
        self.values[signal.index()] = value;
    }

    /// Never fails; a signal that was never set reads as `false`.
    pub fn get(&self, signal: Signal) -> bool {
        self.values[signal.index()]
    }

    pub fn is_destroyed(&self) -> bool {
        self.get(Signal::Destroyed)
    }

    pub fn reset(&mut self) {
        self.values = [false; Signal::COUNT];
    }
}

// ============================================================================
// PILOT (actuator intent)
// ============================================================================

/// Discrete actions a behavior can hold pressed on the pilot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PilotAction {
    Attack,
    Aim,
    Stop,
    Scared,
}

impl PilotAction {
    pub const COUNT: usize = 4;

    #[inline]
    fn index(&self) -> usize {
        match self {
            PilotAction::Attack => 0,
            PilotAction::Aim => 1,
            PilotAction::Stop => 2,
            PilotAction::Scared => 3,
        }
    }
}

/// Discretized speed intent. Actual units come from `MachineStats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedLevel {
    #[default]
    Stop,
    Walk,
    Run,
}

impl SpeedLevel {
    pub fn units_per_sec(&self, stats: &MachineStats) -> f32 {
        match self {
            SpeedLevel::Stop => 0.0,
            SpeedLevel::Walk => stats.walk_speed,
            SpeedLevel::Run => stats.run_speed,
        }
    }
}

/// Actuator-intent holder. The active behaviors write it each tick; the
/// motion system is the only reader that turns it into movement.
#[derive(Component, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pilot {
    /// Desired facing/travel direction (unit vector, gameplay plane).
    pub direction: Vec3,
    /// Desired speed level.
    pub speed: SpeedLevel,
    /// Position integration vector consumed by motion (units/sec).
    pub impulse: Vec3,
    actions: [bool; PilotAction::COUNT],
}

impl Pilot {
    pub fn set_direction(&mut self, dir: Vec3) {
        self.direction = dir.normalize_or_zero();
    }

    /// Idempotent: pressing an already-pressed action is a no-op.
    pub fn press_action(&mut self, action: PilotAction) {
        self.actions[action.index()] = true;
    }

    /// Idempotent: releasing an unpressed action is a no-op.
    pub fn release_action(&mut self, action: PilotAction) {
        self.actions[action.index()] = false;
    }

    pub fn is_action_pressed(&self, action: PilotAction) -> bool {
        self.actions[action.index()]
    }

    /// Steer toward a point in the gameplay plane at the given speed level.
    pub fn go_to(&mut self, from: Vec3, target: Vec3, speed: SpeedLevel, stats: &MachineStats) {
        let to_target = Vec3::new(target.x - from.x, target.y - from.y, 0.0);
        self.direction = to_target.normalize_or_zero();
        self.speed = speed;
        self.impulse = self.direction * speed.units_per_sec(stats);
    }

    /// Steer directly away from a point.
    pub fn avoid(&mut self, from: Vec3, threat: Vec3, speed: SpeedLevel, stats: &MachineStats) {
        let away = Vec3::new(from.x - threat.x, from.y - threat.y, 0.0);
        self.direction = away.normalize_or_zero();
        self.speed = speed;
        self.impulse = self.direction * speed.units_per_sec(stats);
    }

    /// Zero all movement intent. Pressed actions are left untouched.
    pub fn stop(&mut self) {
        self.speed = SpeedLevel::Stop;
        self.impulse = Vec3::ZERO;
    }

    pub fn release_all_actions(&mut self) {
        self.actions = [false; PilotAction::COUNT];
    }
}

// ============================================================================
// TARGET / GROUP COMPONENTS
// ============================================================================

/// Weak reference to the current enemy. Consumers resolve it through the
/// target registry each use; a despawned enemy resolves to "not found".
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Enemy(pub Option<Entity>);

/// Flock membership handle. Leadership is tracked in the `Groups` resource
/// and surfaced through the `Leader` signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u32);

#[derive(Component, Debug, Clone, Copy)]
pub struct Flock {
    pub group: GroupId,
}

/// World position the machine spawned at; wander keeps to a band around it.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SpawnOrigin(pub Vec3);

// ============================================================================
// SENSOR
// ============================================================================

/// Static perception tuning. Read-only at runtime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensorParams {
    /// Sensor position offset from the machine position.
    pub offset: Vec3,
    /// Near ring radius (raises `Danger`).
    pub min_radius: f32,
    /// Far ring radius (raises `Warning`).
    pub max_radius: f32,
    /// Total field-of-view width in degrees; >= 360 disables the angle check.
    pub angle: f32,
    /// Rotation of the field of view relative to facing, degrees.
    pub angle_offset: f32,
    /// Probe-delay range in seconds; each probe re-arms with a random delay.
    pub delay_min: f32,
    pub delay_max: f32,
}

impl Default for SensorParams {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            min_radius: 5.0,
            max_radius: 15.0,
            angle: 360.0,
            angle_offset: 0.0,
            delay_min: 0.2,
            delay_max: 0.5,
        }
    }
}

/// Perception module state. The countdown timer throttles probing; the
/// disable window shuts the sensor down entirely (attack retreat).
#[derive(Component, Debug, Clone, Default)]
pub struct Sensor {
    pub params: SensorParams,
    /// Time until the next probe.
    pub timer: f32,
    /// Remaining disable window; > 0 means the sensor is offline.
    pub disabled: f32,
}

impl Sensor {
    pub fn new(params: SensorParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Shut the sensor down for the given window.
    pub fn disable(&mut self, seconds: f32) {
        self.disabled = self.disabled.max(seconds);
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled > 0.0
    }
}

// ============================================================================
// EATING
// ============================================================================

/// Machines that consume edible machines while `Hungry`.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Eater {
    /// Bite reach in world units.
    pub eat_radius: f32,
}

impl Default for Eater {
    fn default() -> Self {
        Self { eat_radius: 1.5 }
    }
}

/// Machines that can be consumed. Reward is credited in the eat record.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Edible {
    pub reward: f32,
}

impl Default for Edible {
    fn default() -> Self {
        Self { reward: 10.0 }
    }
}
