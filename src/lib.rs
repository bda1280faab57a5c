//! Machine Sim - Game AI Runtime
//!
//! A deterministic, fixed-timestep ECS runtime for per-entity game AI:
//! hierarchical state machines, sensing, steering, and combat resolution.
//! Uses `bevy_ecs` for the entity-component-system architecture.

pub mod api;
pub mod archetypes;
pub mod behaviors;
pub mod brain;
pub mod components;
pub mod events;
pub mod ground;
pub mod occlusion;
pub mod pool;
pub mod spatial;
pub mod systems;
pub mod view;
pub mod world;

pub use api::{SimConfig, SimTick, SimWorld};
pub use brain::{Brain, BrainConfig, BrainConfigError, StateSpec, Trigger};
pub use components::*;
pub use events::{AnimationEvent, Broadcast, CombatLog, CombatRecord};
pub use ground::GroundGrid;
pub use occlusion::Occluders;
pub use pool::ProjectilePool;
pub use spatial::{SpatialEntry, SpatialGrid};
pub use systems::*;
pub use view::{View, ViewCommand};
pub use world::Snapshot;
