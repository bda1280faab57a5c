//! ECS Systems for the machine AI runtime.
//!
//! Systems contain the per-tick logic that operates on components. The
//! schedule is chained; each tick runs the groups in a fixed order:
//!
//! 1. `spatial_grid_update_system` - rebuilds the spatial grid
//! 2. `target_registry_system` - snapshots living machines for lookups
//! 3. `flock_system` - group registration and leader promotion
//! 4. `sensor_system` - perception probes, Warning/Danger signals
//! 5. `brain_dispatch_system` - runs the active state's behaviors
//! 6. `motion_system` - turns pilot intent into position and facing
//! 7. `eater_system` - resolves hungry machines eating edible ones
//! 8. `projectile_system` - projectile flight, hits, pool returns

pub mod dispatch;
pub mod eater;
pub mod flock;
pub mod motion;
pub mod projectile;
pub mod registry;
pub mod sensor;

pub use dispatch::*;
pub use eater::*;
pub use flock::*;
pub use motion::*;
pub use projectile::*;
pub use registry::*;
pub use sensor::*;
