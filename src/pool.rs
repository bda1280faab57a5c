//! Named projectile pools.
//!
//! Every projectile a machine fires is a checked-out pool instance; the
//! instance must be returned exactly once, either by the projectile flight
//! system or by the attack behavior's exit path. Pools are (re)created
//! idempotently when the play area is entered.

use bevy_ecs::prelude::*;
use std::collections::HashMap;
use tracing::warn;

/// Handle to a checked-out pool instance. The generation ties the handle
/// to the pool epoch it was checked out of.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PooledInstance {
    pub pool: String,
    pub index: usize,
    generation: u64,
}

#[derive(Debug)]
struct Pool {
    size: usize,
    generation: u64,
    available: Vec<usize>,
}

impl Pool {
    fn new(size: usize, generation: u64) -> Self {
        Self {
            size,
            generation,
            available: (0..size).rev().collect(),
        }
    }
}

/// Registry of named projectile pools.
#[derive(Resource, Debug, Default)]
pub struct ProjectilePool {
    pools: HashMap<String, Pool>,
}

impl ProjectilePool {
    /// Create or recreate a pool. Recreation bumps the pool's generation,
    /// drops all outstanding checkouts, and restores the pool to fully
    /// available; handles from the previous generation can no longer be
    /// returned.
    pub fn create_pool(&mut self, name: &str, size: usize) {
        let generation = self
            .pools
            .get(name)
            .map(|p| p.generation.wrapping_add(1))
            .unwrap_or(0);
        self.pools.insert(name.to_string(), Pool::new(size, generation));
    }

    pub fn has_pool(&self, name: &str) -> bool {
        self.pools.contains_key(name)
    }

    /// Check out an instance. Returns `None` when the pool is missing or
    /// exhausted; callers treat that as "cannot fire this cycle".
    pub fn get_instance(&mut self, name: &str) -> Option<PooledInstance> {
        let pool = self.pools.get_mut(name)?;
        match pool.available.pop() {
            Some(index) => Some(PooledInstance {
                pool: name.to_string(),
                index,
                generation: pool.generation,
            }),
            None => {
                warn!(pool = name, "projectile pool exhausted");
                None
            }
        }
    }

    /// Return a checked-out instance. Returning to a missing pool or from
    /// a stale generation is a silent no-op; returning twice is ignored.
    /// The generation check keeps a pre-recreation handle from releasing a
    /// slot that a fresh checkout holds.
    pub fn return_instance(&mut self, instance: PooledInstance) {
        if let Some(pool) = self.pools.get_mut(&instance.pool) {
            if instance.generation == pool.generation
                && instance.index < pool.size
                && !pool.available.contains(&instance.index)
            {
                pool.available.push(instance.index);
            }
        }
    }

    /// Number of instances currently checked out of a pool.
    pub fn checked_out(&self, name: &str) -> usize {
        self.pools
            .get(name)
            .map(|p| p.size - p.available.len())
            .unwrap_or(0)
    }

    pub fn available(&self, name: &str) -> usize {
        self.pools.get(name).map(|p| p.available.len()).unwrap_or(0)
    }
}
