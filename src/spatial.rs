//! Spatial partitioning for efficient neighbor queries.
//!
//! Provides O(1) cell lookup and O(k) neighbor queries where k is the number
//! of entities in nearby cells, rather than O(n) for brute force. Cells are
//! keyed on the XY gameplay plane; z depth is ignored.

use bevy_ecs::prelude::*;
use std::collections::HashMap;

/// Grid-based spatial partitioning structure.
///
/// Divides the gameplay plane into cells and tracks which machines are in
/// each cell. Rebuilt at the start of every tick; destroyed machines are
/// never inserted.
#[derive(Resource, Debug)]
pub struct SpatialGrid {
    /// Cell size in world units.
    pub cell_size: f32,
    /// Map from cell coordinates to list of entities in that cell.
    cells: HashMap<(i32, i32), Vec<SpatialEntry>>,
    /// Reverse lookup: entity to cell.
    entity_cells: HashMap<Entity, (i32, i32)>,
}

/// Entry in a spatial cell.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub entity: Entity,
    pub x: f32,
    pub y: f32,
    pub category: u8, // 0 = Player, 1 = Prey, 2 = Predator
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(20.0) // 20 unit cells by default
    }
}

impl SpatialGrid {
    /// Create a new spatial grid with the given cell size.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            entity_cells: HashMap::new(),
        }
    }

    /// Convert world coordinates to cell coordinates.
    #[inline]
    pub fn world_to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Clear all entries (call at start of each tick before rebuilding).
    pub fn clear(&mut self) {
        self.cells.clear();
        self.entity_cells.clear();
    }

    /// Insert an entity at a position.
    pub fn insert(&mut self, entity: Entity, x: f32, y: f32, category: u8) {
        let cell = self.world_to_cell(x, y);

        // Remove from old cell if moved
        if let Some(&old_cell) = self.entity_cells.get(&entity) {
            if old_cell != cell {
                if let Some(entries) = self.cells.get_mut(&old_cell) {
                    entries.retain(|e| e.entity != entity);
                }
            }
        }

        let entry = SpatialEntry {
            entity,
            x,
            y,
            category,
        };
        self.cells.entry(cell).or_default().push(entry);
        self.entity_cells.insert(entity, cell);
    }

    /// Remove an entity from the grid.
    pub fn remove(&mut self, entity: Entity) {
        if let Some(cell) = self.entity_cells.remove(&entity) {
            if let Some(entries) = self.cells.get_mut(&cell) {
                entries.retain(|e| e.entity != entity);
            }
        }
    }

    /// Query all entities within a radius of a point.
    /// Returns entries sorted by distance (closest first).
    pub fn query_radius(&self, x: f32, y: f32, radius: f32) -> Vec<SpatialEntry> {
        let radius_sq = radius * radius;
        let cells_to_check = (radius / self.cell_size).ceil() as i32 + 1;
        let center_cell = self.world_to_cell(x, y);

        let mut results = Vec::new();

        for dx in -cells_to_check..=cells_to_check {
            for dy in -cells_to_check..=cells_to_check {
                let cell = (center_cell.0 + dx, center_cell.1 + dy);
                if let Some(entries) = self.cells.get(&cell) {
                    for entry in entries {
                        let dist_sq = (entry.x - x).powi(2) + (entry.y - y).powi(2);
                        if dist_sq <= radius_sq {
                            results.push(*entry);
                        }
                    }
                }
            }
        }

        results.sort_by(|a, b| {
            let dist_a = (a.x - x).powi(2) + (a.y - y).powi(2);
            let dist_b = (b.x - x).powi(2) + (b.y - y).powi(2);
            dist_a.partial_cmp(&dist_b).unwrap_or(std::cmp::Ordering::Equal)
        });

        results
    }

    /// Query all entities of one category within a radius.
    pub fn query_category(&self, x: f32, y: f32, radius: f32, category: u8) -> Vec<SpatialEntry> {
        let mut results = self.query_radius(x, y, radius);
        results.retain(|e| e.category == category);
        results
    }

    /// Nearest entity of the given category, excluding the querying entity.
    pub fn nearest_of_category(
        &self,
        x: f32,
        y: f32,
        radius: f32,
        category: u8,
        exclude: Entity,
    ) -> Option<SpatialEntry> {
        self.query_category(x, y, radius, category)
            .into_iter()
            .find(|e| e.entity != exclude)
    }

    /// Get count of entities in a cell.
    pub fn cell_count(&self, cell: (i32, i32)) -> usize {
        self.cells.get(&cell).map(|v| v.len()).unwrap_or(0)
    }

    /// Get total entity count.
    pub fn total_count(&self) -> usize {
        self.entity_cells.len()
    }
}

/// System that rebuilds the spatial grid each tick. Destroyed machines are
/// skipped so every downstream query sees only living targets.
pub fn spatial_grid_update_system(
    mut grid: ResMut<SpatialGrid>,
    query: Query<(
        Entity,
        &crate::components::Position,
        &crate::components::Category,
        &crate::components::Signals,
    )>,
) {
    grid.clear();

    for (entity, pos, category, signals) in query.iter() {
        if signals.is_destroyed() {
            continue;
        }
        grid.insert(entity, pos.0.x, pos.0.y, category.as_u8());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Category, Position, Signal, Signals};

    #[test]
    fn test_spatial_grid_insert_query() {
        let mut grid = SpatialGrid::new(10.0);

        let e1 = Entity::from_raw(1);
        let e2 = Entity::from_raw(2);
        let e3 = Entity::from_raw(3);

        grid.insert(e1, 5.0, 5.0, 1);
        grid.insert(e2, 15.0, 5.0, 1);
        grid.insert(e3, 100.0, 100.0, 2);

        let nearby = grid.query_radius(5.0, 5.0, 15.0);
        assert_eq!(nearby.len(), 2); // e1 and e2

        let nearby = grid.query_radius(5.0, 5.0, 5.0);
        assert_eq!(nearby.len(), 1); // just e1

        let nearby = grid.query_radius(100.0, 100.0, 10.0);
        assert_eq!(nearby.len(), 1); // just e3
    }

    #[test]
    fn test_category_queries() {
        let mut grid = SpatialGrid::new(10.0);

        let e1 = Entity::from_raw(1);
        let e2 = Entity::from_raw(2);
        let e3 = Entity::from_raw(3);

        grid.insert(e1, 0.0, 0.0, 2); // predator
        grid.insert(e2, 5.0, 0.0, 1); // prey
        grid.insert(e3, 10.0, 0.0, 1); // prey

        let prey = grid.query_category(0.0, 0.0, 20.0, 1);
        assert_eq!(prey.len(), 2);

        let nearest = grid.nearest_of_category(0.0, 0.0, 20.0, 1, e1);
        assert_eq!(nearest.unwrap().entity, e2); // e2 is closer

        // Excluding self skips the querying predator
        let nearest = grid.nearest_of_category(0.0, 0.0, 20.0, 2, e1);
        assert!(nearest.is_none());
    }

    #[test]
    fn test_destroyed_machines_not_indexed() {
        let mut world = World::new();
        world.insert_resource(SpatialGrid::new(10.0));

        world.spawn((Position::new(0.0, 0.0, 0.0), Category::Prey, Signals::default()));

        let mut dead_signals = Signals::default();
        dead_signals.set(Signal::Destroyed, true);
        world.spawn((Position::new(1.0, 0.0, 0.0), Category::Prey, dead_signals));

        let mut schedule = Schedule::default();
        schedule.add_systems(spatial_grid_update_system);
        schedule.run(&mut world);

        let grid = world.resource::<SpatialGrid>();
        assert_eq!(grid.total_count(), 1);
    }
}
