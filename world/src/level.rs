//! Validated, immutable level layout shared by the world for an attempt.

use std::collections::{BTreeSet, HashMap};

use ship_lanes_core::{GridPosition, LevelDefinition, LevelError, LevelId, ShipSpawn};

/// Level layout that passed load-time validation.
#[derive(Clone, Debug)]
pub struct Level {
    id: LevelId,
    name: String,
    columns: i32,
    rows: i32,
    cell_size: f32,
    spawns: Vec<ShipSpawn>,
    intersections: BTreeSet<GridPosition>,
    obstacles: BTreeSet<GridPosition>,
}

impl Level {
    /// Validates the provided definition.
    ///
    /// Rejects empty or oversized grids, non-positive cell sizes, levels
    /// without ships, ships or static cells outside the grid, ships sharing a
    /// start cell, and cells declared more than once as intersection or
    /// obstacle.
    pub fn new(definition: LevelDefinition) -> Result<Self, LevelError> {
        let LevelDefinition {
            id,
            name,
            columns,
            rows,
            cell_size,
            ships,
            intersections,
            obstacles,
        } = definition;

        if columns == 0 || rows == 0 {
            return Err(LevelError::EmptyGrid { columns, rows });
        }
        let (Ok(column_bound), Ok(row_bound)) = (i32::try_from(columns), i32::try_from(rows))
        else {
            return Err(LevelError::GridTooLarge { columns, rows });
        };
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(LevelError::InvalidCellSize(cell_size));
        }
        if ships.is_empty() {
            return Err(LevelError::NoShips);
        }

        let in_bounds = |cell: GridPosition| {
            (0..column_bound).contains(&cell.x()) && (0..row_bound).contains(&cell.y())
        };

        let mut starts: HashMap<GridPosition, usize> = HashMap::with_capacity(ships.len());
        for (index, spawn) in ships.iter().enumerate() {
            if !in_bounds(spawn.position) {
                return Err(LevelError::ShipOutOfBounds {
                    index,
                    position: spawn.position,
                });
            }
            if let Some(first) = starts.insert(spawn.position, index) {
                return Err(LevelError::SharedStartCell {
                    first,
                    second: index,
                    position: spawn.position,
                });
            }
        }

        let mut intersection_cells = BTreeSet::new();
        for cell in intersections {
            if !in_bounds(cell) {
                return Err(LevelError::IntersectionOutOfBounds(cell));
            }
            if !intersection_cells.insert(cell) {
                return Err(LevelError::OverlappingStaticCells(cell));
            }
        }

        let mut obstacle_cells = BTreeSet::new();
        for cell in obstacles {
            if !in_bounds(cell) {
                return Err(LevelError::ObstacleOutOfBounds(cell));
            }
            if intersection_cells.contains(&cell) || !obstacle_cells.insert(cell) {
                return Err(LevelError::OverlappingStaticCells(cell));
            }
        }

        Ok(Self {
            id,
            name,
            columns: column_bound,
            rows: row_bound,
            cell_size,
            spawns: ships,
            intersections: intersection_cells,
            obstacles: obstacle_cells,
        })
    }

    /// Identifier of the level.
    #[must_use]
    pub const fn id(&self) -> LevelId {
        self.id
    }

    /// Display name of the level.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of playable columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns.unsigned_abs()
    }

    /// Number of playable rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows.unsigned_abs()
    }

    /// Edge length of a cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Ship start states in identifier order.
    #[must_use]
    pub fn spawns(&self) -> &[ShipSpawn] {
        &self.spawns
    }

    /// Intersection cells in ascending order.
    pub fn intersections(&self) -> impl Iterator<Item = GridPosition> + '_ {
        self.intersections.iter().copied()
    }

    /// Obstacle cells in ascending order.
    pub fn obstacles(&self) -> impl Iterator<Item = GridPosition> + '_ {
        self.obstacles.iter().copied()
    }

    /// Reports whether the cell lies within the playable bounds.
    #[must_use]
    pub fn contains(&self, cell: GridPosition) -> bool {
        (0..self.columns).contains(&cell.x()) && (0..self.rows).contains(&cell.y())
    }

    /// Reports whether ships turn on the provided cell.
    #[must_use]
    pub fn is_intersection(&self, cell: GridPosition) -> bool {
        self.intersections.contains(&cell)
    }

    /// Reports whether the cell holds an obstacle.
    #[must_use]
    pub fn is_obstacle(&self, cell: GridPosition) -> bool {
        self.obstacles.contains(&cell)
    }
}
