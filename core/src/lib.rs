#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Ship Lanes simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new events or command batches.
//!
//! The grid value types and the turn rule engine also live here so that every
//! crate agrees on a single heading and turn vocabulary.

use std::{f32::consts::PI, fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that an idle ship begin moving along its heading.
    StartShip {
        /// Identifier of the ship the player released.
        ship: ShipId,
    },
    /// Performs exactly one discrete simulation step.
    Step,
    /// Advances the simulation clock by the provided delta time.
    ///
    /// One step is performed for every accumulated step duration.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Restores every ship to the start state defined by the level.
    ResetLevel,
}

/// Events broadcast by the world and systems after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an idle ship started moving.
    ShipStarted {
        /// Identifier of the ship that started.
        ship: ShipId,
    },
    /// Confirms that a ship moved between two cells.
    ShipAdvanced {
        /// Identifier of the ship that advanced.
        ship: ShipId,
        /// Cell the ship occupied before moving.
        from: GridPosition,
        /// Cell the ship occupies after completing the move.
        to: GridPosition,
    },
    /// Reports that a ship changed heading on an intersection.
    ShipTurned {
        /// Identifier of the ship that turned.
        ship: ShipId,
        /// Intersection cell where the turn happened.
        at: GridPosition,
        /// Heading used to enter the intersection.
        from: Direction,
        /// Heading that governs the next step.
        to: Direction,
    },
    /// Reports that a ship left the playable bounds.
    ShipExited {
        /// Identifier of the ship that exited.
        ship: ShipId,
    },
    /// Reports that ships ended a step sharing a cell.
    ShipsCollided {
        /// Cell where the collision was detected.
        cell: GridPosition,
        /// Ships involved in the collision, sorted by identifier.
        ships: Vec<ShipId>,
    },
    /// Marks the end of a committed simulation step.
    StepCompleted {
        /// One-based index of the step within the current attempt.
        tick: u64,
    },
    /// Announces that every ship exited without a collision.
    LevelCompleted,
    /// Announces that the attempt ended in a collision.
    LevelFailed,
    /// Confirms that the level returned to its start state.
    LevelReset,
}

/// Cardinal headings available to ships.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing `y`.
    North,
    /// Movement toward increasing `x`.
    East,
    /// Movement toward decreasing `y`.
    South,
    /// Movement toward decreasing `x`.
    West,
}

impl Direction {
    /// All headings in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Unit movement vector expressed as `(dx, dy)`.
    #[must_use]
    pub const fn unit_vector(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }

    /// Sprite rotation in radians, counter-clockwise from a north-facing sprite.
    #[must_use]
    pub fn rotation_radians(self) -> f32 {
        match self {
            Self::North => 0.0,
            Self::West => PI / 2.0,
            Self::South => PI,
            Self::East => -PI / 2.0,
        }
    }

    /// Heading rotated by 90 degrees clockwise.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// Heading rotated by 90 degrees counter-clockwise.
    #[must_use]
    pub const fn counter_clockwise(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    /// Heading pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }
}

/// Heading transition a ship applies when it enters an intersection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPattern {
    /// Keep the current heading.
    Straight,
    /// Turn 90 degrees counter-clockwise.
    Left,
    /// Turn 90 degrees clockwise.
    Right,
}

impl TurnPattern {
    /// All turn patterns.
    pub const ALL: [TurnPattern; 3] = [Self::Straight, Self::Left, Self::Right];

    /// Applies the pattern to the provided heading.
    #[must_use]
    pub const fn apply(self, heading: Direction) -> Direction {
        match self {
            Self::Straight => heading,
            Self::Left => heading.counter_clockwise(),
            Self::Right => heading.clockwise(),
        }
    }
}

/// Computes the heading a ship adopts after crossing an intersection.
#[must_use]
pub const fn next_heading(current: Direction, pattern: TurnPattern) -> Direction {
    pattern.apply(current)
}

/// Location of a single grid cell. Ships may leave the grid, so both axes are signed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    x: i32,
    y: i32,
}

impl GridPosition {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the cell, growing eastward.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell, growing northward.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Neighbouring cell one step along the provided heading.
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.unit_vector();
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Centre of the cell expressed in world units.
    #[must_use]
    pub fn to_world(self, cell_size: f32) -> (f32, f32) {
        (
            (self.x as f32 + 0.5) * cell_size,
            (self.y as f32 + 0.5) * cell_size,
        )
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unique identifier assigned to a ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipId(u32);

impl ShipId {
    /// Creates a new ship identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ship#{}", self.0)
    }
}

/// Unique identifier assigned to a level by its author.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(u32);

impl LevelId {
    /// Creates a new level identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Identifier of the level that follows this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level#{}", self.0)
    }
}

/// Lifecycle state of a single ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShipState {
    /// Waiting at the start cell for the player to release it.
    Idle,
    /// Advancing one cell per step.
    Moving,
    /// Left the playable bounds.
    Exited,
    /// Ended a step sharing a cell with another ship.
    Collided,
}

impl ShipState {
    /// Reports whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Exited | Self::Collided)
    }

    /// Reports whether the ship still counts toward the remaining ships.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

/// How ships interact with obstacle cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleContact {
    /// Obstacles are level-design guides and never fail an attempt.
    #[default]
    Ignore,
    /// A ship ending a step on an obstacle cell collides.
    Collide,
}

/// Level-level result derived from the current ship states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelOutcome {
    /// Ships remain and no collision was flagged.
    InProgress,
    /// A collision froze the attempt.
    Collision,
    /// Every ship left the grid without colliding.
    AllShipsExited,
}

/// Start state of a ship inside a level definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipSpawn {
    /// Cell the ship occupies before it starts.
    pub position: GridPosition,
    /// Heading the ship starts with.
    pub heading: Direction,
    /// Pattern applied at every intersection.
    pub turn: TurnPattern,
}

impl ShipSpawn {
    /// Creates a new spawn descriptor.
    #[must_use]
    pub const fn new(position: GridPosition, heading: Direction, turn: TurnPattern) -> Self {
        Self {
            position,
            heading,
            turn,
        }
    }
}

/// Authoring form of a level, as stored in level files and share codes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Identifier of the level.
    pub id: LevelId,
    /// Display name of the level.
    pub name: String,
    /// Number of cell columns in the playable area.
    pub columns: u32,
    /// Number of cell rows in the playable area.
    pub rows: u32,
    /// Edge length of a single cell in world units.
    pub cell_size: f32,
    /// Ships in identifier order.
    pub ships: Vec<ShipSpawn>,
    /// Cells where ships apply their turn pattern.
    #[serde(default)]
    pub intersections: Vec<GridPosition>,
    /// Impassable cells used as level-design guides.
    #[serde(default)]
    pub obstacles: Vec<GridPosition>,
}

/// Configuration errors detected while loading a level.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LevelError {
    /// The grid has no playable cells.
    #[error("grid must have at least one cell, got {columns}x{rows}")]
    EmptyGrid {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// The grid dimensions do not fit signed cell coordinates.
    #[error("grid dimensions {columns}x{rows} exceed the supported range")]
    GridTooLarge {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// The cell size is not a positive finite number.
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),
    /// The level contains no ships.
    #[error("level must contain at least one ship")]
    NoShips,
    /// A ship starts outside the playable area.
    #[error("ship {index} starts outside the grid at {position}")]
    ShipOutOfBounds {
        /// Index of the ship within the definition.
        index: usize,
        /// Offending start cell.
        position: GridPosition,
    },
    /// Two ships start on the same cell.
    #[error("ships {first} and {second} both start at {position}")]
    SharedStartCell {
        /// Index of the first ship within the definition.
        first: usize,
        /// Index of the second ship within the definition.
        second: usize,
        /// Shared start cell.
        position: GridPosition,
    },
    /// An intersection lies outside the playable area.
    #[error("intersection at {0} lies outside the grid")]
    IntersectionOutOfBounds(GridPosition),
    /// An obstacle lies outside the playable area.
    #[error("obstacle at {0} lies outside the grid")]
    ObstacleOutOfBounds(GridPosition),
    /// A cell is listed more than once across intersections and obstacles.
    #[error("static cell at {0} is declared more than once")]
    OverlappingStaticCells(GridPosition),
}

/// Immutable representation of a single ship's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShipSnapshot {
    /// Unique identifier assigned to the ship.
    pub id: ShipId,
    /// Grid cell currently occupied by the ship.
    pub position: GridPosition,
    /// Heading used for the next step.
    pub heading: Direction,
    /// Pattern applied at intersections.
    pub turn: TurnPattern,
    /// Lifecycle state of the ship.
    pub state: ShipState,
}

/// Read-only snapshot describing all ships of the level.
#[derive(Clone, Debug, Default)]
pub struct ShipView {
    snapshots: Vec<ShipSnapshot>,
}

impl ShipView {
    /// Creates a new ship view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ShipSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured ship snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ShipSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single ship.
    #[must_use]
    pub fn get(&self, ship: ShipId) -> Option<&ShipSnapshot> {
        self.snapshots
            .binary_search_by_key(&ship, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of ships that are neither exited nor collided.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.state.is_active())
            .count()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ShipSnapshot> {
        self.snapshots
    }
}
