#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for Ship Lanes.
//!
//! The world owns every ship of the loaded level and is the only place where
//! ship state mutates. Adapters drive it exclusively through [`apply`]; each
//! step moves all moving ships from the previously committed positions,
//! applies turn patterns on intersections, retires ships that leave the grid
//! and finally runs collision detection over the committed positions.

mod level;

use std::time::Duration;

use log::{debug, info, warn};
use ship_lanes_core::{
    next_heading, Command, Direction, Event, GridPosition, LevelDefinition, LevelError,
    ObstacleContact, ShipId, ShipSnapshot, ShipSpawn, ShipState, TurnPattern,
};
use ship_lanes_system_collision::CollisionDetector;

pub use level::Level;

const DEFAULT_STEP_DURATION: Duration = Duration::from_millis(250);

/// Tunables applied to a simulation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    step_duration: Duration,
    obstacle_contact: ObstacleContact,
}

impl SimulationConfig {
    /// Creates a configuration from explicit values.
    ///
    /// A zero `step_duration` performs exactly one step per tick.
    #[must_use]
    pub const fn new(step_duration: Duration, obstacle_contact: ObstacleContact) -> Self {
        Self {
            step_duration,
            obstacle_contact,
        }
    }

    /// Simulated time a ship needs to cross one cell.
    #[must_use]
    pub const fn step_duration(&self) -> Duration {
        self.step_duration
    }

    /// How ships interact with obstacle cells.
    #[must_use]
    pub const fn obstacle_contact(&self) -> ObstacleContact {
        self.obstacle_contact
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_DURATION, ObstacleContact::Ignore)
    }
}

/// Represents the authoritative Ship Lanes world state.
#[derive(Debug)]
pub struct World {
    level: Level,
    config: SimulationConfig,
    ships: Vec<Ship>,
    detector: CollisionDetector,
    collided: bool,
    tick_index: u64,
    accumulator: Duration,
}

impl World {
    /// Creates a world for a validated level with every ship idle.
    #[must_use]
    pub fn new(level: Level, config: SimulationConfig) -> Self {
        let ships = spawn_ships(level.spawns());
        info!(
            "loaded level {} '{}' ({}x{}) with {} ships",
            level.id(),
            level.name(),
            level.columns(),
            level.rows(),
            ships.len()
        );
        Self {
            level,
            config,
            ships,
            detector: CollisionDetector::new(),
            collided: false,
            tick_index: 0,
            accumulator: Duration::ZERO,
        }
    }

    /// Validates the definition and creates a world for it.
    pub fn from_definition(
        definition: LevelDefinition,
        config: SimulationConfig,
    ) -> Result<Self, LevelError> {
        Ok(Self::new(Level::new(definition)?, config))
    }

    fn is_finished(&self) -> bool {
        self.collided || self.active_count() == 0
    }

    fn active_count(&self) -> usize {
        self.ships
            .iter()
            .filter(|ship| ship.state.is_active())
            .count()
    }

    fn ship_mut(&mut self, ship: ShipId) -> Option<&mut Ship> {
        self.ships.iter_mut().find(|candidate| candidate.id == ship)
    }

    fn reset(&mut self) {
        for ship in &mut self.ships {
            ship.reset();
        }
        self.collided = false;
        self.tick_index = 0;
        self.accumulator = Duration::ZERO;
    }

    fn step(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);

        for ship in self.ships.iter_mut().filter(|ship| ship.state == ShipState::Moving) {
            let from = ship.position;
            let to = from.offset(ship.heading);
            ship.position = to;
            out_events.push(Event::ShipAdvanced {
                ship: ship.id,
                from,
                to,
            });

            if self.level.is_intersection(to) {
                let heading = next_heading(ship.heading, ship.turn);
                if heading != ship.heading {
                    out_events.push(Event::ShipTurned {
                        ship: ship.id,
                        at: to,
                        from: ship.heading,
                        to: heading,
                    });
                    ship.heading = heading;
                }
            }

            if !self.level.contains(to) {
                ship.state = ShipState::Exited;
                debug!("{} exited at {to} on step {}", ship.id, self.tick_index);
                out_events.push(Event::ShipExited { ship: ship.id });
            }
        }

        let level = &self.level;
        let reports = self.detector.detect(
            self.ships
                .iter()
                .filter(|ship| ship.state.is_active())
                .map(|ship| (ship.id, ship.position)),
            |cell| level.is_obstacle(cell),
            self.config.obstacle_contact(),
        );

        for report in reports {
            info!(
                "collision at {} between {:?} on step {}",
                report.cell, report.ships, self.tick_index
            );
            for ship in self
                .ships
                .iter_mut()
                .filter(|ship| report.ships.contains(&ship.id))
            {
                ship.state = ShipState::Collided;
            }
            out_events.push(Event::ShipsCollided {
                cell: report.cell,
                ships: report.ships.clone(),
            });
        }
        if !reports.is_empty() {
            self.collided = true;
        }

        out_events.push(Event::StepCompleted {
            tick: self.tick_index,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// # Panics
///
/// Panics when [`Command::StartShip`] names a ship that does not exist, or a
/// ship that already exited or collided while the attempt is still running.
/// Both indicate a bug in the driving loop.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartShip { ship } => {
            if world.is_finished() {
                warn!("ignoring start of {ship}: attempt already finished");
                return;
            }
            let Some(entry) = world.ship_mut(ship) else {
                panic!("start requested for unknown {ship}");
            };
            if entry.start() {
                out_events.push(Event::ShipStarted { ship });
            }
        }
        Command::Step => {
            if world.is_finished() {
                warn!("ignoring step: attempt already finished");
                return;
            }
            world.step(out_events);
        }
        Command::Tick { dt } => {
            if world.is_finished() {
                return;
            }
            out_events.push(Event::TimeAdvanced { dt });

            let step_duration = world.config.step_duration();
            if step_duration.is_zero() {
                world.step(out_events);
                return;
            }

            world.accumulator = world.accumulator.saturating_add(dt);
            while world.accumulator >= step_duration && !world.is_finished() {
                world.accumulator -= step_duration;
                world.step(out_events);
            }
        }
        Command::ResetLevel => {
            world.reset();
            info!("level {} reset", world.level.id());
            out_events.push(Event::LevelReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use ship_lanes_core::{LevelOutcome, ShipView};

    use super::{Level, SimulationConfig, World};

    /// Provides read-only access to the loaded level.
    #[must_use]
    pub fn level(world: &World) -> &Level {
        &world.level
    }

    /// Provides the configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> SimulationConfig {
        world.config
    }

    /// Captures a read-only view of every ship of the level.
    #[must_use]
    pub fn ship_view(world: &World) -> ShipView {
        ShipView::from_snapshots(world.ships.iter().map(super::Ship::snapshot).collect())
    }

    /// Number of ships that have neither exited nor collided.
    #[must_use]
    pub fn active_ship_count(world: &World) -> usize {
        world.active_count()
    }

    /// Number of steps committed during the current attempt.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether further steps are suppressed until a reset.
    #[must_use]
    pub fn is_finished(world: &World) -> bool {
        world.is_finished()
    }

    /// Derives the level-level outcome of the current attempt.
    #[must_use]
    pub fn level_outcome(world: &World) -> LevelOutcome {
        if world.collided {
            LevelOutcome::Collision
        } else if world.active_count() == 0 {
            LevelOutcome::AllShipsExited
        } else {
            LevelOutcome::InProgress
        }
    }
}

#[derive(Clone, Debug)]
struct Ship {
    id: ShipId,
    spawn: ShipSpawn,
    position: GridPosition,
    heading: Direction,
    turn: TurnPattern,
    state: ShipState,
}

impl Ship {
    fn from_spawn(id: ShipId, spawn: ShipSpawn) -> Self {
        Self {
            id,
            spawn,
            position: spawn.position,
            heading: spawn.heading,
            turn: spawn.turn,
            state: ShipState::Idle,
        }
    }

    /// Moves an idle ship into the moving state, returning whether it changed.
    fn start(&mut self) -> bool {
        assert!(
            !self.state.is_terminal(),
            "{} cannot start from terminal state {:?}",
            self.id,
            self.state
        );
        if self.state == ShipState::Moving {
            return false;
        }
        self.state = ShipState::Moving;
        true
    }

    fn reset(&mut self) {
        *self = Self::from_spawn(self.id, self.spawn);
    }

    fn snapshot(&self) -> ShipSnapshot {
        ShipSnapshot {
            id: self.id,
            position: self.position,
            heading: self.heading,
            turn: self.turn,
            state: self.state,
        }
    }
}

fn spawn_ships(spawns: &[ShipSpawn]) -> Vec<Ship> {
    spawns
        .iter()
        .zip(0u32..)
        .map(|(spawn, index)| Ship::from_spawn(ShipId::new(index), *spawn))
        .collect()
}
