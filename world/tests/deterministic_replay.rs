use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use ship_lanes_core::{
    Command, Direction, Event, GridPosition, LevelDefinition, LevelId, LevelOutcome, ShipId,
    ShipSnapshot, ShipSpawn, ShipState, TurnPattern,
};
use ship_lanes_world::{self as world, query, SimulationConfig, World};

#[test]
fn deterministic_replay_produces_identical_runs() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.outcome, LevelOutcome::AllShipsExited);
}

#[test]
fn replay_ends_with_every_ship_exited_at_expected_cells() {
    let outcome = replay(scripted_commands());

    let cells: Vec<(u32, GridPosition, ShipState)> = outcome
        .ships
        .iter()
        .map(|ship| (ship.id.get(), ship.position, ship.state))
        .collect();
    assert_eq!(
        cells,
        vec![
            (0, GridPosition::new(3, -1), ShipState::Exited),
            (1, GridPosition::new(-1, 3), ShipState::Exited),
        ]
    );

    let exits: Vec<&Event> = outcome
        .events
        .iter()
        .filter(|event| matches!(event, Event::ShipExited { .. }))
        .collect();
    assert_eq!(exits.len(), 2);
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::from_definition(
        level(),
        SimulationConfig::new(Duration::from_millis(200), Default::default()),
    )
    .expect("valid level");
    let mut log = Vec::new();

    for command in commands {
        world::apply(&mut world, command, &mut log);
    }

    ReplayOutcome {
        ships: query::ship_view(&world).into_vec(),
        events: log,
        outcome: query::level_outcome(&world),
    }
}

fn level() -> LevelDefinition {
    LevelDefinition {
        id: LevelId::new(4),
        name: String::from("two lanes"),
        columns: 5,
        rows: 5,
        cell_size: 48.0,
        ships: vec![
            ShipSpawn::new(GridPosition::new(0, 1), Direction::East, TurnPattern::Right),
            ShipSpawn::new(GridPosition::new(3, 4), Direction::South, TurnPattern::Right),
        ],
        intersections: vec![GridPosition::new(3, 1), GridPosition::new(3, 3)],
        obstacles: vec![GridPosition::new(0, 0)],
    }
}

fn scripted_commands() -> Vec<Command> {
    vec![
        Command::StartShip {
            ship: ShipId::new(0),
        },
        Command::Tick {
            dt: Duration::from_millis(100),
        },
        Command::Tick {
            dt: Duration::from_millis(500),
        },
        Command::StartShip {
            ship: ShipId::new(1),
        },
        Command::Tick {
            dt: Duration::from_millis(300),
        },
        Command::Tick {
            dt: Duration::from_secs(1),
        },
        Command::Tick {
            dt: Duration::from_secs(1),
        },
    ]
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ReplayOutcome {
    ships: Vec<ShipSnapshot>,
    events: Vec<Event>,
    outcome: LevelOutcome,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.ships.hash(&mut hasher);
        format!("{:?}", self.events).hash(&mut hasher);
        self.outcome.hash(&mut hasher);
        hasher.finish()
    }
}
