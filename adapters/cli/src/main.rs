#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays Ship Lanes levels headlessly.

mod level_transfer;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use ship_lanes_core::{
    Command, Event, GridPosition, LevelDefinition, LevelId, ObstacleContact, ShipId,
};
use ship_lanes_system_outcome::OutcomeReporter;
use ship_lanes_system_progress::{
    AchievementStore, CleanRunTracker, ProgressBridge, ProgressStore, RewardConfig,
};
use ship_lanes_world::{self as world, query, SimulationConfig, World};

/// Replays Ship Lanes levels without a rendering surface.
#[derive(Debug, Parser)]
#[command(name = "ship-lanes", version, about)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Simulates a level until it is cleared, fails, or the step budget runs out.
    Run(RunArgs),
    /// Prints the share code of a level file.
    Encode(EncodeArgs),
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct LevelSource {
    /// Path to a TOML level definition.
    #[arg(long)]
    level: Option<PathBuf>,
    /// Share code produced by the `encode` subcommand.
    #[arg(long)]
    code: Option<String>,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    source: LevelSource,
    /// Ships to release; every ship starts when omitted.
    #[arg(long = "start", value_name = "ID")]
    start: Vec<u32>,
    /// Maximum number of simulation steps before giving up.
    #[arg(long, default_value_t = 256)]
    max_steps: u64,
    /// Simulated milliseconds a ship needs to cross one cell.
    #[arg(long, default_value_t = 250)]
    step_ms: u64,
    /// Treat a ship resting on an obstacle as a collision.
    #[arg(long)]
    obstacles_collide: bool,
    /// Coins credited when the level is cleared.
    #[arg(long, default_value_t = 10)]
    coins_per_clear: u32,
    /// Number of levels used for the all-clean achievement threshold.
    #[arg(long, default_value_t = 1)]
    total_levels: usize,
}

#[derive(Debug, Args)]
struct EncodeArgs {
    /// Path to a TOML level definition.
    #[arg(long)]
    level: PathBuf,
}

/// Entry point for the Ship Lanes command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        CliCommand::Run(args) => run(args),
        CliCommand::Encode(args) => {
            let definition = load_level_file(&args.level)?;
            let code = level_transfer::encode(&definition).context("failed to encode level")?;
            println!("{code}");
            Ok(())
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let definition = match (&args.source.level, &args.source.code) {
        (Some(path), _) => load_level_file(path)?,
        (None, Some(code)) => level_transfer::decode(code).context("failed to decode level code")?,
        (None, None) => bail!("either --level or --code must be provided"),
    };

    let contact = if args.obstacles_collide {
        ObstacleContact::Collide
    } else {
        ObstacleContact::Ignore
    };
    let step_duration = Duration::from_millis(args.step_ms);
    let config = SimulationConfig::new(step_duration, contact);
    let mut world = World::from_definition(definition, config).context("level is invalid")?;

    let level = query::level(&world);
    let level_id = level.id();
    println!(
        "{} '{}' {}x{} with {} ships",
        level_id,
        level.name(),
        level.columns(),
        level.rows(),
        level.spawns().len()
    );
    println!("intersections: {}", format_cells(level.intersections()));
    println!("obstacles: {}", format_cells(level.obstacles()));

    let ships = select_ships(&world, &args.start)?;
    let mut session = Session {
        reporter: OutcomeReporter::new(),
        bridge: ProgressBridge::new(
            RewardConfig::new(args.coins_per_clear, args.total_levels),
            CleanRunTracker::new(),
        ),
        console: ConsoleProgress::default(),
        level: level_id,
    };

    for ship in ships {
        session.apply(&mut world, Command::StartShip { ship });
    }

    let mut steps = 0;
    while steps < args.max_steps && !query::is_finished(&world) {
        session.apply(&mut world, Command::Tick { dt: step_duration });
        steps += 1;
    }

    println!(
        "outcome after {} steps: {:?}",
        query::tick_index(&world),
        session.reporter.outcome()
    );
    if session.console.coins > 0 {
        println!("coins earned: {}", session.console.coins);
    }
    Ok(())
}

fn load_level_file(path: &Path) -> Result<LevelDefinition> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file at {}", path.display()))?;
    parse_level(&contents).with_context(|| format!("failed to parse level file {}", path.display()))
}

fn parse_level(contents: &str) -> Result<LevelDefinition> {
    toml::from_str(contents).context("level toml is malformed")
}

fn format_cells(cells: impl Iterator<Item = GridPosition>) -> String {
    let cells: Vec<String> = cells.map(|cell| cell.to_string()).collect();
    if cells.is_empty() {
        String::from("none")
    } else {
        cells.join(" ")
    }
}

fn select_ships(world: &World, requested: &[u32]) -> Result<Vec<ShipId>> {
    let view = query::ship_view(world);
    if requested.is_empty() {
        return Ok(view.iter().map(|ship| ship.id).collect());
    }

    requested
        .iter()
        .map(|raw| {
            let ship = ShipId::new(*raw);
            if view.get(ship).is_none() {
                bail!("level has no ship with id {raw}");
            }
            Ok(ship)
        })
        .collect()
}

struct Session {
    reporter: OutcomeReporter,
    bridge: ProgressBridge,
    console: ConsoleProgress,
    level: LevelId,
}

impl Session {
    fn apply(&mut self, world: &mut World, command: Command) {
        let mut events = Vec::new();
        world::apply(world, command, &mut events);
        let mut outcomes = Vec::new();
        self.reporter
            .handle(&events, query::active_ship_count(world), &mut outcomes);
        events.extend(outcomes);

        for event in &events {
            if let Some(line) = describe(event) {
                println!("{line}");
            }
        }

        let mut achievements = ConsoleAchievements;
        self.bridge
            .handle(self.level, &events, &mut self.console, &mut achievements);
    }
}

fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::TimeAdvanced { .. } => return None,
        Event::ShipStarted { ship } => format!("{ship} released"),
        Event::ShipAdvanced { ship, from, to } => format!("{ship} {from} -> {to}"),
        Event::ShipTurned { ship, at, from, to } => {
            format!("{ship} turned {from:?} -> {to:?} at {at}")
        }
        Event::ShipExited { ship } => format!("{ship} exited"),
        Event::ShipsCollided { cell, ships } => format!("collision at {cell}: {ships:?}"),
        Event::StepCompleted { tick } => format!("-- step {tick}"),
        Event::LevelCompleted => String::from("level completed"),
        Event::LevelFailed => String::from("level failed"),
        Event::LevelReset => String::from("level reset"),
    };
    Some(line)
}

#[derive(Debug, Default)]
struct ConsoleProgress {
    coins: u32,
}

impl ProgressStore for ConsoleProgress {
    fn unlock_level(&mut self, level: LevelId) {
        info!("unlocked {level}");
    }

    fn add_coins(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
    }
}

struct ConsoleAchievements;

impl AchievementStore for ConsoleAchievements {
    fn check_achievements(&mut self, completed: LevelId) {
        info!("checking achievements for {completed}");
    }

    fn check_collision_free_achievements(&mut self, clean_count: usize, all_clean: bool) {
        info!("collision-free levels: {clean_count}, all clean: {all_clean}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use ship_lanes_core::{Direction, TurnPattern};

    const CROSSING: &str = r#"
id = 3
name = "crossing"
columns = 4
rows = 4
cell_size = 32.0
intersections = [{ x = 1, y = 1 }]

[[ships]]
position = { x = 1, y = 0 }
heading = "North"
turn = "Right"

[[ships]]
position = { x = 0, y = 3 }
heading = "East"
turn = "Straight"
"#;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_toml_level() {
        let definition = parse_level(CROSSING).expect("level parses");
        assert_eq!(definition.id, LevelId::new(3));
        assert_eq!(definition.intersections, vec![GridPosition::new(1, 1)]);
        assert!(definition.obstacles.is_empty());
        assert_eq!(
            definition.ships[0],
            ship_lanes_core::ShipSpawn::new(
                GridPosition::new(1, 0),
                Direction::North,
                TurnPattern::Right
            )
        );
    }

    #[test]
    fn rejects_unknown_heading() {
        let broken = CROSSING.replace("\"North\"", "\"Up\"");
        assert!(parse_level(&broken).is_err());
    }

    #[test]
    fn formats_static_cells() {
        let definition = parse_level(CROSSING).expect("level parses");
        let world = World::from_definition(definition, SimulationConfig::default())
            .expect("valid level");
        let level = query::level(&world);

        assert_eq!(format_cells(level.intersections()), "(1, 1)");
        assert_eq!(format_cells(level.obstacles()), "none");
    }

    #[test]
    fn selects_requested_ships_only() {
        let definition = parse_level(CROSSING).expect("level parses");
        let world = World::from_definition(definition, SimulationConfig::default())
            .expect("valid level");

        assert_eq!(
            select_ships(&world, &[]).expect("all ships"),
            vec![ShipId::new(0), ShipId::new(1)]
        );
        assert_eq!(
            select_ships(&world, &[1]).expect("one ship"),
            vec![ShipId::new(1)]
        );
        assert!(select_ships(&world, &[5]).is_err());
    }

    #[test]
    fn run_args_accept_a_share_code() {
        let cli = Cli::try_parse_from([
            "ship-lanes",
            "run",
            "--code",
            "lanes:v1:4x4:abc",
            "--start",
            "0",
            "--start",
            "1",
        ])
        .expect("arguments parse");
        let CliCommand::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.start, vec![0, 1]);
        assert_eq!(args.max_steps, 256);
        assert!(args.source.level.is_none());

        assert!(Cli::try_parse_from(["ship-lanes", "run"]).is_err());
    }
}
