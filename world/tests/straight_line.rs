use proptest::prelude::*;
use ship_lanes_core::{
    Command, Direction, GridPosition, LevelDefinition, LevelId, ShipId, ShipSpawn, TurnPattern,
};
use ship_lanes_world::{self as world, query, SimulationConfig, World};

const GRID: u32 = 64;

fn direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

fn turn_pattern() -> impl Strategy<Value = TurnPattern> {
    prop::sample::select(vec![TurnPattern::Straight, TurnPattern::Left, TurnPattern::Right])
}

proptest! {
    #[test]
    fn position_after_n_ticks_follows_heading(
        x in 20i32..44,
        y in 20i32..44,
        heading in direction(),
        turn in turn_pattern(),
        ticks in 0u32..20,
    ) {
        let start = GridPosition::new(x, y);
        let mut world = World::from_definition(
            LevelDefinition {
                id: LevelId::new(9),
                name: String::from("open water"),
                columns: GRID,
                rows: GRID,
                cell_size: 8.0,
                ships: vec![ShipSpawn::new(start, heading, turn)],
                intersections: Vec::new(),
                obstacles: Vec::new(),
            },
            SimulationConfig::default(),
        )
        .expect("valid level");

        let mut events = Vec::new();
        world::apply(&mut world, Command::StartShip { ship: ShipId::new(0) }, &mut events);
        for _ in 0..ticks {
            world::apply(&mut world, Command::Step, &mut events);
        }

        let (dx, dy) = heading.unit_vector();
        let n = i32::try_from(ticks).expect("small tick count");
        let expected = GridPosition::new(x + dx * n, y + dy * n);
        let ship = query::ship_view(&world).into_vec()[0];
        prop_assert_eq!(ship.position, expected);
        prop_assert_eq!(ship.heading, heading);
        prop_assert_eq!(query::tick_index(&world), u64::from(ticks));
    }
}
