use ship_lanes_core::{GridPosition, ObstacleContact, ShipId};
use ship_lanes_system_collision::{CollisionDetector, CollisionReport};

fn positions() -> Vec<(ShipId, GridPosition)> {
    vec![
        (ShipId::new(0), GridPosition::new(2, 2)),
        (ShipId::new(1), GridPosition::new(0, 3)),
        (ShipId::new(2), GridPosition::new(2, 2)),
        (ShipId::new(3), GridPosition::new(-1, 0)),
        (ShipId::new(4), GridPosition::new(0, 3)),
        (ShipId::new(5), GridPosition::new(3, 1)),
    ]
}

#[test]
fn reports_are_sorted_by_cell() {
    let mut detector = CollisionDetector::new();
    let reports = detector.detect(positions(), |_| false, ObstacleContact::Ignore);

    assert_eq!(
        reports,
        &[
            CollisionReport {
                cell: GridPosition::new(0, 3),
                ships: vec![ShipId::new(1), ShipId::new(4)],
            },
            CollisionReport {
                cell: GridPosition::new(2, 2),
                ships: vec![ShipId::new(0), ShipId::new(2)],
            },
        ]
    );
}

#[test]
fn input_order_does_not_change_reports() {
    let mut forward = CollisionDetector::new();
    let mut reversed = CollisionDetector::new();

    let expected = forward
        .detect(positions(), |_| false, ObstacleContact::Ignore)
        .to_vec();
    let mut shuffled = positions();
    shuffled.reverse();
    let actual = reversed.detect(shuffled, |_| false, ObstacleContact::Ignore);

    assert_eq!(actual, expected.as_slice());
}

#[test]
fn obstacle_contact_merges_with_shared_cells() {
    let obstacle = GridPosition::new(2, 2);
    let mut detector = CollisionDetector::new();

    let reports = detector.detect(positions(), |cell| cell == obstacle, ObstacleContact::Collide);

    assert_eq!(reports.len(), 2, "obstacle cell must be reported once");
    assert_eq!(reports[1].cell, obstacle);
    assert_eq!(reports[1].ships, vec![ShipId::new(0), ShipId::new(2)]);
}
