#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic collision detection over committed ship positions.
//!
//! The detector runs once per simulation step, after every move of the step
//! has been committed. It only compares grid cells: two active ships sharing a
//! cell collide, and with [`ObstacleContact::Collide`] a ship resting on an
//! obstacle cell collides as well. Reports are ordered by cell and list ships
//! by identifier, so the input order never changes the result.

use ship_lanes_core::{GridPosition, ObstacleContact, ShipId};

/// A single cell on which a collision was detected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionReport {
    /// Cell shared by the colliding ships.
    pub cell: GridPosition,
    /// Ships involved in the collision, sorted by identifier.
    pub ships: Vec<ShipId>,
}

/// Pure detector that reuses its scratch buffers between steps.
#[derive(Debug, Default)]
pub struct CollisionDetector {
    occupants: Vec<(GridPosition, ShipId)>,
    reports: Vec<CollisionReport>,
}

impl CollisionDetector {
    /// Creates a detector with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks the provided active ship positions for collisions.
    ///
    /// `ships` must contain every ship that is still on the board after the
    /// step, including idle ones. `is_obstacle` is consulted only when
    /// `contact` is [`ObstacleContact::Collide`].
    pub fn detect<I, F>(
        &mut self,
        ships: I,
        is_obstacle: F,
        contact: ObstacleContact,
    ) -> &[CollisionReport]
    where
        I: IntoIterator<Item = (ShipId, GridPosition)>,
        F: Fn(GridPosition) -> bool,
    {
        self.occupants.clear();
        self.reports.clear();
        self.occupants
            .extend(ships.into_iter().map(|(ship, cell)| (cell, ship)));
        self.occupants.sort_unstable();

        let mut start = 0;
        while start < self.occupants.len() {
            let cell = self.occupants[start].0;
            let end = self.occupants[start..]
                .iter()
                .position(|(other, _)| *other != cell)
                .map_or(self.occupants.len(), |offset| start + offset);

            let shared = end - start > 1;
            let blocked = contact == ObstacleContact::Collide && is_obstacle(cell);
            if shared || blocked {
                self.reports.push(CollisionReport {
                    cell,
                    ships: self.occupants[start..end]
                        .iter()
                        .map(|(_, ship)| *ship)
                        .collect(),
                });
            }

            start = end;
        }

        &self.reports
    }

    /// Reports produced by the most recent call to [`CollisionDetector::detect`].
    #[must_use]
    pub fn last_reports(&self) -> &[CollisionReport] {
        &self.reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ship(id: u32, x: i32, y: i32) -> (ShipId, GridPosition) {
        (ShipId::new(id), GridPosition::new(x, y))
    }

    #[test]
    fn distinct_cells_do_not_collide() {
        let mut detector = CollisionDetector::new();
        let reports = detector.detect(
            [ship(0, 0, 0), ship(1, 1, 0), ship(2, 0, 1)],
            |_| false,
            ObstacleContact::Ignore,
        );
        assert!(reports.is_empty());
    }

    #[test]
    fn shared_cell_reports_every_occupant() {
        let mut detector = CollisionDetector::new();
        let reports = detector.detect(
            [ship(4, 2, 2), ship(1, 2, 2), ship(3, 0, 0), ship(2, 2, 2)],
            |_| false,
            ObstacleContact::Ignore,
        );
        assert_eq!(
            reports,
            &[CollisionReport {
                cell: GridPosition::new(2, 2),
                ships: vec![ShipId::new(1), ShipId::new(2), ShipId::new(4)],
            }]
        );
    }

    #[test]
    fn obstacles_ignored_unless_configured() {
        let obstacle = GridPosition::new(1, 1);
        let mut detector = CollisionDetector::new();

        let ignored = detector.detect(
            [ship(0, 1, 1)],
            |cell| cell == obstacle,
            ObstacleContact::Ignore,
        );
        assert!(ignored.is_empty());

        let reports = detector.detect(
            [ship(0, 1, 1)],
            |cell| cell == obstacle,
            ObstacleContact::Collide,
        );
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].ships, vec![ShipId::new(0)]);
    }

    #[test]
    fn scratch_is_cleared_between_steps() {
        let mut detector = CollisionDetector::new();
        let _ = detector.detect(
            [ship(0, 3, 3), ship(1, 3, 3)],
            |_| false,
            ObstacleContact::Ignore,
        );
        assert_eq!(detector.last_reports().len(), 1);

        let reports = detector.detect(
            [ship(0, 3, 4), ship(1, 3, 3)],
            |_| false,
            ObstacleContact::Ignore,
        );
        assert!(reports.is_empty());
        assert!(detector.last_reports().is_empty());
    }
}
