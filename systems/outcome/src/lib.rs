#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns per-step world events into level outcomes.

use log::info;
use ship_lanes_core::{Event, LevelOutcome};

/// Emits [`Event::LevelCompleted`] or [`Event::LevelFailed`] once per attempt.
///
/// The reporter may be driven from a frame callback that fires more often than
/// the world steps; repeated calls after a terminal outcome are ignored until
/// an [`Event::LevelReset`] starts a new attempt.
#[derive(Debug)]
pub struct OutcomeReporter {
    outcome: LevelOutcome,
    collided: bool,
    reported: bool,
}

impl OutcomeReporter {
    /// Creates a reporter for a fresh attempt.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcome of the current attempt as observed so far.
    #[must_use]
    pub fn outcome(&self) -> LevelOutcome {
        self.outcome
    }

    /// Consumes world events and the remaining active ship count.
    ///
    /// `active_ships` must be read from the world after the events were
    /// produced, so it reflects the committed state of the step.
    pub fn handle(&mut self, events: &[Event], active_ships: usize, out: &mut Vec<Event>) {
        for event in events {
            match event {
                Event::LevelReset => self.begin_attempt(),
                Event::ShipsCollided { .. } => self.collided = true,
                _ => {}
            }
        }

        if self.reported {
            return;
        }

        if self.collided {
            self.finish(LevelOutcome::Collision);
            out.push(Event::LevelFailed);
        } else if active_ships == 0 {
            self.finish(LevelOutcome::AllShipsExited);
            out.push(Event::LevelCompleted);
        }
    }

    fn begin_attempt(&mut self) {
        *self = Self::default();
    }

    fn finish(&mut self, outcome: LevelOutcome) {
        info!("attempt finished: {outcome:?}");
        self.outcome = outcome;
        self.reported = true;
    }
}

impl Default for OutcomeReporter {
    fn default() -> Self {
        Self {
            outcome: LevelOutcome::InProgress,
            collided: false,
            reported: false,
        }
    }
}
