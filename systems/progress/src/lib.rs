#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bridge between simulation outcomes and the player's long-lived progress.
//!
//! The simulation never touches global state. Instead this crate consumes the
//! outcome events of an attempt and forwards them to collaborators injected by
//! the surrounding application: a [`ProgressStore`] for unlocks and coins, an
//! [`AchievementStore`] for unlock thresholds, and a [`KeyValueStore`] used to
//! persist the [`CleanRunTracker`].

mod store;

use std::collections::BTreeSet;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use ship_lanes_core::{Event, LevelId};
use thiserror::Error;

pub use store::{KeyValueStore, MemoryStore};

/// Key under which the clean-run tracker is persisted.
pub const CLEAN_RUNS_KEY: &str = "collision_free_levels";

/// Receives unlocks and rewards earned by completing levels.
pub trait ProgressStore {
    /// Makes the provided level playable.
    fn unlock_level(&mut self, level: LevelId);

    /// Credits coins to the player.
    fn add_coins(&mut self, amount: u32);
}

/// Evaluates achievement thresholds after a level is completed.
pub trait AchievementStore {
    /// Checks achievements tied to completing a specific level.
    fn check_achievements(&mut self, completed: LevelId);

    /// Checks achievements tied to collision-free completions.
    fn check_collision_free_achievements(&mut self, clean_count: usize, all_clean: bool);
}

/// Errors raised while persisting or restoring progress.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// The tracker could not be encoded.
    #[error("failed to encode clean-run tracker: {0}")]
    Encode(#[source] serde_json::Error),
    /// The stored tracker payload is malformed.
    #[error("stored clean-run tracker is malformed: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Set of levels most recently completed without a collision.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanRunTracker {
    clean: BTreeSet<LevelId>,
}

impl CleanRunTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the level as completed without a collision.
    pub fn record_clean_completion(&mut self, level: LevelId) {
        let _ = self.clean.insert(level);
    }

    /// Clears the clean status of the level.
    pub fn record_collision(&mut self, level: LevelId) {
        let _ = self.clean.remove(&level);
    }

    /// Reports whether the level currently counts as clean.
    #[must_use]
    pub fn is_clean(&self, level: LevelId) -> bool {
        self.clean.contains(&level)
    }

    /// Number of levels currently counted as clean.
    #[must_use]
    pub fn clean_completion_count(&self) -> usize {
        self.clean.len()
    }

    /// Reports whether at least `total` levels are clean. Always false for zero.
    #[must_use]
    pub fn all_levels_clean_given_total(&self, total: usize) -> bool {
        total > 0 && self.clean_completion_count() >= total
    }

    /// Restores the tracker from the store, defaulting to empty when absent.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, ProgressError> {
        match store.get(CLEAN_RUNS_KEY) {
            Some(payload) => serde_json::from_str(&payload).map_err(ProgressError::Decode),
            None => Ok(Self::default()),
        }
    }

    /// Persists the tracker into the store.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), ProgressError> {
        let payload = serde_json::to_string(self).map_err(ProgressError::Encode)?;
        store.set(CLEAN_RUNS_KEY, payload);
        Ok(())
    }
}

/// Reward tunables applied when a level is completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardConfig {
    coins_per_clear: u32,
    total_levels: usize,
}

impl RewardConfig {
    /// Creates a reward configuration.
    #[must_use]
    pub const fn new(coins_per_clear: u32, total_levels: usize) -> Self {
        Self {
            coins_per_clear,
            total_levels,
        }
    }

    /// Coins credited for every completed level.
    #[must_use]
    pub const fn coins_per_clear(&self) -> u32 {
        self.coins_per_clear
    }

    /// Number of levels shipped with the game.
    #[must_use]
    pub const fn total_levels(&self) -> usize {
        self.total_levels
    }
}

/// Routes outcome events of level attempts to the injected collaborators.
#[derive(Debug)]
pub struct ProgressBridge {
    config: RewardConfig,
    tracker: CleanRunTracker,
    attempt_collided: bool,
}

impl ProgressBridge {
    /// Creates a bridge seeded with previously persisted clean runs.
    #[must_use]
    pub fn new(config: RewardConfig, tracker: CleanRunTracker) -> Self {
        Self {
            config,
            tracker,
            attempt_collided: false,
        }
    }

    /// Clean-run bookkeeping accumulated so far.
    #[must_use]
    pub fn tracker(&self) -> &CleanRunTracker {
        &self.tracker
    }

    /// Starts tracking a new attempt, e.g. after switching levels.
    pub fn begin_attempt(&mut self) {
        self.attempt_collided = false;
    }

    /// Consumes the events of an attempt at `level`.
    pub fn handle<P, A>(
        &mut self,
        level: LevelId,
        events: &[Event],
        progress: &mut P,
        achievements: &mut A,
    ) where
        P: ProgressStore + ?Sized,
        A: AchievementStore + ?Sized,
    {
        for event in events {
            match event {
                Event::LevelReset => self.begin_attempt(),
                Event::ShipsCollided { .. } | Event::LevelFailed => {
                    if !self.attempt_collided {
                        self.attempt_collided = true;
                        self.tracker.record_collision(level);
                        debug!("{level} lost its clean status");
                    }
                }
                Event::LevelCompleted => self.complete(level, progress, achievements),
                _ => {}
            }
        }
    }

    fn complete<P, A>(&mut self, level: LevelId, progress: &mut P, achievements: &mut A)
    where
        P: ProgressStore + ?Sized,
        A: AchievementStore + ?Sized,
    {
        progress.unlock_level(level.next());
        progress.add_coins(self.config.coins_per_clear());
        if !self.attempt_collided {
            self.tracker.record_clean_completion(level);
        }

        let clean_count = self.tracker.clean_completion_count();
        let all_clean = self
            .tracker
            .all_levels_clean_given_total(self.config.total_levels());
        info!("{level} completed; {clean_count} clean levels, all clean: {all_clean}");

        achievements.check_achievements(level);
        achievements.check_collision_free_achievements(clean_count, all_clean);
    }
}
