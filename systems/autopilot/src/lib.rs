#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pathfinding system that steers the snake toward food.
//!
//! The autopilot reads a [`GameSnapshot`], searches for the shortest route to
//! the food with a breadth-first search, and vets the first step of that route
//! with the same legality rules the engine enforces. When the route is missing
//! or its first step is illegal, it falls back to any locally safe direction.

use snake_autopilot_core::{
    rules::{self, MoveRejection},
    CalibrationSource, Command, Direction, GameSnapshot, GameStatus, Offset, Position,
};
use tracing::{debug, trace, warn};

pub mod search;

use search::ObstacleMask;

/// Snake lengths at which the autopilot re-tunes calibration, with the
/// adjustment contributed at each.
pub const LENGTH_TUNING: [(usize, Offset); 2] = [(4, Offset::new(1, 0)), (7, Offset::new(0, -1))];

/// Order in which fallback directions are tried after the active direction.
const FALLBACK_ORDER: [Direction; 4] = [
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
];

/// Configuration parameters required to construct the autopilot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AutopilotConfig {
    length_tuning: bool,
}

impl AutopilotConfig {
    /// Creates a configuration that does not contribute calibration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            length_tuning: false,
        }
    }

    /// Enables calibration contributions on the first decision round and at
    /// the [`LENGTH_TUNING`] thresholds.
    #[must_use]
    pub const fn with_length_tuning(mut self, enabled: bool) -> Self {
        self.length_tuning = enabled;
        self
    }

    /// Whether calibration contributions are emitted.
    #[must_use]
    pub const fn length_tuning(&self) -> bool {
        self.length_tuning
    }
}

/// Counters describing how the autopilot reached its decisions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AutopilotStats {
    /// Decisions requested since construction.
    pub decisions: u64,
    /// Decisions that followed the first step of a searched path.
    pub path_decisions: u64,
    /// Decisions produced by the safe-direction fallback.
    pub fallback_decisions: u64,
    /// Decisions where no safe direction existed.
    pub trapped_decisions: u64,
    /// Most recent decision.
    pub last_decision: Direction,
    /// Number of cells in the most recent searched path, including the head.
    pub last_path_length: usize,
}

/// Pure system that turns game snapshots into steering commands.
#[derive(Debug, Default)]
pub struct Autopilot {
    config: AutopilotConfig,
    stats: AutopilotStats,
    announced: bool,
}

impl Autopilot {
    /// Creates a new autopilot using the supplied configuration.
    #[must_use]
    pub fn new(config: AutopilotConfig) -> Self {
        Self {
            config,
            stats: AutopilotStats::default(),
            announced: false,
        }
    }

    /// Decision counters accumulated so far.
    #[must_use]
    pub const fn stats(&self) -> &AutopilotStats {
        &self.stats
    }

    /// Consumes a snapshot and emits the commands for the next tick.
    ///
    /// Nothing is emitted unless the game is running. A `None` decision emits
    /// no steering command, leaving the active direction in place.
    pub fn handle(&mut self, snapshot: &GameSnapshot, out: &mut Vec<Command>) {
        if snapshot.status != GameStatus::Running {
            return;
        }

        if self.config.length_tuning {
            if !self.announced {
                self.announced = true;
                out.push(Command::Calibrate {
                    source: CalibrationSource::Autopilot,
                    adjustment: Offset::ZERO,
                });
            }

            if let Some(adjustment) = length_tuning_for(snapshot.length()) {
                out.push(Command::Calibrate {
                    source: CalibrationSource::LengthTuning,
                    adjustment,
                });
            }
        }

        let direction = self.next_direction(snapshot);
        if direction != Direction::None {
            out.push(Command::SetDirection { direction });
        }
    }

    /// Chooses the direction the snake should take on the next tick.
    ///
    /// Returns [`Direction::None`] when the snake has no head or is trapped.
    pub fn next_direction(&mut self, snapshot: &GameSnapshot) -> Direction {
        self.stats.decisions = self.stats.decisions.saturating_add(1);

        let Some(head) = snapshot.head() else {
            self.stats.last_path_length = 0;
            return self.record_trapped();
        };

        let grid = snapshot.grid;
        let obstacles = ObstacleMask::from_cells(grid, snapshot.body_without_tail());
        let path = search::shortest_path(grid, head, snapshot.food, |cell| {
            obstacles.is_blocked(cell)
        });
        self.stats.last_path_length = path.len();
        trace!(?head, food = ?snapshot.food, path_length = path.len(), "path searched");

        if let Some(&next) = path.get(1) {
            let direction = Direction::toward(head, next);
            match validate_step(snapshot, head, direction) {
                Ok(()) => {
                    self.stats.path_decisions = self.stats.path_decisions.saturating_add(1);
                    self.stats.last_decision = direction;
                    debug!(?direction, path_length = path.len(), "following path");
                    return direction;
                }
                Err(reason) => {
                    debug!(?direction, ?reason, "path step rejected, falling back");
                }
            }
        } else {
            debug!(food = ?snapshot.food, "no path to food, falling back");
        }

        match safe_direction(snapshot, head) {
            Some(direction) => {
                self.stats.fallback_decisions = self.stats.fallback_decisions.saturating_add(1);
                self.stats.last_decision = direction;
                direction
            }
            None => {
                warn!(?head, length = snapshot.length(), "snake is trapped");
                self.record_trapped()
            }
        }
    }

    fn record_trapped(&mut self) -> Direction {
        self.stats.trapped_decisions = self.stats.trapped_decisions.saturating_add(1);
        self.stats.last_decision = Direction::None;
        Direction::None
    }
}

/// Calibration adjustment contributed at the provided snake length, if any.
#[must_use]
pub fn length_tuning_for(length: usize) -> Option<Offset> {
    LENGTH_TUNING
        .iter()
        .find(|(threshold, _)| *threshold == length)
        .map(|(_, adjustment)| *adjustment)
}

/// Validates the first step of a searched path.
///
/// A step onto the raw food keeps the tail in the checked body, since the
/// snake grows on that tick.
fn validate_step(
    snapshot: &GameSnapshot,
    head: Position,
    direction: Direction,
) -> Result<(), MoveRejection> {
    let will_grow = direction != Direction::None && head.step(direction) == snapshot.food;
    let body = if will_grow {
        snapshot.body.as_slice()
    } else {
        snapshot.body_without_tail()
    };

    rules::assess_move(head, direction, snapshot.direction, snapshot.grid, body).map(|_| ())
}

/// First direction that neither reverses, leaves the grid, nor enters the
/// body minus its tail. The active direction is preferred.
fn safe_direction(snapshot: &GameSnapshot, head: Position) -> Option<Direction> {
    let current = snapshot.direction;
    let preferred = (current != Direction::None).then_some(current);

    preferred
        .into_iter()
        .chain(FALLBACK_ORDER.into_iter().filter(|direction| *direction != current))
        .find(|direction| {
            rules::assess_move(
                head,
                *direction,
                current,
                snapshot.grid,
                snapshot.body_without_tail(),
            )
            .is_ok()
        })
}
