//! Movement legality shared by the engine and the autopilot.
//!
//! The engine decides whether a tick ends the game with [`step_outcome`]; the
//! autopilot vets candidate moves with [`assess_move`]. Both therefore agree on
//! what a wall or a body collision is.

use serde::{Deserialize, Serialize};

use crate::{Collision, Direction, GridSize, Position};

/// Result of moving the head into a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// The cell is inside the grid and free of the checked body.
    Clear,
    /// The head would hit something.
    Blocked(Collision),
}

/// Reasons a proposed move is not legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveRejection {
    /// No direction was proposed.
    NoDirection,
    /// The move would instantly reverse the active direction.
    Reversal,
    /// The move would leave the grid.
    Wall,
    /// The move would enter a body segment.
    SelfBody,
}

impl From<Collision> for MoveRejection {
    fn from(collision: Collision) -> Self {
        match collision {
            Collision::Wall => Self::Wall,
            Collision::SelfBody => Self::SelfBody,
        }
    }
}

/// Classifies a head entering `new_head` against the provided body segments.
///
/// The wall check runs first, so a head that leaves the grid is reported as a
/// wall collision even if the body list happens to contain the same cell.
#[must_use]
pub fn step_outcome(grid: GridSize, body: &[Position], new_head: Position) -> StepOutcome {
    if !grid.contains(new_head) {
        return StepOutcome::Blocked(Collision::Wall);
    }

    if body.contains(&new_head) {
        return StepOutcome::Blocked(Collision::SelfBody);
    }

    StepOutcome::Clear
}

/// Checks a single move from `head` in `direction` while `current` is active.
///
/// Returns the cell the head would occupy when the move is legal.
pub fn assess_move(
    head: Position,
    direction: Direction,
    current: Direction,
    grid: GridSize,
    body: &[Position],
) -> Result<Position, MoveRejection> {
    if direction == Direction::None {
        return Err(MoveRejection::NoDirection);
    }

    if direction.reverses(current) {
        return Err(MoveRejection::Reversal);
    }

    let new_head = head.step(direction);
    match step_outcome(grid, body, new_head) {
        StepOutcome::Clear => Ok(new_head),
        StepOutcome::Blocked(collision) => Err(collision.into()),
    }
}
