//! JSON line format streamed by `--json`.

use serde::Serialize;
use snake_autopilot_core::{Direction, GameSnapshot, GameStatus, Position};

/// Per-tick game state as written to standard output.
#[derive(Debug, Serialize)]
pub(crate) struct WireSnapshot {
    snake: Vec<[i32; 2]>,
    head: Option<[i32; 2]>,
    food: [i32; 2],
    direction: Direction,
    grid_width: u32,
    grid_height: u32,
    score: u32,
    status: GameStatus,
    length: usize,
    moves: u64,
}

fn pair(position: Position) -> [i32; 2] {
    [position.column(), position.row()]
}

impl From<&GameSnapshot> for WireSnapshot {
    fn from(snapshot: &GameSnapshot) -> Self {
        Self {
            snake: snapshot.body.iter().copied().map(pair).collect(),
            head: snapshot.head().map(pair),
            food: pair(snapshot.food),
            direction: snapshot.direction,
            grid_width: snapshot.grid.width(),
            grid_height: snapshot.grid.height(),
            score: snapshot.score,
            status: snapshot.status,
            length: snapshot.length(),
            moves: snapshot.moves,
        }
    }
}
