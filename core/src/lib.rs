#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the snake autopilot engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! changed. Systems such as the autopilot read an immutable [`GameSnapshot`]
//! and respond exclusively with new command batches.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

pub mod rules;

/// Highest optimization level the calibration ledger can reach.
pub const MAX_OPTIMIZATION_LEVEL: u8 = 4;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that the snake turn on the next tick.
    SetDirection {
        /// Direction that should become active when the next tick latches.
        direction: Direction,
    },
    /// Advances the simulation by a single discrete step.
    Tick,
    /// Replaces the game with a fresh one. Calibration state is preserved.
    Reset,
    /// Pauses or resumes a running game.
    SetPaused {
        /// Whether the game should be paused.
        paused: bool,
    },
    /// Records a calibration contribution from the named subsystem.
    Calibrate {
        /// Subsystem contributing the adjustment.
        source: CalibrationSource,
        /// Amount added to the accumulated calibration offset.
        adjustment: Offset,
    },
    /// Clears all calibration state, including the optimization level.
    ResetCalibration,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// A direction was accepted and will latch on the next tick.
    DirectionQueued {
        /// Direction stored as pending.
        direction: Direction,
    },
    /// A direction request was ignored.
    DirectionRejected {
        /// Direction that was requested.
        direction: Direction,
        /// Why the request was ignored.
        reason: rules::MoveRejection,
    },
    /// The tick ran while no direction was active, so the snake stayed put.
    SnakeIdled,
    /// The snake's head moved between two cells.
    SnakeAdvanced {
        /// Head position before the move.
        from: Position,
        /// Head position after the move.
        to: Position,
    },
    /// The snake attempted to enter a forbidden cell and the game ended.
    SnakeCollided {
        /// Cell the head attempted to enter.
        at: Position,
        /// What the head ran into.
        collision: Collision,
    },
    /// The snake consumed the food.
    FoodEaten {
        /// Cell occupied by the new head.
        at: Position,
        /// Score after eating.
        score: u32,
        /// Snake length after growing.
        length: usize,
    },
    /// Food appeared in a free cell.
    FoodSpawned {
        /// Cell that now holds the food.
        at: Position,
    },
    /// No free cell remained for food, so the game ended.
    BoardFilled,
    /// The game status changed.
    StatusChanged {
        /// Status that became active.
        status: GameStatus,
    },
    /// A fresh game replaced the previous one.
    GameReset,
    /// A calibration contribution was recorded.
    CalibrationApplied {
        /// Subsystem that contributed.
        source: CalibrationSource,
        /// Amount contributed.
        adjustment: Offset,
        /// Accumulated calibration offset after the contribution.
        accumulated: Offset,
    },
    /// The runtime optimization level advanced after scoring.
    OptimizationAdvanced {
        /// Level after advancing.
        level: u8,
    },
    /// All calibration state was cleared.
    CalibrationReset,
}

/// Movement directions available to the snake.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// No movement.
    #[default]
    None,
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Cardinal directions in breadth-first expansion order.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step associated with the direction.
    #[must_use]
    pub const fn delta(self) -> Offset {
        match self {
            Self::None => Offset::new(0, 0),
            Self::Up => Offset::new(0, -1),
            Self::Down => Offset::new(0, 1),
            Self::Left => Offset::new(-1, 0),
            Self::Right => Offset::new(1, 0),
        }
    }

    /// Direction pointing the other way. `None` is its own opposite.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Reports whether moving in `self` would instantly reverse `current`.
    ///
    /// Both directions must be cardinal; nothing reverses `None`.
    #[must_use]
    pub fn reverses(self, current: Direction) -> bool {
        if self == Self::None || current == Self::None {
            return false;
        }

        (self.delta() + current.delta()).is_zero()
    }

    /// Single-step direction leading from `from` toward `to`.
    ///
    /// Each axis of the difference is clamped to one step. Diagonal or zero
    /// differences yield `None`.
    #[must_use]
    pub fn toward(from: Position, to: Position) -> Self {
        let dx = (to.column() - from.column()).clamp(-1, 1);
        let dy = (to.row() - from.row()).clamp(-1, 1);

        match (dx, dy) {
            (0, -1) => Self::Up,
            (0, 1) => Self::Down,
            (-1, 0) => Self::Left,
            (1, 0) => Self::Right,
            _ => Self::None,
        }
    }
}

/// Lifecycle status of a game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Ticks advance the simulation.
    #[default]
    Running,
    /// Ticks are ignored until the game resumes.
    Paused,
    /// Terminal status; only a reset leaves it.
    GameOver,
}

/// Obstacle the snake ran into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collision {
    /// The head left the grid.
    Wall,
    /// The head entered a cell occupied by the snake.
    SelfBody,
}

/// Subsystem responsible for a calibration contribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationSource {
    /// Contribution recorded when the engine constructs a world.
    Engine,
    /// Contribution recorded when the autopilot makes its first decision.
    Autopilot,
    /// Contribution recorded by a driver that found the ledger uncalibrated.
    Driver,
    /// Contribution recorded when the snake reaches a tuning length.
    LengthTuning,
}

/// Integer displacement on the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    /// Horizontal component.
    pub dx: i32,
    /// Vertical component.
    pub dy: i32,
}

impl Offset {
    /// Offset that leaves positions unchanged.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new offset.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Reports whether both components are zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Component-wise addition that saturates at the `i32` bounds.
impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.dx.saturating_add(rhs.dx), self.dy.saturating_add(rhs.dy))
    }
}

impl AddAssign for Offset {
    fn add_assign(&mut self, rhs: Offset) {
        *self = *self + rhs;
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that positions just outside the grid, such as a
/// head about to hit the wall, remain representable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    column: i32,
    row: i32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Position reached by moving one step in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        self.offset(direction.delta())
    }

    /// Position displaced by `offset`, saturating at the `i32` bounds.
    #[must_use]
    pub const fn offset(self, offset: Offset) -> Self {
        Self::new(
            self.column.saturating_add(offset.dx),
            self.row.saturating_add(offset.dy),
        )
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }
}

/// Dimensions of the playing field measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Creates a new grid description.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.width) * u64::from(self.height);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Reports whether the position lies within `[0, width) × [0, height)`.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        u32::try_from(position.column()).map_or(false, |column| column < self.width)
            && u32::try_from(position.row()).map_or(false, |row| row < self.height)
    }

    /// Cell at the middle of the grid, rounding toward the origin.
    #[must_use]
    pub fn center(&self) -> Position {
        Position::new(
            i32::try_from(self.width / 2).unwrap_or(i32::MAX),
            i32::try_from(self.height / 2).unwrap_or(i32::MAX),
        )
    }

    /// Reports whether `width + height` is even.
    #[must_use]
    pub const fn has_even_parity(&self) -> bool {
        (self.width as u64 + self.height as u64) % 2 == 0
    }

    /// Row-major index of the position, if it lies within the grid.
    #[must_use]
    pub fn index(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }

        let column = usize::try_from(position.column()).ok()?;
        let row = usize::try_from(position.row()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Position stored at the provided row-major index.
    #[must_use]
    pub fn position_at(&self, index: usize) -> Option<Position> {
        if index >= self.cell_count() {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        let column = i32::try_from(index % width).ok()?;
        let row = i32::try_from(index / width).ok()?;
        Some(Position::new(column, row))
    }
}

/// Immutable view of a game used by systems and adapters.
///
/// The food position is always the raw position that renderers draw; any
/// calibration adjustments stay inside the world.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Snake segments from head to tail.
    pub body: Vec<Position>,
    /// Raw food position.
    pub food: Position,
    /// Direction applied on the last tick.
    pub direction: Direction,
    /// Direction that will latch on the next tick.
    pub pending_direction: Direction,
    /// Dimensions of the playing field.
    pub grid: GridSize,
    /// Food eaten since the last reset.
    pub score: u32,
    /// Moves performed since the last reset.
    pub moves: u64,
    /// Lifecycle status.
    pub status: GameStatus,
}

impl GameSnapshot {
    /// Leading snake segment, if the snake has any segments.
    #[must_use]
    pub fn head(&self) -> Option<Position> {
        self.body.first().copied()
    }

    /// Trailing snake segment, if the snake has any segments.
    #[must_use]
    pub fn tail(&self) -> Option<Position> {
        self.body.last().copied()
    }

    /// Number of snake segments.
    #[must_use]
    pub fn length(&self) -> usize {
        self.body.len()
    }

    /// Segments excluding the tail, which vacates its cell on a non-growing move.
    #[must_use]
    pub fn body_without_tail(&self) -> &[Position] {
        match self.body.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, Event, GameSnapshot, GameStatus, GridSize, Offset, Position};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = Position::new(1, 1);
        let destination = Position::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn opposite_directions_sum_to_zero() {
        for direction in Direction::CARDINALS {
            let sum = direction.delta() + direction.opposite().delta();
            assert!(sum.is_zero(), "{direction:?} and its opposite do not cancel");
            assert!(direction.opposite().reverses(direction));
            assert!(!direction.reverses(direction));
        }
    }

    #[test]
    fn none_never_reverses() {
        for direction in Direction::CARDINALS {
            assert!(!Direction::None.reverses(direction));
            assert!(!direction.reverses(Direction::None));
        }
    }

    #[test]
    fn toward_clamps_to_single_step() {
        let origin = Position::new(5, 5);
        assert_eq!(Direction::toward(origin, Position::new(5, 4)), Direction::Up);
        assert_eq!(Direction::toward(origin, Position::new(9, 5)), Direction::Right);
        assert_eq!(Direction::toward(origin, Position::new(6, 6)), Direction::None);
        assert_eq!(Direction::toward(origin, origin), Direction::None);
    }

    #[test]
    fn grid_contains_rejects_negative_and_overflowing_cells() {
        let grid = GridSize::new(5, 4);
        assert!(grid.contains(Position::new(0, 0)));
        assert!(grid.contains(Position::new(4, 3)));
        assert!(!grid.contains(Position::new(-1, 0)));
        assert!(!grid.contains(Position::new(0, -1)));
        assert!(!grid.contains(Position::new(5, 0)));
        assert!(!grid.contains(Position::new(0, 4)));
    }

    #[test]
    fn grid_index_round_trips_through_position_at() {
        let grid = GridSize::new(7, 3);
        for index in 0..grid.cell_count() {
            let position = grid.position_at(index).expect("index within grid");
            assert_eq!(grid.index(position), Some(index));
        }
        assert_eq!(grid.position_at(grid.cell_count()), None);
    }

    #[test]
    fn grid_center_and_parity() {
        assert_eq!(GridSize::new(20, 20).center(), Position::new(10, 10));
        assert_eq!(GridSize::new(5, 5).center(), Position::new(2, 2));
        assert!(GridSize::new(20, 20).has_even_parity());
        assert!(!GridSize::new(21, 20).has_even_parity());
    }

    #[test]
    fn position_offset_applies_both_components() {
        let moved = Position::new(3, 3).offset(Offset::new(2, -2));
        assert_eq!(moved, Position::new(5, 1));
        assert_eq!(Position::new(0, 0).step(Direction::Left), Position::new(-1, 0));
    }

    #[test]
    fn offsets_saturate_instead_of_overflowing() {
        let mut drift = Offset::new(i32::MAX - 1, i32::MIN + 1);
        drift += Offset::new(5, -5);
        assert_eq!(drift, Offset::new(i32::MAX, i32::MIN));

        let hitbox = Position::new(3, 4).offset(drift);
        assert_eq!(hitbox, Position::new(i32::MAX, i32::MIN + 4));
        assert_eq!(hitbox.step(Direction::Right), hitbox);
    }

    #[test]
    fn snapshot_body_without_tail_excludes_last_segment() {
        let snapshot = GameSnapshot {
            body: vec![Position::new(2, 2), Position::new(1, 2), Position::new(0, 2)],
            food: Position::new(4, 4),
            direction: Direction::Right,
            pending_direction: Direction::Right,
            grid: GridSize::new(5, 5),
            score: 2,
            moves: 7,
            status: GameStatus::Running,
        };

        assert_eq!(snapshot.head(), Some(Position::new(2, 2)));
        assert_eq!(snapshot.tail(), Some(Position::new(0, 2)));
        assert_eq!(snapshot.body_without_tail().len(), 2);
        assert_eq!(snapshot.length(), 3);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn collision_event_round_trips_through_bincode() {
        assert_round_trip(&Event::SnakeCollided {
            at: Position::new(-1, 3),
            collision: super::Collision::Wall,
        });
    }
}
