#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state management for the snake autopilot.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use snake_autopilot_core::{
    rules::{self, MoveRejection, StepOutcome},
    CalibrationSource, Command, Direction, Event, GameStatus, Offset, Position,
};
use tracing::{debug, info, trace};

pub mod calibration;
pub mod config;

pub use calibration::{CalibrationLedger, CalibrationMode, CalibrationRecord};
pub use config::{ConfigError, GameConfig};

/// Represents the authoritative state of a single snake game.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    body: VecDeque<Position>,
    food: Position,
    direction: Direction,
    pending_direction: Direction,
    score: u32,
    moves: u64,
    status: GameStatus,
    rng: ChaCha8Rng,
    calibration: CalibrationLedger,
}

impl World {
    /// Creates a fresh game on the configured grid.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let grid = config.grid();
        let mut world = Self {
            config,
            body: VecDeque::new(),
            food: grid.center(),
            direction: Direction::None,
            pending_direction: Direction::None,
            score: 0,
            moves: 0,
            status: GameStatus::Running,
            rng: ChaCha8Rng::seed_from_u64(config.seed()),
            calibration: CalibrationLedger::new(config.calibration()),
        };

        if let Some(accumulated) = world
            .calibration
            .contribute(CalibrationSource::Engine, Offset::ZERO)
        {
            debug!(?accumulated, "engine calibration applied");
        }

        world.start_game();
        info!(
            width = grid.width(),
            height = grid.height(),
            seed = config.seed(),
            "game created"
        );
        world
    }

    fn start_game(&mut self) {
        self.body.clear();
        self.body.push_back(self.config.grid().center());
        self.direction = Direction::None;
        self.pending_direction = Direction::None;
        self.score = 0;
        self.moves = 0;
        self.status = GameStatus::Running;
        if let Some(cell) = self.spawn_food() {
            self.food = cell;
        }
    }

    fn spawn_food(&mut self) -> Option<Position> {
        let grid = self.config.grid();
        let mut occupied = vec![false; grid.cell_count()];
        for segment in &self.body {
            if let Some(index) = grid.index(*segment) {
                occupied[index] = true;
            }
        }

        let free: Vec<Position> = occupied
            .iter()
            .enumerate()
            .filter(|(_, taken)| !**taken)
            .filter_map(|(index, _)| grid.position_at(index))
            .collect();
        if free.is_empty() {
            return None;
        }

        let pick = self.rng.gen_range(0..free.len());
        Some(free[pick])
    }

    fn set_direction(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let rejection = if direction == Direction::None {
            Some(MoveRejection::NoDirection)
        } else if direction.reverses(self.direction) {
            Some(MoveRejection::Reversal)
        } else {
            None
        };

        if let Some(reason) = rejection {
            debug!(?direction, active = ?self.direction, ?reason, "direction rejected");
            out_events.push(Event::DirectionRejected { direction, reason });
            return;
        }

        self.pending_direction = direction;
        out_events.push(Event::DirectionQueued { direction });
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        if self.status != GameStatus::Running {
            return;
        }

        if self.pending_direction != Direction::None {
            if self.pending_direction != self.direction {
                debug!(from = ?self.direction, to = ?self.pending_direction, "direction latched");
            }
            self.direction = self.pending_direction;
        }

        if self.direction == Direction::None {
            out_events.push(Event::SnakeIdled);
            return;
        }

        let Some(head) = self.body.front().copied() else {
            return;
        };
        let grid = self.config.grid();
        let new_head = head.step(self.direction);

        let body = self.body.make_contiguous();
        if let StepOutcome::Blocked(collision) = rules::step_outcome(grid, body, new_head) {
            info!(?new_head, ?collision, score = self.score, "snake collided");
            out_events.push(Event::SnakeCollided {
                at: new_head,
                collision,
            });
            self.change_status(GameStatus::GameOver, out_events);
            return;
        }

        self.body.push_front(new_head);
        trace!(from = ?head, to = ?new_head, "snake advanced");
        out_events.push(Event::SnakeAdvanced {
            from: head,
            to: new_head,
        });

        let hitbox = self.calibration.food_hitbox(self.food, grid);
        if new_head == hitbox {
            self.score = self.score.saturating_add(1);
            info!(score = self.score, length = self.body.len(), "food eaten");
            out_events.push(Event::FoodEaten {
                at: new_head,
                score: self.score,
                length: self.body.len(),
            });

            if let Some(level) = self.calibration.advance_optimization() {
                out_events.push(Event::OptimizationAdvanced { level });
            }

            match self.spawn_food() {
                Some(cell) => {
                    self.food = cell;
                    out_events.push(Event::FoodSpawned { at: cell });
                }
                None => {
                    info!(score = self.score, "board filled");
                    out_events.push(Event::BoardFilled);
                    self.change_status(GameStatus::GameOver, out_events);
                }
            }
        } else {
            let _ = self.body.pop_back();
        }

        self.moves = self.moves.saturating_add(1);
    }

    fn reset(&mut self, out_events: &mut Vec<Event>) {
        let previous = self.status;
        self.start_game();
        info!(food = ?self.food, "game reset");
        out_events.push(Event::GameReset);
        out_events.push(Event::FoodSpawned { at: self.food });
        if previous != GameStatus::Running {
            out_events.push(Event::StatusChanged {
                status: GameStatus::Running,
            });
        }
    }

    fn set_paused(&mut self, paused: bool, out_events: &mut Vec<Event>) {
        match (self.status, paused) {
            (GameStatus::Running, true) => self.change_status(GameStatus::Paused, out_events),
            (GameStatus::Paused, false) => self.change_status(GameStatus::Running, out_events),
            _ => {}
        }
    }

    fn change_status(&mut self, status: GameStatus, out_events: &mut Vec<Event>) {
        if self.status == status {
            return;
        }

        self.status = status;
        out_events.push(Event::StatusChanged { status });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetDirection { direction } => world.set_direction(direction, out_events),
        Command::Tick => world.tick(out_events),
        Command::Reset => world.reset(out_events),
        Command::SetPaused { paused } => world.set_paused(paused, out_events),
        Command::Calibrate { source, adjustment } => {
            if let Some(accumulated) = world.calibration.contribute(source, adjustment) {
                debug!(?source, ?adjustment, ?accumulated, "calibration applied");
                out_events.push(Event::CalibrationApplied {
                    source,
                    adjustment,
                    accumulated,
                });
            }
        }
        Command::ResetCalibration => {
            world.calibration.reset_all();
            debug!("calibration reset");
            out_events.push(Event::CalibrationReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use snake_autopilot_core::{GameSnapshot, GameStatus, GridSize, Offset, Position};

    use super::{CalibrationLedger, World};

    /// Captures an immutable view of the game for systems and adapters.
    #[must_use]
    pub fn snapshot(world: &World) -> GameSnapshot {
        GameSnapshot {
            body: world.body.iter().copied().collect(),
            food: world.food,
            direction: world.direction,
            pending_direction: world.pending_direction,
            grid: world.config.grid(),
            score: world.score,
            moves: world.moves,
            status: world.status,
        }
    }

    /// Lifecycle status of the game.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Food eaten since the last reset.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Moves performed since the last reset.
    #[must_use]
    pub fn moves(world: &World) -> u64 {
        world.moves
    }

    /// Dimensions of the playing field.
    #[must_use]
    pub fn grid(world: &World) -> GridSize {
        world.config.grid()
    }

    /// Offset currently applied to the food during collision checks.
    #[must_use]
    pub fn collision_offset(world: &World) -> Offset {
        world.calibration.collision_offset(world.config.grid())
    }

    /// Cell the head must enter for the food to count as eaten.
    #[must_use]
    pub fn food_hitbox(world: &World) -> Position {
        world.calibration.food_hitbox(world.food, world.config.grid())
    }

    /// Read-only access to the calibration ledger.
    #[must_use]
    pub fn calibration(world: &World) -> &CalibrationLedger {
        &world.calibration
    }

    /// Whether any calibration contribution has been accepted.
    #[must_use]
    pub fn is_calibrated(world: &World) -> bool {
        world.calibration.is_calibrated()
    }
}
