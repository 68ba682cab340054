//! Breadth-first path search over the game grid.

use std::collections::VecDeque;

use snake_autopilot_core::{Direction, GridSize, Position};

/// Dense set of cells the search must not enter.
#[derive(Clone, Debug)]
pub struct ObstacleMask {
    grid: GridSize,
    blocked: Vec<bool>,
}

impl ObstacleMask {
    /// Creates a mask with every cell open.
    #[must_use]
    pub fn new(grid: GridSize) -> Self {
        Self {
            grid,
            blocked: vec![false; grid.cell_count()],
        }
    }

    /// Creates a mask blocking each of the provided cells.
    #[must_use]
    pub fn from_cells(grid: GridSize, cells: &[Position]) -> Self {
        let mut mask = Self::new(grid);
        for cell in cells {
            mask.block(*cell);
        }
        mask
    }

    /// Marks a cell as impassable. Cells outside the grid are ignored.
    pub fn block(&mut self, cell: Position) {
        if let Some(index) = self.grid.index(cell) {
            self.blocked[index] = true;
        }
    }

    /// Reports whether the cell is impassable.
    #[must_use]
    pub fn is_blocked(&self, cell: Position) -> bool {
        self.grid
            .index(cell)
            .map_or(false, |index| self.blocked[index])
    }
}

/// Finds a shortest 4-connected path from `start` to `goal`.
///
/// The returned path starts with `start` and ends with `goal`. It is empty when
/// the goal cannot be reached and contains only `start` when both coincide.
/// Neighbours expand in [`Direction::CARDINALS`] order, which fixes the choice
/// between equally short paths. The start cell is never tested against
/// `is_blocked`.
pub fn shortest_path<F>(
    grid: GridSize,
    start: Position,
    goal: Position,
    mut is_blocked: F,
) -> Vec<Position>
where
    F: FnMut(Position) -> bool,
{
    let Some(start_index) = grid.index(start) else {
        return Vec::new();
    };
    if grid.index(goal).is_none() {
        return Vec::new();
    }
    if start == goal {
        return vec![start];
    }

    let mut previous: Vec<Option<usize>> = vec![None; grid.cell_count()];
    let mut visited = vec![false; grid.cell_count()];
    let mut queue = VecDeque::new();
    visited[start_index] = true;
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let Some(current_index) = grid.index(current) else {
            continue;
        };

        for direction in Direction::CARDINALS {
            let neighbor = current.step(direction);
            let Some(neighbor_index) = grid.index(neighbor) else {
                continue;
            };
            if visited[neighbor_index] || is_blocked(neighbor) {
                continue;
            }

            visited[neighbor_index] = true;
            previous[neighbor_index] = Some(current_index);
            if neighbor == goal {
                return trace_back(grid, &previous, start_index, neighbor_index);
            }
            queue.push_back(neighbor);
        }
    }

    Vec::new()
}

fn trace_back(
    grid: GridSize,
    previous: &[Option<usize>],
    start_index: usize,
    goal_index: usize,
) -> Vec<Position> {
    let mut indices = vec![goal_index];
    let mut cursor = goal_index;
    while cursor != start_index {
        let Some(parent) = previous[cursor] else {
            return Vec::new();
        };
        indices.push(parent);
        cursor = parent;
    }

    indices
        .into_iter()
        .rev()
        .filter_map(|index| grid.position_at(index))
        .collect()
}
