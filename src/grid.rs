use crate::scheduler::{ObstacleScheduler, Scheduler};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use thiserror::Error;

/// Probability that a non-endpoint cell receives an obstacle during generation.
pub const DEFAULT_OBSTACLE_PROBABILITY: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Number of unit steps between two cells with no diagonal movement.
    pub fn manhattan(&self, other: &Position) -> u32 {
        (self.row.abs_diff(other.row) + self.col.abs_diff(other.col)) as u32
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TerrainType {
    #[default]
    Free,
    Blocking,
    Water,
    TemporaryBlock,
}

impl TerrainType {
    /// Types random generation picks from.
    pub const OBSTACLES: [TerrainType; 3] = [
        TerrainType::Blocking,
        TerrainType::Water,
        TerrainType::TemporaryBlock,
    ];

    /// Cost of moving into a cell of this type. `None` means the cell can't be entered.
    pub fn enter_cost(self) -> Option<u32> {
        match self {
            TerrainType::Free => Some(1),
            TerrainType::Water => Some(2),
            TerrainType::TemporaryBlock => Some(5),
            TerrainType::Blocking => None,
        }
    }

    /// Next type in the manual edit cycle.
    pub fn next(self) -> Self {
        match self {
            TerrainType::Free => TerrainType::Blocking,
            TerrainType::Blocking => TerrainType::Water,
            TerrainType::Water => TerrainType::TemporaryBlock,
            TerrainType::TemporaryBlock => TerrainType::Free,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            TerrainType::Free => '.',
            TerrainType::Blocking => '#',
            TerrainType::Water => '~',
            TerrainType::TemporaryBlock => 'T',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    Goal,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::Goal => write!(f, "goal"),
        }
    }
}

/// Reasons a grid can't be created.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("rows and columns must be greater than zero (got {rows}x{columns})")]
    InvalidDimensions { rows: usize, columns: usize },
    #[error("{endpoint} {position} lies outside the {rows}x{columns} grid")]
    InvalidCoordinates {
        endpoint: Endpoint,
        position: Position,
        rows: usize,
        columns: usize,
    },
}

/// Reasons a cell edit is refused. The grid is left untouched in both cases.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EditError {
    #[error("cell {0} is outside the grid")]
    OutOfBounds(Position),
    #[error("cell {0} is the start or goal and can't be edited")]
    FixedEndpoint(Position),
}

/// Terrain map with fixed start and goal cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainGrid {
    rows: usize,
    columns: usize,
    cells: Vec<Vec<TerrainType>>,
    start: Position,
    goal: Position,
}

impl TerrainGrid {
    /// Build an all-`Free` grid, validating dimensions before the endpoints.
    pub fn new(
        rows: usize,
        columns: usize,
        start: Position,
        goal: Position,
    ) -> Result<Self, GridError> {
        if rows == 0 || columns == 0 {
            return Err(GridError::InvalidDimensions { rows, columns });
        }

        for (endpoint, position) in [(Endpoint::Start, start), (Endpoint::Goal, goal)] {
            if position.row >= rows || position.col >= columns {
                return Err(GridError::InvalidCoordinates {
                    endpoint,
                    position,
                    rows,
                    columns,
                });
            }
        }

        Ok(TerrainGrid {
            rows,
            columns,
            cells: vec![vec![TerrainType::Free; columns]; rows],
            start,
            goal,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.columns
    }

    pub fn is_endpoint(&self, position: Position) -> bool {
        position == self.start || position == self.goal
    }

    pub fn terrain(&self, position: Position) -> Option<TerrainType> {
        self.cells.get(position.row)?.get(position.col).copied()
    }

    /// Cost of entering `position`, or `None` when it is blocked or off the grid.
    pub fn enter_cost(&self, position: Position) -> Option<u32> {
        self.terrain(position)?.enter_cost()
    }

    pub fn count(&self, terrain: TerrainType) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell == terrain)
            .count()
    }

    /// In-bounds, non-blocking cells adjacent to `pos`, in up, down, left, right order.
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        let candidates = [
            pos.row.checked_sub(1).map(|row| Position::new(row, pos.col)),
            Some(Position::new(pos.row + 1, pos.col)),
            pos.col.checked_sub(1).map(|col| Position::new(pos.row, col)),
            Some(Position::new(pos.row, pos.col + 1)),
        ];

        candidates
            .into_iter()
            .flatten()
            .filter(|next| {
                self.is_valid(next.row, next.col)
                    && self.cells[next.row][next.col] != TerrainType::Blocking
            })
            .collect()
    }

    /// Scatter obstacles over every cell except the endpoints.
    ///
    /// Each cell independently becomes one of `types` (chosen uniformly) with
    /// probability `probability`. Temporary blocks get an expiry check.
    /// Returns the number of cells that received an obstacle.
    pub fn generate_random_obstacles<R: Rng, S: Scheduler>(
        &mut self,
        rng: &mut R,
        probability: f64,
        types: &[TerrainType],
        expiries: &mut ObstacleScheduler<S>,
    ) -> usize {
        let mut placed = 0;

        for row in 0..self.rows {
            for col in 0..self.columns {
                let pos = Position::new(row, col);
                if self.is_endpoint(pos) {
                    continue;
                }
                if rng.gen::<f64>() >= probability {
                    continue;
                }
                let Some(&terrain) = types.choose(rng) else {
                    continue;
                };

                self.cells[row][col] = terrain;
                placed += 1;
                if terrain == TerrainType::TemporaryBlock {
                    expiries.register_expiry(pos);
                }
            }
        }

        debug!(
            "generated {} obstacles on a {}x{} grid",
            placed, self.rows, self.columns
        );
        placed
    }

    /// Overwrite a single cell.
    pub fn set_cell<S: Scheduler>(
        &mut self,
        row: usize,
        col: usize,
        terrain: TerrainType,
        expiries: &mut ObstacleScheduler<S>,
    ) -> Result<(), EditError> {
        let pos = self.editable(row, col)?;
        self.cells[row][col] = terrain;
        if terrain == TerrainType::TemporaryBlock {
            expiries.register_expiry(pos);
        }
        Ok(())
    }

    /// Advance a cell through `Free -> Blocking -> Water -> TemporaryBlock -> Free`.
    pub fn cycle_cell<S: Scheduler>(
        &mut self,
        row: usize,
        col: usize,
        expiries: &mut ObstacleScheduler<S>,
    ) -> Result<TerrainType, EditError> {
        self.editable(row, col)?;
        let next = self.cells[row][col].next();
        self.set_cell(row, col, next, expiries)?;
        Ok(next)
    }

    /// Revert a temporary block to free terrain.
    ///
    /// Returns `false` without touching the grid when the cell is no longer a
    /// temporary block (it was overwritten after the expiry was scheduled).
    pub fn expire_if_still_temporary(&mut self, row: usize, col: usize) -> bool {
        if !self.is_valid(row, col) || self.cells[row][col] != TerrainType::TemporaryBlock {
            return false;
        }
        self.cells[row][col] = TerrainType::Free;
        true
    }

    fn editable(&self, row: usize, col: usize) -> Result<Position, EditError> {
        let pos = Position::new(row, col);
        if !self.is_valid(row, col) {
            return Err(EditError::OutOfBounds(pos));
        }
        if self.is_endpoint(pos) {
            return Err(EditError::FixedEndpoint(pos));
        }
        Ok(pos)
    }
}

impl fmt::Display for TerrainGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let pos = Position::new(row, col);
                let glyph = if pos == self.start {
                    'S'
                } else if pos == self.goal {
                    'G'
                } else {
                    cell.glyph()
                };
                write!(f, "{}", glyph)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{Task, TimerQueue, DEFAULT_EXPIRY_DELAY};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn expiries() -> ObstacleScheduler<TimerQueue> {
        ObstacleScheduler::new(TimerQueue::new(), DEFAULT_EXPIRY_DELAY)
    }

    fn grid_5x5() -> TerrainGrid {
        TerrainGrid::new(5, 5, Position::new(0, 0), Position::new(4, 4)).unwrap()
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        let err = TerrainGrid::new(0, 3, Position::new(0, 0), Position::new(0, 0)).unwrap_err();
        assert_eq!(err, GridError::InvalidDimensions { rows: 0, columns: 3 });
    }

    #[test]
    fn new_rejects_out_of_bounds_goal() {
        let err = TerrainGrid::new(3, 3, Position::new(0, 0), Position::new(3, 1)).unwrap_err();
        assert!(matches!(
            err,
            GridError::InvalidCoordinates {
                endpoint: Endpoint::Goal,
                ..
            }
        ));
    }

    #[test]
    fn new_grid_is_all_free() {
        let grid = grid_5x5();
        assert_eq!(grid.count(TerrainType::Free), 25);
        assert!(grid.is_valid(4, 4));
        assert!(!grid.is_valid(5, 0));
        assert!(!grid.is_valid(0, 5));
    }

    #[test]
    fn neighbors_skip_blocking_and_edges() {
        let mut grid = grid_5x5();
        let mut expiries = expiries();
        grid.set_cell(1, 0, TerrainType::Blocking, &mut expiries).unwrap();
        grid.set_cell(0, 1, TerrainType::Water, &mut expiries).unwrap();

        assert_eq!(grid.neighbors(Position::new(0, 0)), vec![Position::new(0, 1)]);
        assert_eq!(
            grid.neighbors(Position::new(2, 2)),
            vec![
                Position::new(1, 2),
                Position::new(3, 2),
                Position::new(2, 1),
                Position::new(2, 3),
            ]
        );
    }

    #[test]
    fn edits_on_endpoints_and_outside_are_rejected() {
        let mut grid = grid_5x5();
        let mut expiries = expiries();

        assert_eq!(
            grid.cycle_cell(0, 0, &mut expiries),
            Err(EditError::FixedEndpoint(Position::new(0, 0)))
        );
        assert_eq!(
            grid.set_cell(7, 1, TerrainType::Blocking, &mut expiries),
            Err(EditError::OutOfBounds(Position::new(7, 1)))
        );
        assert_eq!(grid, grid_5x5());
    }

    #[test]
    fn cycle_cell_walks_the_terrain_cycle() {
        let mut grid = grid_5x5();
        let mut expiries = expiries();
        let seen: Vec<TerrainType> = (0..4)
            .map(|_| grid.cycle_cell(2, 3, &mut expiries).unwrap())
            .collect();

        assert_eq!(
            seen,
            vec![
                TerrainType::Blocking,
                TerrainType::Water,
                TerrainType::TemporaryBlock,
                TerrainType::Free,
            ]
        );
        // only the TemporaryBlock step schedules an expiry
        assert_eq!(expiries.timers().pending(), 1);
    }

    #[test]
    fn expire_only_reverts_temporary_blocks() {
        let mut grid = grid_5x5();
        let mut expiries = expiries();
        grid.set_cell(1, 1, TerrainType::TemporaryBlock, &mut expiries).unwrap();
        grid.set_cell(1, 2, TerrainType::Water, &mut expiries).unwrap();

        assert!(grid.expire_if_still_temporary(1, 1));
        assert_eq!(grid.terrain(Position::new(1, 1)), Some(TerrainType::Free));
        assert!(!grid.expire_if_still_temporary(1, 1));
        assert!(!grid.expire_if_still_temporary(1, 2));
        assert_eq!(grid.terrain(Position::new(1, 2)), Some(TerrainType::Water));
        assert!(!grid.expire_if_still_temporary(9, 9));
    }

    #[test]
    fn generation_never_touches_endpoints() {
        let mut grid = grid_5x5();
        let mut expiries = expiries();
        let mut rng = StdRng::seed_from_u64(7);

        let placed = grid.generate_random_obstacles(
            &mut rng,
            1.0,
            &[TerrainType::TemporaryBlock],
            &mut expiries,
        );

        assert_eq!(placed, 23);
        assert_eq!(grid.terrain(grid.start()), Some(TerrainType::Free));
        assert_eq!(grid.terrain(grid.goal()), Some(TerrainType::Free));
        assert_eq!(grid.count(TerrainType::TemporaryBlock), 23);
        assert_eq!(expiries.timers().pending(), 23);
    }

    #[test]
    fn generation_with_zero_probability_leaves_grid_free() {
        let mut grid = grid_5x5();
        let mut expiries = expiries();
        let mut rng = StdRng::seed_from_u64(1);

        let placed = grid.generate_random_obstacles(
            &mut rng,
            0.0,
            &TerrainType::OBSTACLES,
            &mut expiries,
        );

        assert_eq!(placed, 0);
        assert_eq!(grid, grid_5x5());
    }

    #[test]
    fn generation_schedules_one_expiry_per_temporary_block() {
        let mut grid = TerrainGrid::new(20, 20, Position::new(0, 0), Position::new(19, 19)).unwrap();
        let mut expiries = expiries();
        let mut rng = StdRng::seed_from_u64(42);

        grid.generate_random_obstacles(
            &mut rng,
            DEFAULT_OBSTACLE_PROBABILITY,
            &TerrainType::OBSTACLES,
            &mut expiries,
        );

        let temporary = grid.count(TerrainType::TemporaryBlock);
        assert_eq!(expiries.timers().pending(), temporary);
        while let Some((due, task)) = expiries.timers_mut().pop_due(u64::MAX) {
            assert_eq!(due, DEFAULT_EXPIRY_DELAY);
            let Task::Expire(pos) = task else {
                panic!("unexpected task {:?}", task);
            };
            assert_eq!(grid.terrain(pos), Some(TerrainType::TemporaryBlock));
        }
    }

    #[test]
    fn display_marks_endpoints_and_terrain() {
        let mut grid = TerrainGrid::new(2, 3, Position::new(0, 0), Position::new(1, 2)).unwrap();
        let mut expiries = expiries();
        grid.set_cell(0, 1, TerrainType::Blocking, &mut expiries).unwrap();
        grid.set_cell(0, 2, TerrainType::Water, &mut expiries).unwrap();
        grid.set_cell(1, 0, TerrainType::TemporaryBlock, &mut expiries).unwrap();

        assert_eq!(grid.to_string(), "S#~\nT.G\n");
    }
}
