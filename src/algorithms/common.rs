use crate::grid::{Position, TerrainGrid};

/// A route from the grid's start to its goal, both inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    cells: Vec<Position>,
    cost: u32,
}

impl Route {
    pub fn new(cells: Vec<Position>, cost: u32) -> Self {
        Route { cells, cost }
    }

    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    /// Sum of the enter costs of every cell after the first.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, position: Position) -> bool {
        self.cells.contains(&position)
    }
}

pub trait PathfindingAlgorithm {
    fn name(&self) -> &'static str;

    /// Search from the grid's start to its goal.
    ///
    /// Returns `None` when the goal is unreachable. Never mutates the grid.
    fn find_path(&mut self, grid: &TerrainGrid) -> Option<Route>;
}
