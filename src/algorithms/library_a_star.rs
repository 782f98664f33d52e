use crate::algorithms::common::{PathfindingAlgorithm, Route};
use crate::grid::TerrainGrid;
use pathfinding::prelude::astar;

/// A* from the `pathfinding` crate with the same terrain costs.
///
/// Costs match [`AStar`](crate::algorithms::a_star::AStar) but ties between
/// equally good routes are broken by the library, so the cells can differ.
#[derive(Default)]
pub struct LibraryAStar;

impl LibraryAStar {
    pub fn new() -> Self {
        LibraryAStar
    }
}

impl PathfindingAlgorithm for LibraryAStar {
    fn name(&self) -> &'static str {
        "library_a_star"
    }

    fn find_path(&mut self, grid: &TerrainGrid) -> Option<Route> {
        let goal = grid.goal();
        astar(
            &grid.start(),
            |pos| {
                grid.neighbors(*pos)
                    .into_iter()
                    .filter_map(|next| grid.enter_cost(next).map(|cost| (next, cost)))
                    .collect::<Vec<_>>()
            },
            |pos| pos.manhattan(&goal),
            |pos| *pos == goal,
        )
        .map(|(cells, cost)| Route::new(cells, cost))
    }
}
