use crate::algorithms::common::Route;
use crate::grid::{Position, TerrainGrid};

/// Receives every freshly computed route. This is the seam to whatever draws the map.
pub trait RouteObserver {
    fn route_changed(&mut self, grid: &TerrainGrid, route: Option<&Route>);
}

/// Prints the grid and route to the terminal.
pub struct AsciiRenderer {
    clear_screen: bool,
}

impl AsciiRenderer {
    pub fn new(clear_screen: bool) -> Self {
        AsciiRenderer { clear_screen }
    }
}

impl RouteObserver for AsciiRenderer {
    fn route_changed(&mut self, grid: &TerrainGrid, route: Option<&Route>) {
        if self.clear_screen {
            print!("\x1B[2J\x1B[1;1H");
        }
        println!("Legend: S=Start, G=Goal, *=Route, #=Blocking, ~=Water, T=Temporary, .=Free");
        print!("{}", render(grid, route));
        match route {
            Some(route) => println!("Route: {} cells, cost {}", route.len(), route.cost()),
            None => println!("No path possible"),
        }
        println!();
    }
}

/// Observer for runs without visualization.
pub struct Headless;

impl RouteObserver for Headless {
    fn route_changed(&mut self, _grid: &TerrainGrid, _route: Option<&Route>) {}
}

/// Grid glyphs with the route overlaid on every cell between the endpoints.
pub fn render(grid: &TerrainGrid, route: Option<&Route>) -> String {
    let mut out = String::with_capacity((grid.columns() * 2 + 4) * (grid.rows() + 1));

    out.push_str("   ");
    for col in 0..grid.columns() {
        out.push_str(&format!("{:2}", col % 10));
    }
    out.push('\n');

    for row in 0..grid.rows() {
        out.push_str(&format!("{:2} ", row));
        for col in 0..grid.columns() {
            let pos = Position::new(row, col);
            let glyph = if pos == grid.start() {
                'S'
            } else if pos == grid.goal() {
                'G'
            } else if route.is_some_and(|route| route.contains(pos)) {
                '*'
            } else {
                grid.terrain(pos).map(|terrain| terrain.glyph()).unwrap_or('?')
            };
            out.push(' ');
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::a_star::AStar;
    use crate::algorithms::common::PathfindingAlgorithm;
    use crate::grid::TerrainType;
    use crate::scheduler::{ObstacleScheduler, TimerQueue, DEFAULT_EXPIRY_DELAY};

    #[test]
    fn render_overlays_route_between_endpoints() {
        let mut grid = TerrainGrid::new(2, 3, Position::new(0, 0), Position::new(0, 2)).unwrap();
        let mut expiries = ObstacleScheduler::new(TimerQueue::new(), DEFAULT_EXPIRY_DELAY);
        grid.set_cell(0, 1, TerrainType::Blocking, &mut expiries).unwrap();
        let route = AStar::new().find_path(&grid);

        assert_eq!(
            render(&grid, route.as_ref()),
            "    0 1 2\n 0  S # G\n 1  * * *\n"
        );
    }
}
