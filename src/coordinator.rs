use crate::algorithms::common::{PathfindingAlgorithm, Route};
use crate::grid::{EditError, Position, TerrainGrid, TerrainType, DEFAULT_OBSTACLE_PROBABILITY};
use crate::render::RouteObserver;
use crate::scheduler::{ObstacleScheduler, Scheduler, Task, Tick};
use crate::statistics::{RecomputeStats, RecomputeTrigger};
use log::{debug, info, warn};
use rand::Rng;
use std::time::Instant;

/// How random obstacles are scattered when a new map is created.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub obstacle_probability: f64,
    pub obstacle_types: Vec<TerrainType>,
}

impl Default for MapOptions {
    fn default() -> Self {
        MapOptions {
            obstacle_probability: DEFAULT_OBSTACLE_PROBABILITY,
            obstacle_types: TerrainType::OBSTACLES.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied { position: Position, terrain: TerrainType },
    /// The edit was ignored and nothing was recomputed.
    Rejected(EditError),
}

/// Owns the grid and decides when the route is recomputed.
///
/// Map creation and manual edits recompute before returning. An expiry that
/// actually reverts a cell queues a separate recompute task on the timer
/// facility instead of searching inside the expiry itself.
pub struct RecomputeCoordinator<S: Scheduler> {
    grid: TerrainGrid,
    engine: Box<dyn PathfindingAlgorithm>,
    expiries: ObstacleScheduler<S>,
    observer: Box<dyn RouteObserver>,
    route: Option<Route>,
    stats: RecomputeStats,
}

impl<S: Scheduler> RecomputeCoordinator<S> {
    /// Take over an already built grid and compute its first route.
    pub fn new(
        grid: TerrainGrid,
        engine: Box<dyn PathfindingAlgorithm>,
        expiries: ObstacleScheduler<S>,
        observer: Box<dyn RouteObserver>,
    ) -> Self {
        let mut coordinator = RecomputeCoordinator {
            grid,
            engine,
            expiries,
            observer,
            route: None,
            stats: RecomputeStats::new(),
        };
        coordinator.recompute(RecomputeTrigger::Creation);
        coordinator
    }

    /// Scatter random obstacles over `grid`, then compute its first route.
    pub fn create_map<R: Rng>(
        mut grid: TerrainGrid,
        options: &MapOptions,
        rng: &mut R,
        engine: Box<dyn PathfindingAlgorithm>,
        mut expiries: ObstacleScheduler<S>,
        observer: Box<dyn RouteObserver>,
    ) -> Self {
        let placed = grid.generate_random_obstacles(
            rng,
            options.obstacle_probability,
            &options.obstacle_types,
            &mut expiries,
        );
        info!(
            "created {}x{} map from {} to {} with {} obstacles",
            grid.rows(),
            grid.columns(),
            grid.start(),
            grid.goal(),
            placed
        );
        Self::new(grid, engine, expiries, observer)
    }

    pub fn grid(&self) -> &TerrainGrid {
        &self.grid
    }

    pub fn current_route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn stats(&self) -> &RecomputeStats {
        &self.stats
    }

    pub fn now(&self) -> Tick {
        self.expiries.timers().now()
    }

    pub fn timers(&self) -> &S {
        self.expiries.timers()
    }

    /// Cycle a cell's terrain as a click would, then recompute.
    pub fn edit_cell(&mut self, row: usize, col: usize) -> EditOutcome {
        let result = self.grid.cycle_cell(row, col, &mut self.expiries);
        self.apply_edit(Position::new(row, col), result)
    }

    /// Overwrite a cell's terrain, then recompute.
    pub fn set_cell(&mut self, row: usize, col: usize, terrain: TerrainType) -> EditOutcome {
        let result = self
            .grid
            .set_cell(row, col, terrain, &mut self.expiries)
            .map(|()| terrain);
        self.apply_edit(Position::new(row, col), result)
    }

    /// Run one task handed back by the timer facility.
    pub fn dispatch(&mut self, task: Task) {
        match task {
            Task::Expire(pos) => {
                let reverted = self.grid.expire_if_still_temporary(pos.row, pos.col);
                self.stats.record_expiry(reverted);
                if reverted {
                    debug!("temporary block at {} expired", pos);
                    self.expiries
                        .timers_mut()
                        .schedule_after(0, Task::Recompute);
                } else {
                    debug!("stale expiry at {} ignored", pos);
                }
            }
            Task::Recompute => self.recompute(RecomputeTrigger::Expiry),
        }
    }

    /// Move the clock forward by `elapsed`, running every task that falls due.
    /// Returns the number of tasks dispatched.
    pub fn advance(&mut self, elapsed: Tick) -> usize {
        let until = self.now().saturating_add(elapsed);
        let mut dispatched = 0;
        while let Some((_, task)) = self.expiries.timers_mut().pop_due(until) {
            self.dispatch(task);
            dispatched += 1;
        }
        self.expiries.timers_mut().advance_clock(until);
        dispatched
    }

    fn apply_edit(&mut self, position: Position, result: Result<TerrainType, EditError>) -> EditOutcome {
        match result {
            Ok(terrain) => {
                debug!("cell {} set to {:?}", position, terrain);
                self.recompute(RecomputeTrigger::Edit);
                EditOutcome::Applied { position, terrain }
            }
            Err(err) => {
                debug!("edit rejected: {}", err);
                self.stats.rejected_edits += 1;
                EditOutcome::Rejected(err)
            }
        }
    }

    fn recompute(&mut self, trigger: RecomputeTrigger) {
        let started = Instant::now();
        let route = self.engine.find_path(&self.grid);
        let elapsed = started.elapsed();
        self.stats.record_recompute(trigger, elapsed, route.is_some());

        match &route {
            Some(route) => info!(
                "{} route after {}: {} cells, cost {} ({:.2?})",
                self.engine.name(),
                trigger,
                route.len(),
                route.cost(),
                elapsed
            ),
            None => warn!(
                "no path from {} to {} after {}",
                self.grid.start(),
                self.grid.goal(),
                trigger
            ),
        }

        self.route = route;
        self.observer.route_changed(&self.grid, self.route.as_ref());
    }
}
