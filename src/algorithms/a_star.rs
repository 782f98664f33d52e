use crate::algorithms::common::{PathfindingAlgorithm, Route};
use crate::grid::{Position, TerrainGrid};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Open-set entry keyed by estimated total cost, then by the order the cell
/// entered the open set. We implement `Ord` in reverse to make the
/// `BinaryHeap` a min-heap.
#[derive(Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f_score: u32,
    sequence: u64,
    position: Position,
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Weighted A* with a Manhattan heuristic and first-in, first-out tie-breaking.
///
/// Among open cells with equal `f`, the one that entered the open set first is
/// expanded first, so repeated searches over the same grid yield the same route.
#[derive(Default)]
pub struct AStar;

impl AStar {
    pub fn new() -> Self {
        AStar
    }
}

impl PathfindingAlgorithm for AStar {
    fn name(&self) -> &'static str {
        "a_star"
    }

    fn find_path(&mut self, grid: &TerrainGrid) -> Option<Route> {
        let start = grid.start();
        let goal = grid.goal();
        let heuristic = |pos: Position| pos.manhattan(&goal);

        // Missing entries stand for an infinite score.
        let mut g_scores: FxHashMap<Position, u32> = FxHashMap::default();
        let mut f_scores: FxHashMap<Position, u32> = FxHashMap::default();
        let mut came_from: FxHashMap<Position, Position> = FxHashMap::default();
        // Cells currently in the open set, with the sequence they entered it under.
        let mut open: FxHashMap<Position, u64> = FxHashMap::default();
        let mut queue = BinaryHeap::new();
        let mut next_sequence = 0u64;

        g_scores.insert(start, 0);
        f_scores.insert(start, heuristic(start));
        open.insert(start, next_sequence);
        queue.push(OpenEntry {
            f_score: heuristic(start),
            sequence: next_sequence,
            position: start,
        });
        next_sequence += 1;

        while let Some(entry) = queue.pop() {
            let current = entry.position;

            // Skip entries superseded by a lower f or left over from a closed cell.
            let is_live = open.get(&current) == Some(&entry.sequence)
                && f_scores.get(&current) == Some(&entry.f_score);
            if !is_live {
                continue;
            }
            open.remove(&current);

            if current == goal {
                let cost = g_scores.get(&goal).copied().unwrap_or_default();
                return Some(Route::new(reconstruct_path(&came_from, goal), cost));
            }

            let Some(&current_g) = g_scores.get(&current) else {
                continue;
            };

            for neighbor in grid.neighbors(current) {
                let Some(step) = grid.enter_cost(neighbor) else {
                    continue;
                };
                let tentative_g = current_g + step;
                if tentative_g >= g_scores.get(&neighbor).copied().unwrap_or(u32::MAX) {
                    continue;
                }

                let f_score = tentative_g + heuristic(neighbor);
                g_scores.insert(neighbor, tentative_g);
                f_scores.insert(neighbor, f_score);
                came_from.insert(neighbor, current);

                let sequence = *open.entry(neighbor).or_insert_with(|| {
                    let sequence = next_sequence;
                    next_sequence += 1;
                    sequence
                });
                queue.push(OpenEntry {
                    f_score,
                    sequence,
                    position: neighbor,
                });
            }
        }

        None
    }
}

fn reconstruct_path(came_from: &FxHashMap<Position, Position>, goal: Position) -> Vec<Position> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}
