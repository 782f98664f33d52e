pub mod a_star;
pub mod common;
pub mod library_a_star;

use crate::config::Algorithm;
use a_star::AStar;
use common::PathfindingAlgorithm;
use library_a_star::LibraryAStar;

pub fn create_algorithm(algorithm: Algorithm) -> Box<dyn PathfindingAlgorithm> {
    match algorithm {
        Algorithm::AStar => Box::new(AStar::new()),
        Algorithm::LibraryAStar => Box::new(LibraryAStar::new()),
    }
}
