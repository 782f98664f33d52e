use crate::grid::{Position, DEFAULT_OBSTACLE_PROBABILITY};
use crate::scheduler::{Tick, DEFAULT_EXPIRY_DELAY};
use clap::{Parser, ValueEnum};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    /// Weighted A* with first-in, first-out tie-breaking.
    #[value(name = "a_star")]
    AStar,
    /// A* from the `pathfinding` crate.
    #[value(name = "library_a_star")]
    LibraryAStar,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 10)]
    pub rows: usize,

    #[arg(long, default_value_t = 10)]
    pub columns: usize,

    /// Start cell as `row,col`.
    #[arg(long, default_value = "0,0", value_parser = parse_position)]
    pub start: Position,

    /// Goal cell as `row,col`.
    #[arg(long, default_value = "9,9", value_parser = parse_position)]
    pub goal: Position,

    #[arg(long, default_value_t = DEFAULT_OBSTACLE_PROBABILITY)]
    pub obstacle_probability: f64,

    /// Lifetime of a temporary block, in simulated milliseconds.
    #[arg(long, default_value_t = DEFAULT_EXPIRY_DELAY)]
    pub expiry_delay: Tick,

    /// Seed for reproducible maps.
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Algorithm::AStar)]
    pub algorithm: Algorithm,

    /// Cell to cycle after the map is created, as `row,col`. Repeatable.
    #[arg(long = "edit", value_parser = parse_position)]
    pub edits: Vec<Position>,

    /// Simulated run length.
    #[arg(long, default_value_t = 6000)]
    pub duration: Tick,

    /// Simulated time advanced per step.
    #[arg(long, default_value_t = 250)]
    pub tick: Tick,

    #[arg(long, default_value_t = 100)]
    pub delay_ms: u64,

    #[arg(long, default_value_t = false)]
    pub no_visualization: bool,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("obstacle probability must lie in [0, 1] (got {0})")]
    InvalidProbability(f64),
    #[error("tick must be greater than zero")]
    ZeroTick,
}

impl Config {
    /// Checks that clap's type parsing can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.obstacle_probability) {
            return Err(ConfigError::InvalidProbability(self.obstacle_probability));
        }
        if self.tick == 0 {
            return Err(ConfigError::ZeroTick);
        }
        Ok(())
    }

    pub fn visualize(&self) -> bool {
        !self.no_visualization && !self.quiet
    }
}

/// Parse `row,col` into a position.
pub fn parse_position(raw: &str) -> Result<Position, String> {
    let (row, col) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `row,col`, got `{}`", raw))?;
    let row = row
        .trim()
        .parse()
        .map_err(|e| format!("invalid row `{}`: {}", row.trim(), e))?;
    let col = col
        .trim()
        .parse()
        .map_err(|e| format!("invalid column `{}`: {}", col.trim(), e))?;
    Ok(Position::new(row, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_position_accepts_spaces() {
        assert_eq!(parse_position("3, 4"), Ok(Position::new(3, 4)));
    }

    #[test]
    fn parse_position_rejects_malformed_input() {
        assert!(parse_position("3").is_err());
        assert!(parse_position("a,1").is_err());
        assert!(parse_position("-1,2").is_err());
    }

    #[test]
    fn defaults_match_the_classic_map() {
        let config = Config::parse_from(["terrain_pathfinding"]);

        assert_eq!(config.rows, 10);
        assert_eq!(config.columns, 10);
        assert_eq!(config.start, Position::new(0, 0));
        assert_eq!(config.goal, Position::new(9, 9));
        assert_eq!(config.expiry_delay, 5000);
        assert_eq!(config.algorithm, Algorithm::AStar);
        assert!(config.edits.is_empty());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn repeated_edits_and_algorithm_are_parsed() {
        let config = Config::parse_from([
            "terrain_pathfinding",
            "--edit",
            "1,2",
            "--edit",
            "3,4",
            "--algorithm",
            "library_a_star",
        ]);

        assert_eq!(config.edits, vec![Position::new(1, 2), Position::new(3, 4)]);
        assert_eq!(config.algorithm, Algorithm::LibraryAStar);
    }

    #[test]
    fn validate_rejects_out_of_range_probability() {
        let config = Config::parse_from(["terrain_pathfinding", "--obstacle-probability", "1.5"]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidProbability(1.5))
        );
    }
}
