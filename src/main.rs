use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::thread;
use std::time::Duration;

use terrain_pathfinding::algorithms::create_algorithm;
use terrain_pathfinding::config::Config;
use terrain_pathfinding::coordinator::{EditOutcome, MapOptions, RecomputeCoordinator};
use terrain_pathfinding::grid::TerrainGrid;
use terrain_pathfinding::render::{AsciiRenderer, Headless, RouteObserver};
use terrain_pathfinding::scheduler::{ObstacleScheduler, TimerQueue};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let config = Config::parse();
    config.validate().context("invalid configuration")?;

    if !config.quiet {
        println!("Starting terrain pathfinding simulation...");
        println!("Grid size: {}x{}", config.rows, config.columns);
        println!("Start: {} | Goal: {}", config.start, config.goal);
        println!(
            "Obstacle probability: {} | Temporary block lifetime: {}",
            config.obstacle_probability, config.expiry_delay
        );
        println!("Algorithm: {:?}", config.algorithm);
        println!();
    }

    let grid = TerrainGrid::new(config.rows, config.columns, config.start, config.goal)
        .context("could not create map")?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let observer: Box<dyn RouteObserver> = if config.visualize() {
        Box::new(AsciiRenderer::new(true))
    } else {
        Box::new(Headless)
    };

    let options = MapOptions {
        obstacle_probability: config.obstacle_probability,
        ..MapOptions::default()
    };

    let mut coordinator = RecomputeCoordinator::create_map(
        grid,
        &options,
        &mut rng,
        create_algorithm(config.algorithm),
        ObstacleScheduler::new(TimerQueue::new(), config.expiry_delay),
        observer,
    );

    for edit in &config.edits {
        if let EditOutcome::Rejected(err) = coordinator.edit_cell(edit.row, edit.col) {
            eprintln!("Ignoring edit: {}", err);
        }
    }

    while coordinator.now() < config.duration {
        let step = config.tick.min(config.duration - coordinator.now());
        coordinator.advance(step);

        if config.visualize() {
            thread::sleep(Duration::from_millis(config.delay_ms));
        }
    }

    println!("\n=== FINAL RESULTS ===");
    println!("Simulated time: {}", coordinator.now());
    match coordinator.current_route() {
        Some(route) => println!("Final route: {} cells, cost {}", route.len(), route.cost()),
        None => println!("Final route: no path possible"),
    }
    println!("Pending timers: {}", coordinator.timers().pending());
    println!("{}", coordinator.stats());

    if config.visualize() {
        print!(
            "{}",
            terrain_pathfinding::render::render(coordinator.grid(), coordinator.current_route())
        );
    }

    Ok(())
}
