pub mod algorithms;
pub mod config;
pub mod coordinator;
pub mod grid;
pub mod render;
pub mod scheduler;
pub mod statistics;
