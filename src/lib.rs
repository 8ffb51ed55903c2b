//! Maze Chase engine.
//!
//! `domain` holds the pure pieces (tiles, grid, movement rules, pursuit
//! heuristic). `sim` holds the live session: level catalogue, `MazeState`,
//! the pursuit tick and the single-threaded `SessionDriver` that orders
//! player input and pursuer timers. `config` loads `config.toml`.

pub mod config;
pub mod domain;
pub mod sim;
