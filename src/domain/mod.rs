pub mod ai;
pub mod grid;
pub mod rules;
pub mod tile;
