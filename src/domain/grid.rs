/// Grid: a rectangular, bounds-checked matrix of tiles.
///
/// Cells are stored row-major in one `Vec`. Every access goes through
/// `get()` / `set()`, which refuse coordinates outside the grid instead
/// of panicking, so the border wall is never an off-by-one hazard.
///
/// Coordinates are `(x, y)` with `x` the column and `y` the row.

use thiserror::Error;

use super::tile::Tile;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid has no cells")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },
    #[error("({x}, {y}) is outside the grid")]
    OutOfBounds { x: usize, y: usize },
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
}

impl Grid {
    /// Build a grid from rows. Rows must be non-empty and of equal length.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        if height == 0 || width == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (row, tiles) in rows.into_iter().enumerate() {
            if tiles.len() != width {
                return Err(GridError::Ragged { row, expected: width, found: tiles.len() });
            }
            cells.extend(tiles);
        }

        Ok(Grid { width, height, cells })
    }

    pub fn width(&self) -> usize { self.width }

    pub fn height(&self) -> usize { self.height }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Tile at `pos`, or `None` outside the grid.
    #[inline]
    pub fn get(&self, pos: Position) -> Option<Tile> {
        if self.contains(pos) {
            Some(self.cells[pos.y * self.width + pos.x])
        } else {
            None
        }
    }

    /// Overwrite the tile at `pos`.
    #[inline]
    pub fn set(&mut self, pos: Position, tile: Tile) -> Result<(), GridError> {
        if !self.contains(pos) {
            return Err(GridError::OutOfBounds { x: pos.x, y: pos.y });
        }
        self.cells[pos.y * self.width + pos.x] = tile;
        Ok(())
    }

    /// Write to a cell the caller has already read through this grid.
    /// Out-of-range writes are dropped.
    #[inline]
    pub(crate) fn stamp(&mut self, pos: Position, tile: Tile) {
        if self.contains(pos) {
            self.cells[pos.y * self.width + pos.x] = tile;
        }
    }

    /// `pos + (dx, dy)` if the result lies inside the grid.
    pub fn offset(&self, pos: Position, dx: i32, dy: i32) -> Option<Position> {
        let nx = pos.x as i64 + dx as i64;
        let ny = pos.y as i64 + dy as i64;
        if nx < 0 || ny < 0 {
            return None;
        }
        let next = Position::new(nx as usize, ny as usize);
        self.contains(next).then_some(next)
    }

    /// One row of tiles, for rendering.
    pub fn row(&self, y: usize) -> Option<&[Tile]> {
        if y < self.height {
            Some(&self.cells[y * self.width..(y + 1) * self.width])
        } else {
            None
        }
    }

    /// All positions holding `tile`, in row-major order.
    pub fn positions_of(&self, tile: Tile) -> impl Iterator<Item = Position> + '_ {
        let width = self.width;
        self.cells.iter().enumerate()
            .filter(move |(_, t)| **t == tile)
            .map(move |(i, _)| Position::new(i % width, i / width))
    }
}
