/// Level catalogue: an ordered, validated list of level grids.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.txt` files, sorted by file name)
///   2. Built-in embedded levels
///
/// ## Single-level format (`.txt`):
///   Optional line 1: `# Level Name`
///   Remaining lines: map rows, all the same width
///
/// ## Tile legend:
///   '#' = Wall          '%' = Obstacle (cobweb)
///   'P' = Player start  'Z' = Pursuer start
///   '*' = Hazard        'G' = Goal
///   '.' or ' ' = Empty
///
/// Every level is validated when the catalogue is built: rectangular rows,
/// exactly one player start, at least one goal. A session never sees a
/// malformed grid.

use std::path::Path;

use log::{debug, info, warn};
use thiserror::Error;

use crate::domain::grid::{Grid, GridError};
use crate::domain::tile::Tile;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("unknown tile glyph {ch:?} at row {row}, column {col}")]
    UnknownGlyph { ch: char, row: usize, col: usize },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("level has no player start")]
    MissingPlayer,
    #[error("level has {count} player starts, expected one")]
    MultiplePlayers { count: usize },
    #[error("level has no goal")]
    MissingGoal,
    #[error("could not read {path}: {source}")]
    Io { path: String, source: std::io::Error },
}

/// One validated level definition.
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub grid: Grid,
}

impl LevelDef {
    /// Build a level from glyph rows and validate it.
    pub fn from_rows<S: AsRef<str>>(name: &str, rows: &[S]) -> Result<Self, LevelError> {
        let mut tiles = Vec::with_capacity(rows.len());
        for (row, line) in rows.iter().enumerate() {
            let mut out = Vec::with_capacity(line.as_ref().len());
            for (col, ch) in line.as_ref().chars().enumerate() {
                let tile = Tile::from_glyph(ch).ok_or(LevelError::UnknownGlyph { ch, row, col })?;
                out.push(tile);
            }
            tiles.push(out);
        }

        let grid = Grid::from_rows(tiles)?;

        let players = grid.positions_of(Tile::Player).count();
        if players == 0 {
            return Err(LevelError::MissingPlayer);
        }
        if players > 1 {
            return Err(LevelError::MultiplePlayers { count: players });
        }
        if grid.positions_of(Tile::Goal).next().is_none() {
            return Err(LevelError::MissingGoal);
        }

        Ok(LevelDef { name: name.to_string(), grid })
    }
}

#[derive(Clone, Debug)]
pub struct LevelCatalogue {
    levels: Vec<LevelDef>,
}

impl LevelCatalogue {
    /// Catalogue of already validated levels. Falls back to the built-in
    /// set when `levels` is empty.
    pub fn new(levels: Vec<LevelDef>) -> Self {
        if levels.is_empty() {
            return Self::builtin();
        }
        LevelCatalogue { levels }
    }

    /// The levels that ship with the game.
    pub fn builtin() -> Self {
        LevelCatalogue { levels: embedded_levels() }
    }

    /// Load `.txt` levels from `dir`, or the built-in set if there are none.
    pub fn load(dir: &Path) -> Self {
        if !dir.is_dir() {
            debug!("levels dir {} not found, using built-in levels", dir.display());
            return Self::builtin();
        }
        let levels = load_from_directory(dir);
        if levels.is_empty() {
            debug!("no usable levels in {}, using built-in levels", dir.display());
            return Self::builtin();
        }
        info!("loaded {} levels from {}", levels.len(), dir.display());
        LevelCatalogue { levels }
    }

    pub fn len(&self) -> usize { self.levels.len() }

    pub fn is_empty(&self) -> bool { self.levels.is_empty() }

    /// Level by 1-based index.
    pub fn get(&self, level: usize) -> Option<&LevelDef> {
        level.checked_sub(1).and_then(|i| self.levels.get(i))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.levels.iter().map(|l| l.name.as_str())
    }
}

// ══════════════════════════════════════════════════════════════
// Single-level file parsing
// ══════════════════════════════════════════════════════════════

/// Parse a single level from text content.
pub fn parse_level_file(content: &str, fallback_name: &str) -> Result<LevelDef, LevelError> {
    let mut name = String::new();
    let mut rows: Vec<&str> = vec![];

    for line in content.lines() {
        if rows.is_empty() && name.is_empty() && is_name_line(line) {
            name = line[1..].trim().to_string();
        } else if rows.is_empty() && line.trim().is_empty() {
            continue;
        } else {
            rows.push(line.trim_end_matches('\r'));
        }
    }

    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }

    if name.is_empty() {
        name = fallback_name.to_string();
    }

    LevelDef::from_rows(&name, &rows)
}

/// Distinguish `# Level Name` from `#P..#` (level data).
/// A name line starts with `# ` and contains a character that is not a tile
/// glyph. Any other row is map data, so a typo such as `#P.?G#` is reported
/// as an unknown glyph.
fn is_name_line(line: &str) -> bool {
    line.strip_prefix("# ")
        .map_or(false, |rest| rest.chars().any(|c| Tile::from_glyph(c).is_none()))
}

// ══════════════════════════════════════════════════════════════
// Directory loading (individual .txt files)
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<LevelDef> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!("could not list {}: {e}", dir.display());
            return vec![];
        }
    };

    let mut paths: Vec<_> = entries.flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |e| e == "txt"))
        .collect();
    paths.sort();

    let mut levels = vec![];
    for path in paths {
        match read_level(&path) {
            Ok(def) => levels.push(def),
            Err(e) => warn!("skipping level {}: {e}", path.display()),
        }
    }
    levels
}

fn read_level(path: &Path) -> Result<LevelDef, LevelError> {
    let content = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let stem = path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    parse_level_file(&content, &stem)
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

const EMBEDDED: &[(&str, &[&str])] = &[
    ("Level 1 - The Cellars", &[
        "########",
        "#P..%..#",
        "#.#.#*.#",
        "#....#.#",
        "#%#Z...#",
        "#...#.G#",
        "########",
    ]),
    ("Level 2 - The Great Hall", &[
        "#########",
        "#P..%..*#",
        "#.#.##..#",
        "#.Z.....#",
        "#.#.%.#.#",
        "#...#...#",
        "#.#...*G#",
        "#########",
    ]),
    ("Level 3 - The Battlements", &[
        "############",
        "#P.%..*.%..#",
        "#.###.####.#",
        "#...Z...%..#",
        "###.###.####",
        "#*...%...Z.#",
        "#.##.#####.#",
        "#..Z...%...#",
        "##.##.##.#*#",
        "#%..*......#",
        "#.#.##.##.G#",
        "############",
    ]),
];

fn embedded_levels() -> Vec<LevelDef> {
    EMBEDDED.iter()
        .filter_map(|&(name, rows)| match LevelDef::from_rows(name, rows) {
            Ok(def) => Some(def),
            Err(e) => {
                warn!("built-in level {name:?} is invalid: {e}");
                None
            }
        })
        .collect()
}
