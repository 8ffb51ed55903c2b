/// MazeState: the single source of truth for one level's live grid.
///
/// ## Layers
///
/// The grid carries everything a renderer needs: walls, hazards, the
/// player tile and the pursuer tiles. Positions are tracked redundantly
/// (`player`, `pursuers`) so nothing ever scans the grid after load.
///
/// Pursuers remember the tile they are standing on (`Pursuer::underfoot`)
/// so that walking across a goal or hazard does not erase it.
///
/// ## Lifecycle
///
///   `initialize` → Active → { Won, Lost }
///
/// Once terminal, `move_player` and the pursuit tick are no-ops until the
/// next `initialize`. Every `initialize` bumps `generation`, which the
/// driver uses to invalidate timers armed for an older session.

use log::{debug, info};

use crate::domain::grid::{Grid, Position};
use crate::domain::rules::{self, MoveVerdict};
use crate::domain::tile::Tile;
use super::event::{GameEvent, LossCause};
use super::level::LevelCatalogue;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Active,
    Won,
    Lost,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pursuer {
    pub pos: Position,
    /// Tile to restore when the pursuer leaves `pos`.
    pub underfoot: Tile,
}

/// One loaded, live level.
#[derive(Clone, Debug)]
pub struct GameplaySession {
    pub level: usize,
    pub grid: Grid,
    pub player: Position,
    /// Row-major scan order from load time; also tick resolution order.
    pub pursuers: Vec<Pursuer>,
    pub move_count: u32,
    pub outcome: Outcome,
}

pub struct MazeState {
    session: Option<GameplaySession>,
    generation: u64,
}

impl Default for MazeState {
    fn default() -> Self {
        Self::new()
    }
}

// ── Construction / lifecycle ──

impl MazeState {
    pub fn new() -> Self {
        MazeState { session: None, generation: 0 }
    }

    /// Load level `level` (1-based) from `catalogue`, replacing any session.
    /// Out-of-range indices are ignored and the current session is kept.
    pub fn initialize(&mut self, catalogue: &LevelCatalogue, level: usize) {
        let def = match catalogue.get(level) {
            Some(d) => d,
            None => {
                debug!("initialize: level {level} outside catalogue of {}", catalogue.len());
                return;
            }
        };

        let grid = def.grid.clone();
        let mut player = None;
        let mut pursuers = vec![];
        for y in 0..grid.height() {
            let row = grid.row(y).unwrap_or(&[]);
            for (x, tile) in row.iter().enumerate() {
                match tile {
                    Tile::Player if player.is_none() => player = Some(Position::new(x, y)),
                    Tile::Pursuer => pursuers.push(Pursuer {
                        pos: Position::new(x, y),
                        underfoot: Tile::Empty,
                    }),
                    _ => {}
                }
            }
        }

        // Catalogue levels are validated to hold exactly one player start.
        let player = match player {
            Some(p) => p,
            None => {
                debug!("initialize: level {level} has no player start");
                return;
            }
        };

        self.generation += 1;
        info!(
            "level {level} \"{}\" loaded: {}x{}, {} pursuers",
            def.name, grid.width(), grid.height(), pursuers.len()
        );
        self.session = Some(GameplaySession {
            level,
            grid,
            player,
            pursuers,
            move_count: 0,
            outcome: Outcome::Active,
        });
    }

    /// Drop the current session entirely.
    pub fn clear(&mut self) {
        self.session = None;
        self.generation += 1;
    }
}

// ── Render snapshot ──

impl MazeState {
    pub fn session(&self) -> Option<&GameplaySession> {
        self.session.as_ref()
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.session.as_ref().map(|s| &s.grid)
    }

    pub fn player(&self) -> Option<Position> {
        self.session.as_ref().map(|s| s.player)
    }

    pub fn pursuer_positions(&self) -> Vec<Position> {
        self.session.as_ref()
            .map(|s| s.pursuers.iter().map(|p| p.pos).collect())
            .unwrap_or_default()
    }

    pub fn move_count(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.move_count)
    }

    pub fn level(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.level)
    }

    /// `None` when no session is loaded.
    pub fn outcome(&self) -> Option<Outcome> {
        self.session.as_ref().map(|s| s.outcome)
    }

    pub fn is_active(&self) -> bool {
        self.outcome() == Some(Outcome::Active)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Mutable access for the pursuit tick; `None` unless the session is active.
    pub(crate) fn active_session_mut(&mut self) -> Option<&mut GameplaySession> {
        self.session.as_mut().filter(|s| s.outcome == Outcome::Active)
    }
}

// ── Player movement ──

impl MazeState {
    /// Move the player by a unit delta.
    ///
    /// Returns the single event the move produced, or `None` when the move
    /// was ignored or rejected (no session, session over, out of bounds,
    /// wall, obstacle).
    pub fn move_player(&mut self, dx: i32, dy: i32) -> Option<GameEvent> {
        let session = match self.active_session_mut() {
            Some(s) => s,
            None => {
                debug!("move ({dx},{dy}) ignored: no active session");
                return None;
            }
        };

        let from = session.player;
        match rules::judge_move(&session.grid, from, dx, dy) {
            MoveVerdict::Blocked => None,
            MoveVerdict::Lethal { at, tile } => {
                session.outcome = Outcome::Lost;
                let cause = if tile == Tile::Pursuer {
                    LossCause::RanIntoPursuer { at }
                } else {
                    LossCause::Hazard { at }
                };
                info!("game over: {cause:?} after {} moves", session.move_count);
                Some(GameEvent::GameOver { cause })
            }
            MoveVerdict::Goal { .. } => {
                session.outcome = Outcome::Won;
                info!("level {} complete in {} moves", session.level, session.move_count + 1);
                Some(GameEvent::LevelComplete)
            }
            MoveVerdict::Open { to } => {
                session.grid.stamp(from, Tile::Empty);
                session.grid.stamp(to, Tile::Player);
                session.player = to;
                session.move_count += 1;
                Some(GameEvent::PlayerMoved { from, to })
            }
        }
    }
}
