/// Player movement rules — truth-table driven.
///
/// Pure functions operating on a grid — no side effects.
/// These encode "what happens" without performing the action.
///
/// ## Player Move Truth Table
///
/// ┌────────────────────────────┬──────────────┐
/// │ Condition (priority order)  │ Verdict      │
/// ├────────────────────────────┼──────────────┤
/// │ Target out of bounds        │ Blocked      │
/// │ Target Wall / Obstacle      │ Blocked      │
/// │ Target Pursuer / Hazard     │ Lethal       │
/// │ Target Goal                 │ Goal         │
/// │ Otherwise                   │ Open         │
/// └────────────────────────────┴──────────────┘
///
/// Only `Open` mutates the grid; `Lethal` and `Goal` end the session
/// with the grid left exactly as it was.

use super::grid::{Grid, Position};
use super::tile::Tile;

/// Movement direction (one unit step on the grid).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDir {
    /// Unit delta `(dx, dy)`; `y` grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            MoveDir::Up => (0, -1),
            MoveDir::Down => (0, 1),
            MoveDir::Left => (-1, 0),
            MoveDir::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveVerdict {
    /// Move refused; nothing changes.
    Blocked,
    /// Target holds something that kills the player.
    Lethal { at: Position, tile: Tile },
    /// Target is a goal tile.
    Goal { at: Position },
    /// Target is free; the move may be committed.
    Open { to: Position },
}

/// Judge a player step from `from` by `(dx, dy)`.
pub fn judge_move(grid: &Grid, from: Position, dx: i32, dy: i32) -> MoveVerdict {
    let target = match grid.offset(from, dx, dy) {
        Some(p) => p,
        None => return MoveVerdict::Blocked,
    };
    let tile = match grid.get(target) {
        Some(t) => t,
        None => return MoveVerdict::Blocked,
    };

    if tile.is_impassable() {
        MoveVerdict::Blocked
    } else if tile.is_lethal() {
        MoveVerdict::Lethal { at: target, tile }
    } else if tile.is_goal() {
        MoveVerdict::Goal { at: target }
    } else {
        MoveVerdict::Open { to: target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::tests::grid_from;

    const P: Position = Position::new(1, 1);

    #[test]
    fn open_floor() {
        let g = grid_from(&["###", "#P.", "#.#"]);
        assert_eq!(judge_move(&g, P, 1, 0), MoveVerdict::Open { to: Position::new(2, 1) });
        assert_eq!(judge_move(&g, P, 0, 1), MoveVerdict::Open { to: Position::new(1, 2) });
    }

    #[test]
    fn wall_and_obstacle_block() {
        let g = grid_from(&["#%#", "#P#", "###"]);
        assert_eq!(judge_move(&g, P, 0, -1), MoveVerdict::Blocked);
        assert_eq!(judge_move(&g, P, -1, 0), MoveVerdict::Blocked);
    }

    #[test]
    fn edge_blocks() {
        let g = grid_from(&["P."]);
        assert_eq!(judge_move(&g, Position::new(0, 0), -1, 0), MoveVerdict::Blocked);
        assert_eq!(judge_move(&g, Position::new(0, 0), 0, 1), MoveVerdict::Blocked);
    }

    #[test]
    fn enemies_are_lethal() {
        let g = grid_from(&["#Z#", "*P#", "###"]);
        assert_eq!(
            judge_move(&g, P, 0, -1),
            MoveVerdict::Lethal { at: Position::new(1, 0), tile: Tile::Pursuer }
        );
        assert_eq!(
            judge_move(&g, P, -1, 0),
            MoveVerdict::Lethal { at: Position::new(0, 1), tile: Tile::Hazard }
        );
    }

    #[test]
    fn goal_wins() {
        let g = grid_from(&["###", "#PG", "###"]);
        assert_eq!(judge_move(&g, P, 1, 0), MoveVerdict::Goal { at: Position::new(2, 1) });
    }

    #[test]
    fn deltas_are_unit() {
        for dir in [MoveDir::Up, MoveDir::Down, MoveDir::Left, MoveDir::Right] {
            let (dx, dy) = dir.delta();
            assert_eq!(dx.abs() + dy.abs(), 1);
        }
    }
}
