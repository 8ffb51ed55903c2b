/// The pursuit tick: advances every pursuer one step toward the player.
///
/// Processing order:
///   1. For each pursuer in PursuerSet order, lift its own tile
///   2. Choose a destination (see `domain::ai`), blocked by walls,
///      obstacles, unresolved pursuers and destinations already claimed
///   3. A destination equal to the player's cell is a capture: stop there
///   4. Stamp every decided pursuer back into the grid
///   5. Outcome check
///
/// Resolution is sequential: a later pursuer may step into a cell an
/// earlier one just vacated, and loses any cell an earlier one claimed.

use log::info;

use crate::domain::ai;
use crate::domain::grid::Position;
use crate::domain::tile::Tile;
use super::event::{GameEvent, LossCause};
use super::world::{MazeState, Outcome};

/// Drives pursuers. Stateless: everything lives in the session.
pub struct PursuitController;

impl PursuitController {
    /// Run one tick against `state`. No-op without an active session.
    pub fn step(state: &mut MazeState) -> Vec<GameEvent> {
        let session = match state.active_session_mut() {
            Some(s) => s,
            None => return vec![],
        };
        if session.pursuers.is_empty() {
            return vec![];
        }

        let player = session.player;
        let mut decided: Vec<Position> = Vec::with_capacity(session.pursuers.len());
        let mut caught_by = None;

        for (id, pursuer) in session.pursuers.iter().enumerate() {
            session.grid.stamp(pursuer.pos, pursuer.underfoot);
            match ai::choose_step(&session.grid, pursuer.pos, player, &decided) {
                Some(next) if next == player => {
                    decided.push(pursuer.pos);
                    caught_by = Some(id);
                    break;
                }
                Some(next) => decided.push(next),
                None => decided.push(pursuer.pos),
            }
        }

        // Only the resolved prefix was lifted; the rest are still stamped.
        let mut events = vec![];
        for (id, &to) in decided.iter().enumerate() {
            let pursuer = &mut session.pursuers[id];
            if to != pursuer.pos {
                events.push(GameEvent::PursuerMoved { id, from: pursuer.pos, to });
                pursuer.underfoot = session.grid.get(to).unwrap_or(Tile::Empty);
                pursuer.pos = to;
            }
            session.grid.stamp(to, Tile::Pursuer);
        }

        let caught_by = caught_by.or_else(|| {
            session.pursuers.iter().position(|p| p.pos == player)
        });
        if let Some(pursuer) = caught_by {
            session.outcome = Outcome::Lost;
            info!("game over: caught by pursuer {pursuer} after {} moves", session.move_count);
            events.push(GameEvent::GameOver { cause: LossCause::Caught { pursuer } });
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::LevelCatalogue;
    use crate::sim::world::tests::state_from;

    fn pos(x: usize, y: usize) -> Position { Position::new(x, y) }

    #[test]
    fn first_level_pursuer_takes_longer_axis() {
        let cat = LevelCatalogue::builtin();
        let mut state = MazeState::new();
        state.initialize(&cat, 1);
        assert_eq!(state.pursuer_positions(), vec![pos(3, 4)]);

        let events = PursuitController::step(&mut state);
        assert_eq!(events, vec![GameEvent::PursuerMoved { id: 0, from: pos(3, 4), to: pos(3, 3) }]);
        let grid = state.grid().unwrap();
        assert_eq!(grid.get(pos(3, 4)), Some(Tile::Empty));
        assert_eq!(grid.get(pos(3, 3)), Some(Tile::Pursuer));
    }

    #[test]
    fn no_pursuers_is_noop() {
        let (mut state, _) = state_from(&["#####", "#P.G#", "#####"]);
        let before = state.grid().cloned();
        assert!(PursuitController::step(&mut state).is_empty());
        assert_eq!(state.grid().cloned(), before);
        assert!(state.is_active());
    }

    #[test]
    fn no_session_is_noop() {
        let mut state = MazeState::new();
        assert!(PursuitController::step(&mut state).is_empty());
    }

    #[test]
    fn never_enters_walls_or_obstacles() {
        let (mut state, _) = state_from(&[
            "#######",
            "#P.#..#",
            "#..%.Z#",
            "#G.#..#",
            "#######",
        ]);
        for _ in 0..6 {
            let _ = PursuitController::step(&mut state);
            let grid = state.grid().unwrap();
            for p in state.pursuer_positions() {
                assert!(!matches!(grid.get(p), Some(Tile::Wall | Tile::Obstacle)));
                assert_eq!(grid.get(p), Some(Tile::Pursuer));
            }
        }
    }

    #[test]
    fn earlier_pursuer_wins_contested_cell() {
        let (mut state, _) = state_from(&[
            "######",
            "#.Z..#",
            "#..Z.#",
            "#P..G#",
            "######",
        ]);
        let events = PursuitController::step(&mut state);
        assert_eq!(events, vec![
            GameEvent::PursuerMoved { id: 0, from: pos(2, 1), to: pos(2, 2) },
            GameEvent::PursuerMoved { id: 1, from: pos(3, 2), to: pos(3, 3) },
        ]);
    }

    #[test]
    fn follower_steps_into_vacated_cell() {
        let (mut state, _) = state_from(&[
            "######",
            "#P.ZZ#",
            "#G...#",
            "######",
        ]);
        let _ = PursuitController::step(&mut state);
        assert_eq!(state.pursuer_positions(), vec![pos(2, 1), pos(3, 1)]);
        assert_eq!(state.grid().unwrap().get(pos(4, 1)), Some(Tile::Empty));
    }

    #[test]
    fn unresolved_pursuer_blocks_earlier_one() {
        let (mut state, _) = state_from(&[
            "######",
            "#ZZ.P#",
            "#G####",
            "######",
        ]);
        let events = PursuitController::step(&mut state);
        assert_eq!(events, vec![GameEvent::PursuerMoved { id: 1, from: pos(2, 1), to: pos(3, 1) }]);
        assert_eq!(state.pursuer_positions(), vec![pos(1, 1), pos(3, 1)]);
    }

    #[test]
    fn no_two_pursuers_share_a_cell() {
        let (mut state, _) = state_from(&[
            "########",
            "#Z....Z#",
            "#......#",
            "#Z..P.Z#",
            "#G.....#",
            "########",
        ]);
        for _ in 0..4 {
            if !state.is_active() { break; }
            let _ = PursuitController::step(&mut state);
            let mut seen = state.pursuer_positions();
            let n = seen.len();
            seen.sort_by_key(|p| (p.y, p.x));
            seen.dedup();
            assert_eq!(seen.len(), n);
        }
    }

    #[test]
    fn capture_signals_once_and_freezes() {
        let (mut state, _) = state_from(&[
            "#####",
            "#P.Z#",
            "#G###",
            "#####",
        ]);
        let _ = PursuitController::step(&mut state);
        assert_eq!(state.pursuer_positions(), vec![pos(2, 1)]);

        let events = PursuitController::step(&mut state);
        assert_eq!(events, vec![GameEvent::GameOver { cause: LossCause::Caught { pursuer: 0 } }]);
        assert_eq!(state.outcome(), Some(Outcome::Lost));
        // Catcher is not moved onto the player.
        assert_eq!(state.pursuer_positions(), vec![pos(2, 1)]);
        assert_eq!(state.grid().unwrap().get(pos(1, 1)), Some(Tile::Player));

        assert!(PursuitController::step(&mut state).is_empty());
        assert_eq!(state.move_player(0, 1), None);
    }

    #[test]
    fn capture_stops_later_pursuers() {
        let (mut state, _) = state_from(&[
            "######",
            "#PZ..#",
            "#...Z#",
            "#G...#",
            "######",
        ]);
        let events = PursuitController::step(&mut state);
        assert_eq!(events, vec![GameEvent::GameOver { cause: LossCause::Caught { pursuer: 0 } }]);
        assert_eq!(state.pursuer_positions(), vec![pos(2, 1), pos(4, 2)]);
        assert_eq!(state.grid().unwrap().get(pos(4, 2)), Some(Tile::Pursuer));
    }

    #[test]
    fn crossing_a_goal_leaves_it_intact() {
        let (mut state, _) = state_from(&[
            "######",
            "#P.GZ#",
            "######",
        ]);
        let _ = PursuitController::step(&mut state);
        assert_eq!(state.pursuer_positions(), vec![pos(3, 1)]);
        let _ = PursuitController::step(&mut state);
        assert_eq!(state.pursuer_positions(), vec![pos(2, 1)]);
        assert_eq!(state.grid().unwrap().get(pos(3, 1)), Some(Tile::Goal));
        assert_eq!(state.grid().unwrap().get(pos(4, 1)), Some(Tile::Empty));
    }

    #[test]
    fn tick_after_win_is_noop() {
        let (mut state, _) = state_from(&[
            "######",
            "#PG.Z#",
            "######",
        ]);
        assert_eq!(state.move_player(1, 0), Some(GameEvent::LevelComplete));
        assert!(PursuitController::step(&mut state).is_empty());
        assert_eq!(state.pursuer_positions(), vec![pos(4, 1)]);
    }
}
