/// Events emitted by session mutations.
/// The presentation layer consumes these; the two terminal events are
/// also forwarded to an `OutcomeListener` exactly once per session.

use crate::domain::grid::Position;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LossCause {
    /// Player walked onto a static hazard.
    Hazard { at: Position },
    /// Player walked into a pursuer.
    RanIntoPursuer { at: Position },
    /// A pursuer reached the player during a tick.
    Caught { pursuer: usize },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PlayerMoved { from: Position, to: Position },
    PursuerMoved { id: usize, from: Position, to: Position },
    LevelComplete,
    GameOver { cause: LossCause },
}

impl GameEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameEvent::LevelComplete | GameEvent::GameOver { .. })
    }
}

/// Receiver of the two terminal notifications.
pub trait OutcomeListener {
    fn on_level_complete(&mut self);
    fn on_game_over(&mut self);
}

/// Listener that ignores both signals.
impl OutcomeListener for () {
    fn on_level_complete(&mut self) {}
    fn on_game_over(&mut self) {}
}
