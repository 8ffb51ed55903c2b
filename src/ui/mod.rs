pub mod input;
pub mod renderer;

/// Application screens.
///
///   Title → Playing → { LevelComplete → Playing, GameOver → Playing, Won → Title }
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    LevelComplete,
    GameOver,
    /// Last level of the catalogue cleared.
    Won,
}
