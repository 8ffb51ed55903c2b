/// Input state tracker.
///
/// Moves are discrete: every Press or Repeat event becomes one
/// directional intent, in the order the terminal reported them.
/// Release events are ignored.
///
/// Key bindings live here; the engine only ever sees unit deltas.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use mazechase::domain::rules::MoveDir;

pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
pub const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
pub const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
pub const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Key presses collected during the most recent `drain_events()`.
    presses: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { presses: Vec::with_capacity(8) }
    }

    #[cfg(test)]
    pub fn with_keys(codes: &[KeyCode]) -> Self {
        InputState {
            presses: codes.iter().map(|&c| KeyEvent::new(c, KeyModifiers::NONE)).collect(),
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before advancing the session.
    pub fn drain_events(&mut self) -> std::io::Result<()> {
        self.presses.clear();
        while poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Release {
                    self.presses.push(key);
                }
            }
        }
        Ok(())
    }

    /// Was any of these keys pressed this frame?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        self.presses.iter().any(|k| codes.contains(&k.code))
    }

    /// Directional intents in arrival order.
    pub fn moves(&self) -> Vec<MoveDir> {
        self.presses.iter().filter_map(|k| key_to_dir(k.code)).collect()
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.presses.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

fn key_to_dir(code: KeyCode) -> Option<MoveDir> {
    if KEYS_UP.contains(&code) {
        Some(MoveDir::Up)
    } else if KEYS_DOWN.contains(&code) {
        Some(MoveDir::Down)
    } else if KEYS_LEFT.contains(&code) {
        Some(MoveDir::Left)
    } else if KEYS_RIGHT.contains(&code) {
        Some(MoveDir::Right)
    } else {
        None
    }
}
