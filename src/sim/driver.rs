/// SessionDriver: the single-threaded owner of a live session.
///
/// Player input and pursuer timers are both reduced to work items that
/// run one at a time, in order of their (virtual) arrival time:
///
///   - `submit(now, Command)` queues input at `now`
///   - the periodic timer fires every `pursuit_interval`
///   - every committed move arms a one-shot tick at `move time + reactive_delay`
///
/// `advance(now, listener)` drains everything due at or before `now`.
/// Time is a `Duration` supplied by the caller, so tests can drive the
/// clock by hand.
///
/// Timers carry the session generation they were armed for. Loading or
/// restarting a level bumps the generation and cancels them. A terminal
/// outcome cancels them and drops any input still queued behind it.

use std::collections::VecDeque;
use std::time::Duration;

use log::debug;

use crate::config::TimingConfig;
use super::event::{GameEvent, OutcomeListener};
use super::level::LevelCatalogue;
use super::step::PursuitController;
use super::world::MazeState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    /// Move the player by a unit delta.
    Move { dx: i32, dy: i32 },
    /// Reload the current level from the catalogue.
    Restart,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum TimerKind {
    Periodic,
    Reactive,
}

#[derive(Clone, Copy, Debug)]
struct Timer {
    due: Duration,
    generation: u64,
    kind: TimerKind,
}

enum Work {
    Input(Duration, Command),
    Tick(Timer),
}

pub struct SessionDriver {
    catalogue: LevelCatalogue,
    state: MazeState,
    timing: TimingConfig,
    inbox: VecDeque<(Duration, Command)>,
    timers: Vec<Timer>,
}

impl SessionDriver {
    pub fn new(catalogue: LevelCatalogue, timing: TimingConfig) -> Self {
        SessionDriver {
            catalogue,
            state: MazeState::new(),
            timing,
            inbox: VecDeque::new(),
            timers: Vec::new(),
        }
    }

    pub fn state(&self) -> &MazeState {
        &self.state
    }

    pub fn catalogue(&self) -> &LevelCatalogue {
        &self.catalogue
    }

    /// Load `level` (1-based) at time `now`. Returns `false` and changes
    /// nothing if the catalogue has no such level.
    /// Pending input is discarded.
    pub fn start(&mut self, level: usize, now: Duration) -> bool {
        let loaded = self.load(level, now);
        if loaded {
            self.inbox.clear();
        }
        loaded
    }

    /// Reload the current level, if one was ever loaded. Pending input is discarded.
    pub fn restart(&mut self, now: Duration) -> bool {
        match self.state.level() {
            Some(level) => self.start(level, now),
            None => false,
        }
    }

    /// Initialize `level` and re-arm the periodic timer. Leaves the inbox alone,
    /// so commands queued behind a `Restart` still run.
    fn load(&mut self, level: usize, now: Duration) -> bool {
        let before = self.state.generation();
        self.state.initialize(&self.catalogue, level);
        if self.state.generation() == before {
            return false;
        }

        self.timers.clear();
        if let Some(interval) = self.timing.pursuit_interval() {
            self.timers.push(Timer {
                due: now + interval,
                generation: self.state.generation(),
                kind: TimerKind::Periodic,
            });
        }
        true
    }

    /// Queue a command that arrived at `now`.
    pub fn submit(&mut self, now: Duration, command: Command) {
        self.inbox.push_back((now, command));
    }

    /// Earliest pending work item, if any.
    pub fn next_due(&self) -> Option<Duration> {
        let input = self.inbox.front().map(|(t, _)| *t);
        let timer = self.timers.iter().map(|t| t.due).min();
        match (input, timer) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Run every command and timer due at or before `now`, in time order.
    /// Input wins ties with timers.
    pub fn advance(&mut self, now: Duration, listener: &mut dyn OutcomeListener) -> Vec<GameEvent> {
        let mut events = vec![];
        while let Some(work) = self.pop_due(now) {
            let produced = match work {
                Work::Input(at, command) => self.run_command(at, command),
                Work::Tick(timer) => self.run_timer(timer),
            };
            for event in produced {
                match event {
                    GameEvent::LevelComplete => listener.on_level_complete(),
                    GameEvent::GameOver { .. } => listener.on_game_over(),
                    _ => {}
                }
                // Nothing queued behind a terminal event may touch the frozen session.
                if event.is_terminal() {
                    self.timers.clear();
                    self.inbox.clear();
                }
                events.push(event);
            }
        }
        events
    }

    fn pop_due(&mut self, now: Duration) -> Option<Work> {
        let input_at = self.inbox.front().map(|(t, _)| *t).filter(|t| *t <= now);
        let timer_idx = self.timers.iter().enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by_key(|(_, t)| t.due)
            .map(|(i, _)| i);

        match (input_at, timer_idx) {
            (Some(at), Some(i)) if self.timers[i].due < at => Some(Work::Tick(self.timers.swap_remove(i))),
            (Some(_), _) => self.inbox.pop_front().map(|(at, c)| Work::Input(at, c)),
            (None, Some(i)) => Some(Work::Tick(self.timers.swap_remove(i))),
            (None, None) => None,
        }
    }

    fn run_command(&mut self, at: Duration, command: Command) -> Vec<GameEvent> {
        match command {
            Command::Move { dx, dy } => {
                let event = match self.state.move_player(dx, dy) {
                    Some(e) => e,
                    None => return vec![],
                };
                // Armed only after the move is committed, so the tick sees the new grid.
                if let (GameEvent::PlayerMoved { .. }, Some(delay)) = (event, self.timing.reactive_delay()) {
                    self.timers.push(Timer {
                        due: at + delay,
                        generation: self.state.generation(),
                        kind: TimerKind::Reactive,
                    });
                }
                vec![event]
            }
            Command::Restart => {
                if let Some(level) = self.state.level() {
                    self.load(level, at);
                }
                vec![]
            }
        }
    }

    fn run_timer(&mut self, timer: Timer) -> Vec<GameEvent> {
        if timer.generation != self.state.generation() {
            debug!("dropping stale {:?} tick from generation {}", timer.kind, timer.generation);
            return vec![];
        }

        if timer.kind == TimerKind::Periodic {
            if let Some(interval) = self.timing.pursuit_interval() {
                self.timers.push(Timer { due: timer.due + interval, ..timer });
            }
        }

        PursuitController::step(&mut self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Position;
    use crate::sim::event::LossCause;
    use crate::sim::level::LevelDef;
    use crate::sim::world::Outcome;

    #[derive(Default)]
    struct Counts {
        complete: u32,
        over: u32,
    }

    impl OutcomeListener for Counts {
        fn on_level_complete(&mut self) { self.complete += 1; }
        fn on_game_over(&mut self) { self.over += 1; }
    }

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    fn pos(x: usize, y: usize) -> Position { Position::new(x, y) }

    fn timing(interval: u64, delay: u64) -> TimingConfig {
        TimingConfig {
            pursuit_interval_ms: interval,
            reactive_delay_ms: delay,
            frame_ms: 16,
            pursuers_move: true,
        }
    }

    const CORRIDOR: &[&str] = &[
        "##########",
        "#P.......#",
        "#........#",
        "#.......Z#",
        "#G.......#",
        "##########",
    ];

    fn driver(rows: &[&str], timing: TimingConfig) -> SessionDriver {
        let cat = LevelCatalogue::new(vec![LevelDef::from_rows("t", rows).unwrap()]);
        let mut d = SessionDriver::new(cat, timing);
        assert!(d.start(1, ms(0)));
        d
    }

    #[test]
    fn start_outside_catalogue_fails() {
        let mut d = SessionDriver::new(LevelCatalogue::builtin(), timing(500, 100));
        assert!(!d.start(0, ms(0)));
        assert!(!d.start(99, ms(0)));
        assert!(!d.restart(ms(0)));
        assert_eq!(d.next_due(), None);
    }

    #[test]
    fn periodic_ticks_fire_on_interval() {
        let mut d = driver(CORRIDOR, timing(500, 100));
        assert!(d.advance(ms(499), &mut ()).is_empty());
        assert_eq!(d.advance(ms(500), &mut ()).len(), 1);
        assert_eq!(d.advance(ms(1600), &mut ()).len(), 2);
        assert_eq!(d.next_due(), Some(ms(2000)));
    }

    #[test]
    fn move_arms_reactive_tick() {
        let mut d = driver(CORRIDOR, timing(10_000, 100));
        d.submit(ms(10), Command::Move { dx: 1, dy: 0 });
        let events = d.advance(ms(50), &mut ());
        assert_eq!(events, vec![GameEvent::PlayerMoved { from: pos(1, 1), to: pos(2, 1) }]);
        assert_eq!(d.next_due(), Some(ms(110)));

        let events = d.advance(ms(110), &mut ());
        assert_eq!(events, vec![GameEvent::PursuerMoved { id: 0, from: pos(8, 3), to: pos(7, 3) }]);
    }

    #[test]
    fn reactive_tick_sees_post_move_grid() {
        // Before the move the deltas tie and the pursuer would go up; after
        // the player steps down the x delta is larger.
        let mut d = driver(&[
            "#####",
            "#P..#",
            "#...#",
            "#..Z#",
            "#G..#",
            "#####",
        ], timing(10_000, 0));
        d.submit(ms(0), Command::Move { dx: 0, dy: 1 });
        let events = d.advance(ms(0), &mut ());
        assert_eq!(events, vec![
            GameEvent::PlayerMoved { from: pos(1, 1), to: pos(1, 2) },
            GameEvent::PursuerMoved { id: 0, from: pos(3, 3), to: pos(2, 3) },
        ]);
    }

    #[test]
    fn failed_move_arms_nothing() {
        let mut d = driver(CORRIDOR, timing(10_000, 100));
        d.submit(ms(10), Command::Move { dx: -1, dy: 0 });
        assert!(d.advance(ms(500), &mut ()).is_empty());
        assert_eq!(d.next_due(), Some(ms(10_000)));
    }

    #[test]
    fn restart_invalidates_pending_ticks() {
        let mut d = driver(CORRIDOR, timing(10_000, 100));
        d.submit(ms(10), Command::Move { dx: 1, dy: 0 });
        d.submit(ms(50), Command::Restart);
        let events = d.advance(ms(300), &mut ());
        assert_eq!(events.len(), 1);
        assert_eq!(d.state().move_count(), 0);
        assert_eq!(d.state().pursuer_positions(), vec![pos(8, 3)]);
        assert_eq!(d.next_due(), Some(ms(10_050)));
    }

    #[test]
    fn queued_restart_keeps_later_commands() {
        let mut d = driver(CORRIDOR, timing(10_000, 100));
        d.submit(ms(10), Command::Restart);
        d.submit(ms(20), Command::Move { dx: 1, dy: 0 });
        let events = d.advance(ms(30), &mut ());
        assert_eq!(events, vec![GameEvent::PlayerMoved { from: pos(1, 1), to: pos(2, 1) }]);
        assert_eq!(d.state().move_count(), 1);
        assert_eq!(d.next_due(), Some(ms(120)));
    }

    #[test]
    fn external_start_discards_pending_input() {
        let mut d = driver(CORRIDOR, timing(10_000, 100));
        d.submit(ms(10), Command::Move { dx: 1, dy: 0 });
        assert!(d.start(1, ms(5)));
        assert!(d.advance(ms(50), &mut ()).is_empty());
        assert_eq!(d.state().move_count(), 0);
    }

    #[test]
    fn restart_queued_after_win_is_dropped() {
        let mut d = driver(&["#####", "#PG.#", "#####"], timing(100, 10));
        let mut counts = Counts::default();
        d.submit(ms(1), Command::Move { dx: 1, dy: 0 });
        d.submit(ms(2), Command::Restart);
        let events = d.advance(ms(50), &mut counts);
        assert_eq!(events, vec![GameEvent::LevelComplete]);
        assert_eq!(d.state().outcome(), Some(Outcome::Won));
        assert_eq!(d.next_due(), None);
        assert_eq!(counts.complete, 1);
    }

    #[test]
    fn goal_signals_listener_once() {
        let mut d = driver(&["#####", "#PG.#", "#####"], timing(100, 10));
        let mut counts = Counts::default();
        d.submit(ms(1), Command::Move { dx: 1, dy: 0 });
        d.submit(ms(2), Command::Move { dx: 1, dy: 0 });
        d.submit(ms(3), Command::Move { dx: -1, dy: 0 });
        let events = d.advance(ms(1000), &mut counts);
        assert_eq!(events, vec![GameEvent::LevelComplete]);
        assert_eq!(counts.complete, 1);
        assert_eq!(counts.over, 0);
        assert_eq!(d.next_due(), None);
    }

    #[test]
    fn capture_by_timer_signals_game_over() {
        let mut d = driver(&["#####", "#P.Z#", "#G###", "#####"], timing(100, 10));
        let mut counts = Counts::default();
        let events = d.advance(ms(1000), &mut counts);
        assert_eq!(events.last(), Some(&GameEvent::GameOver { cause: LossCause::Caught { pursuer: 0 } }));
        assert_eq!(counts.over, 1);
        assert_eq!(counts.complete, 0);
        assert_eq!(d.next_due(), None);
        assert!(d.advance(ms(5000), &mut counts).is_empty());
        assert_eq!(counts.over, 1);
    }

    #[test]
    fn frozen_pursuers_never_tick() {
        let mut t = timing(100, 10);
        t.pursuers_move = false;
        let mut d = driver(CORRIDOR, t);
        d.submit(ms(5), Command::Move { dx: 1, dy: 0 });
        let events = d.advance(ms(10_000), &mut ());
        assert_eq!(events.len(), 1);
        assert_eq!(d.state().pursuer_positions(), vec![pos(8, 3)]);
    }

    #[test]
    fn new_level_after_loss_resumes() {
        let mut d = driver(&["#####", "#PZ.#", "#G###", "#####"], timing(100, 10));
        let mut counts = Counts::default();
        d.submit(ms(1), Command::Move { dx: 1, dy: 0 });
        let _ = d.advance(ms(1), &mut counts);
        assert_eq!(counts.over, 1);

        assert!(d.restart(ms(2)));
        assert!(d.state().is_active());
        assert_eq!(d.next_due(), Some(ms(102)));
    }
}
