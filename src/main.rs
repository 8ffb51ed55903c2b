/// Entry point and game loop.

mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use anyhow::Context;
use log::info;

use mazechase::config::GameConfig;
use mazechase::sim::driver::{Command, SessionDriver};
use mazechase::sim::event::{GameEvent, LossCause, OutcomeListener};
use mazechase::sim::level::LevelCatalogue;
use ui::input::{InputState, KEYS_CONFIRM, KEYS_QUIT, KEYS_RESTART};
use ui::renderer::Renderer;
use ui::Phase;

fn main() -> anyhow::Result<()> {
    let config = GameConfig::load();
    init_logging(&config)?;

    let catalogue = LevelCatalogue::load(&config.levels_dir);
    info!("{} levels available from {}", catalogue.len(), config.levels_dir.display());

    let mut app = App {
        driver: SessionDriver::new(catalogue, config.timing.clone()),
        phase: Phase::Title,
        loss: None,
    };

    let mut renderer = Renderer::new();
    renderer.init().context("terminal init failed")?;

    let result = game_loop(&mut app, &mut renderer, config.timing.frame());
    let cleanup = renderer.cleanup().context("terminal cleanup failed");
    result?;
    cleanup?;

    println!("Thanks for playing mazechase!");
    Ok(())
}

/// The terminal is in raw mode, so log lines only go to a file unless
/// `RUST_LOG` explicitly asks for stderr.
fn init_logging(config: &GameConfig) -> anyhow::Result<()> {
    let default_filter = if config.log_file.is_some() { "warn" } else { "off" };
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter),
    );
    if let Some(path) = &config.log_file {
        let file = File::create(path)
            .with_context(|| format!("could not open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init().context("logger already installed")?;
    Ok(())
}

struct App {
    driver: SessionDriver,
    phase: Phase,
    /// Why the last session was lost, for the game-over screen.
    loss: Option<LossCause>,
}

/// Collects terminal callbacks during one `advance`.
#[derive(Default)]
struct Outcomes {
    completed: bool,
    lost: bool,
}

impl OutcomeListener for Outcomes {
    fn on_level_complete(&mut self) {
        self.completed = true;
    }

    fn on_game_over(&mut self) {
        self.lost = true;
    }
}

fn game_loop(app: &mut App, renderer: &mut Renderer, frame: Duration) -> anyhow::Result<()> {
    let mut kb = InputState::new();
    let epoch = Instant::now();

    loop {
        kb.drain_events().context("reading terminal input")?;
        if kb.ctrl_c_pressed() {
            break;
        }

        let now = epoch.elapsed();
        if !handle_input(app, &kb, now) {
            break;
        }

        tick(app, now);

        renderer.render(app.phase, &app.driver, app.loss.as_ref())
            .context("drawing frame")?;
        std::thread::sleep(frame);
    }

    Ok(())
}

/// Apply this frame's keys to the current phase. Returns `false` to quit.
fn handle_input(app: &mut App, kb: &InputState, now: Duration) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM);
    let quit = kb.any_pressed(KEYS_QUIT);
    let restart = kb.any_pressed(KEYS_RESTART);

    match app.phase {
        Phase::Title => {
            if quit {
                return false;
            }
            if confirm {
                start_level(app, 1, now);
            }
        }
        Phase::Playing => {
            if quit {
                app.phase = Phase::Title;
                return true;
            }
            if restart {
                app.driver.submit(now, Command::Restart);
            }
            for dir in kb.moves() {
                let (dx, dy) = dir.delta();
                app.driver.submit(now, Command::Move { dx, dy });
            }
        }
        Phase::LevelComplete => {
            if quit {
                app.phase = Phase::Title;
            } else if restart {
                retry_level(app, now);
            } else if confirm {
                let next = app.driver.state().level().unwrap_or(0) + 1;
                start_level(app, next, now);
            }
        }
        Phase::GameOver => {
            if quit {
                app.phase = Phase::Title;
            } else if confirm || restart {
                retry_level(app, now);
            }
        }
        Phase::Won => {
            if quit || confirm {
                app.phase = Phase::Title;
            }
        }
    }
    true
}

fn start_level(app: &mut App, level: usize, now: Duration) {
    if app.driver.start(level, now) {
        app.loss = None;
        app.phase = Phase::Playing;
    }
}

fn retry_level(app: &mut App, now: Duration) {
    if app.driver.restart(now) {
        app.loss = None;
        app.phase = Phase::Playing;
    }
}

/// Run everything due by `now` while a level is being played.
fn tick(app: &mut App, now: Duration) {
    if app.phase != Phase::Playing {
        return;
    }
    let mut outcomes = Outcomes::default();
    let events = app.driver.advance(now, &mut outcomes);
    settle(app, &events, &outcomes);
}

/// Move to the next phase once the session reaches a terminal outcome.
fn settle(app: &mut App, events: &[GameEvent], outcomes: &Outcomes) {
    if outcomes.completed {
        let level = app.driver.state().level().unwrap_or(0);
        app.phase = if level >= app.driver.catalogue().len() {
            Phase::Won
        } else {
            Phase::LevelComplete
        };
    } else if outcomes.lost {
        app.loss = events.iter().find_map(|e| match e {
            GameEvent::GameOver { cause } => Some(*cause),
            _ => None,
        });
        app.phase = Phase::GameOver;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;
    use mazechase::config::TimingConfig;
    use mazechase::sim::level::LevelDef;

    const SHORT: &[&str] = &["#####", "#PG.#", "#####"];

    fn app() -> App {
        let levels = vec![
            LevelDef::from_rows("one", SHORT).unwrap(),
            LevelDef::from_rows("two", SHORT).unwrap(),
        ];
        App {
            driver: SessionDriver::new(LevelCatalogue::new(levels), TimingConfig::default()),
            phase: Phase::Title,
            loss: None,
        }
    }

    fn press(app: &mut App, code: KeyCode, now: u64) {
        let now = Duration::from_millis(now);
        assert!(handle_input(app, &InputState::with_keys(&[code]), now));
        tick(app, now);
    }

    fn clear_first_level(app: &mut App) {
        press(app, KeyCode::Enter, 0);
        assert_eq!(app.phase, Phase::Playing);
        press(app, KeyCode::Right, 10);
        assert_eq!(app.phase, Phase::LevelComplete);
    }

    #[test]
    fn level_complete_offers_retry() {
        let mut app = app();
        clear_first_level(&mut app);
        press(&mut app, KeyCode::Char('r'), 20);
        assert_eq!(app.phase, Phase::Playing);
        assert_eq!(app.driver.state().level(), Some(1));
        assert!(app.driver.state().is_active());
    }

    #[test]
    fn level_complete_advances_on_confirm() {
        let mut app = app();
        clear_first_level(&mut app);
        press(&mut app, KeyCode::Enter, 20);
        assert_eq!(app.phase, Phase::Playing);
        assert_eq!(app.driver.state().level(), Some(2));
    }

    #[test]
    fn last_level_leads_to_won() {
        let mut app = app();
        clear_first_level(&mut app);
        press(&mut app, KeyCode::Enter, 20);
        press(&mut app, KeyCode::Right, 30);
        assert_eq!(app.phase, Phase::Won);
    }

    #[test]
    fn restart_and_move_in_one_frame_keeps_the_move() {
        let mut app = app();
        press(&mut app, KeyCode::Enter, 0);
        let keys = InputState::with_keys(&[KeyCode::Char('r'), KeyCode::Right]);
        assert!(handle_input(&mut app, &keys, Duration::from_millis(10)));
        tick(&mut app, Duration::from_millis(10));
        assert_eq!(app.phase, Phase::LevelComplete);
    }
}
