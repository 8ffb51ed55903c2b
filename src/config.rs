/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
///
/// ```toml
/// [timing]
/// pursuit_interval_ms = 700   # periodic pursuer tick; 0 disables it
/// reactive_delay_ms = 150     # pursuer tick after each player move
/// frame_ms = 16
/// pursuers_move = true
///
/// [general]
/// levels_dir = "levels"
/// log_file = "mazechase.log"
/// ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::Deserialize;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub levels_dir: PathBuf,
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub pursuit_interval_ms: u64,
    pub reactive_delay_ms: u64,
    pub frame_ms: u64,
    pub pursuers_move: bool,
}

impl TimingConfig {
    /// Periodic tick interval, `None` when periodic ticks are off.
    pub fn pursuit_interval(&self) -> Option<Duration> {
        if self.pursuers_move && self.pursuit_interval_ms > 0 {
            Some(Duration::from_millis(self.pursuit_interval_ms))
        } else {
            None
        }
    }

    /// Delay of the tick that follows a player move, `None` when pursuers are frozen.
    pub fn reactive_delay(&self) -> Option<Duration> {
        self.pursuers_move.then(|| Duration::from_millis(self.reactive_delay_ms))
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TomlTiming::default().into()
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_schema(TomlConfig::default(), &[])
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_pursuit_interval")]
    pursuit_interval_ms: u64,
    #[serde(default = "default_reactive_delay")]
    reactive_delay_ms: u64,
    #[serde(default = "default_frame")]
    frame_ms: u64,
    #[serde(default = "default_pursuers_move")]
    pursuers_move: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default)]
    log_file: Option<String>,
}

// ── Defaults ──

fn default_pursuit_interval() -> u64 { 700 }
fn default_reactive_delay() -> u64 { 150 }
fn default_frame() -> u64 { 16 }
fn default_pursuers_move() -> bool { true }
fn default_levels_dir() -> String { "levels".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            pursuit_interval_ms: default_pursuit_interval(),
            reactive_delay_ms: default_reactive_delay(),
            frame_ms: default_frame(),
            pursuers_move: default_pursuers_move(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            log_file: None,
        }
    }
}

impl From<TomlTiming> for TimingConfig {
    fn from(t: TomlTiming) -> Self {
        TimingConfig {
            pursuit_interval_ms: t.pursuit_interval_ms,
            reactive_delay_ms: t.reactive_delay_ms,
            frame_ms: t.frame_ms,
            pursuers_move: t.pursuers_move,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let schema = load_toml(&search_dirs);
        GameConfig::from_schema(schema, &search_dirs)
    }

    /// Parse config text directly. Relative paths are kept as written.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let schema = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_schema(schema, &[]))
    }

    fn from_schema(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let levels_dir = resolve_dir(&cfg.general.levels_dir, search_dirs);
        GameConfig {
            timing: cfg.timing.into(),
            levels_dir,
            log_file: cfg.general.log_file.map(PathBuf::from),
        }
    }
}

/// Absolute paths are used as-is; relative ones are looked up in each
/// search dir, defaulting to relative-to-CWD.
fn resolve_dir(dir: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = Path::new(dir);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    search_dirs.iter()
        .map(|d| d.join(dir))
        .find(|p| p.is_dir())
        .unwrap_or_else(|| PathBuf::from(dir))
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!("config.toml parse error: {e}; using default settings");
                    return TomlConfig::default();
                }
            },
            Err(e) => warn!("could not read {}: {e}", path.display()),
        }
    }
    TomlConfig::default()
}
