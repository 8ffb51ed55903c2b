/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Each maze cell is two terminal columns wide so the grid looks square.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use mazechase::domain::tile::Tile;
use mazechase::sim::driver::SessionDriver;
use mazechase::sim::event::LossCause;

use super::Phase;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Every blank cell gets this explicit background, never the terminal default.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Differs from any real cell, so every position is diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column; clipped at the edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Tile visuals ──

const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const GREEN: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const RED: Color = Color::Rgb { r: 255, g: 60, b: 60 };

/// Two glyphs plus colors for one maze cell.
fn tile_visual(tile: Tile) -> (char, char, Color, Color) {
    match tile {
        Tile::Empty    => (' ', ' ', Color::Reset, Color::Reset),
        Tile::Wall     => ('█', '█', Color::Rgb { r: 120, g: 120, b: 120 }, Color::Rgb { r: 70, g: 70, b: 70 }),
        Tile::Player   => ('(', ')', GREEN, Color::Reset),
        Tile::Pursuer  => ('Z', 'z', RED, Color::Rgb { r: 60, g: 10, b: 10 }),
        Tile::Hazard   => ('*', '*', Color::Rgb { r: 200, g: 80, b: 220 }, Color::Reset),
        Tile::Goal     => ('[', ']', GOLD, Color::Rgb { r: 20, g: 60, b: 20 }),
        Tile::Obstacle => ('%', '%', Color::Rgb { r: 180, g: 160, b: 140 }, Color::Rgb { r: 50, g: 45, b: 40 }),
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn render(&mut self, phase: Phase, driver: &SessionDriver, loss: Option<&LossCause>) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_phase != Some(phase) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(phase);
        }

        self.front.clear();
        match phase {
            Phase::Title => self.compose_title(driver),
            Phase::Playing => self.compose_game(driver, " ←↑↓→/WASD: Move   R: Restart   Q/ESC: Title"),
            Phase::LevelComplete => {
                self.compose_game(driver, "");
                self.compose_banner(driver, &["★ LEVEL COMPLETE ★", "ENTER: Next level   R: Retry   ESC: Title"], GOLD, Color::Rgb { r: 20, g: 60, b: 20 });
            }
            Phase::GameOver => {
                let why = match loss {
                    Some(LossCause::Hazard { .. }) => "You stepped on a hazard",
                    Some(LossCause::RanIntoPursuer { .. }) => "You ran into a pursuer",
                    Some(LossCause::Caught { .. }) => "A pursuer caught you",
                    None => "",
                };
                self.compose_game(driver, "");
                self.compose_banner(driver, &["✕ GAME OVER ✕", why, "ENTER/R: Retry   ESC: Title"], RED, Color::Rgb { r: 50, g: 10, b: 10 });
            }
            Phase::Won => self.compose_won(driver),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, driver: &SessionDriver) {
        let state = driver.state();
        let total = driver.catalogue().len();
        let level = state.level().unwrap_or(0);
        let name = driver.catalogue().get(level).map_or("", |l| l.name.as_str());
        let hud = format!(" Level {level} / {total}   Moves: {:<4}  {name} ", state.move_count());
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn compose_game(&mut self, driver: &SessionDriver, help: &str) {
        self.compose_hud(driver);

        let grid = match driver.state().grid() {
            Some(g) => g,
            None => return,
        };
        for y in 0..grid.height() {
            let row = MAP_ROW + y;
            if row >= self.front.height { break; }
            for (x, &tile) in grid.row(y).unwrap_or(&[]).iter().enumerate() {
                let col = x * CELL_W;
                if col + 1 >= self.front.width { break; }
                let (c0, c1, fg, bg) = tile_visual(tile);
                self.front.set(col, row, Cell::new(c0, fg, bg));
                self.front.set(col + 1, row, Cell::new(c1, fg, bg));
            }
        }

        let help_row = MAP_ROW + grid.height() + 1;
        if !help.is_empty() && help_row < self.front.height {
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    /// Boxed message centered over the maze.
    fn compose_banner(&mut self, driver: &SessionDriver, lines: &[&str], fg: Color, bg: Color) {
        let (map_w, map_h) = driver.state().grid()
            .map_or((0, 0), |g| (g.width() * CELL_W, g.height()));
        let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
        let top = (MAP_ROW + map_h / 2).saturating_sub(lines.len() / 2 + 1);
        let left = map_w.saturating_sub(inner + 2) / 2;

        let bar: String = "═".repeat(inner);
        self.front.put_str(left, top, &format!("╔{bar}╗"), fg, bg);
        for (i, line) in lines.iter().enumerate() {
            let pad = inner - line.chars().count();
            let text = format!("║{}{line}{}║", " ".repeat(pad / 2), " ".repeat(pad - pad / 2));
            self.front.put_str(left, top + 1 + i, &text, fg, bg);
        }
        self.front.put_str(left, top + 1 + lines.len(), &format!("╚{bar}╝"), fg, bg);
    }

    fn compose_title(&mut self, driver: &SessionDriver) {
        let title = [
            r"  __  __                 ___ _                   ",
            r" |  \/  |__ _ ______    / __| |_  __ _ ___ ___   ",
            r" | |\/| / _` |_ / -_)  | (__| ' \/ _` (_-</ -_)  ",
            r" |_|  |_\__,_/__\___|   \___|_||_\__,_/__/\___|  ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, GOLD, Color::Reset);
        }

        let menu = 8;
        self.front.put_str(6, menu, "ENTER   Start", GREEN, Color::Reset);
        self.front.put_str(6, menu + 1, "  Q     Quit", Color::White, Color::Reset);

        let count = format!("{} levels", driver.catalogue().len());
        self.front.put_str(6, menu + 3, &count, Color::DarkGrey, Color::Reset);
        for (i, name) in driver.catalogue().names().enumerate() {
            let line = format!("  {:>2}. {name}", i + 1);
            self.front.put_str(6, menu + 4 + i, &line, Color::DarkGrey, Color::Reset);
        }

        let legend_row = menu + 5 + driver.catalogue().len();
        let legend = [
            (Tile::Player, "you"),
            (Tile::Goal, "goal"),
            (Tile::Pursuer, "pursuer"),
            (Tile::Hazard, "hazard"),
            (Tile::Obstacle, "obstacle"),
        ];
        let mut col = 6;
        for (tile, label) in legend {
            let (c0, c1, fg, bg) = tile_visual(tile);
            self.front.set(col, legend_row, Cell::new(c0, fg, bg));
            self.front.set(col + 1, legend_row, Cell::new(c1, fg, bg));
            self.front.put_str(col + 3, legend_row, label, Color::White, Color::Reset);
            col += label.len() + 6;
        }
    }

    fn compose_won(&mut self, driver: &SessionDriver) {
        let box_art = [
            "╔══════════════════════════════╗",
            "║   ★ ALL LEVELS CLEARED! ★    ║",
            "╚══════════════════════════════╝",
        ];
        for (i, line) in box_art.iter().enumerate() {
            self.front.put_str(4, 4 + i, line, GOLD, Color::Reset);
        }
        let levels = format!("◈ {} levels escaped", driver.catalogue().len());
        self.front.put_str(6, 9, &levels, GREEN, Color::Reset);
        self.front.put_str(6, 11, "▸ ENTER / ESC: Back to Title", GREEN, Color::Reset);
    }
}
