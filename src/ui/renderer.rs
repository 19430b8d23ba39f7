/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The play screen is rasterized from `draw::compose` commands. One map
/// tile is 2 terminal columns × 1 row, so sprites in pixel space land on
/// half-tile horizontal steps.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Facing, NpcKind};
use crate::domain::map::{MAP_HEIGHT, MAP_WIDTH, TILE_SIZE};
use crate::domain::tile::Terrain;
use crate::ui::draw::DrawCommand;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: [u8; 16],  // up to 16 bytes (supports ZWJ emoji sequences)
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// gap between rows matches the cells on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 26, g: 58, b: 42 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 16],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0,0,0, 0,0,0,0, 0,0,0,0, 0,0,0,0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn from_char_wide(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::from_char(c, fg, bg);
        cell.wide = true;
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or("")
    }
}

/// Emoji and other symbols that take two terminal columns.
fn is_wide(c: char) -> bool {
    let cp = c as u32;
    (0x1F300..=0x1FAFF).contains(&cp) || (0x2E80..=0xA4CF).contains(&cp)
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
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

    /// Place a 2-column glyph at (x, y).
    fn set_wide(&mut self, x: usize, y: usize, c: char, bg: Color) {
        if x + 1 < self.width {
            self.set(x, y, Cell::from_char_wide(c, Color::Reset, bg));
            self.set(x + 1, y, Cell { bg: Cell::norm_bg(bg), ..Cell::WIDE_CONT });
        }
    }

    /// Write a string at (x, y). Wide glyphs take two columns.
    /// Returns the column after the last glyph.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) -> usize {
        let mut cx = x;
        for ch in s.chars() {
            if is_wide(ch) {
                if cx + 1 >= self.width { break; }
                self.set_wide(cx, y, ch, bg);
                cx += 2;
            } else {
                if cx >= self.width { break; }
                self.set(cx, y, Cell::from_char(ch, fg, bg));
                cx += 1;
            }
        }
        cx
    }

    fn fill_row(&mut self, x0: usize, x1: usize, y: usize, bg: Color) {
        for x in x0..x1 {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }
}

// ── Layout ──

/// Terminal columns per map tile.
const CELL_W: usize = 2;
/// Pixels per terminal column.
const COL_PX: f32 = TILE_SIZE / CELL_W as f32;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MAP_COLS: usize = MAP_WIDTH * CELL_W;
const DIALOGUE_ROW: usize = MAP_ROW + MAP_HEIGHT + 1;
const HELP_ROW: usize = DIALOGUE_ROW + 5;

const HUD_BG: Color = Color::Rgb { r: 20, g: 40, b: 30 };
const GOLD: Color = Color::Rgb { r: 255, g: 215, b: 0 };
const HI: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const PANEL_BG: Color = Color::Rgb { r: 26, g: 26, b: 46 };

/// What the host wants on screen this frame.
pub enum Screen<'a> {
    Title,
    Playing {
        commands: &'a [DrawCommand],
        /// Formatted contact number while the reward modal is open.
        prompt: Option<&'a str>,
    },
    Victory {
        number: &'a str,
        message: Option<&'a str>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ScreenKind {
    Title,
    Playing,
    Victory,
}

impl Screen<'_> {
    fn kind(&self) -> ScreenKind {
        match self {
            Screen::Title => ScreenKind::Title,
            Screen::Playing { .. } => ScreenKind::Playing,
            Screen::Victory { .. } => ScreenKind::Victory,
        }
    }
}

/// Terminal (col, row) of a sprite whose top-left is at pixel (x, y).
fn sprite_cell(x: f32, y: f32) -> (usize, usize) {
    let col = (x / COL_PX).round().clamp(0.0, (MAP_COLS - CELL_W) as f32) as usize;
    let row = (y / TILE_SIZE).round().clamp(0.0, (MAP_HEIGHT - 1) as f32) as usize;
    (col, MAP_ROW + row)
}

/// Greedy word wrap. Words longer than `width` get their own line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() { word.len() } else { line.len() + 1 + word.len() };
        if needed > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn terrain_glyphs(terrain: Terrain, gx: usize, gy: usize, shimmer: bool) -> (char, char, Color, Color) {
    match terrain {
        Terrain::Grass => {
            let tuft = if (gx * 7 + gy * 3) % 5 == 0 { ',' } else { ' ' };
            (tuft, ' ', Color::Rgb { r: 61, g: 122, b: 77 }, Color::Rgb { r: 45, g: 90, b: 61 })
        }
        Terrain::Wall => ('♣', '♣', Color::Rgb { r: 61, g: 122, b: 61 }, Color::Rgb { r: 26, g: 61, b: 26 }),
        Terrain::Path => ('░', '░', Color::Rgb { r: 109, g: 94, b: 71 }, Color::Rgb { r: 93, g: 78, b: 55 }),
        Terrain::Water => {
            let (a, b) = if shimmer { ('≈', '~') } else { ('~', '≈') };
            (a, b, Color::Rgb { r: 41, g: 128, b: 185 }, Color::Rgb { r: 26, g: 82, b: 118 })
        }
    }
}

fn player_glyphs(facing: Facing) -> (char, char) {
    match facing {
        Facing::Down => ('☻', '▾'),
        Facing::Up => ('▴', '☻'),
        Facing::Left => ('◂', '☻'),
        Facing::Right => ('☻', '▸'),
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<ScreenKind>,
    /// Keyboard enhancement flags were pushed and must be popped.
    enhanced: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
            enhanced: false,
        }
    }

    /// Enter raw mode and the alternate screen. Returns whether the
    /// terminal will report key Release events.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(self.enhanced)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
            self.enhanced = false;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, screen: &Screen) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Screen change → clear for clean transition
        let kind = screen.kind();
        if self.last_screen != Some(kind) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_screen = Some(kind);
        }

        self.front.clear();
        match screen {
            Screen::Title => self.compose_title(),
            Screen::Playing { commands, prompt } => self.compose_play(commands, *prompt),
            Screen::Victory { number, message } => self.compose_victory(number, *message),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the
        // terminal's own default and leave line artifacts.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                // Skip continuation cells (right half of wide emoji)
                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                // For wide cells, also check if the continuation changed
                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Play screen ──

    fn compose_play(&mut self, commands: &[DrawCommand], prompt: Option<&str>) {
        self.front.fill_row(0, MAP_COLS, HUD_ROW, HUD_BG);

        for cmd in commands {
            match cmd {
                DrawCommand::Terrain { gx, gy, terrain, shimmer } => {
                    let (c0, c1, fg, bg) = terrain_glyphs(*terrain, *gx, *gy, *shimmer);
                    let col = gx * CELL_W;
                    let row = MAP_ROW + gy;
                    self.front.set(col, row, Cell::from_char(c0, fg, bg));
                    self.front.set(col + 1, row, Cell::from_char(c1, fg, bg));
                }
                DrawCommand::Key { x, y, glint } => {
                    let (col, row) = sprite_cell(*x, *y);
                    let bg = if *glint {
                        Color::Rgb { r: 140, g: 120, b: 20 }
                    } else {
                        self.front.get(col, row).bg
                    };
                    self.front.set_wide(col, row, '🔑', bg);
                }
                DrawCommand::Npc { x, y, kind, bob } => {
                    let (col, row) = sprite_cell(*x, *y);
                    let glyph = match kind {
                        NpcKind::Sage => '🧙',
                        NpcKind::Guardian => '🗿',
                    };
                    let bg = if *bob {
                        Color::Rgb { r: 70, g: 50, b: 100 }
                    } else {
                        self.front.get(col, row).bg
                    };
                    self.front.set_wide(col, row, glyph, bg);
                }
                DrawCommand::Player { x, y, facing, step } => {
                    let (col, row) = sprite_cell(*x, *y);
                    let (c0, c1) = player_glyphs(*facing);
                    let fg = if *step {
                        Color::Rgb { r: 120, g: 190, b: 240 }
                    } else {
                        Color::Rgb { r: 52, g: 152, b: 219 }
                    };
                    let bg = self.front.get(col, row).bg;
                    self.front.set(col, row, Cell::from_char(c0, fg, bg));
                    self.front.set(col + 1, row, Cell::from_char(c1, fg, bg));
                }
                DrawCommand::KeyCounter(text) => {
                    self.front.put_str(1, HUD_ROW, text, GOLD, HUD_BG);
                }
                DrawCommand::QuestBanner(text) => {
                    let x = MAP_COLS.saturating_sub(text.chars().count() + 1);
                    self.front.put_str(x, HUD_ROW, text, Color::White, HUD_BG);
                }
                DrawCommand::DialogueBox(text) => self.compose_dialogue(text),
                DrawCommand::RewardModal => self.compose_reward_modal(prompt.unwrap_or("")),
            }
        }

        let help = " ←→↑↓/WASD Move  Space Talk  Esc Title";
        self.front.put_str(0, HELP_ROW, help, Color::DarkGrey, Color::Reset);
    }

    fn compose_dialogue(&mut self, text: &str) {
        let inner = MAP_COLS - 4;
        let border = Color::Rgb { r: 200, g: 180, b: 120 };
        let top = format!("┌{}┐", "─".repeat(MAP_COLS - 2));
        let bottom = format!("└{}[Space]─┘", "─".repeat(MAP_COLS - 10));
        self.front.put_str(0, DIALOGUE_ROW, &top, border, PANEL_BG);
        let lines = wrap(text, inner);
        for i in 0..3 {
            let row = DIALOGUE_ROW + 1 + i;
            self.front.fill_row(0, MAP_COLS, row, PANEL_BG);
            self.front.put_str(0, row, "│", border, PANEL_BG);
            self.front.put_str(MAP_COLS - 1, row, "│", border, PANEL_BG);
            if let Some(line) = lines.get(i) {
                self.front.put_str(2, row, line, Color::White, PANEL_BG);
            }
        }
        self.front.put_str(0, DIALOGUE_ROW + 4, &bottom, border, PANEL_BG);
    }

    fn compose_reward_modal(&mut self, number: &str) {
        let box_w = MAP_COLS - 4;
        let x0 = 2;
        let y0 = MAP_ROW + 4;
        for y in y0..y0 + 8 {
            self.front.fill_row(x0, x0 + box_w, y, PANEL_BG);
        }
        self.front.put_str(x0 + 2, y0 + 1, "🎉 All three keys found!", GOLD, PANEL_BG);
        self.front.put_str(x0 + 2, y0 + 3, "Enter your phone number", Color::White, PANEL_BG);
        self.front.put_str(x0 + 2, y0 + 4, "to unlock the secret:", Color::White, PANEL_BG);
        let field = format!("> {}_", number);
        self.front.put_str(x0 + 2, y0 + 5, &field, HI, PANEL_BG);
        self.front.put_str(x0 + 2, y0 + 7, "Enter Submit  Bksp Delete", Color::DarkGrey, PANEL_BG);
    }

    // ── Static screens ──

    fn compose_title(&mut self) {
        let title = [
            r" _  _______   __   ___  _   _ _____ ____ _____ ",
            r"| |/ / ____\ \ / /  / _ \| | | | ____/ ___|_   _|",
            r"| ' /|  _|  \ V /  | | | | | | |  _| \___ \ | |  ",
            r"| . \| |___  | |   | |_| | |_| | |___ ___) || |  ",
            r"|_|\_\_____| |_|    \__\_\\___/|_____|____/ |_|  ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, GOLD, Color::Reset);
        }

        let tagline = "Three golden keys. One secret.";
        let tx = 2 + title[1].len().saturating_sub(tagline.len()) / 2;
        self.front.put_str(tx, 8, tagline, Color::Rgb { r: 180, g: 220, b: 180 }, Color::Reset);

        self.front.put_str(8, 11, "ENTER   Start", HI, Color::Reset);
        self.front.put_str(8, 12, "  Q     Quit", Color::White, Color::Reset);

        let help = [
            "Controls",
            "  ←→↑↓ / WASD   Walk",
            "  Space / E     Talk, next line",
            "  Esc           Back to title",
        ];
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 { GOLD } else { Color::White };
            self.front.put_str(8, 15 + i, line, color, Color::Reset);
        }
    }

    fn compose_victory(&mut self, number: &str, message: Option<&str>) {
        let box_art = [
            "╔══════════════════════════════════╗",
            "║   ★  THE SECRET IS YOURS!  ★     ║",
            "╚══════════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(4, 3 + i, l, GOLD, Color::Reset);
        }
        let saved = format!("Saved number: {}", number);
        self.front.put_str(6, 8, &saved, Color::White, Color::Reset);
        self.front.put_str(6, 10, "▸ D:           Download backup", HI, Color::Reset);
        self.front.put_str(6, 11, "▸ ENTER / ESC: Back to Title", Color::DarkGrey, Color::Reset);

        if let Some(msg) = message {
            let row = 13;
            let text = format!(" ◈ {} ", msg);
            self.front.put_str(4, row, &text, Color::Black, Color::Rgb { r: 200, g: 180, b: 50 });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprites_snap_to_half_tiles() {
        assert_eq!(sprite_cell(0.0, 0.0), (0, MAP_ROW));
        assert_eq!(sprite_cell(288.0, 384.0), (18, MAP_ROW + 12));
        // 27 px is closer to column 2 (32 px) than column 1 (16 px)
        assert_eq!(sprite_cell(27.0, 384.0), (2, MAP_ROW + 12));
        assert_eq!(sprite_cell(20.0, 50.0), (1, MAP_ROW + 2));
    }

    #[test]
    fn sprite_cells_stay_on_the_map() {
        let (col, row) = sprite_cell(10_000.0, 10_000.0);
        assert_eq!(col, MAP_COLS - CELL_W);
        assert_eq!(row, MAP_ROW + MAP_HEIGHT - 1);
        assert_eq!(sprite_cell(-50.0, -50.0), (0, MAP_ROW));
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("Greetings, traveler! You seek the secret, don't you?", 36);
        assert_eq!(lines, vec!["Greetings, traveler! You seek the", "secret, don't you?"]);
        assert!(wrap("", 10).is_empty());
        assert_eq!(wrap("abcdefghijkl xy", 5), vec!["abcdefghijkl", "xy"]);
    }

    #[test]
    fn wide_glyphs_take_two_columns() {
        let mut fb = FrameBuffer::new(20, 1);
        let end = fb.put_str(0, 0, "🔑 1/3", Color::White, Color::Reset);
        assert_eq!(end, 6);
        assert!(fb.get(0, 0).wide);
        assert!(fb.get(1, 0).cont);
        assert_eq!(fb.get(3, 0).as_str(), "1");
    }

    #[test]
    fn put_str_clips_at_edge() {
        let mut fb = FrameBuffer::new(4, 1);
        let end = fb.put_str(2, 0, "abcdef", Color::White, Color::Reset);
        assert_eq!(end, 4);
        assert_eq!(fb.get(3, 0).as_str(), "b");
        // A wide glyph that would straddle the edge is dropped.
        let mut fb = FrameBuffer::new(3, 1);
        assert_eq!(fb.put_str(2, 0, "🔑", Color::White, Color::Reset), 2);
    }
}
