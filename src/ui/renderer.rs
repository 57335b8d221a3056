/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// ## Board layout
///
/// Each tile is `CELL_W` columns by 2 rows: an edge row carrying its north
/// wall, then a body row whose first column is its west wall. The board is
/// closed by one extra row (south boundary) and column (east boundary).
///
/// ```text
///   ┌───┬───┐     edge row   (y = height-1)
///   │ ● ─ ─ │     body row
///   ├   ┘   ┤     edge row   (y = height-2)
/// ```
///
/// Trails, hints and wall junctions all use the same glyph table indexed
/// by a 4-bit direction mask.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use trailrunner::domain::direction::{DirSet, Direction, CARDINALS};
use trailrunner::domain::grid::{Grid, Pos};
use trailrunner::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the gap
    /// between rows matches the cells on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
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

    /// Recolor the background of an existing cell.
    fn tint(&mut self, x: usize, y: usize, bg: Color) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x].bg = bg;
        }
    }

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

// ── Glyphs ──

/// Box glyph for a set of arms. Bits: N=1, E=2, S=4, W=8.
const GLYPHS: [char; 16] = [
    ' ', '│', '─', '└', '│', '│', '┌', '├',
    '─', '┘', '─', '┴', '┐', '┤', '┬', '┼',
];

fn glyph(mask: DirSet) -> char {
    GLYPHS[mask.bits() as usize & 0xF]
}

fn arrow(dir: Direction) -> char {
    match dir {
        Direction::North => '↑',
        Direction::South => '↓',
        Direction::East => '→',
        Direction::West => '←',
        Direction::Start => ' ',
    }
}

const WALL_FG: Color = Color::Rgb { r: 150, g: 150, b: 190 };
const TRAIL_FG: Color = Color::Rgb { r: 80, g: 220, b: 255 };
const HINT_FG: Color = Color::Rgb { r: 230, g: 200, b: 60 };
const TOKEN_FG: Color = Color::Rgb { r: 255, g: 110, b: 90 };
const GOAL_FG: Color = Color::Rgb { r: 80, g: 255, b: 120 };
const AFFORD_FG: Color = Color::Rgb { r: 255, g: 255, b: 255 };
const ICE_BG: Color = Color::Rgb { r: 40, g: 70, b: 110 };
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const CURSOR_BG: Color = Color::Rgb { r: 30, g: 60, b: 30 };

// ── Renderer ──

/// Terminal columns per tile (west wall + 3 body columns).
const CELL_W: usize = 4;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MAP_COL: usize = 2;

/// Inner width of the select screen frames.
const SELECT_W: usize = 44;

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
        self.sync_size()?;
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

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        self.sync_size()?;

        // Phase change → full repaint for a clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        match world.phase {
            Phase::PackSelect => self.compose_pack_select(world),
            Phase::LevelSelect => self.compose_level_select(world),
            Phase::Playing | Phase::LevelComplete => self.compose_game(world),
            Phase::GameComplete => self.compose_game_complete(world),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    /// Track terminal size; a resize invalidates the back buffer.
    fn sync_size(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors; ResetColor would fall back to the
        // terminal's own default background.
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

    fn compose_game(&mut self, w: &WorldState) {
        let grid = &w.grid;

        // ── HUD row ──
        let hud = format!(
            " {}  Level {}/{}  {}   Hints: {}   Trail: {} ",
            w.pack_name, w.current_level + 1, w.total_levels, w.level_name,
            w.progress.hints, w.mover.ledger().len(),
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Board ──
        self.compose_walls(grid);
        for pos in grid.positions() {
            self.compose_tile(grid, pos);
        }
        self.compose_token(w);

        // ── Message bar ──
        let msg_row = MAP_ROW + 2 * grid.height() + 2;
        if !w.message.is_empty() {
            let msg = format!(" ◈ {} ", w.message);
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &msg, Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help = " Arrows/WASD: slide  H: hint  R: restart  Enter: next  Esc: levels  Q: quit";
        self.front.put_str(0, msg_row + 2, help, Color::DarkGrey, Color::Reset);
    }

    /// Screen position of a tile's body row, first body column.
    fn body_origin(grid: &Grid, pos: Pos) -> (usize, usize) {
        let col = MAP_COL + pos.x * CELL_W + 1;
        let row = MAP_ROW + 2 * (grid.height() - 1 - pos.y) + 1;
        (col, row)
    }

    /// Wall segments and junctions.
    fn compose_walls(&mut self, grid: &Grid) {
        let (w, h) = (grid.width(), grid.height());

        for k in 0..=h {
            let row = MAP_ROW + 2 * k;
            for cx in 0..=w {
                let mut mask = DirSet::EMPTY;
                if k > 0 && v_wall(grid, cx, k - 1) { mask.insert(Direction::North); }
                if k < h && v_wall(grid, cx, k) { mask.insert(Direction::South); }
                if cx > 0 && h_wall(grid, cx - 1, k) { mask.insert(Direction::West); }
                if cx < w && h_wall(grid, cx, k) { mask.insert(Direction::East); }
                let col = MAP_COL + cx * CELL_W;
                self.front.set(col, row, Cell::new(glyph(mask), WALL_FG, Color::Reset));

                if cx < w && h_wall(grid, cx, k) {
                    for dc in 1..CELL_W {
                        self.front.set(col + dc, row, Cell::new('─', WALL_FG, Color::Reset));
                    }
                }
            }
        }

        for i in 0..h {
            let row = MAP_ROW + 2 * i + 1;
            for cx in 0..=w {
                if v_wall(grid, cx, i) {
                    self.front.set(MAP_COL + cx * CELL_W, row, Cell::new('│', WALL_FG, Color::Reset));
                }
            }
        }
    }

    /// Ice, goal, trail and hint marks of one tile. Each mark is drawn on
    /// the tile it leaves from, so shared edges are drawn from both sides
    /// with the same glyph.
    fn compose_tile(&mut self, grid: &Grid, pos: Pos) {
        let tile = grid.tile(pos);
        let (col, row) = Self::body_origin(grid, pos);

        let mut trails = DirSet::EMPTY;
        let mut hints = DirSet::EMPTY;
        for d in CARDINALS {
            if tile.has_trail(d) {
                trails.insert(d);
            } else if tile.has_hint(d) {
                hints.insert(d);
            }
        }

        let bg = if tile.is_ice() { ICE_BG } else { Color::Reset };
        for dc in 0..CELL_W - 1 {
            self.front.set(col + dc, row, Cell::new(' ', Color::White, bg));
        }

        let arms: DirSet = trails.iter().chain(hints.iter()).collect();
        let center_fg = if trails.is_empty() { HINT_FG } else { TRAIL_FG };
        let center = if tile.is_goal() {
            Cell::new('◎', GOAL_FG, bg)
        } else {
            Cell::new(glyph(arms), center_fg, bg)
        };
        self.front.set(col + 1, row, center);

        for (set, fg) in [(hints, HINT_FG), (trails, TRAIL_FG)] {
            for d in set.iter() {
                match d {
                    Direction::West => {
                        self.front.set(col, row, Cell::new('─', fg, bg));
                        self.front.set(col - 1, row, Cell::new('─', fg, Color::Reset));
                    }
                    Direction::East => {
                        self.front.set(col + 2, row, Cell::new('─', fg, bg));
                    }
                    Direction::North => {
                        self.front.set(col + 1, row - 1, Cell::new('│', fg, Color::Reset));
                    }
                    Direction::South => {
                        self.front.set(col + 1, row + 1, Cell::new('│', fg, Color::Reset));
                    }
                    Direction::Start => {}
                }
            }
        }
    }

    /// The token and, while it rests, the directions it can slide.
    fn compose_token(&mut self, w: &WorldState) {
        let grid = &w.grid;
        let pos = w.mover.pos();
        let (col, row) = Self::body_origin(grid, pos);
        let bg = if grid.tile(pos).is_ice() { ICE_BG } else { Color::Reset };
        self.front.set(col + 1, row, Cell::new('●', TOKEN_FG, bg));

        if w.mover.is_moving() || w.phase != Phase::Playing {
            return;
        }
        for d in w.affordances.iter() {
            let (c, r) = match d {
                Direction::North => (col + 1, row - 1),
                Direction::South => (col + 1, row + 1),
                Direction::East => (col + 2, row),
                Direction::West => (col, row),
                Direction::Start => continue,
            };
            self.front.set(c, r, Cell::new(arrow(d), AFFORD_FG, Color::Reset));
            if matches!(d, Direction::East | Direction::West) {
                self.front.tint(c, r, bg);
            }
        }
    }

    fn compose_game_complete(&mut self, w: &WorldState) {
        let box_art = [
            "╔══════════════════════════════╗",
            "║      ★ PACK  COMPLETE ★      ║",
            "╚══════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(4, 4 + i, l, HINT_FG, Color::Reset);
        }
        let levels = format!("◈ {}: all {} levels cleared", w.pack_name, w.total_levels);
        let hints = format!("◈ Hints left: {}", w.progress.hints);
        self.front.put_str(6, 9, &levels, GOAL_FG, Color::Reset);
        self.front.put_str(6, 10, &hints, Color::White, Color::Reset);
        self.front.put_str(6, 12, "▸ ENTER: Packs   Q: Quit", Color::DarkGrey, Color::Reset);
    }

    // ── Select screens ──

    fn compose_header(&mut self, title: &str) {
        let bar = "═".repeat(SELECT_W);
        self.front.put_str(2, 1, &format!("╔{}╗", bar), HINT_FG, Color::Reset);
        self.front.put_str(2, 2, &format!("║{:^width$}║", title, width = SELECT_W), HINT_FG, Color::Reset);
        self.front.put_str(2, 3, &format!("╚{}╝", bar), HINT_FG, Color::Reset);
    }

    /// One list row; the selected row is highlighted across the list width.
    fn compose_entry(&mut self, row: usize, text: &str, fg: Color, selected: bool) {
        if selected {
            for x in 2..2 + SELECT_W + 2 {
                self.front.set(x, row, Cell::new(' ', Color::White, CURSOR_BG));
            }
            self.front.put_str(3, row, "▸", GOAL_FG, CURSOR_BG);
            self.front.put_str(5, row, text, GOAL_FG, CURSOR_BG);
        } else {
            self.front.put_str(5, row, text, fg, Color::Reset);
        }
    }

    fn compose_pack_select(&mut self, w: &WorldState) {
        self.compose_header("LEVEL PACKS");

        let list_top = 5;
        for (idx, pack) in w.pack_list.iter().enumerate() {
            let row = list_top + idx;
            if row + 3 >= self.front.height { break; }
            let done = w.progress.completed_in(&pack.name).min(pack.level_count);
            let marker = if idx == w.active_pack { '★' } else { ' ' };
            let text = format!("{} {:<24} {:>3}/{:<3} solved", marker, pack.name, done, pack.level_count);
            let fg = if done == pack.level_count { TRAIL_FG } else { Color::White };
            self.compose_entry(row, &text, fg, idx == w.pack_cursor);
        }

        let footer = list_top + w.pack_list.len() + 1;
        self.front.put_str(2, footer, "  ENTER: Open   ↑↓: Select   ESC: Back   Q: Quit", Color::DarkGrey, Color::Reset);
    }

    fn compose_level_select(&mut self, w: &WorldState) {
        self.compose_header("LEVEL SELECT");
        self.front.put_str(4, 4, &w.pack_name, TOKEN_FG, Color::Reset);

        let list_top = 6;
        let unlocked = w.progress.unlocked_in(&w.pack_name, w.level_names.len());
        let completed = w.progress.completed_in(&w.pack_name);

        // Keep the cursor row on screen.
        let visible = self.front.height.saturating_sub(list_top + 3).max(1);
        let scroll = w.select_cursor.saturating_sub(visible - 1);

        for (i, name) in w.level_names.iter().enumerate().skip(scroll).take(visible) {
            let row = list_top + i - scroll;
            let (mark, fg) = if i < completed {
                ('✓', TRAIL_FG)
            } else if i < unlocked {
                ('•', Color::White)
            } else {
                ('×', Color::DarkGrey)
            };
            let shown = if i < unlocked { name.as_str() } else { "???" };
            let text = format!("{:>3}. {} {}", i + 1, mark, shown);
            self.compose_entry(row, &text, fg, i == w.select_cursor);
        }

        let footer = list_top + w.level_names.len().min(visible) + 1;
        self.front.put_str(2, footer, "  ENTER: Play   ↑↓: Select   ESC: Packs   Q: Quit", Color::DarkGrey, Color::Reset);
        let count = format!("  {}/{} solved", completed.min(w.level_names.len()), w.level_names.len());
        self.front.put_str(2, footer + 1, &count, Color::DarkGrey, Color::Reset);
    }
}

/// Horizontal wall on edge row `k` (0 = top) above grid column `cx`.
fn h_wall(grid: &Grid, cx: usize, k: usize) -> bool {
    let h = grid.height();
    if k == h {
        grid.is_wall(Pos::new(cx, 0), Direction::South)
    } else {
        grid.is_wall(Pos::new(cx, h - 1 - k), Direction::North)
    }
}

/// Vertical wall on body row `i` (0 = top) at the west side of column `cx`.
fn v_wall(grid: &Grid, cx: usize, i: usize) -> bool {
    let y = grid.height() - 1 - i;
    if cx == grid.width() {
        grid.is_wall(Pos::new(cx - 1, y), Direction::East)
    } else {
        grid.is_wall(Pos::new(cx, y), Direction::West)
    }
}
