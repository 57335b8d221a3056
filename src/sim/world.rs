/// WorldState: the complete snapshot of a running game.
///
/// One explicit context object owned by the main loop and passed to the
/// step, level and hint functions. Nothing here is global.
///
/// ## Layers
///   - `grid`:  walls, ice and goal as loaded, plus the runtime trail
///     counters and revealed hint flags.
///   - `mover`: token position, movement state and trail ledger.
///   - `hints`: the level's hint path and how much of it is shown.
///
/// Restart clears trails through `mover.reset`; the hint flags on `grid`
/// and the `hints` cursor survive it.

use crate::config::SpeedConfig;
use crate::domain::direction::DirSet;
use crate::domain::grid::{Grid, Pos};
use crate::domain::hint::HintPath;
use crate::domain::movement::Mover;
use crate::sim::level::PackInfo;
use crate::sim::save::Progress;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    PackSelect,
    LevelSelect,
    Playing,
    LevelComplete,
    GameComplete,
}

pub struct WorldState {
    // ── Board ──
    pub grid: Grid,
    pub mover: Mover,
    pub hints: HintPath,
    /// Segments shown per hint request.
    pub hint_budget: usize,
    /// Open directions to draw around the idle token.
    pub affordances: DirSet,

    // ── Speed config ──
    pub speed: SpeedConfig,
    /// Ticks left before the next single step of a move.
    pub step_cooldown: u32,

    // ── Packs ──
    pub active_pack: usize,
    pub pack_name: String,
    pub pack_list: Vec<PackInfo>,
    /// Level names of the active pack.
    pub level_names: Vec<String>,
    pub pack_cursor: usize,
    pub select_cursor: usize,

    // ── Meta ──
    pub phase: Phase,
    pub current_level: usize,
    pub total_levels: usize,
    pub level_name: String,
    pub progress: Progress,
    pub tick: u64,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

impl WorldState {
    pub fn new(speed: SpeedConfig, progress: Progress) -> Self {
        WorldState {
            grid: Grid::new(1, 1),
            mover: Mover::new(Pos::new(0, 0)),
            hints: HintPath::default(),
            hint_budget: 1,
            affordances: DirSet::EMPTY,
            speed,
            step_cooldown: 0,
            active_pack: 0,
            pack_name: String::new(),
            pack_list: Vec::new(),
            level_names: Vec::new(),
            pack_cursor: 0,
            select_cursor: 0,
            phase: Phase::LevelSelect,
            current_level: 0,
            total_levels: 0,
            level_name: String::new(),
            progress,
            tick: 0,
            message: String::new(),
            message_timer: 0,
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}
