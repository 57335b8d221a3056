/// Events emitted during a simulation step.
/// The presentation layer consumes these for animation and the HUD.

use crate::domain::direction::{DirSet, Direction};
use crate::domain::grid::Pos;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// One single-tile step. `undone` when it walked back over the last trail.
    Moved { from: Pos, to: Pos, dir: Direction, undone: bool },
    /// The move stopped at a dead end or crossroad.
    Halted { at: Pos, open: DirSet },
    GoalReached { at: Pos },
    HintRevealed { segments: usize },
    HintNoCurrency,
    HintsExhausted,
    LevelRestarted,
}
