/// Hint path revealer.
///
/// The hint path is a fixed list of adjacent grid points from the start tile
/// to the goal. A segment is the edge between two consecutive points; showing
/// it marks the direction on the first tile and its opposite on the second.
/// `revealed` counts segments shown so far and only ever grows.

use super::direction::Direction;
use super::grid::{Grid, Pos};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HintOutcome {
    /// This many segments were newly shown.
    Revealed(usize),
    /// No hint currency left; nothing shown.
    NoCurrency,
    /// Every segment is already visible.
    PathExhausted,
}

#[derive(Clone, Debug, Default)]
pub struct HintPath {
    points: Vec<Pos>,
    revealed: usize,
}

impl HintPath {
    pub fn new(points: Vec<Pos>) -> Self {
        HintPath { points, revealed: 0 }
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn remaining(&self) -> usize {
        self.segment_count() - self.revealed
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Segments shown per request when not configured: a third of the
    /// points, rounded up.
    pub fn default_budget(&self) -> usize {
        (self.points.len() + 2) / 3
    }

    /// Show up to `budget` more segments. Returns how many were shown.
    pub fn reveal(&mut self, grid: &mut Grid, budget: usize) -> usize {
        let n = budget.min(self.remaining());
        for i in self.revealed..self.revealed + n {
            let (a, b) = (self.points[i], self.points[i + 1]);
            let dir = Direction::between(a, b);
            grid.set_hint(a, dir);
            grid.set_hint(b, dir.opposite());
        }
        self.revealed += n;
        n
    }

    /// A player's hint request. Spends one unit of `balance` on success.
    pub fn request(&mut self, grid: &mut Grid, balance: &mut u32, budget: usize) -> HintOutcome {
        if self.is_exhausted() {
            return HintOutcome::PathExhausted;
        }
        if *balance == 0 {
            return HintOutcome::NoCurrency;
        }
        *balance -= 1;
        HintOutcome::Revealed(self.reveal(grid, budget))
    }
}
