/// Trail ledger: the stack of directions taken since the level started.
///
/// Kept consistent with the per-tile trail counters by routing every
/// single-step move through `record`:
///
///   - stepping back along the most recent step (top == opposite) pops it and
///     decrements both ends of that edge (an undo);
///   - any other step pushes and increments both ends.
///
/// Both counters change together; the step is a single logical event even if
/// the presentation animates the far-end segment later.

use super::direction::Direction;
use super::grid::{Grid, Pos};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TrailUpdate {
    Advanced,
    Undone,
}

#[derive(Clone, Debug, Default)]
pub struct TrailLedger {
    taken: Vec<Direction>,
}

impl TrailLedger {
    pub fn new() -> Self {
        TrailLedger { taken: Vec::with_capacity(64) }
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }

    /// Most recent direction still on the ledger.
    pub fn last(&self) -> Option<Direction> {
        self.taken.last().copied()
    }

    pub fn directions(&self) -> &[Direction] {
        &self.taken
    }

    /// Apply the update rule for a step from `from` along `dir`.
    pub fn record(&mut self, grid: &mut Grid, from: Pos, dir: Direction) -> TrailUpdate {
        let back = dir.opposite();
        let to = from.step(dir);

        if self.last() == Some(back) {
            self.taken.pop();
            grid.decrement_trail(from, dir);
            grid.decrement_trail(to, back);
            TrailUpdate::Undone
        } else {
            self.taken.push(dir);
            grid.increment_trail(from, dir);
            grid.increment_trail(to, back);
            TrailUpdate::Advanced
        }
    }

    /// Forget every step and zero all counters on the board.
    pub fn clear(&mut self, grid: &mut Grid) {
        self.taken.clear();
        grid.clear_trails();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::direction::CARDINALS;

    fn snapshot(grid: &Grid) -> Vec<u32> {
        grid.positions()
            .flat_map(|p| CARDINALS.iter().map(move |d| (p, *d)).collect::<Vec<_>>())
            .map(|(p, d)| grid.trail_count(p, d))
            .collect()
    }

    #[test]
    fn advance_increments_both_ends() {
        let mut g = Grid::new(3, 3);
        let mut ledger = TrailLedger::new();
        let up = ledger.record(&mut g, Pos::new(1, 1), Direction::North);
        assert_eq!(up, TrailUpdate::Advanced);
        assert_eq!(ledger.directions(), &[Direction::North]);
        assert_eq!(g.trail_count(Pos::new(1, 1), Direction::North), 1);
        assert_eq!(g.trail_count(Pos::new(1, 2), Direction::South), 1);
        assert_eq!(g.total_trail(), 2);
    }

    #[test]
    fn backtrack_undoes_last_step() {
        let mut g = Grid::new(3, 3);
        let mut ledger = TrailLedger::new();
        let before = snapshot(&g);

        ledger.record(&mut g, Pos::new(0, 0), Direction::East);
        let up = ledger.record(&mut g, Pos::new(1, 0), Direction::West);

        assert_eq!(up, TrailUpdate::Undone);
        assert!(ledger.is_empty());
        assert_eq!(snapshot(&g), before);
    }

    #[test]
    fn only_the_top_entry_can_be_undone() {
        // E, N, then W: W is not the opposite of N, so it pushes.
        let mut g = Grid::new(3, 3);
        let mut ledger = TrailLedger::new();
        ledger.record(&mut g, Pos::new(0, 0), Direction::East);
        ledger.record(&mut g, Pos::new(1, 0), Direction::North);
        let up = ledger.record(&mut g, Pos::new(1, 1), Direction::West);
        assert_eq!(up, TrailUpdate::Advanced);
        assert_eq!(ledger.len(), 3);
        assert_eq!(g.total_trail(), 6);
    }

    #[test]
    fn repeated_crossing_accumulates() {
        // Loop around a 2x2 block twice: every edge is crossed twice forward.
        let mut g = Grid::new(2, 2);
        let mut ledger = TrailLedger::new();
        let mut pos = Pos::new(0, 0);
        for _ in 0..2 {
            for d in [Direction::East, Direction::North, Direction::West, Direction::South] {
                ledger.record(&mut g, pos, d);
                pos = pos.step(d);
            }
        }
        assert_eq!(pos, Pos::new(0, 0));
        assert_eq!(ledger.len(), 8);
        assert_eq!(g.trail_count(Pos::new(0, 0), Direction::East), 2);
        assert_eq!(g.trail_count(Pos::new(1, 0), Direction::West), 2);
    }

    #[test]
    fn unwinding_never_goes_negative() {
        let mut g = Grid::new(4, 1);
        let mut ledger = TrailLedger::new();
        let mut pos = Pos::new(0, 0);
        for _ in 0..3 {
            ledger.record(&mut g, pos, Direction::East);
            pos = pos.step(Direction::East);
        }
        for _ in 0..3 {
            assert_eq!(ledger.record(&mut g, pos, Direction::West), TrailUpdate::Undone);
            pos = pos.step(Direction::West);
        }
        assert!(ledger.is_empty());
        assert_eq!(g.total_trail(), 0);
        // Stepping east again from an empty ledger pushes.
        assert_eq!(ledger.record(&mut g, pos, Direction::East), TrailUpdate::Advanced);
    }

    #[test]
    fn clear_resets_everything() {
        let mut g = Grid::new(3, 3);
        let mut ledger = TrailLedger::new();
        ledger.record(&mut g, Pos::new(0, 0), Direction::North);
        ledger.record(&mut g, Pos::new(0, 1), Direction::East);
        ledger.clear(&mut g);
        assert!(ledger.is_empty());
        assert_eq!(g.total_trail(), 0);
    }
}
