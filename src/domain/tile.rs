/// One grid cell.
///
/// Only the top and left walls are stored. A cell's right wall is the left
/// wall of its east neighbour and its bottom wall is the top wall of the cell
/// below, so the two sides of an edge can never disagree.
///
/// Trail counters and hint flags are indexed by `Direction::slot()`.

use super::direction::Direction;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Tile {
    top_wall: bool,
    left_wall: bool,
    ice: bool,
    goal: bool,
    trails: [u32; 4],
    hints: [bool; 4],
}

impl Tile {
    pub fn has_top_wall(&self) -> bool {
        self.top_wall
    }

    pub fn has_left_wall(&self) -> bool {
        self.left_wall
    }

    /// On ice the token cannot turn.
    pub fn is_ice(&self) -> bool {
        self.ice
    }

    pub fn is_goal(&self) -> bool {
        self.goal
    }

    pub fn set_top_wall(&mut self, on: bool) {
        self.top_wall = on;
    }

    pub fn set_left_wall(&mut self, on: bool) {
        self.left_wall = on;
    }

    pub fn set_ice(&mut self, on: bool) {
        self.ice = on;
    }

    pub fn set_goal(&mut self, on: bool) {
        self.goal = on;
    }

    // ── Trails ──

    pub fn trail_count(&self, dir: Direction) -> u32 {
        dir.slot().map_or(0, |i| self.trails[i])
    }

    /// Visual indicator rule: a trail segment is shown iff its counter > 0.
    pub fn has_trail(&self, dir: Direction) -> bool {
        self.trail_count(dir) > 0
    }

    pub fn increment_trail(&mut self, dir: Direction) {
        if let Some(i) = dir.slot() {
            self.trails[i] += 1;
        }
    }

    /// Counters never go below zero.
    pub fn decrement_trail(&mut self, dir: Direction) {
        if let Some(i) = dir.slot() {
            debug_assert!(self.trails[i] > 0, "trail counter underflow ({dir:?})");
            self.trails[i] = self.trails[i].saturating_sub(1);
        }
    }

    pub fn clear_trails(&mut self) {
        self.trails = [0; 4];
    }

    // ── Hints ──

    pub fn has_hint(&self, dir: Direction) -> bool {
        dir.slot().map_or(false, |i| self.hints[i])
    }

    pub fn set_hint(&mut self, dir: Direction) {
        if let Some(i) = dir.slot() {
            self.hints[i] = true;
        }
    }
}
