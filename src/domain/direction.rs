/// Compass directions and the wall-lookup table.
///
/// Walls are stored only as top/left per tile, so each direction maps to a
/// probe: which tile (relative to the current one) and which of its two wall
/// flags to read.
///
/// ┌───────┬─────────┬──────────────────────────┐
/// │ Dir   │ Delta   │ Wall probe               │
/// ├───────┼─────────┼──────────────────────────┤
/// │ North │ (0, +1) │ current tile, top wall   │
/// │ South │ (0, -1) │ tile below, top wall     │
/// │ East  │ (+1, 0) │ tile to the east, left   │
/// │ West  │ (-1, 0) │ current tile, left wall  │
/// └───────┴─────────┴──────────────────────────┘

use super::grid::{Grid, Pos};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    North,
    South,
    East,
    West,
    /// Sentinel "came-from" before the first step. Never a movement target.
    Start,
}

/// The four movement directions, in trail-slot order.
pub const CARDINALS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Top,
    Left,
}

/// Where a direction's wall lives, relative to the tile being left.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WallProbe {
    pub dx: isize,
    pub dy: isize,
    pub side: Side,
}

struct DirSpec {
    delta: (isize, isize),
    probe: WallProbe,
}

/// Indexed by `Direction::slot()`.
const TABLE: [DirSpec; 4] = [
    // North
    DirSpec { delta: (0, 1), probe: WallProbe { dx: 0, dy: 0, side: Side::Top } },
    // East
    DirSpec { delta: (1, 0), probe: WallProbe { dx: 1, dy: 0, side: Side::Left } },
    // South
    DirSpec { delta: (0, -1), probe: WallProbe { dx: 0, dy: -1, side: Side::Top } },
    // West
    DirSpec { delta: (-1, 0), probe: WallProbe { dx: 0, dy: 0, side: Side::Left } },
];

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Start => Direction::Start,
        }
    }

    /// Index into per-direction arrays. `None` for `Start`.
    #[inline]
    pub fn slot(self) -> Option<usize> {
        match self {
            Direction::North => Some(0),
            Direction::East => Some(1),
            Direction::South => Some(2),
            Direction::West => Some(3),
            Direction::Start => None,
        }
    }

    pub fn is_cardinal(self) -> bool {
        self != Direction::Start
    }

    /// Coordinate delta of one step. `(0, 0)` for `Start`.
    pub fn delta(self) -> (isize, isize) {
        self.slot().map_or((0, 0), |i| TABLE[i].delta)
    }

    pub fn wall_probe(self) -> Option<WallProbe> {
        self.slot().map(|i| TABLE[i].probe)
    }

    /// Direction of the unit step from `a` to `b`.
    /// Returns `Start` when the points are not orthogonally adjacent.
    pub fn between(a: Pos, b: Pos) -> Direction {
        let dx = b.x as isize - a.x as isize;
        let dy = b.y as isize - a.y as isize;
        match (dx, dy) {
            (1, 0) => Direction::East,
            (-1, 0) => Direction::West,
            (0, 1) => Direction::North,
            (0, -1) => Direction::South,
            _ => Direction::Start,
        }
    }
}

/// Is there a wall on the `dir` side of `pos`?
///
/// `Start` always reports a wall so it can never be stepped into.
pub fn is_wall(grid: &Grid, pos: Pos, dir: Direction) -> bool {
    match dir.wall_probe() {
        Some(probe) => grid.edge(pos, probe),
        None => true,
    }
}

/// Compact set of cardinal directions (4-bit mask).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DirSet(u8);

impl DirSet {
    pub const EMPTY: DirSet = DirSet(0);

    pub fn insert(&mut self, dir: Direction) {
        if let Some(i) = dir.slot() {
            self.0 |= 1 << i;
        }
    }

    pub fn contains(self, dir: Direction) -> bool {
        dir.slot().map_or(false, |i| self.0 & (1 << i) != 0)
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw mask: bit 0 = North, 1 = East, 2 = South, 3 = West.
    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        CARDINALS.into_iter().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Direction> for DirSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = DirSet::EMPTY;
        for d in iter {
            set.insert(d);
        }
        set
    }
}

impl std::fmt::Debug for DirSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_pairs() {
        assert_eq!(Direction::North.opposite(), Direction::South);
        assert_eq!(Direction::South.opposite(), Direction::North);
        assert_eq!(Direction::East.opposite(), Direction::West);
        assert_eq!(Direction::West.opposite(), Direction::East);
        assert_eq!(Direction::Start.opposite(), Direction::Start);
        for d in CARDINALS {
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn between_unit_steps() {
        let o = Pos::new(2, 2);
        assert_eq!(Direction::between(o, Pos::new(3, 2)), Direction::East);
        assert_eq!(Direction::between(o, Pos::new(1, 2)), Direction::West);
        assert_eq!(Direction::between(o, Pos::new(2, 3)), Direction::North);
        assert_eq!(Direction::between(o, Pos::new(2, 1)), Direction::South);
        // Diagonal or same point: not a step
        assert_eq!(Direction::between(o, Pos::new(3, 3)), Direction::Start);
        assert_eq!(Direction::between(o, o), Direction::Start);
    }

    #[test]
    fn deltas_match_between() {
        let o = Pos::new(5, 5);
        for d in CARDINALS {
            assert_eq!(Direction::between(o, o.step(d)), d);
        }
    }

    #[test]
    fn wall_lookup_asymmetry() {
        // 2x2 grid, one interior wall between (0,0) and (1,0),
        // and one between (0,0) and (0,1).
        let mut g = Grid::new(2, 2);
        g.set_wall(Pos::new(0, 0), Direction::East, true);
        g.set_wall(Pos::new(0, 0), Direction::North, true);

        // East of (0,0) is stored as the left wall of (1,0)
        assert!(g.tile(Pos::new(1, 0)).has_left_wall());
        assert!(is_wall(&g, Pos::new(0, 0), Direction::East));
        assert!(is_wall(&g, Pos::new(1, 0), Direction::West));

        // North of (0,0) is its own top wall; South of (0,1) reads it
        assert!(g.tile(Pos::new(0, 0)).has_top_wall());
        assert!(is_wall(&g, Pos::new(0, 1), Direction::South));

        // Untouched interior edges are open
        assert!(!is_wall(&g, Pos::new(1, 0), Direction::North));
        assert!(!is_wall(&g, Pos::new(0, 1), Direction::East));
    }

    #[test]
    fn start_is_never_open() {
        let g = Grid::new(3, 3);
        assert!(is_wall(&g, Pos::new(1, 1), Direction::Start));
    }

    #[test]
    fn dirset_basics() {
        let mut s = DirSet::EMPTY;
        assert!(s.is_empty());
        s.insert(Direction::East);
        s.insert(Direction::North);
        s.insert(Direction::Start); // ignored
        assert_eq!(s.len(), 2);
        assert!(s.contains(Direction::East));
        assert!(!s.contains(Direction::West));
        let v: Vec<_> = s.iter().collect();
        assert_eq!(v, vec![Direction::North, Direction::East]);
    }
}
