/// The board: a `width x height` array of tiles plus padding.
///
/// ## Padding
///
/// Walls live on the top/left of each tile, so the south edge of row 0 and
/// the east edge of column `width-1` belong to tiles outside the playable
/// area. Storage therefore holds one extra row below row 0 and one extra
/// column past the last one:
///
/// ```text
///   storage x: 0 ..= width        (x == width is padding)
///   storage y: -1 .. height       (y == -1 is padding)
/// ```
///
/// Every wall probe from a playable tile lands inside storage. Playable
/// coordinates are not bounds-checked; stepping outside is a caller bug,
/// and the boundary is walled on construction so the movement rules never do.

use super::direction::{Direction, Side, WallProbe, CARDINALS};
use super::tile::Tile;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Pos { x, y }
    }

    /// Adjacent position one step along `dir`.
    pub fn step(self, dir: Direction) -> Pos {
        let (dx, dy) = dir.delta();
        Pos {
            x: (self.x as isize + dx) as usize,
            y: (self.y as isize + dy) as usize,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Empty floor enclosed by the outer boundary wall.
    pub fn new(width: usize, height: usize) -> Self {
        let mut grid = Grid {
            width,
            height,
            tiles: vec![Tile::default(); (width + 1) * (height + 1)],
        };
        if width == 0 || height == 0 {
            return grid;
        }
        for x in 0..width {
            grid.set_wall(Pos::new(x, 0), Direction::South, true);
            grid.set_wall(Pos::new(x, height - 1), Direction::North, true);
        }
        for y in 0..height {
            grid.set_wall(Pos::new(0, y), Direction::West, true);
            grid.set_wall(Pos::new(width - 1, y), Direction::East, true);
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of playable tiles.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    #[inline]
    fn index(&self, x: isize, y: isize) -> usize {
        (y + 1) as usize * (self.width + 1) + x as usize
    }

    pub fn tile(&self, pos: Pos) -> &Tile {
        &self.tiles[self.index(pos.x as isize, pos.y as isize)]
    }

    fn tile_mut(&mut self, pos: Pos) -> &mut Tile {
        let i = self.index(pos.x as isize, pos.y as isize);
        &mut self.tiles[i]
    }

    /// Read the wall flag a probe points at.
    pub(crate) fn edge(&self, pos: Pos, probe: WallProbe) -> bool {
        let t = &self.tiles[self.index(pos.x as isize + probe.dx, pos.y as isize + probe.dy)];
        match probe.side {
            Side::Top => t.has_top_wall(),
            Side::Left => t.has_left_wall(),
        }
    }

    /// Place or remove the wall on the `dir` side of `pos`.
    pub fn set_wall(&mut self, pos: Pos, dir: Direction, on: bool) {
        let probe = match dir.wall_probe() {
            Some(p) => p,
            None => return,
        };
        let i = self.index(pos.x as isize + probe.dx, pos.y as isize + probe.dy);
        match probe.side {
            Side::Top => self.tiles[i].set_top_wall(on),
            Side::Left => self.tiles[i].set_left_wall(on),
        }
    }

    pub fn is_wall(&self, pos: Pos, dir: Direction) -> bool {
        super::direction::is_wall(self, pos, dir)
    }

    pub fn set_ice(&mut self, pos: Pos, on: bool) {
        self.tile_mut(pos).set_ice(on);
    }

    pub fn set_goal(&mut self, pos: Pos, on: bool) {
        self.tile_mut(pos).set_goal(on);
    }

    /// First goal tile in row-major order.
    pub fn goal(&self) -> Option<Pos> {
        self.positions().find(|p| self.tile(*p).is_goal())
    }

    /// All playable positions, row by row from y = 0.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Pos::new(x, y)))
    }

    /// Directions out of `pos` that are not walled.
    pub fn open_directions(&self, pos: Pos) -> impl Iterator<Item = Direction> + '_ {
        CARDINALS.into_iter().filter(move |d| !self.is_wall(pos, *d))
    }

    // ── Trail counters ──

    pub fn trail_count(&self, pos: Pos, dir: Direction) -> u32 {
        self.tile(pos).trail_count(dir)
    }

    pub fn increment_trail(&mut self, pos: Pos, dir: Direction) {
        self.tile_mut(pos).increment_trail(dir);
    }

    pub fn decrement_trail(&mut self, pos: Pos, dir: Direction) {
        self.tile_mut(pos).decrement_trail(dir);
    }

    /// Sum of every trail counter on the board.
    pub fn total_trail(&self) -> u32 {
        self.positions()
            .map(|p| CARDINALS.iter().map(|d| self.trail_count(p, *d)).sum::<u32>())
            .sum()
    }

    pub fn clear_trails(&mut self) {
        for t in &mut self.tiles {
            t.clear_trails();
        }
    }

    // ── Hints ──

    pub fn set_hint(&mut self, pos: Pos, dir: Direction) {
        self.tile_mut(pos).set_hint(dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_closed() {
        let g = Grid::new(3, 2);
        for x in 0..3 {
            assert!(g.is_wall(Pos::new(x, 0), Direction::South));
            assert!(g.is_wall(Pos::new(x, 1), Direction::North));
        }
        for y in 0..2 {
            assert!(g.is_wall(Pos::new(0, y), Direction::West));
            assert!(g.is_wall(Pos::new(2, y), Direction::East));
        }
        // Interior edges open
        assert!(!g.is_wall(Pos::new(0, 0), Direction::East));
        assert!(!g.is_wall(Pos::new(1, 0), Direction::North));
    }

    #[test]
    fn edge_shared_between_neighbours() {
        let mut g = Grid::new(3, 3);
        g.set_wall(Pos::new(1, 1), Direction::East, true);
        assert!(g.is_wall(Pos::new(2, 1), Direction::West));
        g.set_wall(Pos::new(2, 1), Direction::West, false);
        assert!(!g.is_wall(Pos::new(1, 1), Direction::East));

        g.set_wall(Pos::new(1, 1), Direction::South, true);
        assert!(g.is_wall(Pos::new(1, 0), Direction::North));
    }

    #[test]
    fn single_tile_grid() {
        let g = Grid::new(1, 1);
        assert_eq!(g.open_directions(Pos::new(0, 0)).count(), 0);
    }

    #[test]
    fn goal_lookup() {
        let mut g = Grid::new(4, 4);
        assert_eq!(g.goal(), None);
        g.set_goal(Pos::new(3, 2), true);
        assert_eq!(g.goal(), Some(Pos::new(3, 2)));
    }

    #[test]
    fn trail_helpers() {
        let mut g = Grid::new(2, 2);
        g.increment_trail(Pos::new(0, 0), Direction::East);
        g.increment_trail(Pos::new(1, 0), Direction::West);
        assert_eq!(g.total_trail(), 2);
        g.decrement_trail(Pos::new(1, 0), Direction::West);
        assert_eq!(g.total_trail(), 1);
        g.clear_trails();
        assert_eq!(g.total_trail(), 0);
    }
}
