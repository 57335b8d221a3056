/// Movement state machine for the token.
///
/// Two states: `Idle` and `Moving`. A swipe is accepted only while idle and
/// only if the swiped side is open; from then on the move is a queue of
/// single steps drained by `advance`, one call per logical step, until a
/// halt condition is reached. Input is not queued while moving.
///
/// ## Continuation rules (checked after every step)
///
/// ┌──────────────────────────────┬──────────────────────────────┐
/// │ Condition (priority order)    │ Result                       │
/// ├──────────────────────────────┼──────────────────────────────┤
/// │ landed on goal                │ HALT: GoalReached            │
/// │ step limit (width*height)     │ HALT: DecisionPoint          │
/// │ on ice, heading open          │ continue straight            │
/// │ on ice, heading walled        │ HALT: DecisionPoint          │
/// │ exactly 1 open (≠ came-from)  │ continue that way            │
/// │ 0 or ≥2 open (≠ came-from)    │ HALT: DecisionPoint          │
/// └──────────────────────────────┴──────────────────────────────┘
///
/// The step limit only matters on boards where forced corridors close
/// into a ring; without it such a move would never end.

use super::direction::{is_wall, DirSet, Direction, CARDINALS};
use super::grid::{Grid, Pos};
use super::trail::{TrailLedger, TrailUpdate};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveState {
    Idle,
    Moving,
}

/// Why a move ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Halt {
    GoalReached,
    /// Dead end or crossroad. `open` lists every open direction except
    /// came-from, for the affordance display.
    DecisionPoint { open: DirSet },
}

/// One single-tile step.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Step {
    pub from: Pos,
    pub to: Pos,
    pub dir: Direction,
    pub update: TrailUpdate,
}

/// Result of one `advance` call. `halt` is set on the final step of a move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StepReport {
    pub step: Step,
    pub halt: Option<Halt>,
}

/// A whole move, from swipe to halt.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MoveReport {
    pub steps: Vec<Step>,
    pub halt: Halt,
}

#[derive(Clone, Debug)]
pub struct Mover {
    start: Pos,
    pos: Pos,
    came_from: Direction,
    /// Direction of the latest step; ice keeps it.
    heading: Direction,
    state: MoveState,
    /// Next step to take while moving.
    pending: Option<Direction>,
    steps_this_move: usize,
    ledger: TrailLedger,
}

impl Mover {
    pub fn new(start: Pos) -> Self {
        Mover {
            start,
            pos: start,
            came_from: Direction::Start,
            heading: Direction::Start,
            state: MoveState::Idle,
            pending: None,
            steps_this_move: 0,
            ledger: TrailLedger::new(),
        }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn start(&self) -> Pos {
        self.start
    }

    pub fn came_from(&self) -> Direction {
        self.came_from
    }

    pub fn state(&self) -> MoveState {
        self.state
    }

    pub fn is_moving(&self) -> bool {
        self.state == MoveState::Moving
    }

    pub fn ledger(&self) -> &TrailLedger {
        &self.ledger
    }

    /// Open directions from the current tile, excluding came-from.
    pub fn open_directions(&self, grid: &Grid) -> DirSet {
        CARDINALS
            .into_iter()
            .filter(|d| *d != self.came_from && !is_wall(grid, self.pos, *d))
            .collect()
    }

    /// Accept a swipe. Returns false (and changes nothing) if already moving,
    /// if `dir` is `Start`, or if the swiped side is walled.
    pub fn try_move(&mut self, grid: &Grid, dir: Direction) -> bool {
        if self.is_moving() || !dir.is_cardinal() || is_wall(grid, self.pos, dir) {
            return false;
        }
        self.state = MoveState::Moving;
        self.pending = Some(dir);
        self.steps_this_move = 0;
        true
    }

    /// Take the next queued step. `None` when idle.
    pub fn advance(&mut self, grid: &mut Grid) -> Option<StepReport> {
        let dir = self.pending.take()?;
        let from = self.pos;
        let update = self.ledger.record(grid, from, dir);
        self.pos = from.step(dir);
        self.came_from = dir.opposite();
        self.heading = dir;
        self.steps_this_move += 1;

        let step = Step { from, to: self.pos, dir, update };

        let halt = if grid.tile(self.pos).is_goal() {
            Some(Halt::GoalReached)
        } else if self.steps_this_move >= grid.area() {
            Some(Halt::DecisionPoint { open: self.open_directions(grid) })
        } else {
            match self.forced_direction(grid) {
                Some(next) => {
                    self.pending = Some(next);
                    None
                }
                None => Some(Halt::DecisionPoint { open: self.open_directions(grid) }),
            }
        };

        if halt.is_some() {
            self.state = MoveState::Idle;
        }
        Some(StepReport { step, halt })
    }

    /// Swipe and drain the whole move at once. `None` if the swipe is rejected.
    pub fn run(&mut self, grid: &mut Grid, dir: Direction) -> Option<MoveReport> {
        if !self.try_move(grid, dir) {
            return None;
        }
        let mut steps = Vec::new();
        loop {
            let report = self.advance(grid)?;
            steps.push(report.step);
            if let Some(halt) = report.halt {
                return Some(MoveReport { steps, halt });
            }
        }
    }

    /// Back to the start tile with an empty ledger and zeroed trails.
    pub fn reset(&mut self, grid: &mut Grid) {
        self.ledger.clear(grid);
        self.pos = self.start;
        self.came_from = Direction::Start;
        self.heading = Direction::Start;
        self.state = MoveState::Idle;
        self.pending = None;
        self.steps_this_move = 0;
    }

    /// The only way forward from the current tile, if there is one.
    fn forced_direction(&self, grid: &Grid) -> Option<Direction> {
        if grid.tile(self.pos).is_ice() {
            return (!is_wall(grid, self.pos, self.heading)).then_some(self.heading);
        }
        let open = self.open_directions(grid);
        if open.len() == 1 {
            open.iter().next()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: usize, y: usize) -> Pos {
        Pos::new(x, y)
    }

    /// Horizontal corridor: `len x 1`, walled on both long sides by the boundary.
    fn corridor(len: usize) -> Grid {
        Grid::new(len, 1)
    }

    fn assert_idle_at(m: &Mover, pos: Pos) {
        assert_eq!(m.state(), MoveState::Idle);
        assert_eq!(m.pos(), pos);
    }

    // ── Wall rejection ──

    #[test]
    fn swipe_into_wall_is_a_no_op() {
        let mut g = Grid::new(3, 3);
        g.set_wall(p(1, 1), Direction::East, true);
        let mut m = Mover::new(p(1, 1));

        assert!(!m.try_move(&g, Direction::East));
        assert!(m.run(&mut g, Direction::East).is_none());
        assert_idle_at(&m, p(1, 1));
        assert_eq!(m.ledger().len(), 0);
        assert_eq!(g.total_trail(), 0);
        assert_eq!(m.came_from(), Direction::Start);
    }

    #[test]
    fn swipe_into_boundary_is_a_no_op() {
        let mut g = Grid::new(3, 3);
        let mut m = Mover::new(p(0, 0));
        assert!(m.run(&mut g, Direction::West).is_none());
        assert!(m.run(&mut g, Direction::South).is_none());
        assert_idle_at(&m, p(0, 0));
    }

    #[test]
    fn start_is_not_a_swipe() {
        let mut g = Grid::new(3, 3);
        let mut m = Mover::new(p(1, 1));
        assert!(m.run(&mut g, Direction::Start).is_none());
    }

    // ── Single-step and corridors ──

    #[test]
    fn open_grid_halts_at_every_junction() {
        // 3x3, no interior walls, goal top-right.
        let mut g = Grid::new(3, 3);
        g.set_goal(p(2, 2), true);
        let mut m = Mover::new(p(0, 0));

        let r = m.run(&mut g, Direction::East).unwrap();
        assert_eq!(r.steps.len(), 1);
        assert!(matches!(r.halt, Halt::DecisionPoint { .. }));
        assert_idle_at(&m, p(1, 0));

        let r = m.run(&mut g, Direction::North).unwrap();
        assert_eq!(r.steps.len(), 1);
        assert_idle_at(&m, p(1, 1));

        let r = m.run(&mut g, Direction::East).unwrap();
        assert_eq!(r.steps.len(), 1);
        assert_idle_at(&m, p(2, 1));

        let r = m.run(&mut g, Direction::North).unwrap();
        assert_eq!(r.steps.len(), 1);
        assert_eq!(r.halt, Halt::GoalReached);
        assert_eq!(m.pos(), p(2, 2));
    }

    #[test]
    fn corridor_runs_to_the_far_end() {
        let mut g = corridor(5);
        let mut m = Mover::new(p(0, 0));

        let r = m.run(&mut g, Direction::East).unwrap();
        assert_eq!(r.steps.len(), 4);
        assert_idle_at(&m, p(4, 0));
        for x in 0..4 {
            assert_eq!(g.trail_count(p(x, 0), Direction::East), 1);
            assert_eq!(g.trail_count(p(x + 1, 0), Direction::West), 1);
        }
        assert_eq!(m.ledger().len(), 4);
        // Dead end: nothing open but the way back.
        assert_eq!(r.halt, Halt::DecisionPoint { open: DirSet::EMPTY });
    }

    #[test]
    fn immediate_dead_end_stops_after_one_step() {
        let mut g = corridor(2);
        let mut m = Mover::new(p(0, 0));
        let r = m.run(&mut g, Direction::East).unwrap();
        assert_eq!(r.steps.len(), 1);
        assert_eq!(r.halt, Halt::DecisionPoint { open: DirSet::EMPTY });
        assert_idle_at(&m, p(1, 0));
    }

    #[test]
    fn corridor_follows_turns() {
        // L-shaped corridor in a 2x2: (0,0) -> (1,0) -> (1,1), with (0,1) cut off.
        let mut g = Grid::new(2, 2);
        g.set_wall(p(0, 0), Direction::North, true);
        g.set_wall(p(0, 1), Direction::East, true);
        let mut m = Mover::new(p(0, 0));

        let r = m.run(&mut g, Direction::East).unwrap();
        let dirs: Vec<_> = r.steps.iter().map(|s| s.dir).collect();
        assert_eq!(dirs, vec![Direction::East, Direction::North]);
        assert_idle_at(&m, p(1, 1));
    }

    #[test]
    fn goal_overrides_forced_corridor() {
        let mut g = corridor(5);
        g.set_goal(p(2, 0), true);
        let mut m = Mover::new(p(0, 0));
        let r = m.run(&mut g, Direction::East).unwrap();
        assert_eq!(r.halt, Halt::GoalReached);
        assert_eq!(r.steps.len(), 2);
        assert_eq!(m.pos(), p(2, 0));
        assert_eq!(m.state(), MoveState::Idle);
    }

    #[test]
    fn crossroad_reports_open_directions() {
        let mut g = Grid::new(3, 3);
        let mut m = Mover::new(p(0, 1));
        let r = m.run(&mut g, Direction::East).unwrap();
        let expected: DirSet = [Direction::North, Direction::East, Direction::South]
            .into_iter()
            .collect();
        assert_eq!(r.halt, Halt::DecisionPoint { open: expected });
        assert!(!m.open_directions(&g).contains(Direction::West));
    }

    // ── Ice ──

    #[test]
    fn ice_keeps_heading_through_junction() {
        // Row y=1 of a 4x3: (1,1) is ice. Without ice, (1,1) is a crossroad.
        let mut g = Grid::new(4, 3);
        g.set_ice(p(1, 1), true);
        let mut m = Mover::new(p(0, 1));

        let r = m.run(&mut g, Direction::East).unwrap();
        assert_eq!(r.steps.len(), 2);
        assert!(r.steps.iter().all(|s| s.dir == Direction::East));
        assert_idle_at(&m, p(2, 1));
    }

    #[test]
    fn ice_does_not_turn_into_a_corridor() {
        // (1,0) is ice with its east side walled. A normal tile here would be a
        // forced corridor turning north; ice stops instead.
        let mut g = Grid::new(3, 2);
        g.set_ice(p(1, 0), true);
        g.set_wall(p(1, 0), Direction::East, true);
        let mut m = Mover::new(p(0, 0));

        let r = m.run(&mut g, Direction::East).unwrap();
        assert_eq!(r.steps.len(), 1);
        assert_idle_at(&m, p(1, 0));
        let expected: DirSet = [Direction::North].into_iter().collect();
        assert_eq!(r.halt, Halt::DecisionPoint { open: expected });
        assert_eq!(g.total_trail(), 2);
    }

    #[test]
    fn ice_run_then_corridor() {
        // Ice strip (1..=3, 0) along the bottom row of a 5x2, open north at x=4.
        let mut g = Grid::new(5, 2);
        for x in 0..5 {
            g.set_wall(p(x, 0), Direction::North, true);
        }
        g.set_wall(p(4, 0), Direction::North, false);
        for x in 1..4 {
            g.set_ice(p(x, 0), true);
        }
        let mut m = Mover::new(p(0, 0));
        let r = m.run(&mut g, Direction::East).unwrap();
        // Straight over the ice, forced north at (4,0), then west along the top row.
        assert_eq!(r.steps[..4].iter().filter(|s| s.dir == Direction::East).count(), 4);
        assert_eq!(r.steps[4].dir, Direction::North);
        assert_eq!(r.steps.len(), 9);
        assert_eq!(m.pos(), p(0, 1));
    }

    // ── Undo ──

    #[test]
    fn swipe_back_undoes_trail() {
        let mut g = Grid::new(3, 3);
        let mut m = Mover::new(p(1, 1));

        m.run(&mut g, Direction::East).unwrap();
        assert_idle_at(&m, p(2, 1));
        assert_eq!(g.total_trail(), 2);

        let r = m.run(&mut g, Direction::West).unwrap();
        assert_eq!(r.steps.len(), 1);
        assert_eq!(r.steps[0].update, TrailUpdate::Undone);
        assert_idle_at(&m, p(1, 1));
        assert_eq!(g.total_trail(), 0);
        assert!(m.ledger().is_empty());
    }

    #[test]
    fn backing_out_of_a_corridor_unwinds_it() {
        let mut g = corridor(5);
        let mut m = Mover::new(p(0, 0));
        m.run(&mut g, Direction::East).unwrap();
        let r = m.run(&mut g, Direction::West).unwrap();
        assert_eq!(r.steps.len(), 4);
        assert!(r.steps.iter().all(|s| s.update == TrailUpdate::Undone));
        assert_idle_at(&m, p(0, 0));
        assert_eq!(g.total_trail(), 0);
    }

    // ── Termination ──

    #[test]
    fn ring_of_corridors_terminates() {
        // Open 2x2: every tile has exactly one way forward, forever.
        let mut g = Grid::new(2, 2);
        let mut m = Mover::new(p(0, 0));
        let r = m.run(&mut g, Direction::East).unwrap();
        assert_eq!(r.steps.len(), g.area());
        assert_eq!(m.state(), MoveState::Idle);
        assert_eq!(m.pos(), p(0, 0));
    }

    #[test]
    fn long_winding_corridor_terminates() {
        // Serpentine through a 4x4 board: every row is a corridor joined at
        // alternating ends.
        let mut g = Grid::new(4, 4);
        for y in 0..3 {
            for x in 0..4 {
                g.set_wall(p(x, y), Direction::North, true);
            }
            let gap = if y % 2 == 0 { 3 } else { 0 };
            g.set_wall(p(gap, y), Direction::North, false);
        }
        let mut m = Mover::new(p(0, 0));
        let r = m.run(&mut g, Direction::East).unwrap();
        assert_eq!(r.steps.len(), 15);
        assert!(r.steps.len() <= g.area());
        assert_idle_at(&m, p(0, 3));
    }

    // ── Step queue ──

    #[test]
    fn advance_one_step_at_a_time() {
        let mut g = corridor(3);
        let mut m = Mover::new(p(0, 0));
        assert!(m.advance(&mut g).is_none());
        assert!(m.try_move(&g, Direction::East));
        assert!(m.is_moving());

        // Input while moving is rejected.
        assert!(!m.try_move(&g, Direction::West));

        let first = m.advance(&mut g).unwrap();
        assert_eq!(first.step.to, p(1, 0));
        assert!(first.halt.is_none());
        assert!(m.is_moving());

        let second = m.advance(&mut g).unwrap();
        assert_eq!(second.step.to, p(2, 0));
        assert!(second.halt.is_some());
        assert!(!m.is_moving());
        assert!(m.advance(&mut g).is_none());
    }

    #[test]
    fn reset_returns_to_start() {
        let mut g = corridor(4);
        let mut m = Mover::new(p(0, 0));
        m.run(&mut g, Direction::East).unwrap();
        m.reset(&mut g);
        assert_idle_at(&m, p(0, 0));
        assert_eq!(m.came_from(), Direction::Start);
        assert!(m.ledger().is_empty());
        assert_eq!(g.total_trail(), 0);
        assert_eq!(m.open_directions(&g).len(), 1);
    }
}
