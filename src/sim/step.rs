/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Message timer
///   2. Input resolution (a swipe is accepted only while the token is idle)
///   3. Movement resolution (one single-tile step every `step_ticks` ticks)
///   4. Halt handling (goal → LevelComplete, otherwise show affordances)
///
/// Hint requests and restarts are player commands outside the tick; they
/// are applied immediately by `request_hint` and `restart_level`.

use tracing::{debug, info, trace};

use crate::domain::direction::{DirSet, Direction};
use crate::domain::hint::HintOutcome;
use crate::domain::movement::Halt;
use crate::domain::trail::TrailUpdate;
use super::event::GameEvent;
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: Option<Direction>) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 { world.message.clear(); }
    }

    resolve_input(world, input);
    resolve_movement(world, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Input
// ══════════════════════════════════════════════════════════════

fn resolve_input(world: &mut WorldState, input: Option<Direction>) {
    let Some(dir) = input else { return };

    if world.mover.try_move(&world.grid, dir) {
        debug!(?dir, at = ?world.mover.pos(), "move started");
        world.affordances = DirSet::EMPTY;
        // First step plays on the tick the swipe lands.
        world.step_cooldown = 0;
    } else {
        trace!(?dir, moving = world.mover.is_moving(), "swipe ignored");
    }
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

fn resolve_movement(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if !world.mover.is_moving() { return; }

    if world.step_cooldown > 0 {
        world.step_cooldown -= 1;
        return;
    }

    while let Some(report) = world.mover.advance(&mut world.grid) {
        let s = report.step;
        trace!(from = ?s.from, to = ?s.to, dir = ?s.dir, update = ?s.update, "step");
        events.push(GameEvent::Moved {
            from: s.from,
            to: s.to,
            dir: s.dir,
            undone: s.update == TrailUpdate::Undone,
        });

        if let Some(halt) = report.halt {
            resolve_halt(world, halt, events);
            return;
        }

        if world.speed.step_ticks > 0 {
            world.step_cooldown = world.speed.step_ticks - 1;
            return;
        }
    }
}

fn resolve_halt(world: &mut WorldState, halt: Halt, events: &mut Vec<GameEvent>) {
    let at = world.mover.pos();
    match halt {
        Halt::GoalReached => {
            world.phase = Phase::LevelComplete;
            world.affordances = DirSet::EMPTY;
            world.progress.complete_level(&world.pack_name, world.current_level);
            world.set_message("Level complete! Press Enter", 0);
            info!(
                pack = %world.pack_name,
                level = world.current_level + 1,
                trail = world.mover.ledger().len(),
                "goal reached"
            );
            events.push(GameEvent::GoalReached { at });
        }
        Halt::DecisionPoint { open } => {
            world.affordances = open;
            debug!(?at, ?open, trail = world.mover.ledger().len(), "move halted");
            events.push(GameEvent::Halted { at, open });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Player commands
// ══════════════════════════════════════════════════════════════

/// Spend one hint on the current level. `None` outside play.
pub fn request_hint(world: &mut WorldState) -> Option<GameEvent> {
    if world.phase != Phase::Playing { return None; }

    let outcome = world.hints.request(
        &mut world.grid,
        &mut world.progress.hints,
        world.hint_budget,
    );
    debug!(?outcome, balance = world.progress.hints, "hint requested");

    let event = match outcome {
        HintOutcome::Revealed(segments) => {
            let msg = format!("Hint shown ({} left)", world.progress.hints);
            world.set_message(&msg, 60);
            GameEvent::HintRevealed { segments }
        }
        HintOutcome::NoCurrency => {
            world.set_message("No hints left", 60);
            GameEvent::HintNoCurrency
        }
        HintOutcome::PathExhausted => {
            world.set_message("The whole path is already shown", 60);
            GameEvent::HintsExhausted
        }
    };
    Some(event)
}

/// Token back to start with trails cleared. Revealed hints stay.
/// `None` while a move is playing out or outside a level.
pub fn restart_level(world: &mut WorldState) -> Option<GameEvent> {
    if !matches!(world.phase, Phase::Playing | Phase::LevelComplete) { return None; }
    if world.mover.is_moving() {
        trace!("restart ignored mid-move");
        return None;
    }

    world.mover.reset(&mut world.grid);
    world.affordances = world.mover.open_directions(&world.grid);
    world.phase = Phase::Playing;
    world.step_cooldown = 0;
    world.message.clear();
    world.message_timer = 0;
    debug!(level = world.current_level + 1, start = ?world.mover.start(), "level restarted");
    Some(GameEvent::LevelRestarted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, SpeedConfig};
    use crate::domain::grid::Pos;
    use crate::sim::level::{load_level, parse_level, LevelPack};
    use crate::sim::save::Progress;

    const DEAD_END: &str = "\
# Dead end
+-+-+-+-+-+-+
|S      |  G|
+-+-+-+-+-+-+
";

    const RUN: &str = "\
# Run
@ 0,0 1,0 2,0 3,0
+-+-+-+-+
|S     G|
+-+-+-+-+
";

    fn world_from(text: &str, step_ticks: u32, hints: u32) -> WorldState {
        let packs = vec![LevelPack { name: "Test".into(), levels: vec![parse_level(text).unwrap()] }];
        let speed = SpeedConfig { tick_rate_ms: 20, step_ticks };
        let mut world = WorldState::new(speed, Progress::new(hints));
        world.pack_name = "Test".into();
        load_level(&mut world, 0, &packs, &GameConfig::default());
        world
    }

    fn moves(events: &[GameEvent]) -> usize {
        events.iter().filter(|e| matches!(e, GameEvent::Moved { .. })).count()
    }

    #[test]
    fn one_step_every_step_ticks() {
        let mut w = world_from(DEAD_END, 3, 0);
        let mut step_ticks = vec![];
        let mut halted = None;

        let mut input = Some(Direction::East);
        for tick in 1..=12 {
            let events = step(&mut w, input.take());
            if moves(&events) > 0 {
                step_ticks.push(tick);
            }
            for e in events {
                if let GameEvent::Halted { at, open } = e {
                    halted = Some((tick, at, open));
                }
            }
        }

        assert_eq!(step_ticks, vec![1, 4, 7]);
        let (tick, at, open) = halted.unwrap();
        assert_eq!(tick, 7);
        assert_eq!(at, Pos::new(3, 0));
        assert!(open.is_empty());
        assert_eq!(w.affordances, DirSet::EMPTY);
        assert!(!w.mover.is_moving());
    }

    #[test]
    fn swipes_while_moving_are_dropped() {
        let mut w = world_from(DEAD_END, 3, 0);
        step(&mut w, Some(Direction::East));
        // Back west would be legal at rest; mid-move it is ignored.
        let events = step(&mut w, Some(Direction::West));
        assert!(events.is_empty());
        for _ in 0..10 {
            step(&mut w, None);
        }
        assert_eq!(w.mover.pos(), Pos::new(3, 0));
        assert_eq!(w.mover.ledger().len(), 3);
    }

    #[test]
    fn zero_step_ticks_plays_the_move_at_once() {
        let mut w = world_from(DEAD_END, 0, 0);
        let events = step(&mut w, Some(Direction::East));
        assert_eq!(moves(&events), 3);
        assert!(matches!(events.last(), Some(GameEvent::Halted { .. })));
    }

    #[test]
    fn backtracking_reports_undo() {
        let mut w = world_from(DEAD_END, 0, 0);
        step(&mut w, Some(Direction::East));
        let events = step(&mut w, Some(Direction::West));
        assert_eq!(moves(&events), 3);
        assert!(events.iter().all(|e| match e {
            GameEvent::Moved { undone, .. } => *undone,
            _ => true,
        }));
        assert_eq!(w.grid.total_trail(), 0);
        assert_eq!(w.mover.pos(), Pos::new(0, 0));
    }

    #[test]
    fn goal_completes_level_and_blocks_input() {
        let mut w = world_from(RUN, 0, 0);
        let events = step(&mut w, Some(Direction::East));
        assert_eq!(events.last(), Some(&GameEvent::GoalReached { at: Pos::new(3, 0) }));
        assert_eq!(w.phase, Phase::LevelComplete);
        assert_eq!(w.progress.completed_in("Test"), 1);
        assert_eq!(w.progress.level, 1);

        assert!(step(&mut w, Some(Direction::West)).is_empty());
        assert_eq!(w.mover.pos(), Pos::new(3, 0));
        assert!(request_hint(&mut w).is_none());
    }

    #[test]
    fn hint_requests_spend_currency() {
        let mut w = world_from(RUN, 3, 1);
        assert_eq!(request_hint(&mut w), Some(GameEvent::HintRevealed { segments: 2 }));
        assert_eq!(w.progress.hints, 0);
        assert!(w.grid.tile(Pos::new(0, 0)).has_hint(Direction::East));

        assert_eq!(request_hint(&mut w), Some(GameEvent::HintNoCurrency));

        w.progress.hints = 4;
        assert_eq!(request_hint(&mut w), Some(GameEvent::HintRevealed { segments: 1 }));
        assert_eq!(request_hint(&mut w), Some(GameEvent::HintsExhausted));
        assert_eq!(w.progress.hints, 3);
    }

    #[test]
    fn restart_clears_trails_but_keeps_hints() {
        let mut w = world_from(DEAD_END.replace("# Dead end", "# Dead end\n@ 0,0 1,0").as_str(), 0, 2);
        request_hint(&mut w);
        step(&mut w, Some(Direction::East));
        assert!(w.grid.total_trail() > 0);

        assert_eq!(restart_level(&mut w), Some(GameEvent::LevelRestarted));
        assert_eq!(w.mover.pos(), Pos::new(0, 0));
        assert_eq!(w.grid.total_trail(), 0);
        assert!(w.mover.ledger().is_empty());
        assert!(w.grid.tile(Pos::new(0, 0)).has_hint(Direction::East));
        assert_eq!(w.hints.revealed(), 1);
        assert_eq!(w.affordances.iter().collect::<Vec<_>>(), vec![Direction::East]);
    }

    #[test]
    fn restart_after_goal_replays_the_level() {
        let mut w = world_from(RUN, 0, 0);
        step(&mut w, Some(Direction::East));
        assert_eq!(w.phase, Phase::LevelComplete);
        restart_level(&mut w);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.mover.pos(), Pos::new(0, 0));
    }

    #[test]
    fn restart_waits_for_the_move_to_finish() {
        let mut w = world_from(DEAD_END, 3, 0);
        step(&mut w, Some(Direction::East));
        assert!(w.mover.is_moving());

        assert_eq!(restart_level(&mut w), None);
        for _ in 0..10 {
            step(&mut w, None);
        }
        assert_eq!(w.mover.pos(), Pos::new(3, 0));
        assert_eq!(w.mover.ledger().len(), 3);

        // At rest the restart goes through.
        assert_eq!(restart_level(&mut w), Some(GameEvent::LevelRestarted));
        assert_eq!(w.mover.pos(), Pos::new(0, 0));
    }

    #[test]
    fn restart_is_ignored_on_select_screens() {
        let mut w = world_from(RUN, 0, 0);
        w.phase = Phase::LevelSelect;
        assert_eq!(restart_level(&mut w), None);
        assert_eq!(w.phase, Phase::LevelSelect);
    }
}
