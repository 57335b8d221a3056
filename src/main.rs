/// Entry point and game loop.

mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use tracing::{info, warn};

use trailrunner::config::GameConfig;
use trailrunner::domain::direction::Direction;
use trailrunner::logging;
use trailrunner::sim::event::GameEvent;
use trailrunner::sim::level::{load_level, load_packs, LevelPack};
use trailrunner::sim::save::{self, Progress};
use trailrunner::sim::{select, step};
use trailrunner::sim::world::{Phase, WorldState};
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    if let Err(e) = logging::init(&config.log) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let packs = load_packs(&config);
    let progress = save::load_progress(config.hints.starting_hints)
        .unwrap_or_else(|| Progress::new(config.hints.starting_hints));
    info!(packs = packs.len(), ?progress, "starting");

    let mut world = WorldState::new(config.speed.clone(), progress);
    select::resume(&mut world, &packs, &config);

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &packs, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    if let Err(e) = save::save_progress(&world.progress) {
        eprintln!("Warning: {e}");
    }

    println!();
    println!("Thanks for playing Trail Runner!");
    let total: usize = packs.iter().map(|p| p.levels.len()).sum();
    println!("Levels completed: {}/{}", world.progress.total_completed().min(total), total);
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    packs: &[LevelPack],
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    // Consumed by the next tick; a swipe that lands mid-move is dropped there.
    let mut pending_swipe: Option<Direction> = None;

    loop {
        kb.drain_events()?;

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_meta(world, &kb, packs, config) {
            break;
        }

        if world.phase == Phase::Playing {
            if let Some(dir) = kb.swipe() {
                pending_swipe = Some(dir);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            let events = step::step(world, pending_swipe.take());
            process_events(world, &events);
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Key Constants ──

const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_BACK: &[KeyCode] = &[KeyCode::Esc];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_HINT: &[KeyCode] = &[KeyCode::Char('h'), KeyCode::Char('H')];
const KEYS_NEXT: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char('n'), KeyCode::Char('N')];

/// Keys outside the swipe set. Returns true to quit.
fn handle_meta(world: &mut WorldState, kb: &InputState, packs: &[LevelPack], config: &GameConfig) -> bool {
    if kb.any_pressed(KEYS_QUIT) {
        return true;
    }
    let back = kb.any_pressed(KEYS_BACK);

    match world.phase {
        // ── Pack / Level Select ──
        Phase::PackSelect | Phase::LevelSelect => {
            match kb.swipe() {
                Some(Direction::North) => select::move_cursor(world, -1),
                Some(Direction::South) => select::move_cursor(world, 1),
                _ => {}
            }
            if kb.any_pressed(KEYS_CONFIRM) {
                select::confirm(world, packs, config);
            } else if back {
                select::back(world);
            }
        }

        // ── In a level ──
        Phase::Playing | Phase::LevelComplete => {
            if back {
                select::open_level_select(world);
                return false;
            }
            if kb.any_pressed(KEYS_RESTART) && step::restart_level(world).is_some() {
                world.set_message("Level restarted", 30);
            }
            if kb.any_pressed(KEYS_HINT) {
                if let Some(GameEvent::HintRevealed { .. }) = step::request_hint(world) {
                    persist(world);
                }
            }
            if world.phase == Phase::LevelComplete && kb.any_pressed(KEYS_NEXT) {
                let next = world.current_level + 1;
                load_level(world, next, packs, config);
            }
        }

        // ── Pack finished ──
        Phase::GameComplete => {
            if back || kb.any_pressed(KEYS_CONFIRM) {
                select::open_pack_select(world);
            }
        }
    }

    false
}

fn process_events(world: &mut WorldState, events: &[GameEvent]) {
    for ev in events {
        if let GameEvent::GoalReached { .. } = ev {
            persist(world);
        }
    }
}

fn persist(world: &mut WorldState) {
    if let Err(e) = save::save_progress(&world.progress) {
        warn!(error = %e, "progress not saved");
        world.set_message("Could not save progress", 60);
    }
}
