/// Pack and level selection screens.
///
/// ┌──────────────┬──────────────────────┬──────────────────────────────┐
/// │ Phase        │ Cursor range         │ Confirm                      │
/// ├──────────────┼──────────────────────┼──────────────────────────────┤
/// │ PackSelect   │ every pack           │ switch pack, open its levels │
/// │ LevelSelect  │ unlocked levels only │ load the level               │
/// └──────────────┴──────────────────────┴──────────────────────────────┘
///
/// Level `i` of a pack is unlocked once `i` levels of it are complete, so
/// the cursor can never rest on a locked level.

use tracing::{debug, info};

use crate::config::GameConfig;
use crate::sim::level::{load_level, switch_pack, LevelPack};
use crate::sim::world::{Phase, WorldState};

/// Startup: pick the saved pack and resume its saved level when it is still
/// unlocked, otherwise open that pack's level list.
pub fn resume(world: &mut WorldState, packs: &[LevelPack], config: &GameConfig) {
    world.pack_list = packs.iter().map(LevelPack::info).collect();

    let saved_level = world.progress.level;
    let pack_idx = packs.iter()
        .position(|p| p.name == world.progress.pack)
        .unwrap_or(0);
    switch_pack(world, packs, pack_idx);

    if saved_level < world.total_levels
        && world.progress.is_unlocked(&world.pack_name, saved_level)
    {
        info!(pack = %world.pack_name, level = saved_level + 1, "resuming");
        load_level(world, saved_level, packs, config);
    } else {
        open_level_select(world);
    }
}

/// Level list of the active pack, cursor on the current level when it can be
/// picked, else on the newest unlocked one.
pub fn open_level_select(world: &mut WorldState) {
    let unlocked = unlocked_levels(world);
    world.select_cursor = if world.progress.pack == world.pack_name && world.progress.level < unlocked {
        world.progress.level
    } else {
        unlocked.saturating_sub(1)
    };
    world.phase = Phase::LevelSelect;
    world.message.clear();
    world.message_timer = 0;
}

pub fn open_pack_select(world: &mut WorldState) {
    world.pack_cursor = world.active_pack;
    world.phase = Phase::PackSelect;
}

/// Levels of the active pack the player may pick.
pub fn unlocked_levels(world: &WorldState) -> usize {
    world.progress.unlocked_in(&world.pack_name, world.level_names.len())
}

/// Move the cursor of the open select screen by `delta`, clamped to its range.
pub fn move_cursor(world: &mut WorldState, delta: isize) {
    let (cursor, len) = match world.phase {
        Phase::PackSelect => (&mut world.pack_cursor, world.pack_list.len()),
        Phase::LevelSelect => {
            let len = world.progress.unlocked_in(&world.pack_name, world.level_names.len());
            (&mut world.select_cursor, len)
        }
        _ => return,
    };
    if len == 0 {
        return;
    }
    let moved = cursor.saturating_add_signed(delta);
    *cursor = moved.min(len - 1);
}

/// Act on the highlighted entry.
pub fn confirm(world: &mut WorldState, packs: &[LevelPack], config: &GameConfig) {
    match world.phase {
        Phase::PackSelect => {
            let idx = world.pack_cursor;
            switch_pack(world, packs, idx);
            debug!(pack = %world.pack_name, "pack selected");
            open_level_select(world);
        }
        Phase::LevelSelect => {
            let idx = world.select_cursor;
            if idx < unlocked_levels(world) {
                load_level(world, idx, packs, config);
            }
        }
        _ => {}
    }
}

/// One screen up: level list to pack list, pack list back to the levels.
pub fn back(world: &mut WorldState) {
    match world.phase {
        Phase::LevelSelect => open_pack_select(world),
        Phase::PackSelect => open_level_select(world),
        _ => {}
    }
}
