/// Level loader.
///
/// ## Packs (listed in this order):
///   1. Built-in "Classic" and "Ice" sets
///   2. Loose `.txt` files in `levels/`, as a pack named after the directory
///   3. Each `levels/<pack>/` subdirectory, sorted by name
///
///   Within a directory pack, levels are ordered by filename.
///
/// ## Level format (`.txt`):
///   ```text
///   # Level Name
///   @ 0,1 1,1 1,0
///   +-+-+
///   |S  |
///   + + +
///   |~ G|
///   +-+-+
///   ```
///
///   `2*height+1` diagram lines, each `2*width+1` characters wide. Even lines
///   carry horizontal walls (`-` at odd columns), odd lines carry vertical
///   walls (`|` at even columns) and the cells at odd columns. The top text
///   row is the northernmost grid row (`y = height-1`).
///
///   The `@` line lists the hint path in grid coordinates. It always begins
///   at the start tile; a missing start is prepended.
///
/// ## Cell legend:
///   ' ' = Floor       'S' = Start
///   'G' = Goal        '~' = Ice

use std::path::Path;

use tracing::{info, warn};

use crate::config::GameConfig;
use crate::domain::direction::Direction;
use crate::domain::grid::{Grid, Pos};
use crate::domain::hint::HintPath;
use crate::domain::movement::Mover;
use crate::error::LevelError;
use crate::sim::world::{Phase, WorldState};

/// A parsed, validated level.
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub grid: Grid,
    pub start: Pos,
    pub hint: Vec<Pos>,
}

/// A named, ordered set of levels. Levels unlock one at a time.
#[derive(Clone, Debug)]
pub struct LevelPack {
    pub name: String,
    pub levels: Vec<LevelDef>,
}

/// What the pack list shows for one pack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackInfo {
    pub name: String,
    pub level_count: usize,
}

impl LevelPack {
    pub fn info(&self) -> PackInfo {
        PackInfo { name: self.name.clone(), level_count: self.levels.len() }
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load level `level_idx` of the active pack into the world state. Keeps
/// progress and revealed-hint currency; everything on the board starts fresh.
/// Past the last level the pack is complete.
pub fn load_level(world: &mut WorldState, level_idx: usize, packs: &[LevelPack], config: &GameConfig) {
    let Some(pack) = packs.get(world.active_pack) else {
        warn!(pack = world.active_pack, "no such pack");
        world.phase = Phase::GameComplete;
        return;
    };
    world.total_levels = pack.levels.len();

    let def = match pack.levels.get(level_idx) {
        Some(d) => d,
        None => {
            world.phase = Phase::GameComplete;
            world.set_message(&format!("{}: all levels complete!", pack.name), 0);
            return;
        }
    };

    world.current_level = level_idx;
    world.level_name = def.name.clone();
    world.grid = def.grid.clone();
    world.mover = Mover::new(def.start);
    world.hints = HintPath::new(def.hint.clone());
    world.hint_budget = match config.hints.tiles_per_hint {
        0 => world.hints.default_budget(),
        n => n,
    };
    world.affordances = world.mover.open_directions(&world.grid);
    world.phase = Phase::Playing;
    world.step_cooldown = 0;
    world.tick = 0;
    world.progress.pack = pack.name.clone();
    world.progress.level = level_idx;

    let msg = format!("Level {}: {}", level_idx + 1, def.name);
    world.set_message(&msg, 100);

    info!(
        pack = %pack.name,
        level = level_idx + 1,
        name = %def.name,
        width = def.grid.width(),
        height = def.grid.height(),
        goal = ?world.grid.goal(),
        hint_segments = world.hints.segment_count(),
        "level loaded"
    );
}

/// Every pack: the embedded sets first, then the levels directory. Loose
/// `.txt` files in the directory form a pack named after it; each
/// subdirectory holding `.txt` files is a pack of its own.
pub fn load_packs(config: &GameConfig) -> Vec<LevelPack> {
    let mut packs = embedded_packs();
    packs.extend(load_directory_packs(&config.levels_dir));
    packs
}

/// Packs found under `dir`, subdirectories sorted by name. Empty packs are
/// left out.
pub fn load_directory_packs(dir: &Path) -> Vec<LevelPack> {
    let mut packs = vec![];
    if !dir.is_dir() {
        return packs;
    }

    let loose = load_from_directory(dir);
    if !loose.is_empty() {
        let name = dir.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "levels".to_string());
        packs.push(LevelPack { name, levels: loose });
    }

    let mut subdirs: Vec<_> = match std::fs::read_dir(dir) {
        Ok(entries) => entries.flatten().map(|e| e.path()).filter(|p| p.is_dir()).collect(),
        Err(_) => vec![],
    };
    subdirs.sort();

    for sub in subdirs {
        let levels = load_from_directory(&sub);
        if levels.is_empty() {
            warn!(dir = %sub.display(), "no usable levels, pack skipped");
            continue;
        }
        let name = sub.file_name().unwrap_or_default().to_string_lossy().to_string();
        info!(pack = %name, levels = levels.len(), "pack found");
        packs.push(LevelPack { name, levels });
    }

    packs
}

/// Switch the active pack. The board is left alone until a level loads.
pub fn switch_pack(world: &mut WorldState, packs: &[LevelPack], pack_idx: usize) {
    let Some(pack) = packs.get(pack_idx) else { return };
    world.active_pack = pack_idx;
    world.pack_name = pack.name.clone();
    world.level_names = pack.levels.iter().map(|l| l.name.clone()).collect();
    world.total_levels = pack.levels.len();
    world.select_cursor = 0;
}

/// Parse and validate one level. Line and column numbers in errors are
/// 1-based positions in `content`.
pub fn parse_level(content: &str) -> Result<LevelDef, LevelError> {
    let mut name = String::new();
    let mut hint_tokens: Vec<&str> = vec![];
    let mut diagram: Vec<(usize, Vec<char>)> = vec![];

    for (i, raw) in content.lines().enumerate() {
        let line = raw.trim_end();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix('#') {
            if name.is_empty() {
                name = rest.trim().to_string();
            }
        } else if let Some(rest) = line.strip_prefix('@') {
            hint_tokens.extend(rest.split_whitespace());
        } else {
            diagram.push((i + 1, line.chars().collect()));
        }
    }

    let (grid, start) = parse_diagram(&diagram)?;
    let hint = parse_hint(&hint_tokens, &grid, start)?;

    if name.is_empty() {
        name = "Untitled".to_string();
    }

    Ok(LevelDef { name, grid, start, hint })
}

fn parse_diagram(lines: &[(usize, Vec<char>)]) -> Result<(Grid, Pos), LevelError> {
    let expected = match lines.first() {
        Some((_, chars)) => chars.len(),
        None => return Err(LevelError::Empty),
    };
    for (line, chars) in lines {
        if chars.len() != expected {
            return Err(LevelError::RaggedLine { line: *line, found: chars.len(), expected });
        }
    }
    if lines.len() < 3 || lines.len() % 2 == 0 || expected < 3 || expected % 2 == 0 {
        return Err(LevelError::BadShape { lines: lines.len(), width: expected });
    }

    let width = (expected - 1) / 2;
    let height = (lines.len() - 1) / 2;
    let mut grid = Grid::new(width, height);
    let mut start = None;
    let mut goals = 0;

    for (row, (line, chars)) in lines.iter().enumerate() {
        let line = *line;
        if row % 2 == 0 {
            // Horizontal walls: north edge of text row `row/2`.
            let boundary = row == 0 || row == lines.len() - 1;
            for x in 0..width {
                let column = 2 * x + 1;
                match chars[column] {
                    '-' if !boundary => {
                        grid.set_wall(Pos::new(x, height - 1 - row / 2), Direction::North, true);
                    }
                    '-' => {}
                    ' ' if boundary => {
                        return Err(LevelError::OpenBoundary { line, column: column + 1 });
                    }
                    ' ' => {}
                    ch => return Err(LevelError::UnknownCell { ch, line, column: column + 1 }),
                }
            }
        } else {
            let y = height - 1 - row / 2;
            for (column, &ch) in chars.iter().enumerate() {
                let x = column / 2;
                if column % 2 == 0 {
                    let boundary = column == 0 || column == expected - 1;
                    match ch {
                        '|' if !boundary => grid.set_wall(Pos::new(x, y), Direction::West, true),
                        '|' => {}
                        ' ' if boundary => {
                            return Err(LevelError::OpenBoundary { line, column: column + 1 });
                        }
                        ' ' => {}
                        _ => return Err(LevelError::UnknownCell { ch, line, column: column + 1 }),
                    }
                    continue;
                }
                let pos = Pos::new(x, y);
                match ch {
                    ' ' => {}
                    '~' => grid.set_ice(pos, true),
                    'G' => {
                        grid.set_goal(pos, true);
                        goals += 1;
                    }
                    'S' => {
                        if start.is_some() {
                            return Err(LevelError::DuplicateStart);
                        }
                        start = Some(pos);
                    }
                    _ => return Err(LevelError::UnknownCell { ch, line, column: column + 1 }),
                }
            }
        }
    }

    let start = start.ok_or(LevelError::MissingStart)?;
    if goals == 0 {
        return Err(LevelError::MissingGoal);
    }
    Ok((grid, start))
}

fn parse_hint(tokens: &[&str], grid: &Grid, start: Pos) -> Result<Vec<Pos>, LevelError> {
    let mut points = Vec::with_capacity(tokens.len() + 1);
    for token in tokens {
        let bad = || LevelError::BadHintPoint { token: token.to_string() };
        let (xs, ys) = token.split_once(',').ok_or_else(bad)?;
        let x: usize = xs.trim().parse().map_err(|_| bad())?;
        let y: usize = ys.trim().parse().map_err(|_| bad())?;
        let pos = Pos::new(x, y);
        if !grid.contains(pos) {
            return Err(LevelError::HintOutOfBounds {
                x,
                y,
                width: grid.width(),
                height: grid.height(),
            });
        }
        points.push(pos);
    }

    if points.first() != Some(&start) {
        points.insert(0, start);
    }

    if let Some(index) = points
        .windows(2)
        .position(|w| Direction::between(w[0], w[1]) == Direction::Start)
    {
        return Err(LevelError::DisjointHint { index });
    }

    Ok(points)
}

// ══════════════════════════════════════════════════════════════
// Directory loading (individual .txt files)
// ══════════════════════════════════════════════════════════════

/// Every valid `.txt` level directly inside `dir`, ordered by filename.
/// Files that fail to read or parse are skipped with a warning.
pub fn load_from_directory(dir: &Path) -> Vec<LevelDef> {
    let mut results: Vec<(String, LevelDef)> = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "could not read levels directory");
            return Vec::new();
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.extension().map_or(false, |e| e == "txt") {
            continue;
        }
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "could not read level");
                continue;
            }
        };
        match parse_level(&content) {
            Ok(def) => {
                let filename = path.file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string();
                results.push((filename, def));
            }
            Err(e) => warn!(file = %path.display(), error = %e, "skipping level"),
        }
    }

    results.sort_by(|a: &(String, LevelDef), b| a.0.cmp(&b.0));
    results.into_iter().map(|(_, def)| def).collect()
}

// ══════════════════════════════════════════════════════════════
// Embedded packs
// ══════════════════════════════════════════════════════════════

pub fn embedded_packs() -> Vec<LevelPack> {
    vec![
        LevelPack { name: "Classic".to_string(), levels: classic_levels() },
        LevelPack { name: "Ice".to_string(), levels: ice_levels() },
    ]
}

fn classic_levels() -> Vec<LevelDef> {
    built_in([
        make_embedded("First Steps", "0,2 1,2 1,1 0,1 0,0 1,0 2,0 3,0 3,1", &[
            "+-+-+-+-+",
            "|S  |   |",
            "+-+ + +-+",
            "|   |  G|",
            "+ +-+-+ +",
            "|       |",
            "+-+-+-+-+",
        ]),
        make_embedded("Crossroads", "0,2 1,2 1,1 0,1 0,0 1,0 2,0 3,0 3,1 3,2 4,2", &[
            "+-+-+-+-+-+",
            "|S    |  G|",
            "+-+ + + +-+",
            "|   |     |",
            "+ +-+-+ + +",
            "|         |",
            "+-+-+-+-+-+",
        ]),
    ])
}

fn ice_levels() -> Vec<LevelDef> {
    built_in([
        make_embedded("Thin Ice", "0,3 1,3 2,3 2,2 3,2 3,3 4,3 4,2 4,1", &[
            "+-+-+-+-+-+",
            "|S    |   |",
            "+ +-+ + + +",
            "| |~    | |",
            "+ + +-+-+ +",
            "|   |    G|",
            "+-+ + +-+-+",
            "|         |",
            "+-+-+-+-+-+",
        ]),
        make_embedded("Glide Path", "0,2 0,1 1,1 1,0 2,0 2,1", &[
            "+-+-+-+-+-+-+",
            "|S ~ ~ ~ ~  |",
            "+ +-+-+-+ + +",
            "|   |G    | |",
            "+-+ + +-+-+ +",
            "|     |     |",
            "+-+-+-+-+-+-+",
        ]),
    ])
}

fn built_in(levels: impl IntoIterator<Item = Result<LevelDef, LevelError>>) -> Vec<LevelDef> {
    levels
        .into_iter()
        .filter_map(|level| match level {
            Ok(def) => Some(def),
            Err(e) => {
                warn!(error = %e, "built-in level rejected");
                None
            }
        })
        .collect()
}

fn make_embedded(name: &str, hint: &str, map: &[&str]) -> Result<LevelDef, LevelError> {
    let text = format!("# {}\n@ {}\n{}\n", name, hint, map.join("\n"));
    parse_level(&text)
}
