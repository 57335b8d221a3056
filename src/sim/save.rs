/// Save and load player progress.
///
/// ## File format:
///   Key-value lines in `progress.dat`:
///   ```text
///   pack=Classic
///   level=2
///   hints=5
///   completed:Classic=2
///   completed:Ice=1
///   ```
///   `pack`/`level` name the level to resume; each `completed:<pack>` line
///   counts the levels finished in that pack. Unknown keys are ignored.
///   Missing keys keep the fresh-profile value.
///
/// Only progress is stored, never a mid-move snapshot: a level always
/// resumes from its start tile.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::SaveError;

const PROGRESS_FILE: &str = "progress.dat";
const COMPLETED_PREFIX: &str = "completed:";

// ══════════════════════════════════════════════════════════════
// Public types
// ══════════════════════════════════════════════════════════════

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Progress {
    /// Pack of the level to resume.
    pub pack: String,
    /// Level to resume, within `pack`.
    pub level: usize,
    /// Hint currency balance.
    pub hints: u32,
    /// Levels finished per pack. Level `i` is unlocked when `i <= completed`.
    completed: BTreeMap<String, usize>,
}

impl Progress {
    pub fn new(hints: u32) -> Self {
        Progress {
            pack: String::new(),
            level: 0,
            hints,
            completed: BTreeMap::new(),
        }
    }

    pub fn completed_in(&self, pack: &str) -> usize {
        self.completed.get(pack).copied().unwrap_or(0)
    }

    /// Levels of a `count`-level pack the player may pick: every finished
    /// one plus the next.
    pub fn unlocked_in(&self, pack: &str, count: usize) -> usize {
        (self.completed_in(pack) + 1).min(count)
    }

    pub fn is_unlocked(&self, pack: &str, idx: usize) -> bool {
        idx <= self.completed_in(pack)
    }

    /// Record finishing level `idx` of `pack` and point at the next one.
    pub fn complete_level(&mut self, pack: &str, idx: usize) {
        let done = self.completed.entry(pack.to_string()).or_insert(0);
        *done = (*done).max(idx + 1);
        self.pack = pack.to_string();
        self.level = idx + 1;
    }

    /// Total levels finished across every pack.
    pub fn total_completed(&self) -> usize {
        self.completed.values().sum()
    }
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

fn save_dir() -> PathBuf {
    // 1. Exe directory, if writable (portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let test_path = parent.join(".write_test_trailrunner");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/trailrunner");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn progress_path() -> PathBuf {
    save_dir().join(PROGRESS_FILE)
}

// ══════════════════════════════════════════════════════════════
// File operations
// ══════════════════════════════════════════════════════════════

pub fn save_progress(progress: &Progress) -> Result<(), SaveError> {
    save_progress_to(&progress_path(), progress)
}

/// `None` when no progress file exists yet.
pub fn load_progress(starting_hints: u32) -> Option<Progress> {
    let candidates = [progress_path(), PathBuf::from(PROGRESS_FILE)];
    candidates.iter().find_map(|p| load_progress_from(p, starting_hints))
}

pub fn save_progress_to(path: &Path, progress: &Progress) -> Result<(), SaveError> {
    std::fs::write(path, serialize(progress)).map_err(|source| SaveError::Write {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), ?progress, "progress saved");
    Ok(())
}

pub fn load_progress_from(path: &Path, starting_hints: u32) -> Option<Progress> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(parse_progress(&content, starting_hints)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read progress");
            None
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Serialization
// ══════════════════════════════════════════════════════════════

fn serialize(p: &Progress) -> String {
    let mut out = String::with_capacity(128);
    out.push_str(&format!("pack={}\n", p.pack));
    out.push_str(&format!("level={}\n", p.level));
    out.push_str(&format!("hints={}\n", p.hints));
    for (pack, n) in &p.completed {
        out.push_str(&format!("{}{}={}\n", COMPLETED_PREFIX, pack, n));
    }
    out
}

fn parse_progress(content: &str, starting_hints: u32) -> Progress {
    let mut p = Progress::new(starting_hints);

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix(COMPLETED_PREFIX) {
            // The pack name may contain '='; the count never does.
            if let Some((pack, val)) = rest.rsplit_once('=') {
                if let Ok(v) = val.trim().parse() {
                    p.completed.insert(pack.to_string(), v);
                }
            }
            continue;
        }
        let Some((key, val)) = line.split_once('=') else { continue };
        let val = val.trim();
        match key.trim() {
            "pack" => p.pack = val.to_string(),
            "level" => if let Ok(v) = val.parse() { p.level = v },
            "hints" => if let Ok(v) = val.parse() { p.hints = v },
            _ => {}
        }
    }

    p
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("trailrunner_save_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample() -> Progress {
        let mut p = Progress::new(7);
        p.complete_level("a=b", 0);
        p.complete_level("Classic", 0);
        p.complete_level("Classic", 1);
        p.complete_level("Ice", 0);
        p
    }

    #[test]
    fn serialized_progress_reads_back() {
        let p = sample();
        assert_eq!(parse_progress(&serialize(&p), 0), p);
    }

    #[test]
    fn progress_file_on_disk() {
        let dir = scratch_dir("disk");
        let path = dir.join(PROGRESS_FILE);
        assert_eq!(load_progress_from(&path, 3), None);

        let p = sample();
        save_progress_to(&path, &p).unwrap();
        assert_eq!(load_progress_from(&path, 3), Some(p));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unwritable_path_is_a_save_error() {
        let dir = scratch_dir("unwritable");
        let path = dir.join("missing").join(PROGRESS_FILE);
        let err = save_progress_to(&path, &sample()).unwrap_err();
        assert!(matches!(err, SaveError::Write { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_and_bad_keys_keep_fresh_values() {
        let p = parse_progress("level=2\nhints=lots\ncolour=blue\nnonsense\ncompleted:Ice=x\n", 3);
        assert_eq!(p.level, 2);
        assert_eq!(p.hints, 3);
        assert_eq!(p.pack, "");
        assert_eq!(p.completed_in("Ice"), 0);
    }

    #[test]
    fn empty_file_is_a_fresh_profile() {
        assert_eq!(parse_progress("", 5), Progress::new(5));
    }

    #[test]
    fn completion_is_kept_per_pack() {
        let mut p = Progress::new(3);
        p.complete_level("Classic", 0);
        assert_eq!((p.pack.as_str(), p.level), ("Classic", 1));
        p.complete_level("Classic", 1);
        assert_eq!(p.completed_in("Classic"), 2);
        assert_eq!(p.completed_in("Ice"), 0);

        // Replaying an earlier level does not lower the count.
        p.complete_level("Classic", 0);
        assert_eq!(p.completed_in("Classic"), 2);
        assert_eq!(p.level, 1);

        p.complete_level("Ice", 0);
        assert_eq!(p.total_completed(), 3);
    }

    #[test]
    fn unlocking_follows_completion() {
        let mut p = Progress::new(0);
        assert!(p.is_unlocked("Ice", 0));
        assert!(!p.is_unlocked("Ice", 1));
        assert_eq!(p.unlocked_in("Ice", 4), 1);

        p.complete_level("Ice", 0);
        p.complete_level("Ice", 1);
        assert!(p.is_unlocked("Ice", 2));
        assert!(!p.is_unlocked("Ice", 3));
        assert_eq!(p.unlocked_in("Ice", 4), 3);
        // Never more than the pack holds.
        assert_eq!(p.unlocked_in("Ice", 2), 2);
    }
}
