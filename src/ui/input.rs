/// Keyboard input, classified into swipes and commands.
///
/// A swipe is one fresh key press of an arrow key or WASD. Key repeat and
/// release events never swipe: holding a key does not re-launch the token
/// after it halts.
///
/// ┌──────────────────┬──────────────┐
/// │ Key              │ Meaning      │
/// ├──────────────────┼──────────────┤
/// │ ↑ / W            │ swipe North  │
/// │ ↓ / S            │ swipe South  │
/// │ → / D            │ swipe East   │
/// │ ← / A            │ swipe West   │
/// └──────────────────┴──────────────┘

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use trailrunner::domain::direction::Direction;

pub struct InputState {
    /// Keys pressed (not repeated) during the most recent drain_events().
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for modifier handling.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) -> std::io::Result<()> {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                self.raw_events.push(key);
                if key.kind == KeyEventKind::Press {
                    self.fresh_presses.push(key.code);
                }
            }
        }
        Ok(())
    }

    /// Was this key freshly pressed this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// The last swipe of the frame, if any.
    pub fn swipe(&self) -> Option<Direction> {
        self.fresh_presses.iter().rev().find_map(|c| swipe_direction(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

/// Map a key to a swipe direction.
pub fn swipe_direction(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Direction::North),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Direction::South),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Direction::East),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Direction::West),
        _ => None,
    }
}
