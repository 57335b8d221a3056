/// Log output setup.
///
/// The terminal is in raw mode on the alternate screen while the game runs,
/// so logs go to a file. With no file configured nothing is installed and
/// `tracing` calls are no-ops.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::Level;

use crate::config::LogConfig;

/// Parse a level name; unknown names fall back to `info`.
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the file subscriber. Returns `Ok(false)` when logging is disabled.
pub fn init(cfg: &LogConfig) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let path = match &cfg.file {
        Some(p) => p,
        None => return Ok(false),
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_max_level(parse_level(&cfg.level))
        .with_target(false)
        .compact()
        .try_init()?;
    Ok(true)
}
