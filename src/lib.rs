/// Trail Runner: slide a token through a walled maze to the goal.
///
///   - `domain`: grid, directions, trail ledger, movement, hints
///   - `sim`: world state, per-tick stepping, levels, progress
///   - `config`: `config.toml` loading
///   - `logging`, `error`: log file setup and the level/save error types

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod sim;
