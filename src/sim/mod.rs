/// Tick-driven game world built on the domain rules.

pub mod event;
pub mod level;
pub mod save;
pub mod select;
pub mod step;
pub mod world;
