/// Pure puzzle rules: no I/O, no clocks, no logging.

pub mod direction;
pub mod grid;
pub mod hint;
pub mod movement;
pub mod tile;
pub mod trail;
