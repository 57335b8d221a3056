/// Error types for the fallible edges of the game: level files and saves.
/// Moves and hint requests never fail; their outcomes are plain values.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("level has no diagram")]
    Empty,
    #[error("diagram line {line} is {found} wide, expected {expected}")]
    RaggedLine { line: usize, found: usize, expected: usize },
    #[error("diagram must have an odd number of lines of odd width, got {lines}x{width}")]
    BadShape { lines: usize, width: usize },
    #[error("unknown cell '{ch}' at line {line}, column {column}")]
    UnknownCell { ch: char, line: usize, column: usize },
    #[error("level has no start tile 'S'")]
    MissingStart,
    #[error("level has more than one start tile")]
    DuplicateStart,
    #[error("level has no goal tile 'G'")]
    MissingGoal,
    #[error("outer boundary is open at line {line}, column {column}")]
    OpenBoundary { line: usize, column: usize },
    #[error("bad hint point '{token}'")]
    BadHintPoint { token: String },
    #[error("hint point {x},{y} is outside the {width}x{height} grid")]
    HintOutOfBounds { x: usize, y: usize, width: usize, height: usize },
    #[error("hint points {index} and {next} are not adjacent", next = .index + 1)]
    DisjointHint { index: usize },
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("could not write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
