//! Conway's Game of Life on a bounded grid, stepping only the cells near life.

pub mod enc;
pub mod engine;
pub mod pos;

pub use enc::{Pattern, PatternEncoder, PatternError, RunLengthEncoded};
pub use engine::{
    Cell, Grid, GridError, GridWindow, PendingGeneration, StepOutcome, Topology, Transition,
};
pub use pos::Pos2;
