use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    /// Seeding was asked for a grid that cannot exist or cannot be indexed
    #[error("invalid grid topology {width}x{height}")]
    InvalidTopology { width: i64, height: i64 },
    #[error("cell size must be at least one pixel")]
    ZeroCellSize,
    /// Pixel arithmetic is done in `i32`, so larger cells cannot be addressed
    #[error("cell size {0} is too large")]
    CellSizeTooLarge(u32),
    #[error("cell ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },
}
