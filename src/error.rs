use thiserror::Error;

use crate::components::Cell;

/// Invalid arguments handed to the maze core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MazeError {
    #[error("cell {cell} is outside the {width}x{height} maze")]
    OutOfBounds {
        cell: Cell,
        width: usize,
        height: usize,
    },
    #[error("cell {0} is a brick of the outer wall, it has no nearest cells")]
    OuterWall(Cell),
    #[error("walls_factor must be 0 <= factor <= 1, given: {0}")]
    WallsFactor(f64),
    #[error("position ({x}, {y}) does not map to a cell")]
    InvalidPosition { x: f32, y: f32 },
    #[error("unknown mark code {0}")]
    UnknownMark(u8),
    #[error("malformed maze text: {0}")]
    Malformed(String),
}
