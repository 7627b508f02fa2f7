use std::fmt;

use crate::error::MazeError;

/// Content of a single grid cell. The discriminants are the stable encoding
/// used by the textual form of a [`Grid`](crate::maze::Grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mark {
    Unvisited = 0,
    Wall = 1,
    Path = 2,
    Coin = 3,
    Door = 4,
    Monster = 5,
    Robot = 6,
}

impl Mark {
    pub const ALL: [Mark; 7] = [
        Mark::Unvisited,
        Mark::Wall,
        Mark::Path,
        Mark::Coin,
        Mark::Door,
        Mark::Monster,
        Mark::Robot,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Marks standing for an entity rather than maze content.
    pub fn is_entity(self) -> bool {
        matches!(self, Mark::Monster | Mark::Robot)
    }
}

impl TryFrom<u8> for Mark {
    type Error = MazeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Mark::ALL
            .get(code as usize)
            .copied()
            .ok_or(MazeError::UnknownMark(code))
    }
}

/// Integer coordinate of a grid cell; `y` is the row, `x` the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The cell `distance` cells away along `dir`, `None` when it would leave
    /// the first quadrant.
    pub fn offset(self, dir: Direction, distance: usize) -> Option<Cell> {
        let (dx, dy) = dir.delta();
        let x = self.x as isize + dx * distance as isize;
        let y = self.y as isize + dy * distance as isize;
        if x < 0 || y < 0 {
            return None;
        }
        Some(Cell::new(x as usize, y as usize))
    }
}

impl From<(usize, usize)> for Cell {
    fn from((x, y): (usize, usize)) -> Self {
        Cell::new(x, y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Real-valued position of the robot. Half-cell steps are allowed, the mark
/// is read and written at the cell obtained by truncation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn cell(self) -> Result<Cell, MazeError> {
        if !self.x.is_finite() || !self.y.is_finite() || self.x < 0.0 || self.y < 0.0 {
            return Err(MazeError::InvalidPosition {
                x: self.x,
                y: self.y,
            });
        }
        Ok(Cell::new(self.x.trunc() as usize, self.y.trunc() as usize))
    }

    pub fn shifted(self, dir: Direction, step: f32) -> Position {
        let (dx, dy) = dir.delta();
        Position::new(self.x + dx as f32 * step, self.y + dy as f32 * step)
    }
}

impl From<Cell> for Position {
    fn from(cell: Cell) -> Self {
        Position::new(cell.x as f32, cell.y as f32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Priority order used when a single direction has to be picked.
    pub const PRIORITY: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    /// Stable slot of the direction in per-direction arrays.
    pub fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        }
    }
}

/// Terminal state shared by every moving entity of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    None,
    Passed,
    GameOver,
}

impl Status {
    /// Entities stop moving once the level has been decided.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Passed | Status::GameOver)
    }
}

/// Discrete actions accepted from the input collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Press(Direction),
    Release(Direction),
    BreakWall,
    Restart,
    NextLevel,
    Exit,
}
