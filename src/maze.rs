//! The shared tile grid every entity reads and mutates.
//!
//! The grid has double resolution: cells with both coordinates odd are rooms,
//! every other cell is a seam (the wall or passage between two rooms) or part
//! of the outer ring.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{Cell, Mark};
use crate::error::MazeError;

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    marks: Vec<Mark>,
    start_cell: Cell,
    finish_cell: Option<Cell>,
}

impl Grid {
    /// Forces a requested dimension to an odd value of at least 3.
    pub fn normalize_dimension(size: usize) -> usize {
        let size = if size % 2 == 0 {
            size.saturating_sub(1)
        } else {
            size
        };
        size.max(3)
    }

    /// Outer ring and every seam set to `Wall`, every room `Unvisited`.
    pub(crate) fn blueprint(width: usize, height: usize) -> Self {
        let width = Self::normalize_dimension(width);
        let height = Self::normalize_dimension(height);
        let mut marks = vec![Mark::Wall; width * height];
        for y in (1..height - 1).step_by(2) {
            for x in (1..width - 1).step_by(2) {
                marks[y * width + x] = Mark::Unvisited;
            }
        }
        Self {
            width,
            height,
            marks,
            start_cell: Cell::new(1, 1),
            finish_cell: None,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn start_cell(&self) -> Cell {
        self.start_cell
    }

    /// Unset only for a maze with a single room.
    pub fn finish_cell(&self) -> Option<Cell> {
        self.finish_cell
    }

    pub(crate) fn set_endpoints(&mut self, start: Cell, finish: Option<Cell>) {
        self.start_cell = start;
        self.finish_cell = finish;
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    pub fn is_room(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && cell.x % 2 == 1 && cell.y % 2 == 1 && !self.is_outer_wall(cell)
    }

    fn index(&self, cell: Cell) -> Result<usize, MazeError> {
        if !self.in_bounds(cell) {
            return Err(MazeError::OutOfBounds {
                cell,
                width: self.width,
                height: self.height,
            });
        }
        Ok(cell.y * self.width + cell.x)
    }

    fn cell_at(&self, idx: usize) -> Cell {
        Cell::new(idx % self.width, idx / self.width)
    }

    /// Unchecked write for cells the caller derived from the grid itself.
    pub(crate) fn set(&mut self, cell: Cell, mark: Mark) {
        let idx = cell.y * self.width + cell.x;
        self.marks[idx] = mark;
    }

    pub(crate) fn at(&self, cell: Cell) -> Mark {
        self.marks[cell.y * self.width + cell.x]
    }

    pub fn mark_cell(&mut self, cell: Cell, mark: Mark) -> Result<(), MazeError> {
        let idx = self.index(cell)?;
        self.marks[idx] = mark;
        Ok(())
    }

    pub fn get_mark(&self, cell: Cell) -> Result<Mark, MazeError> {
        Ok(self.marks[self.index(cell)?])
    }

    pub fn check_mark(&self, cell: Cell, mark: Mark) -> Result<bool, MazeError> {
        Ok(self.get_mark(cell)? == mark)
    }

    /// Picks uniformly among the cells currently holding `mark`.
    pub fn pick_random_cell(&self, mark: Mark, rng: &mut impl Rng) -> Option<Cell> {
        self.find_cells_by_mark(mark).choose(rng).copied()
    }

    pub fn find_cells_by_mark(&self, mark: Mark) -> Vec<Cell> {
        self.iter()
            .filter(|(m, _)| *m == mark)
            .map(|(_, cell)| cell)
            .collect()
    }

    pub fn contains_mark(&self, mark: Mark) -> bool {
        self.marks.contains(&mark)
    }

    /// True for the outer ring and anything beyond it.
    pub fn is_outer_wall(&self, cell: Cell) -> bool {
        cell.x == 0 || cell.x >= self.width - 1 || cell.y == 0 || cell.y >= self.height - 1
    }

    /// The four orthogonal neighbours in the order right, left, down, up.
    pub fn get_nearest(&self, cell: Cell) -> Result<[Cell; 4], MazeError> {
        if self.is_outer_wall(cell) {
            return Err(MazeError::OuterWall(cell));
        }
        let Cell { x, y } = cell;
        Ok([
            Cell::new(x + 1, y),
            Cell::new(x - 1, y),
            Cell::new(x, y + 1),
            Cell::new(x, y - 1),
        ])
    }

    /// A dead end has walls on exactly three sides.
    pub fn is_dead_end(&self, cell: Cell) -> Result<bool, MazeError> {
        let walls = self
            .get_nearest(cell)?
            .iter()
            .filter(|n| self.at(**n) == Mark::Wall)
            .count();
        Ok(walls == 3)
    }

    pub fn dead_ends(&self) -> Vec<Cell> {
        self.find_cells_by_mark(Mark::Path)
            .into_iter()
            .filter(|cell| self.is_dead_end(*cell).unwrap_or(false))
            .collect()
    }

    /// Row-major scan of `(mark, cell)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Mark, Cell)> + '_ {
        self.marks
            .iter()
            .enumerate()
            .map(|(idx, mark)| (*mark, self.cell_at(idx)))
    }

    pub fn room_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let width = self.width;
        (1..self.height - 1)
            .step_by(2)
            .flat_map(move |y| (1..width - 1).step_by(2).map(move |x| Cell::new(x, y)))
    }
}

impl<'a> IntoIterator for &'a Grid {
    type Item = (Mark, Cell);
    type IntoIter = Box<dyn Iterator<Item = (Mark, Cell)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.marks.chunks(self.width) {
            for mark in row {
                write!(f, "{}", mark.code())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Parses rows of mark digits, the same form `Display` produces.
///
/// The start cell is the first `Robot` mark (else the first non-wall cell),
/// the finish cell the first `Door` mark.
impl FromStr for Grid {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        let height = rows.len();
        if width < 3 || height < 3 {
            return Err(MazeError::Malformed(format!(
                "maze must be at least 3x3, got {width}x{height}"
            )));
        }

        let mut marks = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(MazeError::Malformed(format!(
                    "row {y} has {} cells, expected {width}",
                    row.len()
                )));
            }
            for ch in row.chars() {
                let code = ch
                    .to_digit(10)
                    .ok_or_else(|| MazeError::Malformed(format!("unexpected character {ch:?}")))?;
                marks.push(Mark::try_from(code as u8)?);
            }
        }

        let mut grid = Grid {
            width,
            height,
            marks,
            start_cell: Cell::new(1, 1),
            finish_cell: None,
        };
        let start = grid
            .find_cells_by_mark(Mark::Robot)
            .first()
            .copied()
            .or_else(|| grid.iter().find(|(m, _)| *m != Mark::Wall).map(|(_, c)| c))
            .unwrap_or(Cell::new(1, 1));
        let finish = grid.find_cells_by_mark(Mark::Door).first().copied();
        grid.set_endpoints(start, finish);
        Ok(grid)
    }
}
