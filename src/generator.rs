//! Randomized depth-first carving of a perfect maze.
//!
//! Every room is linked to the spanning tree exactly once, through the seam
//! between it and the room it was discovered from. The recursion runs on an
//! explicit stack so large mazes cannot exhaust the call stack.

use log::debug;
use rand::Rng;

use crate::components::{Cell, Direction, Mark};
use crate::error::MazeError;
use crate::maze::Grid;

/// Builds grids of a fixed size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MazeGenerator {
    width: usize,
    height: usize,
    walls_factor: f64,
}

/// One pending room in the carve: the room and the neighbours it still has
/// to try, fixed when the room was entered.
struct Frame {
    cell: Cell,
    candidates: Vec<Cell>,
}

impl MazeGenerator {
    pub fn new(width: usize, height: usize, walls_factor: f64) -> Result<Self, MazeError> {
        if !(0.0..=1.0).contains(&walls_factor) {
            return Err(MazeError::WallsFactor(walls_factor));
        }
        Ok(Self {
            width: Grid::normalize_dimension(width),
            height: Grid::normalize_dimension(height),
            walls_factor,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn generate(&self, rng: &mut impl Rng) -> Grid {
        let mut grid = Grid::blueprint(self.width, self.height);
        self.add_more_walls(&mut grid, rng);

        let start = grid
            .pick_random_cell(Mark::Unvisited, rng)
            .unwrap_or(Cell::new(1, 1));
        let finish = carve(&mut grid, start, rng);

        // Rooms walled off by the extra walls never join the tree.
        for cell in grid.find_cells_by_mark(Mark::Unvisited) {
            grid.set(cell, Mark::Wall);
        }

        grid.set_endpoints(start, finish);
        debug!(
            "generated {}x{} maze, start {start}, finish {:?}",
            self.width, self.height, finish
        );
        grid
    }

    /// Turns a share of the rooms into walls, keeping at least one room free.
    fn add_more_walls(&self, grid: &mut Grid, rng: &mut impl Rng) {
        let amount = (self.width as f64 * self.height as f64 * self.walls_factor).round() as usize;
        if amount == 0 {
            return;
        }
        let mut cells = grid.find_cells_by_mark(Mark::Unvisited);
        for _ in 0..amount {
            if cells.len() <= 1 {
                break;
            }
            let idx = rng.gen_range(0..cells.len());
            let cell = cells.swap_remove(idx);
            grid.set(cell, Mark::Wall);
        }
    }
}

/// Carves from `start` and returns the last room newly reached, which is the
/// finish cell. `None` when the start room has nowhere to go.
fn carve(grid: &mut Grid, start: Cell, rng: &mut impl Rng) -> Option<Cell> {
    let mut finish = None;
    grid.set(start, Mark::Path);
    let mut stack = vec![Frame {
        cell: start,
        candidates: unvisited_neighbours(grid, start),
    }];

    while let Some(frame) = stack.last_mut() {
        if frame.candidates.is_empty() {
            stack.pop();
            continue;
        }
        let idx = rng.gen_range(0..frame.candidates.len());
        let chosen = frame.candidates.swap_remove(idx);
        if grid.at(chosen) != Mark::Unvisited {
            continue;
        }

        finish = Some(chosen);
        grid.set(seam_between(frame.cell, chosen), Mark::Path);
        grid.set(chosen, Mark::Path);
        let candidates = unvisited_neighbours(grid, chosen);
        stack.push(Frame {
            cell: chosen,
            candidates,
        });
    }
    finish
}

/// Rooms two steps away (left, right, up, down) that are still unvisited.
fn unvisited_neighbours(grid: &Grid, cell: Cell) -> Vec<Cell> {
    let mut neighbours = Vec::with_capacity(4);
    for dir in Direction::PRIORITY {
        let Some(next) = cell.offset(dir, 2) else {
            continue;
        };
        if grid.is_outer_wall(next) {
            continue;
        }
        if grid.at(next) == Mark::Unvisited {
            neighbours.push(next);
        }
    }
    neighbours
}

fn seam_between(a: Cell, b: Cell) -> Cell {
    Cell::new((a.x + b.x) / 2, (a.y + b.y) / 2)
}
