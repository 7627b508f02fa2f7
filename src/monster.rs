//! Autonomous monsters wandering the maze.
//!
//! A monster walks randomly at crossings but remembers where it has been
//! (`visited_cells`) and which cells led nowhere (`closed_cells`), so it keeps
//! pushing into unexplored corridors. Coins and doors it steps on are kept in
//! `covering` and written back once it moves on.

use std::collections::{HashMap, HashSet};

use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{Cell, Mark, Status};
use crate::config::MONSTER_MOVE_INTERVAL;
use crate::error::MazeError;
use crate::maze::Grid;

#[derive(Debug, Clone)]
pub struct Monster {
    cell: Cell,
    pub status: Status,
    closed_cells: HashSet<Cell>,
    visited_cells: HashSet<Cell>,
    covering: HashMap<Cell, Mark>,
    move_interval: u32,
    cycles: u32,
}

impl Monster {
    pub fn new(cell: Cell) -> Self {
        Self::with_interval(cell, MONSTER_MOVE_INTERVAL)
    }

    /// A monster that really moves once every `move_interval` ticks.
    pub fn with_interval(cell: Cell, move_interval: u32) -> Self {
        Self {
            cell,
            status: Status::None,
            closed_cells: HashSet::new(),
            visited_cells: HashSet::new(),
            covering: HashMap::new(),
            move_interval: move_interval.max(1),
            cycles: 0,
        }
    }

    pub fn cell(&self) -> Cell {
        self.cell
    }

    /// Cells whose true mark is hidden under this monster.
    pub fn covering(&self) -> &HashMap<Cell, Mark> {
        &self.covering
    }

    pub fn covers(&self, mark: Mark) -> bool {
        self.covering.values().any(|m| *m == mark)
    }

    /// Called once per tick; moves at most once per throttle window.
    pub fn advance(&mut self, grid: &mut Grid, rng: &mut impl Rng) -> Result<(), MazeError> {
        if self.status.is_terminal() {
            return Ok(());
        }

        self.cycles += 1;
        if self.cycles < self.move_interval {
            return Ok(());
        }
        self.cycles = 0;

        let target = self.track(grid, rng)?;
        let target_mark = grid.get_mark(target)?;
        match target_mark {
            Mark::Robot => {
                trace!("monster at {} caught the robot at {target}", self.cell);
                self.status = Status::GameOver;
                return Ok(());
            }
            Mark::Coin | Mark::Door => {
                self.covering.insert(target, target_mark);
            }
            Mark::Path => {}
            Mark::Monster | Mark::Wall | Mark::Unvisited => {
                trace!("monster at {} stays put", self.cell);
                return Ok(());
            }
        }

        grid.mark_cell(self.cell, Mark::Path)?;
        grid.mark_cell(target, Mark::Monster)?;
        trace!("monster moved {} -> {target}", self.cell);
        self.cell = target;
        self.restore_covered(grid)
    }

    /// Writes back the true mark of every covered cell this monster has left.
    fn restore_covered(&mut self, grid: &mut Grid) -> Result<(), MazeError> {
        let current = self.cell;
        let left: Vec<(Cell, Mark)> = self
            .covering
            .iter()
            .filter(|(cell, _)| **cell != current)
            .map(|(cell, mark)| (*cell, *mark))
            .collect();
        for (cell, mark) in left {
            grid.mark_cell(cell, mark)?;
            self.covering.remove(&cell);
        }
        Ok(())
    }

    /// Neighbours the monster may step to: not a wall, not another monster,
    /// not known to be closed. Ordered right, left, down, up.
    fn available_paths(&self, grid: &Grid, cell: Cell) -> Result<Vec<Cell>, MazeError> {
        let mut paths = Vec::with_capacity(4);
        for next in grid.get_nearest(cell)? {
            if matches!(grid.get_mark(next)?, Mark::Wall | Mark::Monster) {
                continue;
            }
            if self.closed_cells.contains(&next) {
                continue;
            }
            paths.push(next);
        }
        Ok(paths)
    }

    fn is_closed_end(&self, grid: &Grid, cell: Cell) -> Result<bool, MazeError> {
        if grid.is_dead_end(cell)? {
            return Ok(true);
        }
        Ok(self.available_paths(grid, cell)?.len() <= 1)
    }

    /// Picks the next cell to step to. Returns the current cell when boxed in.
    fn track(&mut self, grid: &Grid, rng: &mut impl Rng) -> Result<Cell, MazeError> {
        let current = self.cell;

        if self.is_closed_end(grid, current)? {
            self.closed_cells.insert(current);
            let paths = self.available_paths(grid, current)?;
            return Ok(match paths.first() {
                Some(only) => *only,
                None => {
                    self.closed_cells.clear();
                    self.visited_cells.clear();
                    current
                }
            });
        }

        self.visited_cells.insert(current);
        let mut paths = self.available_paths(grid, current)?;
        if paths.is_empty() {
            self.closed_cells.clear();
            paths = self.available_paths(grid, current)?;
        }

        let fresh: Vec<Cell> = paths
            .iter()
            .copied()
            .filter(|c| !self.visited_cells.contains(c))
            .collect();
        let next = if let Some(cell) = fresh.choose(rng) {
            *cell
        } else {
            self.visited_cells.clear();
            match paths.choose(rng) {
                Some(cell) => *cell,
                None => current,
            }
        };
        Ok(next)
    }
}
