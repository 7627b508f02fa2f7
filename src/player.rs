use log::{debug, info};

use crate::components::{Cell, Direction, Mark, Position, Status};
use crate::config::ROBOT_STEP;
use crate::error::MazeError;
use crate::maze::Grid;

/// The player-controlled robot.
///
/// Each direction has its own press flag, so diagonal moves happen when two
/// keys are held. Movement is recomputed after every input event.
#[derive(Debug, Clone)]
pub struct Robot {
    position: Position,
    rams: u32,
    pub coins: u32,
    pub status: Status,
    pressed: [bool; 4],
    step: f32,
}

impl Robot {
    pub fn new(cell: Cell, rams: u32, coins: u32) -> Self {
        Self {
            position: cell.into(),
            rams,
            coins,
            status: Status::None,
            pressed: [false; 4],
            step: ROBOT_STEP,
        }
    }

    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn cell(&self) -> Result<Cell, MazeError> {
        self.position.cell()
    }

    pub fn rams(&self) -> u32 {
        self.rams
    }

    pub fn is_pressed(&self, dir: Direction) -> bool {
        self.pressed[dir.index()]
    }

    pub fn press(&mut self, grid: &mut Grid, dir: Direction) -> Result<(), MazeError> {
        self.pressed[dir.index()] = true;
        self.move_robot(grid)
    }

    pub fn release(&mut self, grid: &mut Grid, dir: Direction) -> Result<(), MazeError> {
        self.pressed[dir.index()] = false;
        self.move_robot(grid)
    }

    pub fn break_wall(&mut self, grid: &mut Grid) -> Result<(), MazeError> {
        self.ram(grid)?;
        self.move_robot(grid)
    }

    /// Rams the cell next to the robot in the first pressed direction (left,
    /// right, up, down) that does not face the outer wall. Costs one ram
    /// whatever the cell holds; the used direction is released so a held key
    /// rams only once. Only a `Wall` turns into `Path`, other marks are kept.
    fn ram(&mut self, grid: &mut Grid) -> Result<(), MazeError> {
        if self.rams == 0 {
            return Ok(());
        }

        let mut target = None;
        for dir in Direction::PRIORITY {
            if !self.is_pressed(dir) {
                continue;
            }
            let Ok(cell) = self.position.shifted(dir, 1.0).cell() else {
                continue;
            };
            if grid.is_outer_wall(cell) {
                continue;
            }
            self.pressed[dir.index()] = false;
            target = Some(cell);
            break;
        }

        let Some(cell) = target else {
            return Ok(());
        };
        self.rams -= 1;
        if grid.get_mark(cell)? == Mark::Wall {
            grid.mark_cell(cell, Mark::Path)?;
            debug!("robot broke the wall at {cell}, {} rams left", self.rams);
        } else {
            debug!("robot rammed open ground at {cell}, {} rams left", self.rams);
        }
        Ok(())
    }

    /// Steps along every pressed direction at once. Walls stop the move,
    /// coins are collected and the door passes the level.
    pub fn move_robot(&mut self, grid: &mut Grid) -> Result<(), MazeError> {
        if self.status.is_terminal() {
            return Ok(());
        }

        let mut target = self.position;
        for dir in Direction::PRIORITY {
            if self.is_pressed(dir) {
                target = target.shifted(dir, self.step);
            }
        }
        if target == self.position {
            return Ok(());
        }

        let target_cell = target.cell()?;
        match grid.get_mark(target_cell)? {
            Mark::Wall => return Ok(()),
            // Walking into a monster only blocks the move; the game ends
            // when the monster reaches the robot.
            Mark::Monster => return Ok(()),
            Mark::Coin => self.coins += 1,
            Mark::Door => {
                info!("robot reached the door at {target_cell}");
                self.status = Status::Passed;
            }
            Mark::Path | Mark::Robot | Mark::Unvisited => {}
        }

        grid.mark_cell(self.position.cell()?, Mark::Path)?;
        grid.mark_cell(target_cell, Mark::Robot)?;
        self.position = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(text: &str, rams: u32) -> (Grid, Robot) {
        let grid: Grid = text.parse().unwrap();
        let robot = Robot::new(grid.start_cell(), rams, 0);
        (grid, robot)
    }

    #[test]
    fn half_steps_cross_into_the_next_cell() {
        let (mut grid, mut robot) = setup(
            "
            11111
            16221
            11111
        ",
            0,
        );
        robot.press(&mut grid, Direction::Right).unwrap();
        assert_eq!(robot.position(), Position::new(1.5, 1.0));
        assert_eq!(grid.get_mark(Cell::new(1, 1)).unwrap(), Mark::Robot);
        robot.move_robot(&mut grid).unwrap();
        assert_eq!(robot.position(), Position::new(2.0, 1.0));
        assert_eq!(grid.get_mark(Cell::new(1, 1)).unwrap(), Mark::Path);
        assert_eq!(grid.get_mark(Cell::new(2, 1)).unwrap(), Mark::Robot);
    }

    #[test]
    fn walls_reject_the_move() {
        let (mut grid, mut robot) = setup(
            "
            11111
            16121
            11111
        ",
            0,
        );
        robot.press(&mut grid, Direction::Right).unwrap();
        robot.move_robot(&mut grid).unwrap();
        assert_eq!(robot.position(), Position::new(1.5, 1.0));
        robot.press(&mut grid, Direction::Left).unwrap();
        robot.release(&mut grid, Direction::Right).unwrap();
        assert_eq!(robot.position(), Position::new(1.0, 1.0));
        robot.move_robot(&mut grid).unwrap();
        assert_eq!(robot.position(), Position::new(1.0, 1.0));
    }

    #[test]
    fn diagonal_combines_both_axes() {
        let (mut grid, mut robot) = setup(
            "
            11111
            16221
            12221
            12221
            11111
        ",
            0,
        );
        robot.press(&mut grid, Direction::Right).unwrap();
        robot.press(&mut grid, Direction::Down).unwrap();
        assert_eq!(robot.position(), Position::new(2.0, 1.5));
        robot.move_robot(&mut grid).unwrap();
        assert_eq!(robot.position(), Position::new(2.5, 2.0));
        assert_eq!(grid.get_mark(Cell::new(2, 2)).unwrap(), Mark::Robot);
        assert_eq!(grid.find_cells_by_mark(Mark::Robot).len(), 1);
    }

    #[test]
    fn coins_are_collected_and_door_passes() {
        let (mut grid, mut robot) = setup(
            "
            1111111
            1633421
            1111111
        ",
            0,
        );
        robot.press(&mut grid, Direction::Right).unwrap();
        for _ in 0..3 {
            robot.move_robot(&mut grid).unwrap();
        }
        assert_eq!(robot.coins, 2);
        assert_eq!(robot.status, Status::None);
        assert!(!grid.contains_mark(Mark::Coin));
        robot.move_robot(&mut grid).unwrap();
        robot.move_robot(&mut grid).unwrap();
        assert_eq!(robot.status, Status::Passed);
        assert_eq!(grid.get_mark(Cell::new(4, 1)).unwrap(), Mark::Robot);

        robot.move_robot(&mut grid).unwrap();
        assert_eq!(robot.position(), Position::new(4.0, 1.0));
    }

    #[test]
    fn monster_blocks_without_ending_the_game() {
        let (mut grid, mut robot) = setup(
            "
            11111
            16521
            11111
        ",
            0,
        );
        robot.press(&mut grid, Direction::Right).unwrap();
        robot.move_robot(&mut grid).unwrap();
        assert_eq!(robot.position(), Position::new(1.5, 1.0));
        assert_eq!(robot.status, Status::None);
        assert_eq!(grid.get_mark(Cell::new(2, 1)).unwrap(), Mark::Monster);
    }

    #[test]
    fn rams_break_two_walls_then_run_out() {
        let (mut grid, mut robot) = setup(
            "
            1111111
            1116221
            1111111
        ",
            2,
        );
        assert_eq!(robot.cell().unwrap(), Cell::new(3, 1));

        robot.press(&mut grid, Direction::Left).unwrap();
        assert_eq!(robot.position(), Position::new(3.0, 1.0));
        robot.break_wall(&mut grid).unwrap();
        assert_eq!(robot.rams(), 1);
        assert_eq!(grid.get_mark(Cell::new(2, 1)).unwrap(), Mark::Path);
        assert!(!robot.is_pressed(Direction::Left));
        assert_eq!(robot.position(), Position::new(3.0, 1.0));

        robot.press(&mut grid, Direction::Left).unwrap();
        assert_eq!(robot.position(), Position::new(2.5, 1.0));
        robot.break_wall(&mut grid).unwrap();
        assert_eq!(robot.rams(), 0);
        assert_eq!(grid.get_mark(Cell::new(1, 1)).unwrap(), Mark::Path);

        robot.press(&mut grid, Direction::Left).unwrap();
        robot.break_wall(&mut grid).unwrap();
        assert_eq!(robot.rams(), 0);
        assert!(robot.is_pressed(Direction::Left));
        assert_eq!(grid.find_cells_by_mark(Mark::Wall).len(), 16);
    }

    #[test]
    fn ramming_open_ground_still_costs_a_ram() {
        let (mut grid, mut robot) = setup(
            "
            1111111
            1622221
            1111111
        ",
            2,
        );
        robot.pressed[Direction::Right.index()] = true;
        robot.ram(&mut grid).unwrap();
        assert_eq!(robot.rams(), 1);
        assert!(!robot.is_pressed(Direction::Right));
        assert_eq!(grid.get_mark(Cell::new(2, 1)).unwrap(), Mark::Path);
    }

    #[test]
    fn ramming_a_coin_keeps_the_coin() {
        let (mut grid, mut robot) = setup(
            "
            11111
            16321
            11111
        ",
            1,
        );
        robot.pressed[Direction::Right.index()] = true;
        robot.ram(&mut grid).unwrap();
        assert_eq!(robot.rams(), 0);
        assert_eq!(grid.get_mark(Cell::new(2, 1)).unwrap(), Mark::Coin);
    }

    #[test]
    fn outer_wall_cannot_be_broken() {
        let (mut grid, mut robot) = setup(
            "
            11111
            16121
            11111
        ",
            3,
        );
        robot.pressed[Direction::Left.index()] = true;
        robot.pressed[Direction::Up.index()] = true;
        robot.break_wall(&mut grid).unwrap();
        assert_eq!(robot.rams(), 3);
        assert!(robot.is_pressed(Direction::Left));

        robot.pressed[Direction::Right.index()] = true;
        robot.break_wall(&mut grid).unwrap();
        assert_eq!(robot.rams(), 2);
        assert_eq!(grid.get_mark(Cell::new(2, 1)).unwrap(), Mark::Path);
        assert!(!robot.is_pressed(Direction::Right));
    }

    #[test]
    fn no_movement_after_level_is_decided() {
        let (mut grid, mut robot) = setup(
            "
            11111
            16221
            11111
        ",
            0,
        );
        robot.status = Status::GameOver;
        robot.press(&mut grid, Direction::Right).unwrap();
        assert_eq!(robot.position(), Position::new(1.0, 1.0));
    }
}
