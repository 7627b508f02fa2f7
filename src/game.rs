//! One game session: the current level's grid and entities, the hidden
//! doors, and the status shared by every moving entity.
//!
//! Each tick first re-evaluates the doors, then advances every monster in
//! order. Input actions are applied one by one afterwards.

use log::{debug, info, warn};
use rand::Rng;

use crate::components::{Action, Cell, Mark, Status};
use crate::config::GameConfig;
use crate::error::MazeError;
use crate::generator::MazeGenerator;
use crate::level::{Level, LevelCursor, Levels};
use crate::maze::Grid;
use crate::monster::Monster;
use crate::player::Robot;

/// Whether the caller should keep running the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    levels: LevelCursor,
    grid: Grid,
    robot: Robot,
    monsters: Vec<Monster>,
    hidden_doors: Vec<Cell>,
    status: Status,
}

impl Game {
    /// Starts a session on the first level with a freshly generated maze.
    pub fn new(levels: Levels, config: GameConfig, rng: &mut impl Rng) -> Result<Self, MazeError> {
        let levels = levels.cursor();
        let grid = new_maze(&config, levels.current(), rng)?;
        Ok(Self::assemble(config, levels, grid))
    }

    /// Starts a session on the first level using a prepared grid. The robot
    /// starts on the grid's `Robot` mark and a monster sits on every
    /// `Monster` mark. Later levels and restarts generate mazes as usual.
    pub fn with_grid(levels: Levels, config: GameConfig, grid: Grid) -> Self {
        Self::assemble(config, levels.cursor(), grid)
    }

    fn assemble(config: GameConfig, levels: LevelCursor, grid: Grid) -> Self {
        let mut game = Self {
            robot: Robot::new(grid.start_cell(), 0, 0),
            config,
            levels,
            grid,
            monsters: Vec::new(),
            hidden_doors: Vec::new(),
            status: Status::None,
        };
        game.spawn_entities();
        game
    }

    fn spawn_entities(&mut self) {
        let level = self.levels.current();
        self.robot = Robot::new(self.grid.start_cell(), level.rams, 0)
            .with_step(self.config.robot_step);
        self.monsters = self
            .grid
            .find_cells_by_mark(Mark::Monster)
            .into_iter()
            .map(|cell| Monster::with_interval(cell, self.config.monster_move_interval))
            .collect();
        self.status = Status::None;
        self.hide_doors();
        debug!(
            "level {} ready: {} monsters, {} rams, {} hidden doors",
            level.level,
            self.monsters.len(),
            level.rams,
            self.hidden_doors.len()
        );
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn level(&self) -> Level {
        self.levels.current()
    }

    pub fn levels_total(&self) -> usize {
        self.levels.total()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    pub fn hidden_doors(&self) -> &[Cell] {
        &self.hidden_doors
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status == Status::GameOver
    }

    pub fn is_level_passed(&self) -> bool {
        self.status == Status::Passed
    }

    /// The last level has been passed.
    pub fn is_game_passed(&self) -> bool {
        self.is_level_passed() && self.levels.is_last()
    }

    /// One simulation step: doors first, then every monster in order.
    pub fn tick(&mut self, rng: &mut impl Rng) -> Result<(), MazeError> {
        self.process_doors()?;
        for monster in self.monsters.iter_mut() {
            monster.advance(&mut self.grid, rng)?;
        }
        self.sync_status();
        Ok(())
    }

    /// Applies one input action. `Exit` is reported back, never acted on.
    pub fn apply(&mut self, action: Action, rng: &mut impl Rng) -> Result<Flow, MazeError> {
        match action {
            Action::Press(dir) => self.robot.press(&mut self.grid, dir)?,
            Action::Release(dir) => self.robot.release(&mut self.grid, dir)?,
            Action::BreakWall => self.robot.break_wall(&mut self.grid)?,
            Action::Restart => self.restart(rng)?,
            Action::NextLevel => {
                self.next_level(rng)?;
            }
            Action::Exit => return Ok(Flow::Exit),
        }
        self.sync_status();
        Ok(Flow::Continue)
    }

    /// Rebuilds the current level from scratch.
    pub fn restart(&mut self, rng: &mut impl Rng) -> Result<(), MazeError> {
        info!("restarting level {}", self.level().level);
        self.grid = new_maze(&self.config, self.level(), rng)?;
        self.spawn_entities();
        Ok(())
    }

    /// Moves on once the current level is passed and it is not the last one.
    /// Returns whether the level changed.
    pub fn next_level(&mut self, rng: &mut impl Rng) -> Result<bool, MazeError> {
        if !self.is_level_passed() || self.is_game_passed() {
            return Ok(false);
        }
        self.set_status(Status::None);
        let Some(level) = self.levels.advance() else {
            return Ok(false);
        };
        info!("advancing to level {}", level.level);
        self.grid = new_maze(&self.config, level, rng)?;
        self.spawn_entities();
        Ok(true)
    }

    /// Remembers every door and replaces it with a path.
    fn hide_doors(&mut self) {
        self.hidden_doors = self.grid.find_cells_by_mark(Mark::Door);
        for cell in &self.hidden_doors {
            self.grid.set(*cell, Mark::Path);
        }
    }

    /// Reveals the hidden doors once no coin is left, neither on the grid nor
    /// under a monster. A door cell occupied by a monster or by the robot
    /// stays hidden until a later tick.
    pub fn process_doors(&mut self) -> Result<(), MazeError> {
        if self.hidden_doors.is_empty() || self.grid.contains_mark(Mark::Coin) {
            return Ok(());
        }
        if self.monsters.iter().any(|m| m.covers(Mark::Coin)) {
            return Ok(());
        }

        let mut still_hidden = Vec::new();
        for cell in self.hidden_doors.drain(..) {
            if self.grid.get_mark(cell)?.is_entity() {
                still_hidden.push(cell);
                continue;
            }
            self.grid.mark_cell(cell, Mark::Door)?;
            debug!("door revealed at {cell}");
        }
        self.hidden_doors = still_hidden;
        Ok(())
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
        self.robot.status = status;
        for monster in self.monsters.iter_mut() {
            monster.status = status;
        }
    }

    /// Spreads a terminal status from any entity to all of them; game over
    /// wins over passing.
    fn sync_status(&mut self) {
        let over = self.robot.status == Status::GameOver
            || self.monsters.iter().any(|m| m.status == Status::GameOver);
        let next = if over {
            Status::GameOver
        } else if self.robot.status == Status::Passed {
            Status::Passed
        } else {
            return;
        };
        if self.status != next {
            match next {
                Status::GameOver => info!("game over on level {}", self.level().level),
                Status::Passed if self.levels.is_last() => info!("game passed"),
                _ => info!("level {} passed", self.level().level),
            }
        }
        self.set_status(next);
    }
}

/// Generates a maze for `level` and places the robot, doors, monsters and
/// coins on it. Doors are still visible on the returned grid.
pub fn new_maze(config: &GameConfig, level: Level, rng: &mut impl Rng) -> Result<Grid, MazeError> {
    let generator = MazeGenerator::new(config.maze_width, config.maze_height, config.walls_factor)?;
    let mut grid = generator.generate(rng);

    grid.mark_cell(grid.start_cell(), Mark::Robot)?;

    let mut doors = config.doors;
    if doors > 0 {
        if let Some(finish) = grid.finish_cell() {
            grid.mark_cell(finish, Mark::Door)?;
            doors -= 1;
        }
    }
    scatter(&mut grid, Mark::Door, doors, rng);
    scatter(&mut grid, Mark::Monster, level.monsters as usize, rng);
    scatter(&mut grid, Mark::Coin, level.coins as usize, rng);
    Ok(grid)
}

/// Puts `mark` on `count` random path cells.
fn scatter(grid: &mut Grid, mark: Mark, count: usize, rng: &mut impl Rng) {
    for placed in 0..count {
        let Some(cell) = grid.pick_random_cell(Mark::Path, rng) else {
            warn!("no free path left, placed {placed} of {count} {mark:?}");
            return;
        };
        grid.set(cell, mark);
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::components::{Direction, Position};

    fn config() -> GameConfig {
        GameConfig {
            monster_move_interval: 1,
            ..GameConfig::default()
        }
    }

    #[test]
    fn new_maze_places_every_entity() {
        let mut rng = StdRng::seed_from_u64(11);
        let level = Level::numbered(3);
        let grid = new_maze(&GameConfig::default(), level, &mut rng).unwrap();
        assert_eq!(grid.get_mark(grid.start_cell()).unwrap(), Mark::Robot);
        assert_eq!(grid.get_mark(grid.finish_cell().unwrap()).unwrap(), Mark::Door);
        assert_eq!(grid.find_cells_by_mark(Mark::Robot).len(), 1);
        assert_eq!(grid.find_cells_by_mark(Mark::Door).len(), 1);
        assert_eq!(grid.find_cells_by_mark(Mark::Monster).len(), 3);
        assert_eq!(grid.find_cells_by_mark(Mark::Coin).len(), 30);
    }

    #[test]
    fn extra_doors_go_on_random_paths() {
        let mut rng = StdRng::seed_from_u64(12);
        let config = GameConfig {
            doors: 3,
            ..GameConfig::default()
        };
        let grid = new_maze(&config, Level::numbered(1), &mut rng).unwrap();
        assert_eq!(grid.find_cells_by_mark(Mark::Door).len(), 3);
    }

    #[test]
    fn placement_stops_when_the_maze_is_full() {
        let mut rng = StdRng::seed_from_u64(13);
        let config = GameConfig::default().with_maze_size(5, 5);
        let grid = new_maze(&config, Level::numbered(4), &mut rng).unwrap();
        assert!(!grid.contains_mark(Mark::Path));
        assert_eq!(grid.find_cells_by_mark(Mark::Robot).len(), 1);
    }

    #[test]
    fn bad_walls_factor_surfaces_from_new() {
        let mut rng = StdRng::seed_from_u64(14);
        let config = GameConfig {
            walls_factor: 2.0,
            ..GameConfig::default()
        };
        assert_eq!(
            Game::new(Levels::new(1), config, &mut rng).unwrap_err(),
            MazeError::WallsFactor(2.0)
        );
    }

    #[test]
    fn session_starts_with_doors_hidden() {
        let mut rng = StdRng::seed_from_u64(15);
        let game = Game::new(Levels::new(2), config(), &mut rng).unwrap();
        assert!(!game.grid().contains_mark(Mark::Door));
        assert_eq!(game.hidden_doors().len(), 1);
        assert_eq!(game.robot().rams(), 2);
        assert_eq!(game.robot().coins, 0);
        assert_eq!(game.monsters().len(), 1);
        assert_eq!(game.status(), Status::None);
    }

    #[test]
    fn exit_is_reported_to_the_caller() {
        let mut rng = StdRng::seed_from_u64(16);
        let mut game = Game::new(Levels::new(1), config(), &mut rng).unwrap();
        assert_eq!(game.apply(Action::Exit, &mut rng).unwrap(), Flow::Exit);
        assert_eq!(
            game.apply(Action::Press(Direction::Up), &mut rng).unwrap(),
            Flow::Continue
        );
    }

    #[test]
    fn robot_passing_spreads_to_monsters() {
        let grid: Grid = "
            1111111
            1642151
            1111111
        "
        .parse()
        .unwrap();
        let mut rng = StdRng::seed_from_u64(17);
        let mut game = Game::with_grid(Levels::new(2), config(), grid);
        game.tick(&mut rng).unwrap();
        assert_eq!(game.grid().get_mark(Cell::new(2, 1)).unwrap(), Mark::Door);

        game.apply(Action::Press(Direction::Right), &mut rng).unwrap();
        game.apply(Action::Press(Direction::Right), &mut rng).unwrap();
        assert!(game.is_level_passed());
        assert!(!game.is_game_passed());
        assert!(game.monsters().iter().all(|m| m.status == Status::Passed));
    }

    #[test]
    fn monster_catch_spreads_game_over() {
        let grid: Grid = "
            11111
            16511
            11111
        "
        .parse()
        .unwrap();
        let mut rng = StdRng::seed_from_u64(18);
        let mut game = Game::with_grid(Levels::new(1), config(), grid);
        game.tick(&mut rng).unwrap();
        assert!(game.is_game_over());
        assert_eq!(game.robot().status, Status::GameOver);

        game.apply(Action::Press(Direction::Right), &mut rng).unwrap();
        assert_eq!(game.robot().position(), Position::from(Cell::new(1, 1)));
    }
}
