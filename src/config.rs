pub const DEFAULT_MAZE_W: usize = 31;
pub const DEFAULT_MAZE_H: usize = 21;
pub const DEFAULT_TICK_RATE: u64 = 60;
pub const MONSTER_MOVE_INTERVAL: u32 = 30;
pub const ROBOT_STEP: f32 = 0.5;

/// Tunables of a game session.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub maze_width: usize,
    pub maze_height: usize,
    /// Fraction of the maze area turned into extra walls before carving.
    pub walls_factor: f64,
    /// Doors per level; the first one sits on the maze finish cell.
    pub doors: usize,
    /// Ticks between two real monster moves.
    pub monster_move_interval: u32,
    /// Simulation steps per second.
    pub tick_rate: u64,
    pub robot_step: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            maze_width: DEFAULT_MAZE_W,
            maze_height: DEFAULT_MAZE_H,
            walls_factor: 0.0,
            doors: 1,
            monster_move_interval: MONSTER_MOVE_INTERVAL,
            tick_rate: DEFAULT_TICK_RATE,
            robot_step: ROBOT_STEP,
        }
    }
}

impl GameConfig {
    pub fn with_maze_size(mut self, width: usize, height: usize) -> Self {
        self.maze_width = width;
        self.maze_height = height;
        self
    }
}
