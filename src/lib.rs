//! Simulation core of "The Way", a maze chase: collect every coin, the exit
//! door shows up, reach it before a monster reaches you. Rams let the robot
//! break through inner walls.

pub mod components;
pub mod config;
pub mod error;
pub mod game;
pub mod generator;
pub mod level;
pub mod maze;
pub mod monster;
pub mod player;

pub use components::{Action, Cell, Direction, Mark, Position, Status};
pub use config::GameConfig;
pub use error::MazeError;
pub use game::{Flow, Game};
pub use generator::MazeGenerator;
pub use level::{Level, Levels};
pub use maze::Grid;
pub use monster::Monster;
pub use player::Robot;
