//! Turn-based game logic for a sliding-block puzzle: spawning, shift resolution and the game
//! state machine, independent of any renderer or input device.

pub use grid_2048::{Block, BlockId, Board, Cell, Direction, GridError};

pub mod config;
pub mod error;
pub mod factory;
pub mod game;
pub mod player;
pub mod shift;

pub use config::{GameConfig, LossRule};
pub use error::GameError;
pub use factory::BlockFactory;
pub use game::{GameLoop, GameState, Step};
pub use player::{Player, RandomPlayer, ScriptedPlayer};
pub use shift::{BlockMove, Merge, MoveResult};
