//! Grid primitives for a sliding-block puzzle: cells, directions, blocks and the board that
//! owns them.

pub mod block;
pub mod board;
pub mod direction;
pub mod error;

pub use block::{Block, BlockId, MAX_VALUE};
pub use board::{Board, Cell};
pub use direction::Direction;
pub use error::GridError;
