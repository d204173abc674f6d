use std::collections::VecDeque;

use grid_2048::{Board, Direction};
use rand::{seq::SliceRandom, Rng};

use crate::shift;

/// A source of directional input. Returning `None` ends the game from the player's side.
pub trait Player {
    fn next_move(&mut self, board: &Board) -> Option<Direction>;
}

/// Picks uniformly among the directions that would change the board.
pub struct RandomPlayer<R> {
    rng: R,
}

impl<R> Player for RandomPlayer<R>
where
    R: Rng,
{
    fn next_move(&mut self, board: &Board) -> Option<Direction> {
        let moves: Vec<_> = Direction::iter()
            .filter(|&direction| shift::would_move(board, direction))
            .collect();

        moves.choose(&mut self.rng).copied()
    }
}

impl<R> RandomPlayer<R>
where
    R: Rng,
{
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ScriptedPlayer {
    moves: VecDeque<Direction>,
}

impl ScriptedPlayer {
    pub fn new(moves: impl IntoIterator<Item = Direction>) -> Self {
        Self {
            moves: moves.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.moves.len()
    }
}

impl Player for ScriptedPlayer {
    fn next_move(&mut self, _board: &Board) -> Option<Direction> {
        self.moves.pop_front()
    }
}
