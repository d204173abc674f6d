use grid_2048::{Block, Board, Cell, GridError};
use rand::{seq::SliceRandom, Rng};

use crate::{config::DEFAULT_FOUR_PROBABILITY, error::GameError};

/// Places new blocks on free cells. Values are 4 with a configurable probability, else 2.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockFactory {
    four_probability: f64,
}

impl Default for BlockFactory {
    fn default() -> Self {
        Self {
            four_probability: DEFAULT_FOUR_PROBABILITY,
        }
    }
}

impl BlockFactory {
    pub fn new(four_probability: f64) -> Result<Self, GameError> {
        if (0.0..=1.0).contains(&four_probability) {
            Ok(Self { four_probability })
        } else {
            Err(GameError::InvalidConfig(format!(
                "four_probability must lie in [0, 1], got {four_probability}"
            )))
        }
    }

    pub const fn four_probability(&self) -> f64 {
        self.four_probability
    }

    pub fn draw_value(&self, rng: &mut impl Rng) -> u32 {
        if rng.gen_bool(self.four_probability) {
            4
        } else {
            2
        }
    }

    /// Spawns up to `count` blocks on distinct free cells chosen uniformly at random. Spawns
    /// fewer when the board has fewer free cells.
    pub fn spawn(
        &self,
        board: &mut Board,
        count: usize,
        rng: &mut impl Rng,
    ) -> Result<Vec<Block>, GridError> {
        let free_cells = board.free_cells();
        let cells: Vec<Cell> = free_cells.choose_multiple(rng, count).copied().collect();

        cells
            .into_iter()
            .map(|cell| -> Result<Block, GridError> {
                let value = self.draw_value(rng);
                let id = board.insert_block(cell, value)?;

                log::trace!("spawned block {id} with value {value} at {cell}");

                Ok(Block::new(id, value, cell))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn rejects_probabilities_outside_unit_interval() {
        assert!(BlockFactory::new(-0.1).is_err());
        assert!(BlockFactory::new(1.01).is_err());
        assert!(BlockFactory::new(1.0).is_ok());
    }

    #[test]
    fn spawns_requested_count_on_distinct_free_cells() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut board = Board::new(4, 4).unwrap();

        let spawned = BlockFactory::default().spawn(&mut board, 3, &mut rng).unwrap();

        assert_eq!(spawned.len(), 3);
        assert_eq!(board.block_count(), 3);
        assert_eq!(board.free_cell_count(), 13);

        for block in &spawned {
            assert!(block.value == 2 || block.value == 4);
            assert_eq!(board.occupant(block.cell).unwrap(), Some(block));
        }
        assert!(board.check_consistency().is_ok());
    }

    #[test]
    fn spawns_only_as_many_as_fit() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut board = Board::from_rows(&[[2u32, 0], [0, 4]]).unwrap();

        let spawned = BlockFactory::default().spawn(&mut board, 5, &mut rng).unwrap();

        assert_eq!(spawned.len(), 2);
        assert!(board.is_full());
        assert!(BlockFactory::default()
            .spawn(&mut board, 1, &mut rng)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn extreme_probabilities_fix_the_value() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let twos = BlockFactory::new(0.0).unwrap();
        let fours = BlockFactory::new(1.0).unwrap();

        assert!((0..100).all(|_| twos.draw_value(&mut rng) == 2));
        assert!((0..100).all(|_| fours.draw_value(&mut rng) == 4));
    }

    #[test]
    fn default_ratio_is_one_four_in_five() {
        let mut rng = ChaCha8Rng::seed_from_u64(2048);
        let factory = BlockFactory::default();

        let fours = (0..20_000)
            .filter(|_| factory.draw_value(&mut rng) == 4)
            .count();

        assert!((3_600..4_400).contains(&fours), "{fours}");
    }
}
