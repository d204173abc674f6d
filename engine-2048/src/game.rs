use grid_2048::{Block, Board, Direction};
use rand::Rng;

use crate::{
    config::{GameConfig, LossRule, INITIAL_SPAWN_COUNT, TURN_SPAWN_COUNT},
    error::GameError,
    factory::BlockFactory,
    player::Player,
    shift::{self, MoveResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameState {
    GeneratingGrid,
    SpawningBlocks,
    WaitingForInput,
    ResolvingMove,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    GridGenerated { width: usize, height: usize },
    Spawned(Vec<Block>),
    AwaitingInput,
    Resolved(MoveResult),
    Finished(GameState),
}

/// The game state machine. Owns the board exclusively; every transition runs to completion
/// before the next one starts.
pub struct GameLoop<R> {
    config: GameConfig,
    factory: BlockFactory,
    rng: R,
    board: Board,
    state: GameState,
    pending: Option<Direction>,
    first_spawn: bool,
    score: u64,
    move_count: u32,
}

impl<R: Rng> GameLoop<R> {
    pub fn new(config: GameConfig, rng: R) -> Result<Self, GameError> {
        config.validate()?;

        Ok(Self {
            factory: BlockFactory::new(config.four_probability)?,
            board: Board::new(config.width, config.height)?,
            config,
            rng,
            state: GameState::GeneratingGrid,
            pending: None,
            first_spawn: true,
            score: 0,
            move_count: 0,
        })
    }

    /// Resumes from an existing board. The board's dimensions replace the configured ones and
    /// the game enters `SpawningBlocks` as a later, single-block spawn.
    pub fn with_board(mut config: GameConfig, board: Board, rng: R) -> Result<Self, GameError> {
        config.width = board.width();
        config.height = board.height();
        config.validate()?;
        board.check_consistency()?;

        Ok(Self {
            factory: BlockFactory::new(config.four_probability)?,
            board,
            config,
            rng,
            state: GameState::SpawningBlocks,
            pending: None,
            first_spawn: false,
            score: 0,
            move_count: 0,
        })
    }

    pub const fn state(&self) -> GameState {
        self.state
    }

    pub const fn board(&self) -> &Board {
        &self.board
    }

    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    pub const fn score(&self) -> u64 {
        self.score
    }

    pub const fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Queues a direction for resolution. Only accepted while waiting for input, and only once
    /// per wait; returns whether the input was taken.
    pub fn submit_input(&mut self, direction: Direction) -> bool {
        if self.state != GameState::WaitingForInput {
            log::debug!("ignoring {direction} input in state {:?}", self.state);
            return false;
        }

        self.pending = Some(direction);
        self.transition(GameState::ResolvingMove);

        true
    }

    pub fn step(&mut self) -> Result<Step, GameError> {
        match self.state {
            GameState::GeneratingGrid => {
                // The empty grid is allocated by `new`, which also validates its size.
                let (width, height) = (self.board.width(), self.board.height());

                self.transition(GameState::SpawningBlocks);

                Ok(Step::GridGenerated { width, height })
            }
            GameState::SpawningBlocks => {
                let count = if self.first_spawn {
                    INITIAL_SPAWN_COUNT
                } else {
                    TURN_SPAWN_COUNT
                };
                self.first_spawn = false;

                let spawned = self.factory.spawn(&mut self.board, count, &mut self.rng)?;

                if self.reached_win_value() {
                    self.transition(GameState::Won);
                    return Ok(Step::Spawned(spawned));
                }

                let lost = match self.config.loss_rule {
                    LossRule::FreeCells => self.board.free_cell_count() <= 1,
                    LossRule::NoMovesLeft => !shift::can_move(&self.board),
                };

                if lost {
                    self.transition(GameState::Lost);
                } else {
                    self.transition(GameState::WaitingForInput);
                }

                Ok(Step::Spawned(spawned))
            }
            GameState::WaitingForInput => Ok(Step::AwaitingInput),
            GameState::ResolvingMove => {
                let Some(direction) = self.pending.take() else {
                    self.transition(GameState::WaitingForInput);
                    return Ok(Step::AwaitingInput);
                };

                let result = shift::resolve(&mut self.board, direction)?;
                self.score += result.score;

                if result.moved {
                    self.move_count += 1;
                }

                if self.reached_win_value() {
                    self.transition(GameState::Won);
                } else if result.moved || self.config.spawn_on_noop {
                    self.transition(GameState::SpawningBlocks);
                } else {
                    self.transition(GameState::WaitingForInput);
                }

                Ok(Step::Resolved(result))
            }
            state @ (GameState::Won | GameState::Lost) => Ok(Step::Finished(state)),
        }
    }

    pub fn advance(&mut self) -> Result<Vec<Step>, GameError> {
        let mut steps = Vec::new();

        while self.state != GameState::WaitingForInput && !self.state.is_terminal() {
            steps.push(self.step()?);
        }

        Ok(steps)
    }

    /// Submits `direction` and advances to the next wait. Returns `None` if the input was not
    /// accepted.
    pub fn play(&mut self, direction: Direction) -> Result<Option<MoveResult>, GameError> {
        if !self.submit_input(direction) {
            return Ok(None);
        }

        let steps = self.advance()?;

        Ok(steps.into_iter().find_map(|step| match step {
            Step::Resolved(result) => Some(result),
            _ => None,
        }))
    }

    pub fn run_with(&mut self, player: &mut impl Player) -> Result<GameState, GameError> {
        self.advance()?;

        while self.state == GameState::WaitingForInput {
            let Some(direction) = player.next_move(&self.board) else {
                break;
            };

            self.play(direction)?;
        }

        Ok(self.state)
    }

    fn reached_win_value(&self) -> bool {
        match (self.config.win_value, self.board.max_value()) {
            (Some(target), Some(max)) => max >= target,
            _ => false,
        }
    }

    fn transition(&mut self, next: GameState) {
        if next == GameState::WaitingForInput {
            debug_assert_eq!(self.board.check_consistency(), Ok(()));
        }

        if next.is_terminal() {
            log::info!(
                "game {}: score {}, {} moves, best block {}",
                if next == GameState::Won { "won" } else { "lost" },
                self.score,
                self.move_count,
                self.board.max_value().unwrap_or(0)
            );
        } else {
            log::debug!("{:?} -> {next:?}", self.state);
        }

        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn movable_direction(board: &Board) -> Direction {
        Direction::iter()
            .find(|&direction| shift::would_move(board, direction))
            .unwrap()
    }

    #[test]
    fn first_spawn_seeds_two_blocks() {
        let mut game = GameLoop::new(GameConfig::default(), rng()).unwrap();
        assert_eq!(game.state(), GameState::GeneratingGrid);

        let steps = game.advance().unwrap();

        assert_eq!(
            steps[0],
            Step::GridGenerated {
                width: 4,
                height: 4
            }
        );
        assert!(matches!(&steps[1], Step::Spawned(blocks) if blocks.len() == 2));
        assert_eq!(steps.len(), 2);
        assert_eq!(game.state(), GameState::WaitingForInput);
        assert_eq!(game.board().block_count(), 2);
    }

    #[test]
    fn later_spawns_add_one_block() {
        let mut game = GameLoop::new(GameConfig::default(), rng()).unwrap();
        game.advance().unwrap();

        let direction = movable_direction(game.board());
        let before = game.board().block_count();

        let result = game.play(direction).unwrap().unwrap();

        assert!(result.moved);
        assert_eq!(
            game.board().block_count(),
            before - result.merges.len() + 1
        );
        assert_eq!(game.move_count(), 1);
    }

    #[test]
    fn input_is_ignored_outside_waiting_state() {
        let mut game = GameLoop::new(GameConfig::default(), rng()).unwrap();

        assert!(!game.submit_input(Direction::Left));
        assert_eq!(game.play(Direction::Left).unwrap(), None);
        assert_eq!(game.state(), GameState::GeneratingGrid);
    }

    #[test]
    fn only_one_input_is_taken_per_wait() {
        let mut game = GameLoop::new(GameConfig::default(), rng()).unwrap();
        game.advance().unwrap();

        assert!(game.submit_input(Direction::Up));
        assert!(!game.submit_input(Direction::Down));
        assert_eq!(game.state(), GameState::ResolvingMove);
    }

    #[test]
    fn noop_shift_does_not_spawn_by_default() {
        let board = Board::from_rows(&[[2u32, 4, 0, 0, 0]]).unwrap();
        let mut game = GameLoop::with_board(GameConfig::default(), board, rng()).unwrap();
        game.advance().unwrap();
        assert_eq!(game.board().block_count(), 3);

        let before = game.board().clone();
        let result = game.play(Direction::Up).unwrap().unwrap();

        assert!(!result.moved);
        assert_eq!(game.state(), GameState::WaitingForInput);
        assert_eq!(game.board(), &before);
        assert_eq!(game.move_count(), 0);
    }

    #[test]
    fn noop_shift_spawns_when_configured() {
        let config = GameConfig {
            spawn_on_noop: true,
            ..GameConfig::default()
        };
        let board = Board::from_rows(&[[2u32, 4, 0, 0, 0, 0]]).unwrap();
        let mut game = GameLoop::with_board(config, board, rng()).unwrap();
        game.advance().unwrap();
        assert_eq!(game.board().block_count(), 3);

        let result = game.play(Direction::Down).unwrap().unwrap();

        assert!(!result.moved);
        assert_eq!(game.board().block_count(), 4);
    }

    #[test]
    fn full_board_without_pairs_is_lost() {
        let board = Board::from_rows(&[[2u32, 4, 2], [4, 2, 4], [2, 4, 2]]).unwrap();
        let mut game = GameLoop::with_board(GameConfig::default(), board, rng()).unwrap();

        assert_eq!(game.step().unwrap(), Step::Spawned(Vec::new()));
        assert_eq!(game.state(), GameState::Lost);
        assert_eq!(game.step().unwrap(), Step::Finished(GameState::Lost));
        assert!(!game.submit_input(Direction::Left));
    }

    #[test]
    fn single_free_cell_after_spawn_is_lost() {
        let board = Board::from_rows(&[[2u32, 4, 0], [4, 2, 0]]).unwrap();
        let mut game = GameLoop::with_board(GameConfig::default(), board, rng()).unwrap();

        game.advance().unwrap();

        assert_eq!(game.board().free_cell_count(), 1);
        assert_eq!(game.state(), GameState::Lost);
    }

    #[test]
    fn no_moves_rule_keeps_playing_while_merges_remain() {
        let config = GameConfig {
            four_probability: 0.0,
            loss_rule: LossRule::NoMovesLeft,
            ..GameConfig::default()
        };
        let board = Board::from_rows(&[[2u32, 2], [8, 0]]).unwrap();
        let mut game = GameLoop::with_board(config, board, rng()).unwrap();

        game.advance().unwrap();

        assert!(game.board().is_full());
        assert_eq!(game.state(), GameState::WaitingForInput);
    }

    #[test]
    fn no_moves_rule_ends_a_locked_board() {
        let config = GameConfig {
            four_probability: 0.0,
            loss_rule: LossRule::NoMovesLeft,
            ..GameConfig::default()
        };
        let board = Board::from_rows(&[[2u32, 4], [8, 0]]).unwrap();
        let mut game = GameLoop::with_board(config, board, rng()).unwrap();

        game.advance().unwrap();

        assert_eq!(game.state(), GameState::Lost);
    }

    #[test]
    fn reaching_the_win_value_wins() {
        let board = Board::from_rows(&[
            [1024u32, 1024, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [2, 0, 0, 0],
        ])
        .unwrap();
        let mut game = GameLoop::with_board(GameConfig::default(), board, rng()).unwrap();
        game.advance().unwrap();

        let result = game.play(Direction::Left).unwrap().unwrap();

        assert!(result.merges.iter().any(|merge| merge.value == 2048));
        assert_eq!(game.state(), GameState::Won);
        assert!(game.score() >= 2048);
        assert!(!game.submit_input(Direction::Right));
    }

    #[test]
    fn spawned_block_at_the_win_value_wins() {
        let config = GameConfig {
            win_value: Some(4),
            four_probability: 1.0,
            ..GameConfig::default()
        };
        let mut game = GameLoop::new(config, rng()).unwrap();

        let steps = game.advance().unwrap();

        assert!(matches!(steps.last(), Some(Step::Spawned(blocks)) if blocks.len() == 2));
        assert_eq!(game.board().max_value(), Some(4));
        assert_eq!(game.state(), GameState::Won);
    }

    #[test]
    fn resumed_board_holding_the_win_value_wins() {
        let board = Board::from_rows(&[[2048u32, 0, 0, 0], [0, 0, 0, 0]]).unwrap();
        let mut game = GameLoop::with_board(GameConfig::default(), board, rng()).unwrap();

        game.advance().unwrap();

        assert_eq!(game.state(), GameState::Won);
        assert!(!game.submit_input(Direction::Down));
    }

    #[test]
    fn winning_can_be_disabled() {
        let config = GameConfig {
            win_value: None,
            ..GameConfig::default()
        };
        let board = Board::from_rows(&[[1024u32, 1024, 0, 0]; 2]).unwrap();
        let mut game = GameLoop::with_board(config, board, rng()).unwrap();
        game.advance().unwrap();

        game.play(Direction::Left).unwrap();

        assert_eq!(game.state(), GameState::WaitingForInput);
    }

    #[test]
    fn rejects_invalid_configuration() {
        let config = GameConfig {
            height: 0,
            ..GameConfig::default()
        };

        assert!(matches!(
            GameLoop::new(config, rng()),
            Err(GameError::InvalidConfig(_))
        ));
    }
}
