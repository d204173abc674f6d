use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use engine_2048::{
    config::{DEFAULT_FOUR_PROBABILITY, DEFAULT_HEIGHT, DEFAULT_WIDTH, DEFAULT_WIN_VALUE},
    GameConfig, GameLoop, GameState, LossRule, Player, RandomPlayer,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

mod input;
mod render;

use input::TerminalInput;
use render::TerminalRenderer;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LossRuleArg {
    FreeCells,
    NoMovesLeft,
}

impl From<LossRuleArg> for LossRule {
    fn from(value: LossRuleArg) -> Self {
        match value {
            LossRuleArg::FreeCells => Self::FreeCells,
            LossRuleArg::NoMovesLeft => Self::NoMovesLeft,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Sliding-block puzzle in the terminal")]
struct Cli {
    /// JSON game configuration; replaces the board and rule flags below.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,
    #[arg(long, default_value_t = DEFAULT_FOUR_PROBABILITY)]
    four_probability: f64,
    #[arg(long, default_value_t = DEFAULT_WIN_VALUE)]
    win_value: u32,
    /// Keep playing past the win value until the board locks up.
    #[arg(long)]
    no_win: bool,
    #[arg(long)]
    spawn_on_noop: bool,
    #[arg(long, value_enum, default_value_t = LossRuleArg::FreeCells)]
    loss_rule: LossRuleArg,
    #[arg(long)]
    seed: Option<u64>,
    /// Let a random player make the moves.
    #[arg(short, long)]
    random: bool,
    #[arg(long)]
    max_moves: Option<u32>,
}

impl Cli {
    fn game_config(&self) -> anyhow::Result<GameConfig> {
        if let Some(path) = &self.config {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;

            return serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()));
        }

        Ok(GameConfig {
            width: self.width,
            height: self.height,
            four_probability: self.four_probability,
            win_value: (!self.no_win).then_some(self.win_value),
            loss_rule: self.loss_rule.into(),
            spawn_on_noop: self.spawn_on_noop,
        })
    }
}

fn play_interactive<R: Rng>(
    renderer: &mut TerminalRenderer<impl Write>,
    input: &mut TerminalInput<impl io::Read>,
    game: &mut GameLoop<R>,
) -> anyhow::Result<()> {
    game.advance()?;
    renderer.draw(game.board(), game.score())?;

    while game.state() == GameState::WaitingForInput {
        let Some(direction) = input.next_direction()? else {
            break;
        };

        if let Some(result) = game.play(direction)? {
            if result.moved {
                renderer.draw(game.board(), game.score())?;
            }
        }
    }

    Ok(())
}

fn play_random<R: Rng>(
    renderer: &mut TerminalRenderer<impl Write>,
    player: &mut impl Player,
    game: &mut GameLoop<R>,
    max_moves: Option<u32>,
) -> anyhow::Result<()> {
    game.advance()?;
    renderer.draw(game.board(), game.score())?;

    while game.state() == GameState::WaitingForInput
        && max_moves.map_or(true, |max| game.move_count() < max)
    {
        let Some(direction) = player.next_move(game.board()) else {
            break;
        };

        game.play(direction)?;
        renderer.draw(game.board(), game.score())?;
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.game_config()?;

    let seed = cli.seed.unwrap_or_else(|| rand::thread_rng().gen());
    log::info!("starting {}x{} game with seed {seed}", config.width, config.height);

    let mut game = GameLoop::new(config, ChaCha8Rng::seed_from_u64(seed))?;

    let stdout = io::stdout().lock();
    let mut renderer = TerminalRenderer::new(stdout, game.config().width);

    if cli.random {
        let mut player = RandomPlayer::new(ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)));
        play_random(&mut renderer, &mut player, &mut game, cli.max_moves)?;
    } else {
        render::setup_terminal(&io::stdin()).context("switching terminal to raw input")?;

        let mut input = TerminalInput::new(io::stdin().lock())?;
        play_interactive(&mut renderer, &mut input, &mut game)?;
    }

    let outcome = match game.state() {
        GameState::Won => "You win!",
        GameState::Lost => "Game over",
        _ => "Quit",
    };

    writeln!(
        renderer.out(),
        "{outcome} Score: {}, moves: {}",
        game.score(),
        game.move_count()
    )?;

    Ok(())
}
