mod board;
mod config;
mod error;
mod food;
mod game;
mod logging;
mod position;
mod screens;
mod snake;
mod term;

use anyhow::Context;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};

use crate::board::Board;
use crate::game::SnakeGame;
use crate::term::TermManager;

fn main() -> anyhow::Result<()> {
    let args = config::Args::parse();
    if let Some(path) = &args.log_file {
        logging::init(path, &args.log_level)?;
    }

    let board = Board::new(args.width, args.height);
    let (min_width, min_height) = board.required_terminal_size();
    let term = TermManager::new(min_width, min_height).context("could not set up the terminal")?;

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut game = SnakeGame::new(term, board, rng)?;
    let result = game.run();
    let (score, high_score) = (game.score(), game.high_score());
    // Leaves the alternate screen so the summary below stays visible.
    drop(game);
    result?;

    println!("Thanks for playing!");
    println!("Final score: {}", score);
    println!("High score:  {}", high_score);
    Ok(())
}
