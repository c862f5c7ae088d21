use std::io;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FoodError {
    #[error("no free cell left on a {width}x{height} board")]
    NoFreeCell { width: i32, height: i32 },
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("terminal I/O failed")]
    Terminal(#[from] io::Error),

    #[error(
        "terminal is {actual_width}x{actual_height}, \
         the game needs at least {needed_width}x{needed_height}"
    )]
    TerminalTooSmall {
        actual_width: u16,
        actual_height: u16,
        needed_width: u16,
        needed_height: u16,
    },

    #[error("could not place food")]
    Food(#[from] FoodError),
}

pub type Result<T, E = GameError> = std::result::Result<T, E>;
