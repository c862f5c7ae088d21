use std::{cmp::max, thread::sleep, time::Duration};

use rand::Rng;
use tracing::{debug, info};

use crate::board::{Board, Overlay, Stats};
use crate::error::Result;
use crate::food::Food;
use crate::position::Direction::{self, *};
use crate::screens;
use crate::snake::Snake;
use crate::term::{Key, Terminal};

const SLOWEST_TICK_MS: u64 = 200;
const FASTEST_TICK_MS: u64 = 50;
const TICK_STEP_MS: u64 = 15;
const POINTS_PER_LEVEL: u32 = 100;

/// How long a paused game sleeps between ticks.
const IDLE_INTERVAL: Duration = Duration::from_millis(100);
/// How often the game over prompt looks for an answer.
const PROMPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Welcome,
    Running,
    Paused,
    GameOver,
    Terminated,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Command {
    Turn(Direction),
    TogglePause,
    Quit,
    Restart,
}

impl Command {
    fn from_key(key: Key) -> Option<Command> {
        let command = match key {
            Key::Char('w') | Key::Up => Command::Turn(Up),
            Key::Char('s') | Key::Down => Command::Turn(Down),
            Key::Char('a') | Key::Left => Command::Turn(Left),
            Key::Char('d') | Key::Right => Command::Turn(Right),
            Key::Char('p') => Command::TogglePause,
            Key::Char('q') | Key::Interrupt => Command::Quit,
            Key::Char('r') => Command::Restart,
            _ => return None,
        };
        Some(command)
    }
}

pub fn level_for(score: u32) -> u32 {
    score / POINTS_PER_LEVEL + 1
}

/// Gets faster with every level until it bottoms out.
pub fn tick_interval_ms(level: u32) -> u64 {
    max(FASTEST_TICK_MS, SLOWEST_TICK_MS.saturating_sub(u64::from(level) * TICK_STEP_MS))
}

pub struct SnakeGame<T, R> {
    term: T,
    rng: R,
    board: Board,
    snake: Snake,
    food: Food,
    score: u32,
    high_score: u32,
    level: u32,
    tick_interval_ms: u64,
    phase: Phase,
}

impl<T: Terminal, R: Rng> SnakeGame<T, R> {
    pub fn new(term: T, board: Board, mut rng: R) -> Result<Self> {
        let snake = Snake::new();
        let food = Food::spawn(&board, snake.body(), &mut rng)?;

        Ok(SnakeGame {
            term,
            rng,
            board,
            snake,
            food,
            score: 0,
            high_score: 0,
            level: level_for(0),
            tick_interval_ms: tick_interval_ms(level_for(0)),
            phase: Phase::Welcome,
        })
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Welcome screen, then ticks until the player quits.
    pub fn run(&mut self) -> Result<()> {
        self.show_intro()?;

        while self.phase != Phase::Terminated {
            self.tick()?;
            if self.phase != Phase::Terminated {
                sleep(self.sleep_interval());
            }
        }

        self.term.show_cursor()?;
        info!(score = self.score, high_score = self.high_score, "quit");
        Ok(())
    }

    /// Blocks for exactly one key. A resize only repaints the screen.
    pub fn show_intro(&mut self) -> Result<()> {
        screens::welcome(&mut self.term)?;

        let key = loop {
            match self.term.read_key_blocking()? {
                Key::Resize => screens::welcome(&mut self.term)?,
                key => break key,
            }
        };
        if key == Key::Interrupt {
            self.phase = Phase::Terminated;
            return Ok(());
        }

        self.term.clear_screen()?;
        self.phase = Phase::Running;
        info!(width = self.board.width(), height = self.board.height(), "game started");
        Ok(())
    }

    /// One round of input, update and render. At most one key is consumed
    /// so two quick turns can't fold the snake back onto itself.
    pub fn tick(&mut self) -> Result<()> {
        if let Some(key) = self.term.poll_key()? {
            self.handle_key(key)?;
        }

        match self.phase {
            Phase::Terminated | Phase::Welcome => return Ok(()),
            Phase::Running => self.update()?,
            Phase::Paused | Phase::GameOver => {}
        }

        self.render()
    }

    pub fn sleep_interval(&self) -> Duration {
        match self.phase {
            Phase::Running => Duration::from_millis(self.tick_interval_ms),
            Phase::GameOver => PROMPT_POLL_INTERVAL,
            _ => IDLE_INTERVAL,
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn handle_key(&mut self, key: Key) -> Result<()> {
        if key == Key::Resize {
            self.term.clear_screen()?;
            self.board.reset_drawn_state();
            return Ok(());
        }

        let command = match Command::from_key(key) {
            Some(command) => command,
            None => return Ok(()),
        };

        match (self.phase, command) {
            (_, Command::Quit) => self.phase = Phase::Terminated,
            (Phase::Running, Command::Turn(direction)) => self.snake.set_direction(direction),
            (Phase::Running, Command::TogglePause) => {
                self.phase = Phase::Paused;
                debug!("paused");
            }
            (Phase::Paused, Command::TogglePause) => {
                self.phase = Phase::Running;
                debug!("resumed");
            }
            (Phase::GameOver, Command::Restart) => self.restart()?,
            _ => {}
        }

        Ok(())
    }

    fn update(&mut self) -> Result<()> {
        self.snake.advance();

        let level = level_for(self.score);
        if level != self.level {
            debug!(level, "level up");
        }
        self.level = level;
        self.tick_interval_ms = tick_interval_ms(level);

        let head = self.snake.head();
        if !self.board.contains(head) || self.snake.has_self_collision() {
            self.game_over();
            return Ok(());
        }

        if head == self.food.position() {
            self.score += self.food.value();
            self.snake.mark_growth();
            self.food.respawn(&self.board, self.snake.body(), &mut self.rng)?;
        }

        Ok(())
    }

    fn game_over(&mut self) {
        self.phase = Phase::GameOver;
        self.high_score = max(self.high_score, self.score);
        info!(
            score = self.score,
            high_score = self.high_score,
            length = self.snake.len(),
            direction = ?self.snake.direction(),
            "game over"
        );
    }

    fn restart(&mut self) -> Result<()> {
        self.snake.reset();
        self.score = 0;
        self.level = level_for(0);
        self.tick_interval_ms = tick_interval_ms(self.level);
        self.food.respawn(&self.board, self.snake.body(), &mut self.rng)?;

        self.term.clear_screen()?;
        self.board.reset_drawn_state();
        self.phase = Phase::Running;
        info!("restarted");
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let stats = Stats {
            score: self.score,
            high_score: self.high_score,
            length: self.snake.len(),
            level: self.level,
        };
        let overlay = match self.phase {
            Phase::Paused => Overlay::Paused,
            Phase::GameOver => Overlay::GameOver,
            _ => Overlay::None,
        };

        self.board
            .render(&mut self.term, &self.snake, &self.food, &stats, overlay)?;
        Ok(())
    }
}

#[cfg(test)]
impl<T, R> SnakeGame<T, R> {
    fn phase(&self) -> Phase {
        self.phase
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn snake(&self) -> &Snake {
        &self.snake
    }

    fn food(&self) -> &Food {
        &self.food
    }

    fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn place_food(&mut self, food: Food) {
        self.food = food;
    }

    fn place_snake(&mut self, snake: Snake) {
        self.snake = snake;
    }

    fn term(&mut self) -> &mut T {
        &mut self.term
    }
}
