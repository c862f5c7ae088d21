use std::cmp::max;
use std::collections::HashSet;
use std::io;

use crossterm::style::Color;

use crate::food::{Food, FoodKind};
use crate::position::Position;
use crate::screens;
use crate::snake::Snake;
use crate::term::Terminal;

pub const DEFAULT_WIDTH: i32 = 30;
pub const DEFAULT_HEIGHT: i32 = 20;

// Grid cell (x, y) lives at terminal column x + GRID_LEFT, row y + GRID_TOP.
const GRID_LEFT: i32 = 1;
const GRID_TOP: i32 = 4;
const BORDER_TOP: u16 = 3;

const PANEL_GAP: u16 = 4;
const PANEL_WIDTH: usize = 30;
const STATS_TOP: u16 = 5;
const CONTROLS_TOP: u16 = 12;
const LEGEND_TOP: u16 = 21;
const BANNER_WIDTH: usize = 58;

const HEAD_COLOR: Color = Color::Green;
const BODY_COLOR: Color = Color::DarkGreen;
const BORDER_COLOR: Color = Color::DarkCyan;
const TEXT_COLOR: Color = Color::Grey;

const BODY_CHAR: char = 'o';
const PAUSED_LABEL: &str = "PAUSED";

const CONTROLS: [&str; 6] = [
    "W/UP    - Move up",
    "S/DOWN  - Move down",
    "A/LEFT  - Move left",
    "D/RIGHT - Move right",
    "P       - Pause / resume",
    "Q       - Quit",
];

/// Values shown in the stats panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stats {
    pub score: u32,
    pub high_score: u32,
    pub length: usize,
    pub level: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Overlay {
    None,
    Paused,
    GameOver,
}

/// The playing field. Besides bounds it remembers what it last put on the
/// screen, so each render only writes the cells and fields that changed.
pub struct Board {
    width: i32,
    height: i32,
    chrome_drawn: bool,
    drawn_body: Vec<Position>,
    drawn_head: Option<(Position, char)>,
    drawn_food: Option<(Position, FoodKind)>,
    last_score: Option<u32>,
    last_high_score: Option<u32>,
    last_length: Option<usize>,
    last_level: Option<String>,
    pause_shown: bool,
    game_over_shown: bool,
    /// Snake and food cells must be repainted even if memory says they are
    /// already on screen.
    repaint: bool,
}

impl Board {
    /// # Panics
    ///
    /// If either dimension is not positive. Sizes coming from the command
    /// line are range-checked before they get here.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "board must have at least one cell");

        Board {
            width,
            height,
            chrome_drawn: false,
            drawn_body: vec![],
            drawn_head: None,
            drawn_food: None,
            last_score: None,
            last_high_score: None,
            last_length: None,
            last_level: None,
            pause_shown: false,
            game_over_shown: false,
            repaint: false,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn capacity(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, pos: Position) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    /// Smallest terminal the whole layout fits in.
    pub fn required_terminal_size(&self) -> (u16, u16) {
        let panel_right = self.panel_left() as usize + PANEL_WIDTH;
        let width = max(max(panel_right, BANNER_WIDTH), screens::WELCOME_RIGHT as usize);
        let height = max(self.height as u16 + GRID_TOP as u16 + 1, LEGEND_TOP + 4);
        (width as u16, max(height, screens::WELCOME_BOTTOM))
    }

    /// Forget everything drawn so far; the next render repaints in full.
    pub fn reset_drawn_state(&mut self) {
        self.chrome_drawn = false;
        self.drawn_body.clear();
        self.drawn_head = None;
        self.drawn_food = None;
        self.last_score = None;
        self.last_high_score = None;
        self.last_length = None;
        self.last_level = None;
        self.pause_shown = false;
        self.game_over_shown = false;
        self.repaint = false;
    }

    pub fn render<T: Terminal>(
        &mut self,
        term: &mut T,
        snake: &Snake,
        food: &Food,
        stats: &Stats,
        overlay: Overlay,
    ) -> io::Result<()> {
        if !self.chrome_drawn {
            self.draw_chrome(term)?;
        }

        if self.pause_shown && overlay != Overlay::Paused {
            self.hide_pause_label(term)?;
        }

        self.draw_snake(term, snake)?;
        self.draw_food(term, food, snake)?;
        self.repaint = false;
        self.draw_stats(term, stats)?;

        match overlay {
            Overlay::Paused if !self.pause_shown => {
                let (x, y) = self.pause_label_origin();
                term.set_color(Color::Yellow)?;
                term.print_at(x, y, PAUSED_LABEL)?;
                self.pause_shown = true;
            }
            Overlay::GameOver if !self.game_over_shown => {
                screens::game_over_box(term, self.center(), stats.score, stats.high_score)?;
                self.game_over_shown = true;
            }
            _ => {}
        }

        term.flush()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw_snake<T: Terminal>(&mut self, term: &mut T, snake: &Snake) -> io::Result<()> {
        let body = snake.body();
        let occupied: HashSet<Position> = body.iter().copied().collect();

        for pos in &self.drawn_body {
            if !occupied.contains(pos) {
                self.erase_cell(term, *pos)?;
            }
        }

        // Segments already showing the body glyph stay as they are; in the
        // usual case only the old head needs repainting.
        let drawn_segments: HashSet<Position> = if self.repaint {
            HashSet::new()
        } else {
            self.drawn_body.iter().skip(1).copied().collect()
        };
        term.set_color(BODY_COLOR)?;
        for pos in &body[1..] {
            if !drawn_segments.contains(pos) {
                self.put_cell(term, *pos, BODY_CHAR)?;
            }
        }

        let head = (snake.head(), snake.head_glyph());
        if self.drawn_head != Some(head) {
            term.set_color(HEAD_COLOR)?;
            self.put_cell(term, head.0, head.1)?;
        }

        self.drawn_head = Some(head);
        self.drawn_body.clear();
        self.drawn_body.extend_from_slice(body);
        Ok(())
    }

    fn draw_food<T: Terminal>(
        &mut self,
        term: &mut T,
        food: &Food,
        snake: &Snake,
    ) -> io::Result<()> {
        let current = (food.position(), food.kind());
        if self.drawn_food == Some(current) && !self.repaint {
            return Ok(());
        }

        if let Some((old, _)) = self.drawn_food {
            // Normally the head is sitting on it now.
            if old != food.position() && !snake.body().contains(&old) {
                self.erase_cell(term, old)?;
            }
        }

        term.set_color(food.kind().color())?;
        self.put_cell(term, food.position(), food.kind().glyph())?;
        self.drawn_food = Some(current);
        Ok(())
    }

    fn draw_stats<T: Terminal>(&mut self, term: &mut T, stats: &Stats) -> io::Result<()> {
        let x = self.panel_left();
        term.set_color(TEXT_COLOR)?;

        if self.last_score != Some(stats.score) {
            term.print_at(x, STATS_TOP + 1, &stat_line("Score:", stats.score))?;
            self.last_score = Some(stats.score);
        }

        if self.last_high_score != Some(stats.high_score) {
            term.print_at(x, STATS_TOP + 2, &stat_line("High score:", stats.high_score))?;
            self.last_high_score = Some(stats.high_score);
        }

        if self.last_length != Some(stats.length) {
            term.print_at(x, STATS_TOP + 3, &stat_line("Length:", stats.length))?;
            self.last_length = Some(stats.length);
        }

        let level = format!("Level {}", stats.level);
        if self.last_level.as_deref() != Some(level.as_str()) {
            term.print_at(x, STATS_TOP + 4, &stat_line("Level:", &level))?;
            self.last_level = Some(level);
        }

        Ok(())
    }

    fn draw_chrome<T: Terminal>(&mut self, term: &mut T) -> io::Result<()> {
        term.set_color(Color::Cyan)?;
        let rule = format!("+{:=^w$}+", "", w = BANNER_WIDTH - 2);
        term.print_at(0, 0, &rule)?;
        term.print_at(0, 1, &format!("|{:^w$}|", "S N A K E", w = BANNER_WIDTH - 2))?;
        term.print_at(0, 2, &rule)?;

        term.set_color(BORDER_COLOR)?;
        let edge = format!("+{}+", "-".repeat(self.width as usize));
        let bottom = GRID_TOP as u16 + self.height as u16;
        term.print_at(0, BORDER_TOP, &edge)?;
        for y in GRID_TOP as u16..bottom {
            term.print_at(0, y, "|")?;
            term.print_at(self.width as u16 + 1, y, "|")?;
        }
        term.print_at(0, bottom, &edge)?;

        let x = self.panel_left();
        term.set_color(Color::DarkYellow)?;
        term.print_at(x, STATS_TOP, &panel_rule(" STATS "))?;
        term.print_at(x, STATS_TOP + 5, &panel_rule(""))?;

        term.set_color(Color::Magenta)?;
        term.print_at(x, CONTROLS_TOP, &panel_rule(" CONTROLS "))?;
        term.set_color(TEXT_COLOR)?;
        for (i, line) in CONTROLS.iter().enumerate() {
            let row = format!("| {:<w$} |", line, w = PANEL_WIDTH - 4);
            term.print_at(x, CONTROLS_TOP + 1 + i as u16, &row)?;
        }
        term.set_color(Color::Magenta)?;
        term.print_at(x, CONTROLS_TOP + 1 + CONTROLS.len() as u16, &panel_rule(""))?;

        term.set_color(BORDER_COLOR)?;
        term.print_at(x, LEGEND_TOP, &panel_rule(" FOOD "))?;
        for (i, kind) in [FoodKind::Common, FoodKind::Bonus].iter().enumerate() {
            let y = LEGEND_TOP + 1 + i as u16;
            let name = if *kind == FoodKind::Bonus { "Bonus" } else { "Common" };
            let label = format!("{} food (+{})", name, kind.value());
            term.set_color(BORDER_COLOR)?;
            term.print_at(x, y, "| ")?;
            term.set_color(kind.color())?;
            term.print(&kind.glyph().to_string())?;
            term.set_color(TEXT_COLOR)?;
            term.print(&format!(" - {:<w$}", label, w = PANEL_WIDTH - 7))?;
            term.set_color(BORDER_COLOR)?;
            term.print("|")?;
        }
        term.print_at(x, LEGEND_TOP + 3, &panel_rule(""))?;

        self.chrome_drawn = true;
        Ok(())
    }

    fn hide_pause_label<T: Terminal>(&mut self, term: &mut T) -> io::Result<()> {
        let (x, y) = self.pause_label_origin();
        term.print_at(x, y, &" ".repeat(PAUSED_LABEL.len()))?;
        self.pause_shown = false;

        // The label may have covered snake or food cells. Positions are
        // kept so cells the snake left since the last frame still get erased.
        self.drawn_head = None;
        self.repaint = true;
        Ok(())
    }

    fn put_cell<T: Terminal>(&self, term: &mut T, pos: Position, ch: char) -> io::Result<()> {
        if !self.contains(pos) {
            return Ok(());
        }
        let (x, y) = screen_coords(pos);
        let mut buf = [0u8; 4];
        term.print_at(x, y, ch.encode_utf8(&mut buf))
    }

    fn erase_cell<T: Terminal>(&self, term: &mut T, pos: Position) -> io::Result<()> {
        self.put_cell(term, pos, ' ')
    }

    fn panel_left(&self) -> u16 {
        self.width as u16 + GRID_LEFT as u16 + PANEL_GAP
    }

    fn center(&self) -> (u16, u16) {
        screen_coords(Position::new(self.width / 2, self.height / 2))
    }

    fn pause_label_origin(&self) -> (u16, u16) {
        let (x, y) = self.center();
        (x.saturating_sub(PAUSED_LABEL.len() as u16 / 2), y)
    }
}

fn screen_coords(pos: Position) -> (u16, u16) {
    ((pos.x + GRID_LEFT) as u16, (pos.y + GRID_TOP) as u16)
}

fn panel_rule(title: &str) -> String {
    format!("+{:-^w$}+", title, w = PANEL_WIDTH - 2)
}

fn stat_line(label: &str, value: impl std::fmt::Display) -> String {
    format!("| {:<12}{:>w$} |", label, value, w = PANEL_WIDTH - 16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Direction::*;
    use crate::term::fake::FakeTerminal;
    use proptest::prelude::*;

    fn stats(score: u32) -> Stats {
        Stats { score, high_score: 0, length: 3, level: 1 }
    }

    fn cell(term: &FakeTerminal, x: i32, y: i32) -> char {
        let (sx, sy) = screen_coords(Position::new(x, y));
        term.char_at(sx, sy)
    }

    #[test]
    fn contains_is_half_open() {
        let board = Board::new(30, 20);
        assert!(board.contains(Position::new(0, 0)));
        assert!(board.contains(Position::new(29, 19)));
        assert!(!board.contains(Position::new(30, 10)));
        assert!(!board.contains(Position::new(10, 20)));
        assert!(!board.contains(Position::new(-1, 0)));
        assert!(!board.contains(Position::new(0, -1)));
    }

    #[test]
    fn layout_fits_the_default_board() {
        let board = Board::new(DEFAULT_WIDTH, DEFAULT_HEIGHT);
        let (w, h) = board.required_terminal_size();
        assert!(w >= 65 && h >= 25, "{}x{}", w, h);
    }

    #[test]
    fn first_render_draws_everything() {
        let mut board = Board::new(30, 20);
        let mut term = FakeTerminal::new();
        let snake = Snake::new();
        let food = Food::at(Position::new(3, 4), FoodKind::Common);

        board.render(&mut term, &snake, &food, &stats(0), Overlay::None).unwrap();

        assert_eq!(cell(&term, 10, 10), '@');
        assert_eq!(cell(&term, 9, 10), 'o');
        assert_eq!(cell(&term, 8, 10), 'o');
        assert_eq!(cell(&term, 3, 4), '*');
        assert_eq!(term.char_at(0, BORDER_TOP), '+');
        assert_eq!(term.char_at(31, GRID_TOP as u16), '|');
        assert!(term.shows("S N A K E"));
        assert!(term.shows("Level 1"));
        assert!(term.shows("Common food (+10)"));
    }

    #[test]
    fn unchanged_frame_writes_nothing() {
        let mut board = Board::new(30, 20);
        let mut term = FakeTerminal::new();
        let snake = Snake::new();
        let food = Food::at(Position::new(3, 4), FoodKind::Common);

        board.render(&mut term, &snake, &food, &stats(0), Overlay::None).unwrap();
        term.reset_counters();
        board.render(&mut term, &snake, &food, &stats(0), Overlay::None).unwrap();

        assert_eq!(term.writes, 0);
    }

    #[test]
    fn moving_touches_only_changed_cells() {
        let mut board = Board::new(30, 20);
        let mut term = FakeTerminal::new();
        let mut snake = Snake::new();
        let food = Food::at(Position::new(3, 4), FoodKind::Common);
        board.render(&mut term, &snake, &food, &stats(0), Overlay::None).unwrap();

        snake.set_direction(Right);
        snake.advance();
        term.reset_counters();
        board.render(&mut term, &snake, &food, &stats(0), Overlay::None).unwrap();

        // Tail erased, old head becomes body, new head drawn.
        assert_eq!(term.writes, 3);
        assert_eq!(cell(&term, 8, 10), ' ');
        assert_eq!(cell(&term, 10, 10), 'o');
        assert_eq!(cell(&term, 11, 10), '>');
    }

    #[test]
    fn only_changed_stats_are_redrawn() {
        let mut board = Board::new(30, 20);
        let mut term = FakeTerminal::new();
        let snake = Snake::new();
        let food = Food::at(Position::new(3, 4), FoodKind::Common);
        board.render(&mut term, &snake, &food, &stats(0), Overlay::None).unwrap();

        term.reset_counters();
        board.render(&mut term, &snake, &food, &stats(10), Overlay::None).unwrap();

        assert_eq!(term.writes, PANEL_WIDTH);
        assert!(term.row(STATS_TOP + 1).ends_with("10 |"));
    }

    #[test]
    fn eaten_food_is_replaced_without_erasing_the_head() {
        let mut board = Board::new(30, 20);
        let mut term = FakeTerminal::new();
        let mut snake = Snake::new();
        let food = Food::at(Position::new(11, 10), FoodKind::Common);
        board.render(&mut term, &snake, &food, &stats(0), Overlay::None).unwrap();

        snake.set_direction(Right);
        snake.advance();
        let next = Food::at(Position::new(0, 0), FoodKind::Bonus);
        board.render(&mut term, &snake, &next, &stats(10), Overlay::None).unwrap();

        assert_eq!(cell(&term, 11, 10), '>');
        assert_eq!(cell(&term, 0, 0), '$');
        assert_eq!(term.color_at(1, 4), Some(Color::Yellow));
    }

    #[test]
    fn off_board_head_is_not_drawn() {
        let mut board = Board::new(30, 20);
        let mut term = FakeTerminal::new();
        let mut snake = Snake::from_segments(
            vec![Position::new(29, 10), Position::new(28, 10), Position::new(27, 10)],
            Right,
        );
        let food = Food::at(Position::new(3, 4), FoodKind::Common);
        board.render(&mut term, &snake, &food, &stats(0), Overlay::None).unwrap();

        snake.advance();
        board.render(&mut term, &snake, &food, &stats(0), Overlay::GameOver).unwrap();

        // Column 31 is the right border and must survive.
        assert_eq!(term.char_at(31, 14), '|');
        assert!(term.shows("GAME OVER"));
    }

    #[test]
    fn pause_label_comes_and_goes() {
        let mut board = Board::new(30, 20);
        let mut term = FakeTerminal::new();
        let snake = Snake::new();
        let food = Food::at(Position::new(3, 4), FoodKind::Common);

        board.render(&mut term, &snake, &food, &stats(0), Overlay::Paused).unwrap();
        assert!(term.shows(PAUSED_LABEL));

        board.render(&mut term, &snake, &food, &stats(0), Overlay::None).unwrap();
        assert!(!term.shows(PAUSED_LABEL));
        assert_eq!(cell(&term, 10, 10), '@');
        assert_eq!(cell(&term, 3, 4), '*');
    }

    #[test]
    fn resuming_after_a_move_erases_the_old_tail() {
        let mut board = Board::new(30, 20);
        let mut term = FakeTerminal::new();
        let mut snake = Snake::new();
        snake.set_direction(Right);
        let food = Food::at(Position::new(3, 4), FoodKind::Common);

        board.render(&mut term, &snake, &food, &stats(0), Overlay::Paused).unwrap();
        snake.advance();
        board.render(&mut term, &snake, &food, &stats(0), Overlay::None).unwrap();

        assert_eq!(cell(&term, 8, 10), ' ');
        assert_eq!(cell(&term, 9, 10), 'o');
        assert_eq!(cell(&term, 10, 10), 'o');
        assert_eq!(cell(&term, 11, 10), '>');
        assert_eq!(cell(&term, 3, 4), '*');
    }

    #[test]
    #[should_panic(expected = "board must have at least one cell")]
    fn empty_board_is_rejected() {
        Board::new(0, 20);
    }

    #[test]
    fn reset_forces_a_full_redraw() {
        let mut board = Board::new(30, 20);
        let mut term = FakeTerminal::new();
        let snake = Snake::new();
        let food = Food::at(Position::new(3, 4), FoodKind::Common);
        board.render(&mut term, &snake, &food, &stats(0), Overlay::None).unwrap();

        term.clear_screen().unwrap();
        board.reset_drawn_state();
        board.render(&mut term, &snake, &food, &stats(0), Overlay::None).unwrap();

        assert_eq!(cell(&term, 10, 10), '@');
        assert_eq!(cell(&term, 3, 4), '*');
        assert!(term.shows("S N A K E"));
        assert!(term.shows("Level 1"));
    }

    proptest! {
        #[test]
        fn outside_positions_are_rejected(x in -50i32..80, y in -50i32..80) {
            let board = Board::new(30, 20);
            let inside = x >= 0 && x < 30 && y >= 0 && y < 20;
            prop_assert_eq!(board.contains(Position::new(x, y)), inside);
        }
    }
}
