//! The text screens around the board: welcome and game over.

use std::io;

use crossterm::style::Color;

use crate::term::Terminal;

const WELCOME_LEFT: u16 = 8;
const WELCOME_TOP: u16 = 3;
const WELCOME_WIDTH: u16 = 52;

const WELCOME_LINES: [&str; 13] = [
    "",
    "S N A K E",
    "",
    "Arrow keys or WASD to steer",
    "Eat * to grow and score 10 points",
    "Bonus $ is worth 50 points",
    "Don't hit the walls or yourself",
    "P to pause, Q to quit",
    "The snake speeds up as you score",
    "",
    "",
    "Press any key to start",
    "",
];

/// Rightmost column and last row the welcome screen touches.
pub const WELCOME_RIGHT: u16 = WELCOME_LEFT + WELCOME_WIDTH;
pub const WELCOME_BOTTOM: u16 = WELCOME_TOP + WELCOME_LINES.len() as u16 + 2;

pub fn welcome<T: Terminal>(term: &mut T) -> io::Result<()> {
    term.clear_screen()?;
    term.hide_cursor()?;
    message_box(term, (WELCOME_LEFT, WELCOME_TOP), WELCOME_WIDTH, &WELCOME_LINES, Color::Cyan)?;

    term.set_color(Color::Yellow)?;
    let prompt = WELCOME_LINES.len() as u16 - 2;
    print_centered(
        term,
        (WELCOME_LEFT, WELCOME_TOP + 1 + prompt),
        WELCOME_WIDTH,
        WELCOME_LINES[prompt as usize],
    )?;
    term.flush()
}

/// Boxed final result, centered on `center` (terminal coordinates).
pub fn game_over_box<T: Terminal>(
    term: &mut T,
    center: (u16, u16),
    score: u32,
    high_score: u32,
) -> io::Result<()> {
    let final_score = format!("Final score: {:>6}", score);
    let best = format!("High score:  {:>6}", high_score);
    let lines = ["GAME OVER", "", final_score.as_str(), best.as_str(), "", "R: restart   Q: quit"];

    let width = lines.iter().map(|l| l.len()).max().unwrap_or(0) as u16 + 4;
    let height = lines.len() as u16 + 2;
    let top_left = (center.0.saturating_sub(width / 2), center.1.saturating_sub(height / 2));
    message_box(term, top_left, width, &lines, Color::Red)
}

fn message_box<T: Terminal>(
    term: &mut T,
    top_left: (u16, u16),
    width: u16,
    lines: &[&str],
    frame: Color,
) -> io::Result<()> {
    let (x, y) = top_left;
    let inner = width as usize - 2;
    let rule = format!("+{}+", "=".repeat(inner));

    term.set_color(frame)?;
    term.print_at(x, y, &rule)?;
    for (i, line) in lines.iter().enumerate() {
        let row = y + 1 + i as u16;
        term.set_color(frame)?;
        term.print_at(x, row, "|")?;
        term.set_color(Color::White)?;
        term.print(&format!("{line: ^width$}", line = line, width = inner))?;
        term.set_color(frame)?;
        term.print("|")?;
    }
    term.print_at(x, y + 1 + lines.len() as u16, &rule)
}

fn print_centered<T: Terminal>(
    term: &mut T,
    top_left: (u16, u16),
    width: u16,
    line: &str,
) -> io::Result<()> {
    let inner = width as usize - 2;
    let padded = format!("{line: ^width$}", line = line, width = inner);
    term.print_at(top_left.0 + 1, top_left.1, &padded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::fake::FakeTerminal;

    #[test]
    fn welcome_hides_the_cursor_and_prompts() {
        let mut term = FakeTerminal::new();
        welcome(&mut term).unwrap();

        assert!(!term.cursor_visible);
        assert!(term.shows("Press any key to start"));
        assert_eq!(term.char_at(WELCOME_LEFT, WELCOME_TOP), '+');
        assert_eq!(term.char_at(WELCOME_RIGHT - 1, WELCOME_BOTTOM - 1), '+');
    }

    #[test]
    fn game_over_box_shows_both_scores() {
        let mut term = FakeTerminal::new();
        game_over_box(&mut term, (16, 14), 120, 340).unwrap();

        assert!(term.shows("GAME OVER"));
        assert!(term.shows("Final score:    120"));
        assert!(term.shows("High score:     340"));
        assert!(term.shows("R: restart   Q: quit"));
    }
}
