use crate::position::{Direction::{self, *}, Position};

pub const INITIAL_HEAD: Position = Position::new(10, 10);
pub const INITIAL_LENGTH: usize = 3;

pub struct Snake {
    body: Vec<Position>,
    direction: Direction,
    pending_growth: bool,
}

impl Snake {
    /// A three segment snake lying horizontally with its head at
    /// `INITIAL_HEAD`, waiting for its first direction.
    pub fn new() -> Self {
        let body = (0..INITIAL_LENGTH as i32)
            .map(|i| Position::new(INITIAL_HEAD.x - i, INITIAL_HEAD.y))
            .collect();
        Snake { body, direction: Stopped, pending_growth: false }
    }

    #[cfg(test)]
    pub fn from_segments(body: Vec<Position>, direction: Direction) -> Self {
        assert!(!body.is_empty());
        Snake { body, direction, pending_growth: false }
    }

    pub fn reset(&mut self) {
        *self = Snake::new();
    }

    /// Head first.
    pub fn body(&self) -> &[Position] {
        &self.body
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[cfg(test)]
    pub fn has_pending_growth(&self) -> bool {
        self.pending_growth
    }

    /// Turning straight back is silently ignored, as is `Stopped`, which is
    /// only ever the starting state.
    pub fn set_direction(&mut self, requested: Direction) {
        let reversal = self.direction != Stopped && requested == self.direction.opposite();
        if requested == Stopped || reversal {
            return;
        }

        if requested != self.direction {
            tracing::trace!(from = ?self.direction, to = ?requested, "direction changed");
        }
        self.direction = requested;
    }

    pub fn advance(&mut self) {
        if self.direction == Stopped {
            return;
        }

        let new_head = self.head().step(self.direction);
        self.body.insert(0, new_head);

        if self.pending_growth {
            self.pending_growth = false;
        } else {
            self.body.pop();
        }
    }

    /// Takes effect on the next `advance`.
    pub fn mark_growth(&mut self) {
        self.pending_growth = true;
    }

    pub fn has_self_collision(&self) -> bool {
        let head = self.head();
        self.body[1..].contains(&head)
    }

    pub fn head_glyph(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
            Stopped => '@',
        }
    }
}
