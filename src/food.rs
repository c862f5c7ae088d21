use std::collections::HashSet;

use crossterm::style::Color;
use rand::Rng;

use crate::board::Board;
use crate::error::FoodError;
use crate::position::Position;

/// One in ten spawns is a bonus item.
const BONUS_PROBABILITY: f64 = 0.1;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FoodKind {
    Common,
    Bonus,
}

impl FoodKind {
    pub fn value(self) -> u32 {
        match self {
            FoodKind::Common => 10,
            FoodKind::Bonus => 50,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            FoodKind::Common => '*',
            FoodKind::Bonus => '$',
        }
    }

    pub fn color(self) -> Color {
        match self {
            FoodKind::Common => Color::Red,
            FoodKind::Bonus => Color::Yellow,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Food {
    position: Position,
    kind: FoodKind,
}

impl Food {
    /// A freshly placed item that avoids `occupied`.
    pub fn spawn<R: Rng>(
        board: &Board,
        occupied: &[Position],
        rng: &mut R,
    ) -> Result<Self, FoodError> {
        let mut food = Food { position: Position::new(0, 0), kind: FoodKind::Common };
        food.respawn(board, occupied, rng)?;
        Ok(food)
    }

    #[cfg(test)]
    pub fn at(position: Position, kind: FoodKind) -> Self {
        Food { position, kind }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn kind(&self) -> FoodKind {
        self.kind
    }

    pub fn value(&self) -> u32 {
        self.kind.value()
    }

    /// Rejection-samples a free cell, then draws the kind independently.
    ///
    /// A board with no free cell is refused up front instead of sampling
    /// forever.
    pub fn respawn<R: Rng>(
        &mut self,
        board: &Board,
        occupied: &[Position],
        rng: &mut R,
    ) -> Result<(), FoodError> {
        let taken: HashSet<Position> = occupied
            .iter()
            .copied()
            .filter(|p| board.contains(*p))
            .collect();
        if taken.len() >= board.capacity() {
            return Err(FoodError::NoFreeCell { width: board.width(), height: board.height() });
        }

        let position = loop {
            let candidate = Position::new(
                rng.gen_range(0..board.width()),
                rng.gen_range(0..board.height()),
            );
            if !taken.contains(&candidate) {
                break candidate;
            }
        };

        self.position = position;
        self.kind = if rng.gen_bool(BONUS_PROBABILITY) {
            FoodKind::Bonus
        } else {
            FoodKind::Common
        };

        tracing::debug!(x = position.x, y = position.y, kind = ?self.kind, "food spawned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn values_match_kinds() {
        assert_eq!(FoodKind::Common.value(), 10);
        assert_eq!(FoodKind::Bonus.value(), 50);
        assert_eq!(Food::at(Position::new(1, 1), FoodKind::Bonus).value(), 50);
    }

    #[test]
    fn full_board_is_refused() {
        let board = Board::new(2, 2);
        let occupied: Vec<Position> = (0..2)
            .flat_map(|y| (0..2).map(move |x| Position::new(x, y)))
            .collect();
        let mut rng = StdRng::seed_from_u64(1);

        let err = Food::spawn(&board, &occupied, &mut rng).unwrap_err();
        assert_eq!(err, FoodError::NoFreeCell { width: 2, height: 2 });
    }

    #[test]
    fn last_free_cell_is_found() {
        let board = Board::new(3, 3);
        let occupied: Vec<Position> = (0..3)
            .flat_map(|y| (0..3).map(move |x| Position::new(x, y)))
            .filter(|p| *p != Position::new(2, 1))
            .collect();
        let mut rng = StdRng::seed_from_u64(7);

        let food = Food::spawn(&board, &occupied, &mut rng).unwrap();
        assert_eq!(food.position(), Position::new(2, 1));
    }

    #[test]
    fn off_board_segments_do_not_count_as_occupied() {
        let board = Board::new(1, 1);
        let mut rng = StdRng::seed_from_u64(3);

        let food = Food::spawn(&board, &[Position::new(1, 0)], &mut rng).unwrap();
        assert_eq!(food.position(), Position::new(0, 0));
    }

    #[test]
    fn both_kinds_show_up_at_roughly_the_right_rate() {
        let board = Board::new(30, 20);
        let mut rng = StdRng::seed_from_u64(42);
        let mut food = Food::spawn(&board, &[], &mut rng).unwrap();

        let mut bonus = 0;
        for _ in 0..2000 {
            food.respawn(&board, &[], &mut rng).unwrap();
            if food.kind() == FoodKind::Bonus {
                bonus += 1;
            }
        }
        assert!((100..300).contains(&bonus), "bonus count {}", bonus);
    }

    proptest! {
        #[test]
        fn never_lands_on_the_snake(
            seed in any::<u64>(),
            cells in proptest::collection::hash_set((0..8i32, 0..6i32), 0..40),
        ) {
            let board = Board::new(8, 6);
            let occupied: Vec<Position> =
                cells.into_iter().map(|(x, y)| Position::new(x, y)).collect();
            let mut rng = StdRng::seed_from_u64(seed);

            let food = Food::spawn(&board, &occupied, &mut rng).unwrap();
            prop_assert!(board.contains(food.position()));
            prop_assert!(!occupied.contains(&food.position()));
        }
    }
}
