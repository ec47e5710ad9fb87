#[derive(Debug, Clone, Default)]
pub struct Board {
    cards: Vec<Card>, // presize
}

impl Board {
    pub fn empty() -> Board {
        Board {
            cards: Vec::with_capacity(5),
        }
    }

    pub fn add(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.cards.extend(cards);
        assert!(self.cards.len() <= 5);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

impl From<&Board> for Hand {
    fn from(board: &Board) -> Self {
        Hand::from(board.cards.clone())
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter) -> Result {
        for card in &self.cards {
            write!(f, "{} ", card)?;
        }
        Ok(())
    }
}

use super::card::Card;
use super::hand::Hand;
use std::fmt::{Display, Formatter, Result};
