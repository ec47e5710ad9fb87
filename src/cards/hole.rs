#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Hole(Card, Card);

impl Hole {
    pub fn cards(&self) -> [Card; 2] {
        [self.0, self.1]
    }
}

impl From<(Card, Card)> for Hole {
    fn from((a, b): (Card, Card)) -> Self {
        Self(a, b)
    }
}

impl From<Hole> for Hand {
    fn from(hole: Hole) -> Self {
        Hand::add(Hand::from(hole.0), Hand::from(hole.1))
    }
}

impl Display for Hole {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{} {}", self.0, self.1)
    }
}

use super::card::Card;
use super::hand::Hand;
use std::fmt::{Display, Formatter, Result};
