use super::card::Card;
use super::hole::Hole;
use super::street::Street;
use crate::error::{Error, Result};
use rand::seq::SliceRandom;

/// A dealing deck. The top of the deck is the back of the vector.
///
/// Created freshly shuffled for every deal from an OS-seeded generator,
/// never from the bot policy RNG. Mutable only by drawing.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>, // presize
}

impl Deck {
    /// uniformly shuffled 52-card permutation, securely seeded per deal
    pub fn shuffled() -> Deck {
        let mut cards = (0u8..52).map(Card::from).collect::<Vec<Card>>();
        cards.shuffle(&mut rand::rng());
        Deck { cards }
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// two passes of n: position 1 gets the 1st and the (n+1)th card
    pub fn holes(&mut self, n: usize) -> Result<Vec<Hole>> {
        let first = (0..n).map(|_| self.draw()).collect::<Result<Vec<_>>>()?;
        let second = (0..n).map(|_| self.draw()).collect::<Result<Vec<_>>>()?;
        Ok(first
            .into_iter()
            .zip(second)
            .map(Hole::from)
            .collect())
    }

    /// burn one, then reveal this street's cards
    pub fn reveal(&mut self, street: Street) -> Result<Vec<Card>> {
        match street {
            Street::Preflop => Err(Error::Fatal("no cards revealed preflop".into())),
            street => {
                self.burn()?;
                (0..street.n_revealed()).map(|_| self.draw()).collect()
            }
        }
    }

    fn burn(&mut self) -> Result<()> {
        self.draw().map(|_| ())
    }

    fn draw(&mut self) -> Result<Card> {
        self.cards
            .pop()
            .ok_or_else(|| Error::Fatal("deck exhausted".into()))
    }
}

/// rigged decks for tests; the first card is dealt first
impl From<Vec<Card>> for Deck {
    fn from(mut cards: Vec<Card>) -> Self {
        cards.reverse();
        Self { cards }
    }
}
