use super::round::Round;
use crate::Chips;
use crate::cards::board::Board;
use crate::cards::card::Card;
use crate::cards::deck::Deck;
use crate::cards::street::Street;
use crate::error::Result;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// One line of the hand's action log, archived at settlement.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Record {
    pub street: Street,
    pub seat: u8,
    pub action: String,
    pub amount: Chips,
    pub auto: bool,
}

/// Per-deal state of one table: everything created when cards hit the
/// felt and destroyed when the pot is awarded.
#[derive(Debug)]
pub struct Deal {
    pub number: u64,
    pub street: Street,
    pub board: Board,
    pub pot: Chips,
    pub dealer: u8,
    pub sb: u8,
    pub bb: u8,
    pub turn: Option<u8>,
    pub round: Round,
    /// seat numbers dealt into this hand, fixed at the deal
    pub players: Vec<u8>,
    /// stacks at the moment of the deal, before blinds
    pub starting: BTreeMap<u8, Chips>,
    deck: Deck,
    acted: BTreeSet<u8>,
    committed: BTreeMap<u8, Chips>,
    pub history: Vec<Record>,
}

impl Deal {
    pub fn new(number: u64, deck: Deck, round: Round, dealer: u8, sb: u8, bb: u8) -> Self {
        Self {
            number,
            street: Street::Preflop,
            board: Board::empty(),
            pot: 0,
            dealer,
            sb,
            bb,
            turn: None,
            round,
            players: Vec::new(),
            starting: BTreeMap::new(),
            deck,
            acted: BTreeSet::new(),
            committed: BTreeMap::new(),
            history: Vec::new(),
        }
    }

    pub fn deck(&mut self) -> &mut Deck {
        &mut self.deck
    }

    /// chips a seat has committed across the whole hand
    pub fn committed(&self, seat: u8) -> Chips {
        self.committed.get(&seat).copied().unwrap_or(0)
    }
    pub fn commit(&mut self, seat: u8, delta: Chips) {
        *self.committed.entry(seat).or_insert(0) += delta;
    }

    pub fn has_acted(&self, seat: u8) -> bool {
        self.acted.contains(&seat)
    }
    pub fn mark_acted(&mut self, seat: u8) {
        self.acted.insert(seat);
    }
    /// a bet or full raise resets the obligation of everyone else
    pub fn reopen(&mut self, seat: u8) {
        self.acted.clear();
        self.acted.insert(seat);
    }

    /// street betting is over: sweep contributions into the pot
    pub fn collect(&mut self) {
        self.pot += self.round.take_contributions().values().sum::<Chips>();
        self.acted.clear();
        self.turn = None;
    }

    /// burn and reveal the next street's community cards
    pub fn advance(&mut self) -> Result<(Street, Vec<Card>)> {
        let street = self
            .street
            .next()
            .ok_or_else(|| crate::error::Error::Fatal("no street after the river".into()))?;
        let cards = self.deck.reveal(street)?;
        self.board.add(cards.iter().copied());
        self.street = street;
        Ok((street, cards))
    }

    /// everything in the middle, collected or not
    pub fn chips_in_play(&self) -> Chips {
        self.committed.values().sum()
    }

    pub fn record(&mut self, seat: u8, action: &str, amount: Chips, auto: bool) {
        self.history.push(Record {
            street: self.street,
            seat,
            action: action.to_string(),
            amount,
            auto,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_walks_the_streets() {
        let mut deal = Deal::new(1, Deck::shuffled(), Round::new(1, 2), 3, 2, 1);
        let (street, cards) = deal.advance().unwrap();
        assert_eq!(street, Street::Flop);
        assert_eq!(cards.len(), 3);
        let (street, cards) = deal.advance().unwrap();
        assert_eq!(street, Street::Turn);
        assert_eq!(cards.len(), 1);
        let (street, _) = deal.advance().unwrap();
        assert_eq!(street, Street::River);
        assert_eq!(deal.board.cards().len(), 5);
        assert!(deal.advance().is_err());
    }

    #[test]
    fn reopen_clears_prior_actors() {
        let mut deal = Deal::new(1, Deck::shuffled(), Round::new(1, 2), 3, 2, 1);
        deal.mark_acted(3);
        deal.mark_acted(2);
        deal.reopen(1);
        assert!(deal.has_acted(1));
        assert!(!deal.has_acted(3));
    }
}
