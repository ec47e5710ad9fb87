use super::card::Card;

/// Hand is a bitstring of 52 bits
/// stored as a u64
/// each bit represents a card in the (unordered) set
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hand(u64);

impl Hand {
    pub fn empty() -> Self {
        Self(0)
    }
    pub fn add(lhs: Self, rhs: Self) -> Self {
        Self(lhs.0 | rhs.0)
    }
    pub fn contains(&self, card: &Card) -> bool {
        self.0 & u64::from(*card) != 0
    }
    pub fn size(&self) -> usize {
        self.0.count_ones() as usize
    }
}

/// u64 isomorphism
impl From<u64> for Hand {
    fn from(n: u64) -> Self {
        Self(n)
    }
}
impl From<Hand> for u64 {
    fn from(hand: Hand) -> Self {
        hand.0
    }
}

impl From<Card> for Hand {
    fn from(card: Card) -> Self {
        Self(u64::from(card))
    }
}

/// Vec<Card> isomorphism
/// we OR the cards to get the bitstring
impl From<Vec<Card>> for Hand {
    fn from(cards: Vec<Card>) -> Self {
        Self(cards.into_iter().fold(0, |h, c| h | u64::from(c)))
    }
}
/// we pluck the 1s out of the bitstring and convert them to cards
impl From<Hand> for Vec<Card> {
    fn from(hand: Hand) -> Self {
        let mut value = hand.0;
        let mut index = 0u8;
        let mut cards = Vec::new();
        while value != 0 {
            if value & 1 == 1 {
                cards.push(Card::from(index));
            }
            value = value >> 1;
            index = index + 1;
        }
        cards
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for card in Vec::<Card>::from(*self) {
            write!(f, "{} ", card)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::rank::Rank;
    use crate::cards::suit::Suit;

    #[test]
    fn union_and_membership() {
        let a = Hand::from(Card::from((Rank::Ace, Suit::Spade)));
        let k = Hand::from(Card::from((Rank::King, Suit::Heart)));
        let both = Hand::add(a, k);
        assert_eq!(both.size(), 2);
        assert!(both.contains(&Card::from((Rank::Ace, Suit::Spade))));
        assert!(!both.contains(&Card::from((Rank::Ace, Suit::Heart))));
    }
}
