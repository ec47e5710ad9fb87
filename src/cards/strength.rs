use super::evaluator::Evaluator;
use super::hand::Hand;
use super::kicks::Kickers;
use super::ranking::Ranking;

/// fewer than five cards cannot make a poker hand
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("evaluation requires at least five cards, got {0}")]
pub struct EvaluationError(pub usize);

/// A hand's strength.
///
/// Constructed from a Hand of five to seven cards. Ordered first by
/// Ranking, with Kickers breaking ties, so the derived Ord is the total
/// order over showdown hands.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub struct Strength {
    value: Ranking,
    kicks: Kickers,
}

impl Strength {
    pub fn value(&self) -> Ranking {
        self.value
    }
}

impl TryFrom<Hand> for Strength {
    type Error = EvaluationError;
    fn try_from(hand: Hand) -> Result<Self, Self::Error> {
        if hand.size() < 5 {
            return Err(EvaluationError(hand.size()));
        }
        let ref evaluator = Evaluator::from(hand);
        let value = evaluator.find_ranking();
        let kicks = evaluator.find_kickers(value);
        Ok(Self { value, kicks })
    }
}

impl From<(Ranking, Kickers)> for Strength {
    fn from((value, kicks): (Ranking, Kickers)) -> Self {
        Self { value, kicks }
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:<18}{:>5}", self.value, self.kicks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::card::Card;

    fn strength(cards: &[&str]) -> Strength {
        Strength::try_from(Hand::from(
            cards
                .iter()
                .map(|s| Card::try_from(*s).unwrap())
                .collect::<Vec<Card>>(),
        ))
        .unwrap()
    }

    #[test]
    fn too_few_cards() {
        let hand = Hand::from(vec![Card::try_from("As").unwrap()]);
        assert!(Strength::try_from(hand).is_err());
    }

    #[test]
    fn kickers_break_ties() {
        let a = strength(&["As", "Ah", "Kd", "Qc", "Js"]);
        let b = strength(&["Ad", "Ac", "Kh", "Qs", "Ts"]);
        assert!(a > b);
    }

    #[test]
    fn equal_hands_tie() {
        let a = strength(&["As", "Ah", "Kd", "Qc", "Js"]);
        let b = strength(&["Ad", "Ac", "Kh", "Qs", "Jd"]);
        assert_eq!(a, b);
    }

    #[test]
    fn total_order_is_transitive() {
        let a = strength(&["As", "Ah", "Kc", "Kd", "2s", "7h", "3c"]);
        let b = strength(&["7s", "7d", "2h", "2d", "3s", "Ac", "Kh"]);
        let c = strength(&["9s", "8h", "7c", "6d", "2c", "3h", "Ks"]);
        assert!(a >= b && b >= c && a >= c);
    }

    #[test]
    fn pocket_aces_on_paired_board() {
        use crate::cards::rank::Rank;
        use crate::cards::ranking::Ranking;
        let s = strength(&["As", "Ah", "7s", "7h", "2h", "2d", "3c"]);
        assert_eq!(s.value(), Ranking::TwoPair(Rank::Ace, Rank::Seven));
    }

    #[test]
    fn board_plays_when_hole_is_dead() {
        let hole_a = strength(&["2c", "3d", "Ts", "Js", "Qs", "Ks", "As"]);
        let hole_b = strength(&["7h", "8h", "Ts", "Js", "Qs", "Ks", "As"]);
        assert_eq!(hole_a, hole_b);
    }
}
