use super::rank::Rank;

/// A poker hand's category, ordered ascending by strength.
///
/// Carries the ranks that define the category; kicker cards are kept
/// separately and break ties between equal categories.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub enum Ranking {
    HighCard(Rank),        // 4 kickers
    OnePair(Rank),         // 3 kickers
    TwoPair(Rank, Rank),   // 1 kicker
    ThreeOAK(Rank),        // 2 kickers
    Straight(Rank),        // 0 kickers
    Flush(Rank),           // 4 kickers
    FullHouse(Rank, Rank), // 0 kickers
    FourOAK(Rank),         // 1 kicker
    StraightFlush(Rank),   // 0 kickers
    RoyalFlush,            // unique
}

impl Ranking {
    pub fn n_kickers(&self) -> usize {
        match self {
            Ranking::HighCard(_) | Ranking::Flush(_) => 4,
            Ranking::OnePair(_) => 3,
            Ranking::ThreeOAK(_) => 2,
            Ranking::FourOAK(_) | Ranking::TwoPair(_, _) => 1,
            _ => 0,
        }
    }

    /// stable wire label for hand results
    pub fn label(&self) -> &'static str {
        match self {
            Ranking::HighCard(_) => "HIGH_CARD",
            Ranking::OnePair(_) => "ONE_PAIR",
            Ranking::TwoPair(..) => "TWO_PAIR",
            Ranking::ThreeOAK(_) => "THREE_OF_A_KIND",
            Ranking::Straight(_) => "STRAIGHT",
            Ranking::Flush(_) => "FLUSH",
            Ranking::FullHouse(..) => "FULL_HOUSE",
            Ranking::FourOAK(_) => "FOUR_OF_A_KIND",
            Ranking::StraightFlush(_) => "STRAIGHT_FLUSH",
            Ranking::RoyalFlush => "ROYAL_FLUSH",
        }
    }
}

impl std::fmt::Display for Ranking {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Ranking::HighCard(r) => write!(f, "HighCard      {} ", r),
            Ranking::OnePair(r) => write!(f, "OnePair       {} ", r),
            Ranking::TwoPair(r1, r2) => write!(f, "TwoPair       {}{}", r1, r2),
            Ranking::ThreeOAK(r) => write!(f, "ThreeOfAKind  {} ", r),
            Ranking::Straight(r) => write!(f, "Straight      {} ", r),
            Ranking::Flush(r) => write!(f, "Flush         {} ", r),
            Ranking::FullHouse(r1, r2) => write!(f, "FullHouse     {}{}", r1, r2),
            Ranking::FourOAK(r) => write!(f, "FourOfAKind   {} ", r),
            Ranking::StraightFlush(r) => write!(f, "StraightFlush {} ", r),
            Ranking::RoyalFlush => write!(f, "RoyalFlush      "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_order_ascending() {
        assert!(Ranking::OnePair(Rank::Ace) > Ranking::HighCard(Rank::Ace));
        assert!(Ranking::FullHouse(Rank::Two, Rank::Three) > Ranking::Flush(Rank::Ace));
        assert!(Ranking::Flush(Rank::Seven) > Ranking::Straight(Rank::Ace));
        assert!(Ranking::RoyalFlush > Ranking::StraightFlush(Rank::King));
    }

    #[test]
    fn ties_break_on_defining_ranks() {
        assert!(Ranking::TwoPair(Rank::Ace, Rank::King) > Ranking::TwoPair(Rank::Ace, Rank::Queen));
        assert!(Ranking::Straight(Rank::Seven) > Ranking::Straight(Rank::Five));
    }
}
