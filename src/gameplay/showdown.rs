use crate::Chips;
use crate::cards::strength::Strength;

/// Per-seat ledger entry for settling a hand.
///
/// `risked` is the seat's total commitment across every street of the
/// hand. Rewards start at zero and are filled in by settlement.
#[derive(Debug, Clone)]
pub struct Payout {
    pub seat: u8,
    pub reward: Chips,
    pub risked: Chips,
    pub folded: bool,
    pub strength: Option<Strength>,
}

impl From<(u8, Chips, bool, Option<Strength>)> for Payout {
    fn from((seat, risked, folded, strength): (u8, Chips, bool, Option<Strength>)) -> Self {
        Self {
            seat,
            reward: 0,
            risked,
            folded,
            strength,
        }
    }
}

/// Ephemeral structure that settles a hand by iterating commitment
/// levels from the strongest hand down, carving main and side pots out
/// of the shared ledger with no pot objects ever materialized.
///
/// Entries must arrive ordered clockwise from the dealer: odd chips go
/// to the earliest entry among tied winners.
pub struct Showdown {
    payouts: Vec<Payout>,
    rank: Option<Strength>,
    prev_stake: Chips,
}

impl From<Vec<Payout>> for Showdown {
    fn from(payouts: Vec<Payout>) -> Self {
        Self {
            payouts,
            rank: None,
            prev_stake: 0,
        }
    }
}

impl Showdown {
    pub fn settle(mut self) -> Vec<Payout> {
        while !self.is_complete() {
            match self.next_rank() {
                Some(rank) => {
                    self.rank = Some(rank);
                    while let Some(stake) = self.next_stake() {
                        self.distribute(stake);
                        self.prev_stake = stake;
                        if self.is_complete() {
                            break;
                        }
                    }
                }
                None => {
                    self.refund();
                    break;
                }
            }
        }
        self.payouts
    }

    fn is_complete(&self) -> bool {
        let staked = self.payouts.iter().map(|p| p.risked).sum::<Chips>();
        let reward = self.payouts.iter().map(|p| p.reward).sum::<Chips>();
        staked == reward
    }

    /// strongest remaining showdown hand strictly below the current rank
    fn next_rank(&self) -> Option<Strength> {
        self.payouts
            .iter()
            .filter(|p| !p.folded)
            .filter_map(|p| p.strength)
            .filter(|s| match self.rank {
                None => true,
                Some(rank) => *s < rank,
            })
            .max()
    }

    /// smallest commitment level above the settled floor among winners
    fn next_stake(&self) -> Option<Chips> {
        self.payouts
            .iter()
            .filter(|p| !p.folded)
            .filter(|p| p.strength == self.rank)
            .filter(|p| p.risked > self.prev_stake)
            .map(|p| p.risked)
            .min()
    }

    fn winnings(&self, stake: Chips) -> Chips {
        self.payouts
            .iter()
            .map(|p| p.risked.min(stake))
            .map(|s| s.saturating_sub(self.prev_stake))
            .sum()
    }

    fn distribute(&mut self, stake: Chips) {
        let winnings = self.winnings(stake);
        let prev_stake = self.prev_stake;
        let rank = self.rank;
        let mut winners = self
            .payouts
            .iter_mut()
            .filter(|p| !p.folded)
            .filter(|p| p.strength == rank)
            .filter(|p| p.risked > prev_stake)
            .collect::<Vec<&mut Payout>>();
        let share = winnings / winners.len() as Chips;
        let remainder = winnings as usize % winners.len();
        for winner in winners.iter_mut() {
            winner.reward += share;
        }
        for winner in winners.iter_mut().take(remainder) {
            winner.reward += 1;
        }
    }

    /// ranks exhausted with chips left over: give every seat back the
    /// undistributed remainder of its own stake
    fn refund(&mut self) {
        let distributed = self
            .payouts
            .iter()
            .map(|p| p.reward)
            .sum::<Chips>();
        let staked = self.payouts.iter().map(|p| p.risked).sum::<Chips>();
        let mut leftover = staked - distributed;
        for payout in self.payouts.iter_mut() {
            let back = payout.risked.saturating_sub(self.prev_stake).min(leftover);
            payout.reward += back;
            leftover -= back;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::card::Card;
    use crate::cards::hand::Hand;

    fn strength(cards: &[&str]) -> Option<Strength> {
        Some(
            Strength::try_from(Hand::from(
                cards
                    .iter()
                    .map(|s| Card::try_from(*s).unwrap())
                    .collect::<Vec<Card>>(),
            ))
            .unwrap(),
        )
    }

    fn rewards(payouts: Vec<Payout>) -> Vec<(u8, Chips)> {
        payouts.into_iter().map(|p| (p.seat, p.reward)).collect()
    }

    #[test]
    fn single_winner_scoops() {
        let nuts = strength(&["Ts", "Js", "Qs", "Ks", "As"]);
        let dud = strength(&["2s", "3d", "7h", "9c", "Jh"]);
        let settled = Showdown::from(vec![
            Payout::from((1, 50, false, nuts)),
            Payout::from((2, 50, false, dud)),
        ])
        .settle();
        assert_eq!(rewards(settled), vec![(1, 100), (2, 0)]);
    }

    #[test]
    fn folded_chips_go_to_the_winner() {
        let best = strength(&["As", "Ah", "Kd", "Kc", "2s"]);
        let worse = strength(&["Qs", "Qh", "Jd", "Tc", "2d"]);
        let settled = Showdown::from(vec![
            Payout::from((3, 100, false, best)),
            Payout::from((2, 100, false, worse)),
            Payout::from((1, 40, true, None)),
        ])
        .settle();
        assert_eq!(rewards(settled), vec![(3, 240), (2, 0), (1, 0)]);
    }

    #[test]
    fn short_stack_wins_main_pot_only() {
        let best = strength(&["As", "Ah", "Ad", "Kc", "Ks"]);
        let mid = strength(&["Ks", "Kh", "Qd", "Qc", "2s"]);
        let dud = strength(&["9s", "7h", "5d", "3c", "2d"]);
        let settled = Showdown::from(vec![
            Payout::from((1, 10, false, best)),
            Payout::from((2, 50, false, mid)),
            Payout::from((3, 50, false, dud)),
        ])
        .settle();
        // main pot 30 to the short stack, side pot 80 to the cover
        assert_eq!(rewards(settled), vec![(1, 30), (2, 80), (3, 0)]);
    }

    #[test]
    fn split_pot_shares_equally() {
        let even = strength(&["Ts", "Js", "Qs", "Ks", "9d"]);
        let same = strength(&["Th", "Jh", "Qh", "Kh", "9c"]);
        let settled = Showdown::from(vec![
            Payout::from((2, 50, false, even)),
            Payout::from((1, 50, false, same)),
        ])
        .settle();
        assert_eq!(rewards(settled), vec![(2, 50), (1, 50)]);
    }

    #[test]
    fn odd_chip_goes_to_earliest_clockwise_winner() {
        let even = strength(&["Ts", "Js", "Qs", "Ks", "9d"]);
        let same = strength(&["Th", "Jh", "Qh", "Kh", "9c"]);
        let settled = Showdown::from(vec![
            Payout::from((2, 50, false, even)),
            Payout::from((1, 50, false, same)),
            Payout::from((3, 1, true, None)),
        ])
        .settle();
        assert_eq!(rewards(settled), vec![(2, 51), (1, 50), (3, 0)]);
    }

    #[test]
    fn uncalled_bet_returns_to_its_owner() {
        let best = strength(&["As", "Ah", "Ad", "Kc", "Ks"]);
        let cover = strength(&["2s", "4h", "6d", "8c", "Th"]);
        let settled = Showdown::from(vec![
            Payout::from((1, 200, false, cover)),
            Payout::from((2, 120, false, best)),
        ])
        .settle();
        // the all-in wins what it covered; the overbet excess flows back
        assert_eq!(rewards(settled), vec![(1, 80), (2, 240)]);
    }

    #[test]
    fn chips_are_conserved() {
        let a = strength(&["As", "Ah", "Kd", "Qc", "Js"]);
        let b = strength(&["Ks", "Kh", "Qd", "Jc", "9s"]);
        let c = strength(&["Qs", "Qh", "Jd", "Tc", "8s"]);
        let payouts = vec![
            Payout::from((3, 75, false, a)),
            Payout::from((2, 120, false, b)),
            Payout::from((1, 120, true, None)),
            Payout::from((4, 9, false, c)),
        ];
        let staked = payouts.iter().map(|p| p.risked).sum::<Chips>();
        let settled = Showdown::from(payouts).settle();
        assert_eq!(settled.iter().map(|p| p.reward).sum::<Chips>(), staked);
    }
}
