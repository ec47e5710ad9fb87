use crate::Chips;
use crate::gameplay::action::Action;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// What the policy sees when deciding: the acting seat's view of the
/// betting state.
#[derive(Debug, Clone, Copy)]
pub struct BotView {
    pub current_bet: Chips,
    pub contribution: Chips,
    pub owed: Chips,
    pub minimum_raise: Chips,
    pub pot: Chips,
    pub stack: Chips,
}

/// Fixed mixed policy for bot seats: 30% fold, 40% check-or-call,
/// 30% bet-or-raise sized at max(minimum raise, half pot).
///
/// Seeded per table and kept apart from the shuffle RNG so tests can
/// replay bot lines without pinning the deal.
#[derive(Debug)]
pub struct Bot {
    rng: SmallRng,
}

impl Bot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn decide(&mut self, view: BotView) -> Action {
        match self.rng.random_range(0..10u32) {
            0..=2 => Action::Fold,
            3..=6 if view.owed == 0 => Action::Check,
            3..=6 if view.owed >= view.stack => Action::AllIn,
            3..=6 => Action::Call,
            _ => Self::aggress(view),
        }
    }

    /// the bet/raise branch, sizing clamped to the stack
    fn aggress(view: BotView) -> Action {
        let size = Self::sizing(view.minimum_raise, view.pot, view.stack);
        match view.current_bet {
            0 if size >= view.stack => Action::AllIn,
            0 => Action::Bet(size),
            bet => {
                let total = bet + size;
                if total - view.contribution >= view.stack {
                    Action::AllIn
                } else {
                    Action::Raise(total)
                }
            }
        }
    }

    pub fn sizing(minimum_raise: Chips, pot: Chips, stack: Chips) -> Chips {
        minimum_raise.max(pot / 2).min(stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_view(stack: Chips) -> BotView {
        BotView {
            current_bet: 0,
            contribution: 0,
            owed: 0,
            minimum_raise: 20,
            pot: 100,
            stack,
        }
    }

    #[test]
    fn sizing_takes_the_larger_of_min_raise_and_half_pot() {
        assert_eq!(Bot::sizing(20, 100, 1_000), 50);
        assert_eq!(Bot::sizing(80, 100, 1_000), 80);
        assert_eq!(Bot::sizing(20, 100, 30), 30);
    }

    #[test]
    fn deterministic_given_a_seed() {
        let mut a = Bot::new(42);
        let mut b = Bot::new(42);
        for _ in 0..100 {
            assert_eq!(a.decide(open_view(1_000)), b.decide(open_view(1_000)));
        }
    }

    #[test]
    fn bet_branch_sizes_at_half_pot() {
        let mut bot = Bot::new(42);
        let bet = (0..1_000)
            .map(|_| bot.decide(open_view(1_000)))
            .find(|a| matches!(a, Action::Bet(_)))
            .unwrap();
        assert_eq!(bet, Action::Bet(50));
    }

    #[test]
    fn mixture_roughly_matches_weights() {
        let mut bot = Bot::new(42);
        let mut folds = 0;
        let mut checks = 0;
        let mut bets = 0;
        for _ in 0..10_000 {
            match bot.decide(open_view(1_000)) {
                Action::Fold => folds += 1,
                Action::Check => checks += 1,
                _ => bets += 1,
            }
        }
        assert!((2_500..3_500).contains(&folds));
        assert!((3_500..4_500).contains(&checks));
        assert!((2_500..3_500).contains(&bets));
    }

    #[test]
    fn never_raises_beyond_the_stack() {
        let mut bot = Bot::new(7);
        for _ in 0..1_000 {
            let view = BotView {
                current_bet: 40,
                contribution: 10,
                owed: 30,
                minimum_raise: 20,
                pot: 200,
                stack: 55,
            };
            match bot.decide(view) {
                Action::Raise(total) => assert!(total - view.contribution < view.stack),
                Action::Bet(_) => panic!("cannot bet into an open bet"),
                _ => {}
            }
        }
    }
}
