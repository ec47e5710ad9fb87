use crate::Chips;
use crate::UserId;
use crate::cards::card::Card;
use crate::cards::hole::Hole;
use crate::cards::street::Street;
use crate::gameplay::action::Action;
use crate::gameplay::deal::Record;

/// A pot (or pot share) awarded at settlement.
#[derive(Debug, Clone)]
pub struct Winner {
    pub user: UserId,
    pub amount: Chips,
    pub category: Option<&'static str>,
}

/// Domain events produced by one table transition, in order.
/// The actor turns these into wire messages and side effects.
#[derive(Debug, Clone)]
pub enum Event {
    /// community cards revealed
    Dealt { street: Street, cards: Vec<Card> },
    /// a player action was accepted and applied
    Applied {
        seat: u8,
        user: UserId,
        action: Action,
        amount: Chips,
        auto: bool,
    },
    /// the action is on this seat
    TurnBegin { seat: u8, user: UserId, bot: bool },
    /// the hand settled: pots awarded, cards revealed, ledger archived
    Settled {
        pot: Chips,
        winners: Vec<Winner>,
        reveals: Vec<(UserId, Hole)>,
        board: Vec<Card>,
        history: Vec<Record>,
    },
    /// busted seats, worst finisher first
    Eliminated { order: Vec<UserId> },
    /// the hand was torn down and every stake returned
    Aborted { reason: String },
}
