use super::action::Action;
use crate::Chips;
use crate::UserId;
use crate::cards::hole::Hole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Active,
    Folded,
    AllIn,
    SittingOut,
    Eliminated,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "ACTIVE",
            Status::Folded => "FOLDED",
            Status::AllIn => "ALL_IN",
            Status::SittingOut => "SITTING_OUT",
            Status::Eliminated => "ELIMINATED",
        }
    }
}

impl TryFrom<&str> for Status {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "ACTIVE" => Ok(Status::Active),
            "FOLDED" => Ok(Status::Folded),
            "ALL_IN" => Ok(Status::AllIn),
            "SITTING_OUT" => Ok(Status::SittingOut),
            "ELIMINATED" => Ok(Status::Eliminated),
            other => Err(format!("invalid seat status: {}", other)),
        }
    }
}

/// A seat at one table: who sits there, with how many chips, in what state.
#[derive(Debug, Clone)]
pub struct Seat {
    number: u8,
    user: UserId,
    name: String,
    bot: bool,
    chips: Chips,
    status: Status,
    hole: Option<Hole>,
    last: Option<Action>,
}

impl Seat {
    pub fn new(number: u8, user: UserId, name: String, bot: bool, chips: Chips) -> Self {
        Self {
            number,
            user,
            name,
            bot,
            chips,
            status: if chips > 0 {
                Status::Active
            } else {
                Status::Eliminated
            },
            hole: None,
            last: None,
        }
    }

    pub fn number(&self) -> u8 {
        self.number
    }
    pub fn user(&self) -> UserId {
        self.user
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn is_bot(&self) -> bool {
        self.bot
    }
    pub fn chips(&self) -> Chips {
        self.chips
    }
    pub fn status(&self) -> Status {
        self.status
    }
    pub fn hole(&self) -> Option<Hole> {
        self.hole
    }
    pub fn last(&self) -> Option<Action> {
        self.last
    }

    /// seat is dealt into the next hand
    pub fn is_dealt_in(&self) -> bool {
        self.status != Status::Eliminated && self.status != Status::SittingOut && self.chips > 0
    }
    /// seat still holds live cards this hand
    pub fn is_live(&self) -> bool {
        matches!(self.status, Status::Active | Status::AllIn)
    }
    /// seat may still be asked to act this hand
    pub fn can_act(&self) -> bool {
        self.status == Status::Active && self.chips > 0
    }

    /// deduct up to `amount`, capped by the stack; returns the deduction
    pub fn pay(&mut self, amount: Chips) -> Chips {
        let paid = amount.min(self.chips);
        self.chips -= paid;
        if self.chips == 0 && self.status == Status::Active {
            self.status = Status::AllIn;
        }
        paid
    }
    pub fn win(&mut self, amount: Chips) {
        self.chips += amount;
    }

    pub fn fold(&mut self) {
        self.status = Status::Folded;
    }
    pub fn eliminate(&mut self) {
        self.status = Status::Eliminated;
    }
    pub fn sit_out(&mut self) {
        self.status = Status::SittingOut;
    }
    pub fn record(&mut self, action: Action) {
        self.last = Some(action);
    }

    /// fresh hand: restore live status, take new hole cards
    pub fn reset(&mut self, hole: Option<Hole>) {
        self.hole = hole;
        self.last = None;
        if self.chips > 0 && self.status != Status::SittingOut {
            self.status = Status::Active;
        } else if self.chips == 0 {
            self.status = Status::Eliminated;
        }
    }

    /// relocation to another table keeps the player and stack
    pub fn renumber(&mut self, number: u8) {
        self.number = number;
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "#{:<2} u{:<6} {:>8} {}", self.number, self.user, self.chips, self.status.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pay_caps_at_stack_and_shoves() {
        let mut seat = Seat::new(1, 7, "p".into(), false, 50);
        assert_eq!(seat.pay(80), 50);
        assert_eq!(seat.chips(), 0);
        assert_eq!(seat.status(), Status::AllIn);
    }

    #[test]
    fn reset_revives_folded_with_chips() {
        let mut seat = Seat::new(2, 8, "q".into(), false, 100);
        seat.fold();
        seat.reset(None);
        assert_eq!(seat.status(), Status::Active);
    }

    #[test]
    fn reset_eliminates_broke_seats() {
        let mut seat = Seat::new(3, 9, "r".into(), false, 10);
        seat.pay(10);
        seat.reset(None);
        assert_eq!(seat.status(), Status::Eliminated);
    }
}
