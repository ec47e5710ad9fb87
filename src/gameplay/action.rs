#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Fold,
    Check,
    Call,
    Bet(Chips),
    Raise(Chips),
    AllIn,
}

impl Action {
    /// stable wire label
    pub fn label(&self) -> &'static str {
        match self {
            Action::Fold => "FOLD",
            Action::Check => "CHECK",
            Action::Call => "CALL",
            Action::Bet(_) => "BET",
            Action::Raise(_) => "RAISE",
            Action::AllIn => "ALL_IN",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Action::Fold => write!(f, "{}", "FOLD".red()),
            Action::Check => write!(f, "{}", "CHECK".cyan()),
            Action::Call => write!(f, "{}", "CALL".yellow()),
            Action::Bet(amount) => write!(f, "{}", format!("BET   {}", amount).green()),
            Action::Raise(total) => write!(f, "{}", format!("RAISE {}", total).green()),
            Action::AllIn => write!(f, "{}", "ALLIN".magenta()),
        }
    }
}

use crate::Chips;
use colored::*;
use std::fmt::{Display, Formatter, Result};
