use crate::Chips;

/// Closed set of error kinds surfaced by the engine.
///
/// Betting errors are reported to the offending client only and never
/// mutate state. Transient errors are retried internally. Fatal errors
/// abort the current hand but leave the table alive.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("invalid action: {0}")]
    InvalidAction(String),
    #[error("raise to {total} is below the minimum raise of {minimum}")]
    BelowMinimumRaise { total: Chips, minimum: Chips },
    #[error("insufficient chips: need {need}, have {have}")]
    InsufficientChips { need: Chips, have: Chips },
    #[error("acting out of turn")]
    OutOfTurn,
    #[error("user is not registered")]
    NotRegistered,
    #[error("user is already registered")]
    AlreadyRegistered,
    #[error("tournament is full")]
    TournamentFull,
    #[error("invalid lifecycle transition: {0}")]
    InvalidState(String),
    #[error("not found")]
    NotFound,
    #[error("transient failure: {0}")]
    Transient(String),
    #[error("fatal invariant violation: {0}")]
    Fatal(String),
}

impl Error {
    /// stable wire code for the client-facing error message
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAction(_) => "invalid-action",
            Self::BelowMinimumRaise { .. } => "below-minimum-raise",
            Self::InsufficientChips { .. } => "insufficient-chips",
            Self::OutOfTurn => "out-of-turn",
            Self::NotRegistered => "not-registered",
            Self::AlreadyRegistered => "already-registered",
            Self::TournamentFull => "tournament-full",
            Self::InvalidState(_) => "invalid-state",
            Self::NotFound => "not-found",
            Self::Transient(_) => "transient",
            Self::Fatal(_) => "fatal",
        }
    }

    /// transient errors are worth retrying, everything else is not
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
