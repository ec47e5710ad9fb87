use super::schedule::BlindSchedule;
use crate::Chips;
use crate::TournamentId;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Scheduled,
    Registering,
    Seated,
    Running,
    Completed,
    Cancelled,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Scheduled => "SCHEDULED",
            Status::Registering => "REGISTERING",
            Status::Seated => "SEATED",
            Status::Running => "RUNNING",
            Status::Completed => "COMPLETED",
            Status::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Cancelled)
    }
}

impl TryFrom<&str> for Status {
    type Error = String;
    fn try_from(s: &str) -> std::result::Result<Self, String> {
        match s {
            "SCHEDULED" => Ok(Status::Scheduled),
            "REGISTERING" => Ok(Status::Registering),
            "SEATED" => Ok(Status::Seated),
            "RUNNING" => Ok(Status::Running),
            "COMPLETED" => Ok(Status::Completed),
            "CANCELLED" => Ok(Status::Cancelled),
            other => Err(format!("invalid tournament status: {}", other)),
        }
    }
}

/// The tournament record. Lifecycle only ever moves forward:
/// SCHEDULED -> REGISTERING -> SEATED -> RUNNING -> COMPLETED | CANCELLED.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub scheduled_start: u64,
    pub actual_start: Option<u64>,
    pub max_players: u32,
    pub seats_per_table: u8,
    pub starting_chips: Chips,
    pub schedule: BlindSchedule,
    pub prize_places: u32,
    pub status: Status,
}

impl Tournament {
    pub fn validate(&self) -> Result<()> {
        if !(2..=10).contains(&self.seats_per_table) {
            return Err(Error::InvalidState(format!(
                "seats per table must be 2..=10, got {}",
                self.seats_per_table
            )));
        }
        if self.starting_chips == 0 {
            return Err(Error::InvalidState("starting chips must be positive".into()));
        }
        if self.prize_places == 0 {
            return Err(Error::InvalidState("at least one prize place".into()));
        }
        if self.max_players < 2 {
            return Err(Error::InvalidState("at least two players".into()));
        }
        Ok(())
    }

    /// forward-only lifecycle steps; terminal states never resume
    pub fn advance(&mut self, to: Status) -> Result<()> {
        let legal = match (self.status, to) {
            (Status::Scheduled, Status::Registering) => true,
            (Status::Registering, Status::Seated) => true,
            (Status::Seated, Status::Running) => true,
            (Status::Running, Status::Completed) => true,
            (from, Status::Cancelled) => !from.is_terminal(),
            _ => false,
        };
        if legal {
            self.status = to;
            Ok(())
        } else {
            Err(Error::InvalidState(format!(
                "{} -> {}",
                self.status.as_str(),
                to.as_str()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::schedule::BlindLevel;

    fn tournament() -> Tournament {
        Tournament {
            id: 1,
            name: "nightly".into(),
            scheduled_start: 0,
            actual_start: None,
            max_players: 18,
            seats_per_table: 6,
            starting_chips: 1_000,
            schedule: BlindSchedule::new(vec![BlindLevel::from((1, 2, None))]).unwrap(),
            prize_places: 3,
            status: Status::Scheduled,
        }
    }

    #[test]
    fn lifecycle_moves_forward_only() {
        let mut t = tournament();
        assert!(t.advance(Status::Running).is_err());
        t.advance(Status::Registering).unwrap();
        t.advance(Status::Seated).unwrap();
        t.advance(Status::Running).unwrap();
        t.advance(Status::Completed).unwrap();
        assert!(t.advance(Status::Cancelled).is_err());
    }

    #[test]
    fn cancel_from_any_live_state() {
        let mut t = tournament();
        t.advance(Status::Cancelled).unwrap();
        assert!(t.advance(Status::Registering).is_err());
    }

    #[test]
    fn validation_bounds() {
        let mut t = tournament();
        t.seats_per_table = 11;
        assert!(t.validate().is_err());
        t.seats_per_table = 6;
        t.starting_chips = 0;
        assert!(t.validate().is_err());
    }
}
