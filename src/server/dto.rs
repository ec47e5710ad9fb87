use crate::Chips;
use crate::TableId;
use crate::TournamentId;
use crate::UserId;
use crate::cards::card::Card;
use crate::error::{Error, Result};
use crate::gameplay::action::Action;
use crate::table::snapshot::TableState;
use serde::{Deserialize, Serialize};

/// Messages a client may push over the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    SubscribeTable {
        table_id: TableId,
    },
    UnsubscribeTable {
        table_id: TableId,
    },
    PlayerAction {
        table_id: TableId,
        action: String,
        #[serde(default)]
        amount: Chips,
    },
}

/// closed action vocabulary of the wire
pub fn parse_action(label: &str, amount: Chips) -> Result<Action> {
    match label {
        "FOLD" => Ok(Action::Fold),
        "CHECK" => Ok(Action::Check),
        "CALL" => Ok(Action::Call),
        "BET" => Ok(Action::Bet(amount)),
        "RAISE" => Ok(Action::Raise(amount)),
        "ALL_IN" => Ok(Action::AllIn),
        other => Err(Error::InvalidAction(format!("unknown action: {}", other))),
    }
}

/// admin HTTP body for tournament creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTournament {
    pub name: String,
    pub scheduled_start: u64,
    pub max_players: u32,
    pub seats_per_table: u8,
    pub starting_chips: Chips,
    pub blind_levels: Vec<crate::tournament::schedule::BlindLevel>,
    pub prize_places: u32,
}

/// admin HTTP body for registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinnerDto {
    pub user_id: UserId,
    pub amount: Chips,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealDto {
    pub user_id: UserId,
    pub cards: [Card; 2],
}

/// Messages the server pushes to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    TableState(TableState),
    TurnBegin {
        table_id: TableId,
        user_id: UserId,
        deadline_epoch_ms: u64,
        duration_ms: u64,
    },
    ActionApplied {
        table_id: TableId,
        user_id: UserId,
        action: String,
        amount: Chips,
        auto: bool,
    },
    HandResult {
        table_id: TableId,
        winners: Vec<WinnerDto>,
        reveals: Vec<RevealDto>,
    },
    TournamentState {
        id: TournamentId,
        status: String,
        current_blind_level: usize,
        remaining_players: u32,
    },
    Error {
        code: String,
        message: String,
    },
}

impl From<&Error> for ServerMessage {
    fn from(e: &Error) -> Self {
        ServerMessage::Error {
            code: e.code().to_string(),
            message: e.to_string(),
        }
    }
}

impl ServerMessage {
    pub fn json(&self) -> String {
        serde_json::to_string(self).expect("wire messages serialize")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_parse() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"subscribe-table","table_id":3}"#).unwrap();
        assert!(matches!(msg, ClientMessage::SubscribeTable { table_id: 3 }));
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"player-action","table_id":3,"action":"RAISE","amount":40}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::PlayerAction { action, amount, .. } => {
                assert_eq!(parse_action(&action, amount).unwrap(), Action::Raise(40));
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn amount_defaults_to_zero() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"player-action","table_id":1,"action":"FOLD"}"#)
                .unwrap();
        match msg {
            ClientMessage::PlayerAction { action, amount, .. } => {
                assert_eq!(parse_action(&action, amount).unwrap(), Action::Fold);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn unknown_actions_are_rejected() {
        assert!(parse_action("STRADDLE", 0).is_err());
    }

    #[test]
    fn server_messages_are_tagged() {
        let json = ServerMessage::TurnBegin {
            table_id: 1,
            user_id: 2,
            deadline_epoch_ms: 3,
            duration_ms: 4,
        }
        .json();
        assert!(json.contains(r#""type":"turn-begin""#));
        assert!(json.contains(r#""deadline_epoch_ms":3"#));
    }
}
