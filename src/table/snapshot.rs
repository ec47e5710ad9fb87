use super::table::Table;
use crate::Chips;
use crate::TableId;
use crate::TournamentId;
use crate::UserId;
use crate::cards::card::Card;

/// One seat as a viewer sees it. Hole cards survive redaction only in
/// the copy sent to their owner.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SeatState {
    pub seat_number: u8,
    pub user_id: UserId,
    pub display_name: String,
    pub chips: Chips,
    pub status: String,
    pub contribution_this_round: Chips,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole_cards: Option<[Card; 2]>,
}

/// Authoritative per-viewer snapshot of one table.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TableState {
    pub table_id: TableId,
    pub tournament_id: TournamentId,
    pub table_number: u32,
    pub street: String,
    pub pot: Chips,
    pub current_bet: Chips,
    pub minimum_raise: Chips,
    pub small_blind: Chips,
    pub big_blind: Chips,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealer_seat: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sb_seat: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bb_seat: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_turn_seat: Option<u8>,
    pub community_cards: Vec<Card>,
    pub seats: Vec<SeatState>,
}

impl Table {
    /// snapshot redacted for `viewer`: only the viewer's own hole
    /// cards survive; spectators see none at all
    pub fn state(&self, viewer: Option<UserId>) -> TableState {
        let deal = self.deal();
        let (small_blind, big_blind) = match deal {
            Some(deal) => (deal.round.small_blind(), deal.round.big_blind()),
            None => self.blinds(),
        };
        TableState {
            table_id: self.id(),
            tournament_id: self.tournament(),
            table_number: self.number(),
            street: match deal {
                Some(deal) => deal.street.to_string().to_uppercase(),
                None => "IDLE".to_string(),
            },
            pot: deal.map(|d| d.pot).unwrap_or(0),
            current_bet: deal.map(|d| d.round.current_bet()).unwrap_or(0),
            minimum_raise: deal.map(|d| d.round.minimum_raise()).unwrap_or(big_blind),
            small_blind,
            big_blind,
            dealer_seat: deal.map(|d| d.dealer),
            sb_seat: deal.map(|d| d.sb),
            bb_seat: deal.map(|d| d.bb),
            current_turn_seat: deal.and_then(|d| d.turn),
            community_cards: deal.map(|d| d.board.cards().to_vec()).unwrap_or_default(),
            seats: self
                .seats()
                .values()
                .map(|seat| SeatState {
                    seat_number: seat.number(),
                    user_id: seat.user(),
                    display_name: seat.name().to_string(),
                    chips: seat.chips(),
                    status: seat.status().as_str().to_string(),
                    contribution_this_round: deal
                        .map(|d| d.round.contribution(seat.number()))
                        .unwrap_or(0),
                    hole_cards: match viewer {
                        Some(user) if user == seat.user() => seat.hole().map(|h| h.cards()),
                        _ => None,
                    },
                })
                .collect(),
        }
    }
}
