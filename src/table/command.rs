use crate::Chips;
use crate::SessionId;
use crate::UserId;
use crate::error::Result;
use crate::gameplay::action::Action;
use crate::gameplay::seat::Seat;
use crate::server::dto::ServerMessage;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

/// Which seat a donor table gives up during consolidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeRule {
    /// breaking table: any remaining seat
    Any,
    /// balance move: the seat next clockwise from the last big blind
    BigBlindOut,
}

/// Inbound mailbox of a table actor. FIFO; one command is fully
/// applied (state, broadcast, timers) before the next is read.
#[derive(Debug)]
pub enum Command {
    /// deal the next hand
    Deal,
    /// blinds for the next hand, pushed by the controller
    SetBlinds {
        level: usize,
        small_blind: Chips,
        big_blind: Chips,
    },
    /// a player action from a client session
    Act {
        session: SessionId,
        user: UserId,
        action: Action,
    },
    /// turn clock fired; stale epochs are discarded
    Timeout { epoch: u64 },
    Subscribe {
        session: SessionId,
        user: Option<UserId>,
        tx: UnboundedSender<String>,
    },
    Unsubscribe { session: SessionId },
    /// fan a prebuilt message out to all subscribers
    Broadcast { message: ServerMessage },
    /// consolidation: place a relocated player, lowest vacant seat
    AddSeat {
        seat: Seat,
        reply: oneshot::Sender<Result<u8>>,
    },
    /// consolidation: give up a seat, between hands only
    TakeSeat {
        rule: TakeRule,
        reply: oneshot::Sender<Option<Seat>>,
    },
    Shutdown,
}
