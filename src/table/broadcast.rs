use super::table::Table;
use crate::SessionId;
use crate::UserId;
use crate::server::dto::ServerMessage;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;

/// One subscribed session: possibly a seated player, possibly a pure
/// spectator. The channel carries serialized wire messages.
#[derive(Debug)]
struct Subscriber {
    user: Option<UserId>,
    tx: UnboundedSender<String>,
}

/// Per-table fan-out. Delivery is at-most-once per subscriber per
/// event, in transition order; a dead channel drops its subscriber.
#[derive(Debug, Default)]
pub struct Subscribers {
    subs: HashMap<SessionId, Subscriber>,
}

impl Subscribers {
    pub fn subscribe(&mut self, session: SessionId, user: Option<UserId>, tx: UnboundedSender<String>) {
        self.subs.insert(session, Subscriber { user, tx });
    }

    pub fn unsubscribe(&mut self, session: SessionId) {
        self.subs.remove(&session);
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    /// the same message to every subscriber
    pub fn send(&mut self, message: &ServerMessage) {
        let json = message.json();
        self.subs.retain(|session, sub| {
            sub.tx
                .send(json.clone())
                .inspect_err(|_| log::debug!("dropping dead subscriber {}", session))
                .is_ok()
        });
    }

    /// a message to one session only
    pub fn send_to(&mut self, session: SessionId, message: &ServerMessage) {
        if let Some(sub) = self.subs.get(&session) {
            if sub.tx.send(message.json()).is_err() {
                self.subs.remove(&session);
            }
        }
    }

    /// the authoritative snapshot, redacted per recipient
    pub fn send_state(&mut self, table: &Table) {
        self.subs.retain(|session, sub| {
            let state = ServerMessage::TableState(table.state(sub.user));
            sub.tx
                .send(state.json())
                .inspect_err(|_| log::debug!("dropping dead subscriber {}", session))
                .is_ok()
        });
    }

    /// snapshot for a single (usually fresh) subscriber
    pub fn send_state_to(&mut self, session: SessionId, table: &Table) {
        if let Some(sub) = self.subs.get(&session) {
            let state = ServerMessage::TableState(table.state(sub.user));
            if sub.tx.send(state.json()).is_err() {
                self.subs.remove(&session);
            }
        }
    }
}
