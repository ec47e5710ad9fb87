use crate::SessionId;
use crate::TableId;
use crate::UserId;
use crate::error::Error;
use crate::server::dto::ClientMessage;
use crate::server::dto::ServerMessage;
use crate::server::dto::parse_action;
use crate::server::lobby::Registry;
use crate::table::command::Command;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// Bridges one WebSocket connection to the table actors. Inbound
/// frames are parsed and routed through the registry; outbound
/// messages flow from table broadcasts into the socket. On disconnect
/// every subscription is withdrawn.
pub fn bridge(
    registry: Arc<Registry>,
    session_id: SessionId,
    user: Option<UserId>,
    mut session: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
) {
    let (tx, mut rx) = unbounded_channel::<String>();
    actix_web::rt::spawn(async move {
        use futures::StreamExt;
        let mut subscribed: Vec<TableId> = Vec::new();
        'sesh: loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Some(json) => if session.text(json).await.is_err() { break 'sesh },
                    None => break 'sesh,
                },
                msg = stream.next() => match msg {
                    Some(Ok(actix_ws::Message::Text(text))) => {
                        inbound(&registry, session_id, user, &tx, &mut subscribed, &text);
                    }
                    Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                    Some(Err(_)) => break 'sesh,
                    None => break 'sesh,
                    _ => continue 'sesh,
                },
            }
        }
        for table in subscribed {
            if let Some(table_tx) = registry.get(table) {
                let _ = table_tx.send(Command::Unsubscribe { session: session_id });
            }
        }
        log::info!("session {} disconnected", session_id);
    });
}

fn inbound(
    registry: &Registry,
    session_id: SessionId,
    user: Option<UserId>,
    tx: &UnboundedSender<String>,
    subscribed: &mut Vec<TableId>,
    text: &str,
) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            let error = Error::InvalidAction(format!("unparseable message: {}", e));
            let _ = tx.send(ServerMessage::from(&error).json());
            return;
        }
    };
    match message {
        ClientMessage::SubscribeTable { table_id } => match registry.get(table_id) {
            Some(table) => {
                let _ = table.send(Command::Subscribe {
                    session: session_id,
                    user,
                    tx: tx.clone(),
                });
                if !subscribed.contains(&table_id) {
                    subscribed.push(table_id);
                }
            }
            None => {
                let _ = tx.send(ServerMessage::from(&Error::NotFound).json());
            }
        },
        ClientMessage::UnsubscribeTable { table_id } => {
            if let Some(table) = registry.get(table_id) {
                let _ = table.send(Command::Unsubscribe { session: session_id });
            }
            subscribed.retain(|t| *t != table_id);
        }
        ClientMessage::PlayerAction {
            table_id,
            action,
            amount,
        } => {
            let action = match parse_action(&action, amount) {
                Ok(action) => action,
                Err(ref e) => {
                    let _ = tx.send(ServerMessage::from(e).json());
                    return;
                }
            };
            match (registry.get(table_id), user) {
                (Some(table), Some(user)) => {
                    let _ = table.send(Command::Act {
                        session: session_id,
                        user,
                        action,
                    });
                }
                (None, _) => {
                    let _ = tx.send(ServerMessage::from(&Error::NotFound).json());
                }
                (_, None) => {
                    let _ = tx.send(ServerMessage::from(&Error::OutOfTurn).json());
                }
            }
        }
    }
}
