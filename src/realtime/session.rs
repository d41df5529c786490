//! WebSocket session bridging one client connection to the [`OrderHub`].

use std::time::{Duration, Instant};

use actix_ws::{Message, MessageStream, Session};
use futures_util::StreamExt;

use super::hub::{room_name, ClientCommand, ConnectionId, OrderHub, ServerEvent};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Applies one text frame from the client and returns the reply to send.
pub fn handle_command(hub: &OrderHub, connection: ConnectionId, text: &str) -> ServerEvent {
    match serde_json::from_str::<ClientCommand>(text) {
        Ok(ClientCommand::JoinOrderRoom { order_id }) => {
            // Any client that knows an order id may track it.
            hub.join(connection, order_id);
            ServerEvent::JoinedOrderRoom {
                room: room_name(order_id),
            }
        }
        Ok(ClientCommand::LeaveOrderRoom { order_id }) => {
            hub.leave(connection, order_id);
            ServerEvent::LeftOrderRoom {
                room: room_name(order_id),
            }
        }
        Err(e) => ServerEvent::Error {
            message: format!("unrecognised message: {e}"),
        },
    }
}

async fn send_event(session: &mut Session, event: &ServerEvent) -> Result<(), actix_ws::Closed> {
    match serde_json::to_string(event) {
        Ok(text) => session.text(text).await,
        Err(e) => {
            log::error!("Failed to encode realtime event: {}", e);
            Ok(())
        }
    }
}

/// Runs until the client goes away, then removes it from every room.
pub async fn run_session(hub: OrderHub, mut session: Session, mut messages: MessageStream) {
    let (connection, mut events) = hub.connect();
    log::debug!("Realtime connection {} opened", connection);

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await; // skip immediate
    let mut last_seen = Instant::now();

    let close_reason = loop {
        tokio::select! {
            msg = messages.next() => {
                last_seen = Instant::now();
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_command(&hub, connection, &text);
                        if send_event(&mut session, &reply).await.is_err() {
                            break None;
                        }
                    }
                    Some(Ok(Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            break None;
                        }
                    }
                    Some(Ok(Message::Close(reason))) => break reason,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        log::warn!("Realtime connection {} protocol error: {}", connection, e);
                        break None;
                    }
                    None => break None,
                }
            }

            Some(event) = events.recv() => {
                if send_event(&mut session, &event).await.is_err() {
                    break None;
                }
            }

            _ = heartbeat.tick() => {
                if last_seen.elapsed() > CLIENT_TIMEOUT {
                    log::debug!("Realtime connection {} timed out", connection);
                    break None;
                }
                if session.ping(b"").await.is_err() {
                    break None;
                }
            }
        }
    };

    hub.disconnect(connection);
    let _ = session.close(close_reason).await;
    log::debug!("Realtime connection {} closed", connection);
}
