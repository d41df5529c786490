//! OrderHub: per-order broadcast groups
//!
//! ```text
//! PUT /orders/{id}/status ──commit──▶ OrderService ──▶ OrderHub::broadcast_status
//!                                                        │
//!                     groups: "order_<id>" → {connection ids}
//!                                                        │
//!                     connections: id → mpsc sender ──▶ WS session ──▶ client
//! ```
//!
//! Membership lives in process memory only; nothing is persisted or replayed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::ports::StatusBroadcaster;
use crate::domain::status::OrderStatus;

pub type ConnectionId = u64;

/// Events queued per connection before further ones are dropped.
pub const CONNECTION_BUFFER: usize = 32;

/// Messages pushed to a realtime client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    OrderStatusUpdated { status: OrderStatus },
    JoinedOrderRoom { room: String },
    LeftOrderRoom { room: String },
    Error { message: String },
}

/// Messages a realtime client may send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientCommand {
    JoinOrderRoom {
        #[serde(rename = "orderId")]
        order_id: i32,
    },
    LeaveOrderRoom {
        #[serde(rename = "orderId")]
        order_id: i32,
    },
}

pub fn room_name(order_id: i32) -> String {
    format!("order_{order_id}")
}

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    connections: DashMap<ConnectionId, mpsc::Sender<ServerEvent>>,
    rooms: DashMap<String, DashSet<ConnectionId>>,
}

#[derive(Clone, Default)]
pub struct OrderHub {
    inner: Arc<HubInner>,
}

impl OrderHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection and returns the receiving end of its event queue.
    pub fn connect(&self) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::channel(CONNECTION_BUFFER);
        self.inner.connections.insert(id, tx);
        (id, rx)
    }

    /// Adds the connection to the order's room. Returns `false` when it was
    /// already a member or is no longer connected.
    pub fn join(&self, connection: ConnectionId, order_id: i32) -> bool {
        if !self.inner.connections.contains_key(&connection) {
            return false;
        }
        self.inner
            .rooms
            .entry(room_name(order_id))
            .or_default()
            .insert(connection)
    }

    pub fn leave(&self, connection: ConnectionId, order_id: i32) -> bool {
        let room = room_name(order_id);
        let removed = self
            .inner
            .rooms
            .get(&room)
            .map(|members| members.remove(&connection).is_some())
            .unwrap_or(false);
        self.inner.rooms.remove_if(&room, |_, members| members.is_empty());
        removed
    }

    /// Drops the connection from every room it joined.
    pub fn disconnect(&self, connection: ConnectionId) {
        self.inner.connections.remove(&connection);
        self.inner.rooms.retain(|_, members| {
            members.remove(&connection);
            !members.is_empty()
        });
    }

    pub fn member_count(&self, order_id: i32) -> usize {
        self.inner
            .rooms
            .get(&room_name(order_id))
            .map(|members| members.len())
            .unwrap_or(0)
    }

    /// Sends `event` once to every member of the order's room. A member whose
    /// queue is full misses the event.
    pub fn emit_to_room(&self, order_id: i32, event: &ServerEvent) -> usize {
        let Some(members) = self.inner.rooms.get(&room_name(order_id)) else {
            return 0;
        };
        members
            .iter()
            .filter(|id| {
                let Some(tx) = self.inner.connections.get(id.key()) else {
                    return false;
                };
                match tx.try_send(event.clone()) {
                    Ok(()) => true,
                    Err(TrySendError::Full(_)) => {
                        log::warn!("Connection {} is not draining, dropped event", id.key());
                        false
                    }
                    Err(TrySendError::Closed(_)) => false,
                }
            })
            .count()
    }
}

impl StatusBroadcaster for OrderHub {
    fn broadcast_status(&self, order_id: i32, status: OrderStatus) -> usize {
        let delivered = self.emit_to_room(order_id, &ServerEvent::OrderStatusUpdated { status });
        log::info!(
            "Broadcast {} to {} subscriber(s) of {}",
            status,
            delivered,
            room_name(order_id)
        );
        delivered
    }
}
