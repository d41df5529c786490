use super::errors::DomainError;
use super::order::{NewOrder, OrderView};
use super::status::OrderStatus;

/// Storage for orders and their items. Implementations are blocking and are
/// driven from the async layer through the blocking thread pool.
pub trait OrderRepository: Send + Sync + 'static {
    /// Writes the order and all of its items as one unit.
    fn create(&self, order: NewOrder) -> Result<OrderView, DomainError>;
    /// Loads the order with its items and owning user.
    fn find_by_id(&self, id: i32) -> Result<Option<OrderView>, DomainError>;
    /// All orders of `user_id` with items, newest first.
    fn list_for_user(&self, user_id: i32) -> Result<Vec<OrderView>, DomainError>;
    /// Checks the lifecycle rules against the stored status and writes `next`.
    fn transition_status(&self, id: i32, next: OrderStatus) -> Result<OrderView, DomainError>;
}

/// Fan-out of committed status changes to whoever is tracking an order.
///
/// The in-process hub is the only implementation; a cross-instance relay would
/// plug in here.
pub trait StatusBroadcaster: Send + Sync + 'static {
    /// Returns how many subscribers the event was handed to.
    fn broadcast_status(&self, order_id: i32, status: OrderStatus) -> usize;
}
