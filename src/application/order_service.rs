use std::sync::Arc;

use actix_web::web;
use bigdecimal::BigDecimal;

use crate::domain::access::Requester;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, OrderItemInput, OrderView};
use crate::domain::ports::{OrderRepository, StatusBroadcaster};
use crate::domain::status::OrderStatus;
use crate::payment::{PaymentHandle, PaymentProof, PaymentVerifier};

pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    verifier: PaymentVerifier,
    broadcaster: Arc<dyn StatusBroadcaster>,
}

impl OrderService {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        verifier: PaymentVerifier,
        broadcaster: Arc<dyn StatusBroadcaster>,
    ) -> Self {
        Self {
            repo,
            verifier,
            broadcaster,
        }
    }

    /// Runs a blocking repository call on the blocking thread pool.
    async fn with_repo<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&dyn OrderRepository) -> Result<T, DomainError> + Send + 'static,
        T: Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        web::block(move || f(repo.as_ref()))
            .await
            .map_err(|e| DomainError::Persistence(e.to_string()))?
    }

    pub async fn create_payment_handle(
        &self,
        user_id: i32,
        amount: &BigDecimal,
    ) -> Result<PaymentHandle, DomainError> {
        self.verifier.create_payment_handle(user_id, amount).await
    }

    /// Creates an order atomically, optionally gated on a verified payment.
    ///
    /// Validation and payment verification both happen before any write; a
    /// failure in either leaves the store untouched.
    pub async fn create_order(
        &self,
        user_id: i32,
        items: Vec<OrderItemInput>,
        total_price: BigDecimal,
        proof: Option<PaymentProof>,
    ) -> Result<OrderView, DomainError> {
        let mut order = NewOrder::new(user_id, items, total_price)?;

        if let Some(proof) = proof {
            let verified = self.verifier.verify(&proof).await?;
            order = order.paid_with(verified.payment_id);
        }

        let created = self.with_repo(move |repo| repo.create(order)).await?;
        log::info!(
            "Order {} created for user {} ({} item(s), payment {})",
            created.id,
            created.user_id,
            created.items.len(),
            created.payment_status.as_str()
        );
        Ok(created)
    }

    /// Moves an order to `raw_status` and then notifies its trackers.
    pub async fn update_status(&self, order_id: i32, raw_status: &str) -> Result<OrderView, DomainError> {
        let next: OrderStatus = raw_status.parse()?;

        let updated = self
            .with_repo(move |repo| repo.transition_status(order_id, next))
            .await?;

        // Only committed statuses are announced.
        self.broadcaster.broadcast_status(updated.id, updated.status);
        Ok(updated)
    }

    pub async fn get_order(&self, order_id: i32, requester: Requester) -> Result<OrderView, DomainError> {
        let order = self
            .with_repo(move |repo| repo.find_by_id(order_id))
            .await?
            .ok_or(DomainError::NotFound)?;

        if !requester.can_view(order.user_id) {
            log::warn!(
                "User {} tried to read order {} owned by {}",
                requester.user_id,
                order.id,
                order.user_id
            );
            return Err(DomainError::Forbidden);
        }
        Ok(order)
    }

    pub async fn list_my_orders(&self, user_id: i32) -> Result<Vec<OrderView>, DomainError> {
        self.with_repo(move |repo| repo.list_for_user(user_id)).await
    }
}
