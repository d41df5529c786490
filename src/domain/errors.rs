use thiserror::Error;

use super::status::OrderStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Order not found")]
    NotFound,
    #[error("Product not found")]
    ProductNotFound,
    #[error("No items in cart")]
    EmptyCart,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid order status: {0:?}")]
    InvalidStatus(String),
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Not allowed to access this order")]
    Forbidden,
    #[error("Payment verification failed: {0}")]
    PaymentVerification(String),
    #[error("Payment not completed (provider status: {0})")]
    PaymentNotCompleted(String),
    #[error("Payment has already been used for another order")]
    PaymentAlreadyUsed,
    #[error("Payment service not configured")]
    PaymentUnavailable,
    #[error("Payment provider error: {0}")]
    PaymentProvider(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
}
