use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use super::errors::DomainError;
use super::status::{OrderStatus, PaymentStatus};

/// `orders.total_price` is `NUMERIC(10, 2)`: at most 8 integer digits.
const MAX_TOTAL_EXCLUSIVE: i64 = 100_000_000;
const TOTAL_SCALE: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemInput {
    pub product_id: i32,
    pub quantity: i32,
}

/// A validated order ready to be written.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i32,
    pub total_price: BigDecimal,
    pub payment_id: Option<String>,
    pub items: Vec<OrderItemInput>,
}

impl NewOrder {
    pub fn new(
        user_id: i32,
        items: Vec<OrderItemInput>,
        total_price: BigDecimal,
    ) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::EmptyCart);
        }
        if total_price <= BigDecimal::from(0) {
            return Err(DomainError::InvalidInput(
                "total_price must be greater than zero".to_string(),
            ));
        }
        if total_price.with_scale(TOTAL_SCALE) != total_price {
            return Err(DomainError::InvalidInput(
                "total_price must have at most 2 decimal places".to_string(),
            ));
        }
        if total_price >= BigDecimal::from(MAX_TOTAL_EXCLUSIVE) {
            return Err(DomainError::InvalidInput(
                "total_price is too large".to_string(),
            ));
        }
        if let Some(item) = items.iter().find(|i| i.quantity < 1) {
            return Err(DomainError::InvalidInput(format!(
                "quantity for product {} must be at least 1",
                item.product_id
            )));
        }
        Ok(Self {
            user_id,
            total_price,
            payment_id: None,
            items,
        })
    }

    pub fn paid_with(mut self, payment_id: String) -> Self {
        self.payment_id = Some(payment_id);
        self
    }

    pub fn payment_status(&self) -> PaymentStatus {
        PaymentStatus::for_reference(self.payment_id.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct ProductSummary {
    pub id: i32,
    pub name: String,
    pub price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct UserSummary {
    pub id: i32,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub product: ProductSummary,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i32,
    pub user_id: i32,
    pub total_price: BigDecimal,
    pub status: OrderStatus,
    pub payment_id: Option<String>,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
    /// Only populated by single-order reads.
    pub user: Option<UserSummary>,
}
