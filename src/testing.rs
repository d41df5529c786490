//! In-memory doubles for the repository, provider and broadcaster seams.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, OrderItemView, OrderView, ProductSummary, UserSummary};
use crate::domain::ports::{OrderRepository, StatusBroadcaster};
use crate::domain::status::OrderStatus;
use crate::payment::{PaymentHandle, PaymentProvider, PaymentRequest, ProviderError};

pub struct FakePaymentProvider {
    status: String,
    delay: Duration,
    fetches: AtomicUsize,
    transport_error: Option<String>,
}

impl FakePaymentProvider {
    pub fn with_status(status: &str) -> Self {
        Self {
            status: status.to_string(),
            delay: Duration::ZERO,
            fetches: AtomicUsize::new(0),
            transport_error: None,
        }
    }

    /// Every status fetch fails with a transport error carrying `detail`.
    pub fn unreachable(detail: &str) -> Self {
        Self {
            transport_error: Some(detail.to_string()),
            ..Self::with_status("unknown")
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentProvider for FakePaymentProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn create_payment(&self, request: &PaymentRequest) -> Result<PaymentHandle, ProviderError> {
        tokio::time::sleep(self.delay).await;
        Ok(PaymentHandle {
            id: format!("order_{}", request.receipt),
            amount: request.amount_minor,
            currency: request.currency.clone(),
            key_id: Some("rzp_test_key".to_string()),
            client_secret: None,
        })
    }

    async fn fetch_payment_status(&self, _reference: &str) -> Result<String, ProviderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match &self.transport_error {
            Some(detail) => Err(ProviderError::Transport(detail.clone())),
            None => Ok(self.status.clone()),
        }
    }
}

#[derive(Default)]
pub struct RecordingBroadcaster {
    events: Mutex<Vec<(i32, OrderStatus)>>,
}

impl RecordingBroadcaster {
    pub fn events(&self) -> Vec<(i32, OrderStatus)> {
        self.events.lock().unwrap().clone()
    }
}

impl StatusBroadcaster for RecordingBroadcaster {
    fn broadcast_status(&self, order_id: i32, status: OrderStatus) -> usize {
        self.events.lock().unwrap().push((order_id, status));
        1
    }
}

struct Store {
    next_order_id: i32,
    next_item_id: i32,
    orders: BTreeMap<i32, OrderView>,
}

/// Mirrors the Postgres repository's all-or-nothing writes, foreign keys and
/// unique payment references.
pub struct InMemoryOrderRepository {
    store: Mutex<Store>,
    products: HashMap<i32, ProductSummary>,
    users: HashMap<i32, UserSummary>,
    fail_writes: AtomicBool,
}

impl Default for InMemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryOrderRepository {
    /// Users 7 and 8, products 3 (28.00) and 4 (12.50).
    pub fn new() -> Self {
        let products = [(3, "Paneer Tikka", "28.00"), (4, "Masala Dosa", "12.50")]
            .into_iter()
            .map(|(id, name, price)| {
                (
                    id,
                    ProductSummary {
                        id,
                        name: name.to_string(),
                        price: BigDecimal::from_str(price).unwrap(),
                    },
                )
            })
            .collect();
        let users = [(7, "Asha"), (8, "Ravi")]
            .into_iter()
            .map(|(id, name)| {
                (
                    id,
                    UserSummary {
                        id,
                        name: name.to_string(),
                        email: format!("{}@example.com", name.to_lowercase()),
                    },
                )
            })
            .collect();
        Self {
            store: Mutex::new(Store {
                next_order_id: 1,
                next_item_id: 1,
                orders: BTreeMap::new(),
            }),
            products,
            users,
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn starting_at(self, order_id: i32) -> Self {
        self.store.lock().unwrap().next_order_id = order_id;
        self
    }

    /// Every following write fails as if the database went away.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn order_count(&self) -> usize {
        self.store.lock().unwrap().orders.len()
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(DomainError::Persistence("connection reset".to_string()))
        } else {
            Ok(())
        }
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, order: NewOrder) -> Result<OrderView, DomainError> {
        self.check_writable()?;
        if order.items.is_empty() {
            return Err(DomainError::EmptyCart);
        }
        if !self.users.contains_key(&order.user_id) {
            return Err(DomainError::InvalidInput(format!(
                "unknown user {}",
                order.user_id
            )));
        }
        let products = order
            .items
            .iter()
            .map(|i| self.products.get(&i.product_id).cloned())
            .collect::<Option<Vec<_>>>()
            .ok_or(DomainError::ProductNotFound)?;

        let mut store = self.store.lock().unwrap();
        if let Some(reference) = order.payment_id.as_deref() {
            if store
                .orders
                .values()
                .any(|o| o.payment_id.as_deref() == Some(reference))
            {
                return Err(DomainError::PaymentAlreadyUsed);
            }
        }
        let id = store.next_order_id;
        store.next_order_id += 1;
        let mut items = Vec::with_capacity(order.items.len());
        for (input, product) in order.items.iter().zip(products) {
            items.push(OrderItemView {
                id: store.next_item_id,
                product_id: input.product_id,
                quantity: input.quantity,
                product,
            });
            store.next_item_id += 1;
        }
        let now = Utc::now();
        let view = OrderView {
            id,
            user_id: order.user_id,
            total_price: order.total_price.clone(),
            status: OrderStatus::INITIAL,
            payment_status: order.payment_status(),
            payment_id: order.payment_id,
            created_at: now,
            updated_at: now,
            items,
            user: None,
        };
        store.orders.insert(id, view.clone());
        Ok(view)
    }

    fn find_by_id(&self, id: i32) -> Result<Option<OrderView>, DomainError> {
        let store = self.store.lock().unwrap();
        Ok(store.orders.get(&id).cloned().map(|mut order| {
            order.user = self.users.get(&order.user_id).cloned();
            order
        }))
    }

    fn list_for_user(&self, user_id: i32) -> Result<Vec<OrderView>, DomainError> {
        let store = self.store.lock().unwrap();
        let mut orders: Vec<OrderView> = store
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    fn transition_status(&self, id: i32, next: OrderStatus) -> Result<OrderView, DomainError> {
        self.check_writable()?;
        let mut store = self.store.lock().unwrap();
        let order = store.orders.get_mut(&id).ok_or(DomainError::NotFound)?;
        order.status.ensure_transition(next)?;
        order.status = next;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }
}
