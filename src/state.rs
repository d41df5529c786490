use std::sync::Arc;

use actix_web::web;

use crate::application::order_service::OrderService;
use crate::auth::AuthSettings;
use crate::domain::ports::OrderRepository;
use crate::payment::PaymentVerifier;
use crate::realtime::OrderHub;

/// Shared handles registered as `app_data` on every worker.
#[derive(Clone)]
pub struct AppState {
    pub orders: web::Data<OrderService>,
    pub hub: web::Data<OrderHub>,
    pub auth: web::Data<AuthSettings>,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        verifier: PaymentVerifier,
        hub: OrderHub,
        auth: AuthSettings,
    ) -> Self {
        let orders = OrderService::new(repo, verifier, Arc::new(hub.clone()));
        Self {
            orders: web::Data::new(orders),
            hub: web::Data::new(hub),
            auth: web::Data::new(auth),
        }
    }
}
