pub mod health;
pub mod orders;
pub mod realtime;

use utoipa::OpenApi;

use crate::domain::status::{OrderStatus, PaymentStatus};
use crate::payment::PaymentHandle;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        orders::create_payment_intent,
        orders::confirm_payment,
        orders::create_order,
        orders::my_orders,
        orders::get_order,
        orders::update_status,
    ),
    components(schemas(
        orders::CreatePaymentIntentRequest,
        orders::OrderItemRequest,
        orders::CreateOrderRequest,
        orders::ConfirmPaymentRequest,
        orders::UpdateStatusRequest,
        orders::ProductResponse,
        orders::OrderItemResponse,
        orders::UserResponse,
        orders::OrderResponse,
        health::HealthResponse,
        PaymentHandle,
        OrderStatus,
        PaymentStatus,
    )),
    tags(
        (name = "orders", description = "Order placement, payment confirmation and lifecycle"),
        (name = "health", description = "Liveness probe"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_order_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/health",
            "/api/orders",
            "/api/orders/confirm-payment",
            "/api/orders/{id}/status",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path}");
        }
    }
}
