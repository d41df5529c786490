use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::order_service::OrderService;
use crate::auth::{AuthSettings, AuthenticatedUser};
use crate::domain::order::{OrderItemInput, OrderItemView, OrderView, UserSummary};
use crate::domain::status::{OrderStatus, PaymentStatus};
use crate::errors::AppError;
use crate::payment::{PaymentHandle, PaymentProof};

// ── Request / response DTOs ──────────────────────────────────────────────────

/// Money as clients send it: a decimal string (`"56.00"`) or a JSON number (`56.5`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MoneyInput {
    Text(String),
    Number(serde_json::Number),
}

impl MoneyInput {
    fn parse(&self, field: &str) -> Result<BigDecimal, AppError> {
        match self {
            MoneyInput::Text(raw) => BigDecimal::from_str(raw.trim())
                .map_err(|_| AppError::BadRequest(format!("Invalid {field} '{raw}'"))),
            // Numbers come from binary floats; settle them to cents.
            MoneyInput::Number(n) => BigDecimal::from_str(&n.to_string())
                .map(|v| v.round(2))
                .map_err(|_| AppError::BadRequest(format!("Invalid {field} {n}"))),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentIntentRequest {
    /// Decimal string preferred to avoid floating-point issues, e.g. "56.00"
    #[schema(value_type = String, example = "56.00")]
    pub amount: MoneyInput,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    #[serde(alias = "productId")]
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    /// Client-declared total, e.g. "56.00". Not recomputed from catalog prices.
    #[serde(alias = "totalPrice")]
    #[schema(value_type = String, example = "56.00")]
    pub total_price: MoneyInput,
}

/// Proof of payment plus the cart snapshot it pays for.
///
/// Either the three signature fields (Razorpay checkout) or a
/// `payment_reference` (Stripe PaymentIntent id) must be present.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmPaymentRequest {
    #[serde(default, alias = "razorpay_order_id")]
    pub provider_order_id: Option<String>,
    #[serde(default, alias = "razorpay_payment_id")]
    pub provider_payment_id: Option<String>,
    #[serde(default, alias = "razorpay_signature")]
    pub signature: Option<String>,
    #[serde(default, alias = "payment_intent_id", alias = "paymentIntentId")]
    pub payment_reference: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    #[serde(alias = "totalPrice")]
    #[schema(value_type = String, example = "56.00")]
    pub total_price: MoneyInput,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub product: ProductResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub user_id: i32,
    pub total_price: String,
    pub status: OrderStatus,
    pub payment_id: Option<String>,
    pub payment_status: PaymentStatus,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

impl From<OrderItemView> for OrderItemResponse {
    fn from(item: OrderItemView) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            product: ProductResponse {
                id: item.product.id,
                name: item.product.name,
                price: item.product.price.to_string(),
            },
        }
    }
}

impl From<UserSummary> for UserResponse {
    fn from(user: UserSummary) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            total_price: order.total_price.to_string(),
            status: order.status,
            payment_id: order.payment_id,
            payment_status: order.payment_status,
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
            items: order.items.into_iter().map(Into::into).collect(),
            user: order.user.map(Into::into),
        }
    }
}

fn to_items(items: Vec<OrderItemRequest>) -> Vec<OrderItemInput> {
    items
        .into_iter()
        .map(|i| OrderItemInput {
            product_id: i.product_id,
            quantity: i.quantity,
        })
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ConfirmPaymentRequest {
    fn proof(&self) -> Result<PaymentProof, AppError> {
        let signature_fields = (
            non_empty(self.provider_order_id.clone()),
            non_empty(self.provider_payment_id.clone()),
            non_empty(self.signature.clone()),
        );
        match (signature_fields, non_empty(self.payment_reference.clone())) {
            ((Some(provider_order_id), Some(provider_payment_id), Some(signature)), _) => {
                Ok(PaymentProof::Signature {
                    provider_order_id,
                    provider_payment_id,
                    signature,
                })
            }
            (_, Some(payment_reference)) => Ok(PaymentProof::Reference { payment_reference }),
            _ => Err(AppError::BadRequest("Missing required fields".to_string())),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/orders/create-payment-intent
///
/// Asks the payment provider for a payable handle covering `amount`.
#[utoipa::path(
    post,
    path = "/api/orders/create-payment-intent",
    request_body = CreatePaymentIntentRequest,
    responses(
        (status = 200, description = "Payable handle created", body = PaymentHandle),
        (status = 400, description = "Invalid amount"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 502, description = "Payment provider failed"),
        (status = 503, description = "Payment service not configured"),
    ),
    tag = "orders"
)]
pub async fn create_payment_intent(
    service: web::Data<OrderService>,
    user: AuthenticatedUser,
    body: web::Json<CreatePaymentIntentRequest>,
) -> Result<HttpResponse, AppError> {
    let amount = body.amount.parse("amount")?;
    let handle = service
        .create_payment_handle(user.user_id(), &amount)
        .await?;
    Ok(HttpResponse::Ok().json(handle))
}

/// POST /api/orders/confirm-payment
///
/// Verifies the payment proof and, only if it holds, creates the order and
/// its items in a single transaction.
#[utoipa::path(
    post,
    path = "/api/orders/confirm-payment",
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 201, description = "Payment verified and order created", body = OrderResponse),
        (status = 400, description = "Missing fields, empty cart or payment not verified"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Unknown product"),
        (status = 503, description = "Payment service not configured"),
    ),
    tag = "orders"
)]
pub async fn confirm_payment(
    service: web::Data<OrderService>,
    user: AuthenticatedUser,
    body: web::Json<ConfirmPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let proof = body.proof()?;
    let total_price = body.total_price.parse("total_price")?;

    let order = service
        .create_order(user.user_id(), to_items(body.items), total_price, Some(proof))
        .await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// POST /api/orders
///
/// Creates an unpaid (cash on delivery) order together with its items.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 400, description = "Empty cart or invalid input"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Unknown product"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<OrderService>,
    user: AuthenticatedUser,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    if body.items.is_empty() {
        return Err(AppError::BadRequest("No items in cart".to_string()));
    }
    let total_price = body.total_price.parse("total_price")?;

    let order = service
        .create_order(user.user_id(), to_items(body.items), total_price, None)
        .await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /api/orders/my-orders
///
/// Returns the caller's orders with their items, newest first.
#[utoipa::path(
    get,
    path = "/api/orders/my-orders",
    responses(
        (status = 200, description = "Caller's orders", body = [OrderResponse]),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn my_orders(
    service: web::Data<OrderService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let orders: Vec<OrderResponse> = service
        .list_my_orders(user.user_id())
        .await?
        .into_iter()
        .map(OrderResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(orders))
}

/// GET /api/orders/{id}
///
/// Returns the order together with its items and owning user.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<OrderService>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let order = service.get_order(path.into_inner(), user.0).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PUT /api/orders/{id}/status
///
/// Moves the order along its lifecycle and notifies everyone tracking it.
/// Open to anonymous callers unless operator tokens are required by config.
#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    params(
        ("id" = i32, Path, description = "Order id"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated and broadcast", body = OrderResponse),
        (status = 400, description = "Missing or unknown status"),
        (status = 401, description = "Operator token required"),
        (status = 403, description = "Caller is not an operator"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Transition not allowed from the current status"),
    ),
    tag = "orders"
)]
pub async fn update_status(
    service: web::Data<OrderService>,
    settings: web::Data<AuthSettings>,
    user: Option<AuthenticatedUser>,
    path: web::Path<i32>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    if settings.require_operator_for_status {
        match user {
            None => return Err(AppError::Unauthorized("operator token required".to_string())),
            Some(u) if !u.0.is_staff() => return Err(AppError::Forbidden),
            Some(_) => {}
        }
    }
    if body.status.trim().is_empty() {
        return Err(AppError::BadRequest("Status is required".to_string()));
    }

    let order = service
        .update_status(path.into_inner(), &body.status)
        .await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
