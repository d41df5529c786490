use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(String),
    #[error("provider rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected provider response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::Malformed(e.to_string())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentRequest {
    /// Amount in the currency's smallest unit (paise, cents).
    pub amount_minor: i64,
    pub currency: String,
    pub receipt: String,
    pub user_id: i32,
}

/// What the client needs to open the provider's checkout.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentHandle {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_payment(&self, request: &PaymentRequest) -> Result<PaymentHandle, ProviderError>;

    /// Current provider-side state of a payment, e.g. `captured` or `succeeded`.
    async fn fetch_payment_status(&self, reference: &str) -> Result<String, ProviderError>;
}

pub(crate) async fn rejection(resp: reqwest::Response) -> ProviderError {
    let status = resp.status().as_u16();
    let body: serde_json::Value = resp.json().await.unwrap_or_default();
    let message = body["error"]["description"]
        .as_str()
        .or_else(|| body["error"]["message"].as_str())
        .unwrap_or("no error description")
        .to_string();
    ProviderError::Rejected { status, message }
}
