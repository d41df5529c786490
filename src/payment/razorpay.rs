//! Razorpay REST client (orders + payments), signature-mode checkout.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::provider::{rejection, PaymentHandle, PaymentProvider, PaymentRequest, ProviderError};

pub const DEFAULT_API_BASE: &str = "https://api.razorpay.com";

pub struct RazorpayClient {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

#[derive(Debug, Deserialize)]
struct RazorpayOrder {
    id: String,
    amount: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct RazorpayPayment {
    status: String,
}

impl RazorpayClient {
    pub fn new(
        key_id: String,
        key_secret: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            key_id,
            key_secret,
        })
    }
}

#[async_trait]
impl PaymentProvider for RazorpayClient {
    fn name(&self) -> &'static str {
        "razorpay"
    }

    async fn create_payment(&self, request: &PaymentRequest) -> Result<PaymentHandle, ProviderError> {
        let resp = self
            .http
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&json!({
                "amount": request.amount_minor,
                "currency": request.currency,
                "receipt": request.receipt,
                "notes": { "userId": request.user_id.to_string() },
            }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(rejection(resp).await);
        }
        let order: RazorpayOrder = resp.json().await?;

        Ok(PaymentHandle {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
            key_id: Some(self.key_id.clone()),
            client_secret: None,
        })
    }

    async fn fetch_payment_status(&self, reference: &str) -> Result<String, ProviderError> {
        let resp = self
            .http
            .get(format!("{}/v1/payments/{}", self.base_url, reference))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(rejection(resp).await);
        }
        let payment: RazorpayPayment = resp.json().await?;
        Ok(payment.status)
    }
}
