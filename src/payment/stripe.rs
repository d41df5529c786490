//! Stripe PaymentIntents via REST (no SDK), retrieve-mode checkout.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::provider::{rejection, PaymentHandle, PaymentProvider, PaymentRequest, ProviderError};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

pub struct StripeClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct PaymentIntent {
    id: String,
    amount: i64,
    currency: String,
    status: String,
    client_secret: Option<String>,
}

impl StripeClient {
    pub fn new(
        secret_key: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            secret_key,
        })
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn create_payment(&self, request: &PaymentRequest) -> Result<PaymentHandle, ProviderError> {
        let amount = request.amount_minor.to_string();
        let user_id = request.user_id.to_string();
        let resp = self
            .http
            .post(format!("{}/v1/payment_intents", self.base_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&[
                ("amount", amount.as_str()),
                ("currency", request.currency.as_str()),
                ("automatic_payment_methods[enabled]", "true"),
                ("metadata[userId]", user_id.as_str()),
                ("metadata[receipt]", request.receipt.as_str()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(rejection(resp).await);
        }
        let intent: PaymentIntent = resp.json().await?;

        Ok(PaymentHandle {
            id: intent.id,
            amount: intent.amount,
            currency: intent.currency,
            key_id: None,
            client_secret: intent.client_secret,
        })
    }

    async fn fetch_payment_status(&self, reference: &str) -> Result<String, ProviderError> {
        let resp = self
            .http
            .get(format!("{}/v1/payment_intents/{}", self.base_url, reference))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(rejection(resp).await);
        }
        let intent: PaymentIntent = resp.json().await?;
        Ok(intent.status)
    }
}
