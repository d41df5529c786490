use std::sync::Arc;
use std::time::Duration;

use bigdecimal::{BigDecimal, ToPrimitive};
use uuid::Uuid;

use crate::config::{PaymentConfig, PaymentProviderKind};
use crate::domain::errors::DomainError;

use super::provider::{PaymentHandle, PaymentProvider, PaymentRequest};
use super::razorpay::RazorpayClient;
use super::signature;
use super::stripe::StripeClient;

/// Provider-side states that count as money received.
pub const ACCEPTED_STATES: [&str; 3] = ["succeeded", "captured", "authorized"];

const PROVIDER_UNCONFIRMED: &str = "could not confirm payment with provider";

/// Client-submitted claim that a payment went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentProof {
    /// Checkout signature over `provider_order_id|provider_payment_id`.
    Signature {
        provider_order_id: String,
        provider_payment_id: String,
        signature: String,
    },
    /// Provider payment reference whose state is fetched from the provider.
    Reference { payment_reference: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayment {
    pub payment_id: String,
}

pub struct PaymentBackend {
    pub provider: Arc<dyn PaymentProvider>,
    /// Secret used for checkout signatures; `None` when the provider has none.
    pub signing_secret: Option<String>,
    pub confirm_with_provider: bool,
    pub currency: String,
}

/// Gatekeeper between a client's payment claim and the order store.
///
/// Built without a backend when the deployment has no provider credentials;
/// every payment operation then fails with [`DomainError::PaymentUnavailable`].
#[derive(Clone)]
pub struct PaymentVerifier {
    backend: Option<Arc<PaymentBackend>>,
    timeout: Duration,
}

impl PaymentVerifier {
    pub fn new(backend: PaymentBackend, timeout: Duration) -> Self {
        Self {
            backend: Some(Arc::new(backend)),
            timeout,
        }
    }

    pub fn disabled() -> Self {
        Self {
            backend: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn from_config(config: &PaymentConfig) -> Self {
        match build_backend(config) {
            Ok(Some(backend)) => {
                log::info!("Payments enabled via {}", backend.provider.name());
                Self::new(backend, config.timeout)
            }
            Ok(None) => {
                log::warn!("Payment provider keys not found, payment endpoints will answer 503");
                Self::disabled()
            }
            Err(e) => {
                log::error!("Failed to initialise payment provider: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    fn backend(&self) -> Result<&PaymentBackend, DomainError> {
        self.backend
            .as_deref()
            .ok_or(DomainError::PaymentUnavailable)
    }

    /// Asks the provider for a payable handle covering `amount`.
    pub async fn create_payment_handle(
        &self,
        user_id: i32,
        amount: &BigDecimal,
    ) -> Result<PaymentHandle, DomainError> {
        let backend = self.backend()?;
        let amount_minor = to_minor_units(amount)?;

        let request = PaymentRequest {
            amount_minor,
            currency: backend.currency.clone(),
            receipt: format!("receipt_{}", Uuid::new_v4().simple()),
            user_id,
        };
        let provider = backend.provider.name();
        tokio::time::timeout(self.timeout, backend.provider.create_payment(&request))
            .await
            .map_err(|_| {
                DomainError::PaymentProvider(format!(
                    "{provider} did not answer within {:?}",
                    self.timeout
                ))
            })?
            .map_err(|e| {
                log::error!("{} payment creation failed: {}", provider, e);
                DomainError::PaymentProvider(e.to_string())
            })
    }

    /// Checks a payment claim. Never touches order state.
    pub async fn verify(&self, proof: &PaymentProof) -> Result<VerifiedPayment, DomainError> {
        let backend = self.backend()?;

        match proof {
            PaymentProof::Signature {
                provider_order_id,
                provider_payment_id,
                signature: claimed,
            } => {
                let secret = backend.signing_secret.as_deref().ok_or_else(|| {
                    DomainError::PaymentVerification(format!(
                        "{} does not issue checkout signatures",
                        backend.provider.name()
                    ))
                })?;
                if !signature::verify(secret, provider_order_id, provider_payment_id, claimed) {
                    log::warn!(
                        "Rejected payment signature for provider order {}",
                        provider_order_id
                    );
                    return Err(DomainError::PaymentVerification(
                        "Invalid payment signature".to_string(),
                    ));
                }
                if backend.confirm_with_provider {
                    self.confirm_completed(backend, provider_payment_id).await?;
                }
                Ok(VerifiedPayment {
                    payment_id: provider_payment_id.clone(),
                })
            }
            PaymentProof::Reference { payment_reference } => {
                self.confirm_completed(backend, payment_reference).await?;
                Ok(VerifiedPayment {
                    payment_id: payment_reference.clone(),
                })
            }
        }
    }

    async fn confirm_completed(
        &self,
        backend: &PaymentBackend,
        reference: &str,
    ) -> Result<(), DomainError> {
        let provider = backend.provider.name();
        let state = tokio::time::timeout(self.timeout, backend.provider.fetch_payment_status(reference))
            .await
            .map_err(|_| {
                DomainError::PaymentVerification(format!(
                    "{provider} did not answer within {:?}",
                    self.timeout
                ))
            })?
            .map_err(|e| {
                log::warn!("Could not fetch payment {} from {}: {}", reference, provider, e);
                DomainError::PaymentVerification(PROVIDER_UNCONFIRMED.to_string())
            })?;

        if ACCEPTED_STATES.contains(&state.as_str()) {
            Ok(())
        } else {
            log::warn!("Payment {} is {} at {}", reference, state, provider);
            Err(DomainError::PaymentNotCompleted(state))
        }
    }
}

fn build_backend(config: &PaymentConfig) -> Result<Option<PaymentBackend>, super::ProviderError> {
    match config.provider {
        PaymentProviderKind::Razorpay => {
            let (Some(key_id), Some(key_secret)) = (
                config.razorpay_key_id.clone(),
                config.razorpay_key_secret.clone(),
            ) else {
                return Ok(None);
            };
            let client = RazorpayClient::new(
                key_id,
                key_secret.clone(),
                config.api_base.clone(),
                config.timeout,
            )?;
            Ok(Some(PaymentBackend {
                provider: Arc::new(client),
                signing_secret: Some(key_secret),
                confirm_with_provider: config.confirm_with_provider,
                currency: config.currency.clone(),
            }))
        }
        PaymentProviderKind::Stripe => {
            let Some(secret_key) = config.stripe_secret_key.clone() else {
                return Ok(None);
            };
            let client = StripeClient::new(secret_key, config.api_base.clone(), config.timeout)?;
            Ok(Some(PaymentBackend {
                provider: Arc::new(client),
                signing_secret: None,
                confirm_with_provider: true,
                currency: config.currency.clone(),
            }))
        }
    }
}

/// Converts a decimal amount to the provider's smallest currency unit.
pub fn to_minor_units(amount: &BigDecimal) -> Result<i64, DomainError> {
    if *amount <= BigDecimal::from(0) {
        return Err(DomainError::InvalidInput("Invalid amount".to_string()));
    }
    (amount * BigDecimal::from(100))
        .round(0)
        .to_i64()
        .filter(|minor| *minor > 0)
        .ok_or_else(|| DomainError::InvalidInput("Invalid amount".to_string()))
}
