//! Payment provider integration: payable handles and proof-of-payment checks.

pub mod provider;
pub mod razorpay;
pub mod signature;
pub mod stripe;
pub mod verifier;

pub use provider::{PaymentHandle, PaymentProvider, PaymentRequest, ProviderError};
pub use verifier::{PaymentBackend, PaymentProof, PaymentVerifier, VerifiedPayment};
