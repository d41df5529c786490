use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentProviderKind {
    Razorpay,
    Stripe,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub provider: PaymentProviderKind,
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
    /// Re-check a correctly signed payment against the provider before trusting it.
    pub confirm_with_provider: bool,
    pub stripe_secret_key: Option<String>,
    pub currency: String,
    pub api_base: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub require_operator_for_status: bool,
    pub payment: PaymentConfig,
}

impl AppConfig {
    /// Reads the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset, like a blank line in `.env`.
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or("PORT", get("PORT"), 8080u16)?;
        let require_operator_for_status =
            parse_or("REQUIRE_OPERATOR_FOR_STATUS", get("REQUIRE_OPERATOR_FOR_STATUS"), false)?;

        let provider = match get("PAYMENT_PROVIDER").as_deref().map(str::to_ascii_lowercase) {
            None => PaymentProviderKind::Razorpay,
            Some(ref v) if v == "razorpay" => PaymentProviderKind::Razorpay,
            Some(ref v) if v == "stripe" => PaymentProviderKind::Stripe,
            Some(value) => {
                return Err(ConfigError::Invalid {
                    name: "PAYMENT_PROVIDER",
                    value,
                })
            }
        };
        let default_currency = match provider {
            PaymentProviderKind::Razorpay => "INR",
            PaymentProviderKind::Stripe => "usd",
        };
        let timeout_secs = parse_or("PAYMENT_TIMEOUT_SECS", get("PAYMENT_TIMEOUT_SECS"), 10u64)?;

        let payment = PaymentConfig {
            provider,
            razorpay_key_id: get("RAZORPAY_KEY_ID"),
            razorpay_key_secret: get("RAZORPAY_KEY_SECRET"),
            confirm_with_provider: parse_or(
                "RAZORPAY_CONFIRM_WITH_PROVIDER",
                get("RAZORPAY_CONFIRM_WITH_PROVIDER"),
                true,
            )?,
            stripe_secret_key: get("STRIPE_SECRET_KEY"),
            currency: get("PAYMENT_CURRENCY").unwrap_or_else(|| default_currency.to_string()),
            api_base: get("PAYMENT_API_BASE"),
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            require_operator_for_status,
            payment,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
