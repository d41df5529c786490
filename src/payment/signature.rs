//! HMAC-SHA256 checkout signatures (`order_id|payment_id`, hex encoded).

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(
    secret: &str,
    provider_order_id: &str,
    provider_payment_id: &str,
) -> Result<HmacSha256, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(provider_order_id.as_bytes());
    mac.update(b"|");
    mac.update(provider_payment_id.as_bytes());
    Ok(mac)
}

pub fn sign(
    secret: &str,
    provider_order_id: &str,
    provider_payment_id: &str,
) -> Result<String, InvalidLength> {
    let mac = mac_for(secret, provider_order_id, provider_payment_id)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time comparison against a lowercase hex signature.
pub fn verify(
    secret: &str,
    provider_order_id: &str,
    provider_payment_id: &str,
    signature: &str,
) -> bool {
    if signature.bytes().any(|b| b.is_ascii_uppercase()) {
        return false;
    }
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    mac_for(secret, provider_order_id, provider_payment_id)
        .map(|mac| mac.verify_slice(&expected).is_ok())
        .unwrap_or(false)
}
