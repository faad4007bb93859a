//! Webhook signature scheme: the provider signs `"{t}.{raw body}"` with
//! HMAC-SHA256 and sends `t=<unix>,v1=<hex>[,v1=<hex>...]` in the
//! `stripe-signature` header.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum accepted age (and future skew) of a signed payload, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Unable to extract timestamp and signatures from header")]
    MalformedHeader,

    #[error("No signatures found matching the expected signature for payload")]
    NoMatch,

    #[error("Timestamp outside the tolerance zone")]
    OutsideTolerance,
}

/// Verify a webhook payload against its signature header.
///
/// `now_secs` is injected so the tolerance check is testable; callers pass
/// the current unix time.
pub fn verify(
    payload: &[u8],
    header: &str,
    secret: &str,
    now_secs: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
    if candidates.is_empty() {
        return Err(SignatureError::MalformedHeader);
    }

    let matched = candidates.iter().any(|candidate| {
        let expected = match hex::decode(candidate) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return false,
        };
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        mac.verify_slice(&expected).is_ok()
    });

    if !matched {
        return Err(SignatureError::NoMatch);
    }

    if (now_secs - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::OutsideTolerance);
    }

    Ok(())
}

/// Build a signature header for `payload`. This is what the provider does
/// on its side; the server only needs it for webhook tests.
pub fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}
