//! UPI payment URI validation and payee extraction.
//!
//! A UPI deep link looks like `upi://pay?pa=merchant@bank&pn=Name&am=10`.
//! The payee address (`pa`) is the virtual payment address this pipeline
//! exists to extract.

use percent_encoding::percent_decode_str;

use crate::error::ExtractError;

/// URI scheme prefix a payload must start with to count as a UPI link.
const UPI_SCHEME: &str = "upi://";

/// Validate a decoded payload as a UPI payment URI and pull out the payee
/// address. The scheme must anchor the payload; a QR code that merely
/// mentions `upi://` somewhere in other text is not a payment link.
pub fn validate_upi_payload(payload: &str) -> Result<String, ExtractError> {
    let payload = payload.trim();
    if !payload.starts_with(UPI_SCHEME) {
        return Err(ExtractError::NotUpiPayload);
    }

    let query = match payload.split_once('?') {
        Some((_, query)) => query,
        None => return Err(ExtractError::MissingPayee),
    };

    let payee = query_param(query, "pa").ok_or(ExtractError::MissingPayee)?;
    let payee = payee.trim();
    if payee.is_empty() {
        return Err(ExtractError::MissingPayee);
    }

    log::debug!("extracted payee address ({} chars)", payee.len());
    Ok(payee.to_string())
}

/// First occurrence of `key` in an x-www-form-urlencoded query string.
/// Later duplicates are ignored.
fn query_param(query: &str, key: &str) -> Option<String> {
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (name, value) = match pair.split_once('=') {
            Some((name, value)) => (name, value),
            None => (pair, ""),
        };
        if name == key {
            return Some(decode_component(value));
        }
    }
    None
}

/// Form decoding: '+' is a space, then percent escapes. Invalid UTF-8
/// escapes are replaced rather than rejected.
fn decode_component(raw: &str) -> String {
    let plus_decoded = raw.replace('+', " ");
    percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}
