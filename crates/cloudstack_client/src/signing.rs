//! CloudStack request signing

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::collections::BTreeMap;
use types::{CloudStackError, Result};

type HmacSha1 = Hmac<Sha1>;

/// Encode parameters as `key=value` pairs sorted by key.
///
/// Values are percent-encoded with spaces as `%20`, which is what the
/// server re-creates before checking the signature.
pub fn encode_params(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Base64 HMAC-SHA1 of the lowercased query
pub fn sign(query: &str, secret_key: &str) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(secret_key.as_bytes())
        .map_err(|e| CloudStackError::Internal(format!("invalid signing key: {}", e)))?;
    mac.update(query.to_lowercase().as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Full query string including the trailing `signature` parameter
pub fn signed_query(params: &BTreeMap<String, String>, secret_key: &str) -> Result<String> {
    let query = encode_params(params);
    let signature = sign(&query, secret_key)?;
    Ok(format!("{}&signature={}", query, urlencoding::encode(&signature)))
}
