//! Request signing
//!
//! The API authenticates each request with an HMAC-SHA1 signature over the
//! sorted, lowercased query string.

use crate::command::Command;
use crate::error::{CosmicError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Build the full signed query string for `command`
pub fn signed_query(command: &Command, api_key: &str, secret_key: &str) -> Result<String> {
    let mut pairs = command.to_query();
    pairs.push(("apiKey".to_string(), api_key.to_string()));
    pairs.push(("command".to_string(), command.name().to_string()));
    pairs.push(("response".to_string(), "json".to_string()));
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let query = encode_pairs(&pairs);
    let signature = sign(&query, secret_key)?;

    Ok(format!(
        "{}&signature={}",
        query,
        urlencoding::encode(&signature)
    ))
}

/// `key=value` pairs joined with `&`, spaces encoded as `%20`
pub fn encode_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Base64 HMAC-SHA1 of the lowercased query
pub fn sign(query: &str, secret_key: &str) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(secret_key.as_bytes())
        .map_err(|e| CosmicError::InvalidConfig(format!("invalid secret key: {}", e)))?;
    mac.update(query.to_lowercase().as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
