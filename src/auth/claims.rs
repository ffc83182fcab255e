//! Access-token claims decoding and identity derivation.
//!
//! Tokens are treated as opaque bearer strings everywhere except here: the
//! payload segment is decoded just far enough to project a displayable
//! identity (email, verification flag). No signature verification happens
//! locally.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::Credentials;

/// The identity projection of the current credentials.
///
/// Always recomputed from the access token; never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub email_verified: bool,
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed access token")]
    MalformedToken,

    #[error("access token is missing identity claims")]
    MissingClaims,
}

/// Decode the claims mapping from a compact token string.
/// Returns `None` on any structural failure.
pub fn decode_claims(token: &str) -> Option<Map<String, Value>> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return None;
    }

    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Derive the caller-facing identity from the current credentials.
pub fn derive_user(credentials: &Credentials) -> Result<User, DecodeError> {
    let claims = decode_claims(&credentials.access_token).ok_or(DecodeError::MalformedToken)?;

    let email = claims
        .get("email")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingClaims)?;
    let email_verified = claims
        .get("email_verified")
        .and_then(Value::as_bool)
        .ok_or(DecodeError::MissingClaims)?;

    Ok(User {
        email: email.to_string(),
        email_verified,
    })
}
