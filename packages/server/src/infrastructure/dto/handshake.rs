//! Credential extraction for the WebSocket handshake.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use serde::Deserialize;

/// Query parameters for the WebSocket handshake
///
/// Browsers cannot set headers on a WebSocket upgrade, so the token may also
/// travel in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct HandshakeQuery {
    pub token: Option<String>,
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolve the handshake credential: header first, query string second.
pub fn resolve_credential<'a>(
    headers: &'a HeaderMap,
    query: &'a HandshakeQuery,
) -> Option<&'a str> {
    extract_bearer_token(headers).or_else(|| {
        query
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    })
}
