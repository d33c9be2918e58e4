use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use subtle::ConstantTimeEq;

use crate::error::GateError;
use crate::router::GateState;

/// Ensure the inbound request carries the configured API key.
///
/// Reads the `x-api-key` header; a missing header is treated as the empty
/// string, which never matches the non-empty configured key. The comparison
/// is constant-time.
pub fn authorize(expected: &str, headers: &HeaderMap) -> Result<(), GateError> {
    let provided = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(GateError::Unauthorized)
    }
}

/// Extractor form of [`authorize`]: rejects before any body extraction or
/// database session work happens.
#[derive(Debug, Clone, Copy)]
pub struct RequireApiKey;

impl FromRequestParts<GateState> for RequireApiKey {
    type Rejection = GateError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &GateState,
    ) -> Result<Self, Self::Rejection> {
        authorize(&state.api_key, &parts.headers)?;
        Ok(Self)
    }
}
