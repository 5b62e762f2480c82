//! Bearer token extractor.
//!
//! Tokens are not validated here; they are forwarded to the upstream
//! services, which accept or reject them.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header};

use crate::middleware::error::AppError;

/// The caller's bearer token.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(token: BearerToken) -> impl Responder { ... }
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    #[cfg(test)]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

fn extract(req: &HttpRequest) -> Result<BearerToken, AppError> {
    let value = req.headers().get(header::AUTHORIZATION).ok_or_else(|| {
        AppError::Unauthorized(
            "Please provide a Bearer token in the Authorization header.".into(),
        )
    })?;

    let value = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header".into()))?;

    match value.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(BearerToken(token.to_string())),
        _ => Err(AppError::Unauthorized("Expected Bearer token".into())),
    }
}

impl FromRequest for BearerToken {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}
