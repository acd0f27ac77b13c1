//! Session cookie extraction.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;

use crate::errors::AppError;

pub const TOKEN_COOKIE: &str = "token";
pub const PROVIDER_COOKIE: &str = "provider";

/// Credentials of an authenticated caller, read from its cookies.
///
/// Rejects the request with 401 when the `token` cookie is missing or empty.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub provider: Option<String>,
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let token = jar
            .get(TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::unauthorized("User not authenticated"))?;

        let provider = jar
            .get(PROVIDER_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self { token, provider })
    }
}
