//! OAuth2 handlers: hand out authorization URLs and redeem the codes that come
//! back on the callback.

use crate::{
    errors::AppError,
    handlers::session::{PROVIDER_COOKIE, TOKEN_COOKIE},
    models::responses::{AuthUrlResponse, ValidateResponse},
    state::AppState,
};
use axum::{
    Form, Json,
    extract::{Path, Query, State, rejection::{FormRejection, QueryRejection}},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use chrono::Utc;
use cookie::time::Duration as CookieDuration;
use serde::Deserialize;

/// Form values of the OAuth2 callback (query string or urlencoded body).
#[derive(Debug, Default, Deserialize)]
pub struct ValidateForm {
    pub state: Option<String>,
    pub code: Option<String>,
}

impl ValidateForm {
    /// Body values win over query values, field by field.
    fn merge(self, query: ValidateForm) -> ValidateForm {
        ValidateForm {
            state: self.state.or(query.state),
            code: self.code.or(query.code),
        }
    }
}

/// GET `/auth/{provider}/url`
///
/// Issues a single-use state bound to `provider` and returns the provider's
/// authorization URL carrying it.
pub async fn auth_url(
    State(state): State<AppState>,
    Path(provider_name): Path<String>,
) -> Result<Json<AuthUrlResponse>, AppError> {
    let provider = state
        .registry
        .get(&provider_name)
        .ok_or_else(|| AppError::not_found("Provider not found"))?;

    let oauth_state = state.oauth_states.issue(provider.name()).await;
    Ok(Json(AuthUrlResponse {
        url: provider.auth_url(&oauth_state),
    }))
}

/// GET/POST `/auth/validate`
///
/// Redeems `code` with the provider the `state` was issued for. On success the
/// session cookies are set alongside the JSON credential.
///
/// Values are read from the query string and, when present, an urlencoded
/// body. A POST without such a body falls back to the query string.
pub async fn validate(
    State(state): State<AppState>,
    jar: CookieJar,
    query: Result<Query<ValidateForm>, QueryRejection>,
    body: Result<Form<ValidateForm>, FormRejection>,
) -> Result<(CookieJar, Json<ValidateResponse>), AppError> {
    let query = query.map(|Query(query)| query).unwrap_or_default();
    let form = match body {
        Ok(Form(body)) => body.merge(query),
        Err(rejection) => {
            tracing::debug!("ignoring callback body: {}", rejection);
            query
        }
    };
    let invalid_state = || AppError::bad_request("Invalid state token");

    let oauth_state = form.state.as_deref().ok_or_else(invalid_state)?;
    let provider_name = state
        .oauth_states
        .consume(oauth_state)
        .await
        .ok_or_else(invalid_state)?;
    let provider = state.registry.get(&provider_name).ok_or_else(invalid_state)?;

    let code = form
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::bad_request("Auth Code invalid"))?;

    let credential = provider.validate(&code).await.map_err(|err| {
        tracing::warn!("code exchange with {} failed: {}", provider_name, err);
        AppError::bad_request("Auth Code invalid")
    })?;

    let mut token_cookie = Cookie::build((TOKEN_COOKIE, credential.access_token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    if let Some(expiry) = credential.expiry {
        let seconds = (expiry - Utc::now()).num_seconds().max(0);
        token_cookie = token_cookie.max_age(CookieDuration::seconds(seconds));
    }
    let provider_cookie = Cookie::build((PROVIDER_COOKIE, provider_name.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    tracing::info!("validated authorization code for {}", provider_name);
    let jar = jar.add(token_cookie).add(provider_cookie);
    Ok((jar, Json(credential.into())))
}
