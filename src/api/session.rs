use crate::SharedData;
use crate::domain::session::SessionCredentials;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};
use axum_extra::extract::CookieJar;
use std::convert::Infallible;
use std::sync::Arc;

/// Extracts whatever session credentials the request carries. Never rejects: a request
/// without credentials is turned away later by authentication, with the standard error body.
pub struct RequestCredentials(pub SessionCredentials);

#[async_trait]
impl FromRequestParts<Arc<SharedData>> for RequestCredentials {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<SharedData>,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequestCredentials(credentials_from_headers(
            &parts.headers,
            &state.session_cookie_name,
        )))
    }
}

/// Reads a session token from a bearer Authorization header, falling back to the
/// session cookie named [cookie_name]. An empty bearer token counts as absent.
pub fn credentials_from_headers(headers: &HeaderMap, cookie_name: &str) -> SessionCredentials {
    let bearer_token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer_token {
        return SessionCredentials::with_token(token);
    }

    let jar = CookieJar::from_headers(headers);
    match jar.get(cookie_name) {
        Some(cookie) => SessionCredentials::with_token(cookie.value()),
        None => SessionCredentials::anonymous(),
    }
}
