use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::auth::{decode_token, AuthError, Principal, Session};
use crate::config::AuthConfig;
use crate::AppState;

/// Resolves the request's session from the session cookie or a bearer token
/// and stores it in request extensions. Never rejects: a missing or invalid
/// token yields an anonymous session and handlers decide what that means.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = resolve_session(request.headers(), &state.config.auth);
    request.extensions_mut().insert(session);
    next.run(request).await
}

pub fn resolve_session(headers: &HeaderMap, auth: &AuthConfig) -> Session {
    let token = match extract_token(headers, &auth.session_cookie) {
        Ok(token) => token,
        Err(_) => return Session::anonymous(),
    };

    match decode_token(&token, &auth.jwt_secret, &auth.jwt_audience) {
        Ok(claims) => Session::authenticated(Principal::from(claims)),
        Err(e) => {
            debug!("Ignoring session token: {}", e);
            Session::anonymous()
        }
    }
}

/// Bearer header first, then the session cookie
fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Result<String, AuthError> {
    if let Some(value) = headers.get("authorization") {
        let value = value
            .to_str()
            .map_err(|_| AuthError::InvalidToken("Invalid Authorization header format".to_string()))?;
        return match value.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(AuthError::InvalidToken(
                "Authorization header must use Bearer token format".to_string(),
            )),
        };
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}
