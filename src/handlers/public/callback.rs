// handlers/public/callback.rs - GET /auth/callback handler
// Completes the hosted sign-in flow

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::AppState;

pub const CALLBACK_FAILED_ERROR: &str = "auth_callback_failed";

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    /// Id of an analysis started before sign-in, to be claimed by the new user
    pub token: Option<String>,
    pub redirect_to: Option<String>,
}

/// Same-site path to continue to. Anything else (absolute URLs, `//host`,
/// backslash tricks) falls back to `/`.
pub fn safe_redirect_target(redirect_to: Option<&str>) -> String {
    match redirect_to.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

/**
 * GET /auth/callback?code=&token=&redirect_to=
 *
 * With a `code`: exchange it for a session and store the access token in the
 * session cookie. A failed exchange goes to the login page with
 * `error=auth_callback_failed`. When `token` names an unclaimed analysis it is
 * assigned to the new user; failing to do so never blocks sign-in.
 *
 * Without a `code` the visitor continues straight to `redirect_to`.
 */
pub async fn callback_get(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> (CookieJar, Redirect) {
    let target = safe_redirect_target(query.redirect_to.as_deref());
    let auth = &state.config.auth;

    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        return (jar, Redirect::to(&target));
    };

    let verifier_cookie = format!("{}-code-verifier", auth.session_cookie);
    let verifier = jar.get(&verifier_cookie).map(|c| c.value().to_string());

    let session = match state.auth.exchange_code(code, verifier.as_deref()).await {
        Ok(session) => session,
        Err(e) => {
            warn!("Auth callback exchange failed: {}", e);
            let failed = format!("{}?error={}", auth.login_path, CALLBACK_FAILED_ERROR);
            return (jar, Redirect::to(&failed));
        }
    };
    info!("User {} signed in", session.user.id);

    if let Some(analysis_id) = query.token.as_deref().filter(|t| !t.is_empty()) {
        claim_analysis(&state, analysis_id, session.user.id).await;
    }

    let cookie = Cookie::build((auth.session_cookie.clone(), session.access_token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.security.secure_cookies)
        .build();
    let jar = jar
        .add(cookie)
        .remove(Cookie::build(verifier_cookie).path("/").build());

    (jar, Redirect::to(&target))
}

async fn claim_analysis(state: &AppState, analysis_id: &str, user_id: Uuid) {
    let client = match state.clients.service() {
        Ok(client) => client,
        Err(e) => {
            warn!("Cannot claim analysis {}: {}", analysis_id, e);
            return;
        }
    };

    match client.claim_analysis(analysis_id, user_id).await {
        Ok(true) => info!("Analysis {} claimed by {}", analysis_id, user_id),
        Ok(false) => warn!("Analysis {} was missing or already claimed", analysis_id),
        Err(e) => warn!("Failed to claim analysis {}: {}", analysis_id, e),
    }
}
