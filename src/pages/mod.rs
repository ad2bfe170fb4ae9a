//! Server-rendered pages. The guards decide whether a page renders at all;
//! the markup itself is a thin shell the browser app hydrates.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
    Extension,
};
use serde::Deserialize;

use crate::auth::{require_auth, require_role, Session};
use crate::handlers::elevated::SUPERADMIN_ROLE;
use crate::handlers::public::callback::CALLBACK_FAILED_ERROR;
use crate::AppState;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{} | Artist OS</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    ))
}

/// GET /dashboard
pub async fn dashboard_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Response {
    let user = match require_auth(&session, &state.config.auth, "/dashboard") {
        Ok(user) => user,
        Err(redirect) => return redirect.into_response(),
    };

    let who = user.email.as_deref().unwrap_or("artist");
    layout(
        "Dashboard",
        &format!(
            "<main id=\"dashboard\" data-user-id=\"{}\">\n<h1>Welcome back, {}</h1>\n</main>",
            user.id,
            escape(who)
        ),
    )
    .into_response()
}

/// GET /dashboard/superadmin
pub async fn superadmin_page(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Response {
    let (user, profile) = match require_role(
        &state.clients,
        &session,
        &state.config.auth,
        SUPERADMIN_ROLE,
        "/dashboard/superadmin",
    )
    .await
    {
        Ok(found) => found,
        Err(redirect) => return redirect.into_response(),
    };

    let who = profile.email.or(user.email).unwrap_or_else(|| user.id.to_string());
    layout(
        "Superadmin",
        &format!(
            "<main id=\"superadmin\">\n<h1>Operator console</h1>\n<p>Signed in as {}</p>\n<ul>\n<li><a href=\"/api/setup-progress-table\">Set up progress table</a></li>\n</ul>\n</main>",
            escape(&who)
        ),
    )
    .into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub redirect_to: Option<String>,
}

/// GET /login
pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    let notice = match query.error.as_deref() {
        Some(CALLBACK_FAILED_ERROR) => {
            "<p class=\"error\">Sign-in could not be completed. Please try again.</p>\n".to_string()
        }
        Some(other) => format!("<p class=\"error\">{}</p>\n", escape(other)),
        None => String::new(),
    };
    let redirect_to = query.redirect_to.as_deref().unwrap_or("/dashboard");

    layout(
        "Sign in",
        &format!(
            "<main id=\"login\" data-redirect-to=\"{}\">\n<h1>Sign in to Artist OS</h1>\n{}</main>",
            escape(redirect_to),
            notice
        ),
    )
}
