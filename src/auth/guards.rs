//! Page guards. Failure is a navigation (303 redirect), never an error page.

use axum::response::Redirect;
use tracing::info;

use crate::auth::session::{get_user, get_user_profile, Session};
use crate::auth::Principal;
use crate::config::AuthConfig;
use crate::database::models::Profile;
use crate::database::ClientFactory;

/// Where guarded pages send visitors who fail a role check
pub const ROLE_DENIED_REDIRECT: &str = "/dashboard";

/// Login page URL that returns the visitor to `return_to` after sign-in
pub fn login_redirect(auth: &AuthConfig, return_to: &str) -> Redirect {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("redirect_to", return_to)
        .finish();
    Redirect::to(&format!("{}?{}", auth.login_path, query))
}

/// The signed-in principal, or a redirect to the login page
pub fn require_auth(
    session: &Session,
    auth: &AuthConfig,
    return_to: &str,
) -> Result<Principal, Redirect> {
    get_user(session).ok_or_else(|| {
        info!("Unauthenticated request to {}, redirecting to login", return_to);
        login_redirect(auth, return_to)
    })
}

/// The principal and profile when the profile's `global_role` equals `role`.
/// Anonymous visitors go to login; everyone else to the dashboard.
pub async fn require_role(
    clients: &ClientFactory,
    session: &Session,
    auth: &AuthConfig,
    role: &str,
    return_to: &str,
) -> Result<(Principal, Profile), Redirect> {
    let user = require_auth(session, auth, return_to)?;

    let client = clients.server(session);
    match get_user_profile(&client, user.id).await {
        Some(profile) if profile.has_role(role) => Ok((user, profile)),
        _ => {
            info!("User {} lacks role '{}', redirecting", user.id, role);
            Err(Redirect::to(ROLE_DENIED_REDIRECT))
        }
    }
}
