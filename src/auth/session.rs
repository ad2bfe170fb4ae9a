use tracing::warn;

use crate::auth::Principal;
use crate::database::models::Profile;
use crate::database::{ClientFactory, DbClient};
use crate::error::ApiError;
use uuid::Uuid;

/// Identity resolved for one request. Anonymous when no valid token was sent.
#[derive(Debug, Clone, Default)]
pub struct Session {
    principal: Option<Principal>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { principal: None }
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// The principal, or 401 "Not authenticated"
    pub fn require(&self) -> Result<&Principal, ApiError> {
        self.principal.as_ref().ok_or_else(ApiError::not_authenticated)
    }
}

/// Current principal, if any
pub fn get_user(session: &Session) -> Option<Principal> {
    session.principal().cloned()
}

/// Profile row for `id`. Lookup failures are logged and read as "no profile".
pub async fn get_user_profile(client: &DbClient, id: Uuid) -> Option<Profile> {
    match client.profile(id).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Failed to load profile for {}: {}", id, e);
            None
        }
    }
}

/// Principal together with its profile, or None if either is missing
pub async fn get_user_with_profile(
    clients: &ClientFactory,
    session: &Session,
) -> Option<(Principal, Profile)> {
    let user = get_user(session)?;
    let client = clients.server(session);
    let profile = get_user_profile(&client, user.id).await?;
    Some((user, profile))
}
