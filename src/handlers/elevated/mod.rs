// handlers/elevated/mod.rs - Elevated handlers (superadmin + service credential)
//
// Security Level: session whose profile has global_role = "superadmin"
// Database access: the service-role client, which bypasses row ownership
// Failures are JSON errors: 401 without a session, 403 for other roles,
// 503 when the service credential is not configured.

pub mod setup;    // GET /api/setup-progress-table
pub mod viberate; // GET /api/viberate/debug-sync

pub use setup::setup_progress_table_get;
pub use viberate::debug_sync_get;

use tracing::warn;

use crate::auth::{get_user_profile, Principal, Session};
use crate::database::DbClient;
use crate::error::ApiError;
use crate::AppState;

pub const SUPERADMIN_ROLE: &str = "superadmin";

/// The superadmin principal and a service-role client, or the matching error
pub async fn require_superadmin(state: &AppState, session: &Session) -> Result<(Principal, DbClient), ApiError> {
    let user = session.require()?.clone();

    let client = state.clients.server(session);
    match get_user_profile(&client, user.id).await {
        Some(profile) if profile.has_role(SUPERADMIN_ROLE) => {}
        _ => {
            warn!("User {} denied operator access", user.id);
            return Err(ApiError::forbidden("Superadmin access required"));
        }
    }

    let service = state.clients.service()?;
    Ok((user, service))
}
