// handlers/protected/profile.rs - GET /api/test-artist-profile handler

use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::auth::Session;
use crate::database::models::ArtistView;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// Raw artist profile row next to the resolved view, which column each
/// attribute was read from, and the profile's social links
pub async fn test_artist_profile_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Value> {
    let user = session.require()?;
    let client = state.clients.authenticated(&session);

    let row = client
        .artist_profile(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("No artist profile found for this user"))?;
    let links = client.social_links(user.id).await?;

    Ok(ApiResponse::success(json!({
        "raw": row,
        "resolved": ArtistView::from_row(&row),
        "sources": ArtistView::sources(&row),
        "columns": row.keys().collect::<Vec<_>>(),
        "socialLinks": links,
    })))
}
