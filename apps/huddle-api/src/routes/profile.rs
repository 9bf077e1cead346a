//! Profile bootstrap.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::auth::middleware::{CurrentProfile, SessionUser};
use crate::error::ApiError;
use crate::models::profile::Profile;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).post(initial_profile))
}

// ---------------------------------------------------------------------------
// POST /api/profile
// ---------------------------------------------------------------------------

/// Create the profile for a freshly signed-in identity, or return the existing one.
#[utoipa::path(
    post,
    path = "/api/profile",
    tag = "Profile",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile for the session's identity", body = Profile),
        (status = 401, description = "Unauthorized", body = String),
        (status = 500, description = "Internal error", body = String),
    ),
)]
pub async fn initial_profile(
    SessionUser { claims }: SessionUser,
    State(state): State<AppState>,
) -> Result<Json<Profile>, ApiError> {
    if let Some(profile) = state
        .store
        .find_profile_by_user_id(&claims.sub)
        .await
        .map_err(|err| ApiError::from_store("PROFILE_POST", err))?
    {
        return Ok(Json(profile));
    }

    let profile = state
        .store
        .upsert_profile(&claims.profile_seed())
        .await
        .map_err(|err| ApiError::from_store("PROFILE_POST", err))?;

    tracing::info!(profile_id = %profile.id, sub = %claims.sub, "profile created");

    Ok(Json(profile))
}

// ---------------------------------------------------------------------------
// GET /api/profile
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current profile", body = Profile),
        (status = 401, description = "Unauthorized", body = String),
    ),
)]
pub async fn get_profile(CurrentProfile(profile): CurrentProfile) -> Json<Profile> {
    Json(profile)
}
