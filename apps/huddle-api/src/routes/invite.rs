//! Invite landing page.

use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;

use crate::auth::middleware::MaybeProfile;
use crate::error::{ApiError, StoreError};
use crate::invite;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invite/{invite_code}", get(invite_page))
        .route("/invite/", get(empty_invite_page))
}

// ---------------------------------------------------------------------------
// GET /invite/:invite_code
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/invite/{invite_code}",
    tag = "Invites",
    params(("invite_code" = String, Path, description = "Server invite code")),
    responses(
        (status = 307, description = "Redirect to sign-in, `/`, or the joined server"),
        (status = 404, description = "No server has this invite code", body = String),
        (status = 500, description = "Internal error", body = String),
    ),
)]
pub async fn invite_page(
    MaybeProfile(profile): MaybeProfile,
    State(state): State<AppState>,
    Path(invite_code): Path<String>,
) -> Result<Response, ApiError> {
    respond(&state, profile.as_ref(), &invite_code).await
}

async fn empty_invite_page(
    MaybeProfile(profile): MaybeProfile,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    respond(&state, profile.as_ref(), "").await
}

async fn respond(
    state: &AppState,
    profile: Option<&crate::models::profile::Profile>,
    invite_code: &str,
) -> Result<Response, ApiError> {
    let outcome = invite::accept_invite(state.store.as_ref(), profile, invite_code)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => ApiError::not_found("Invite Not Found"),
            err => ApiError::from_store("INVITE_ACCEPT", err),
        })?;

    Ok(outcome.respond(&state.config.sign_in_url))
}
